//! Daemon error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Unsupported endpoint '{0}': expected unix://<path> or tcp://<host:port>")]
    UnsupportedEndpoint(String),

    #[error("Invalid tcp address '{0}'")]
    InvalidAddress(String),

    #[error("Driver name must not be empty")]
    EmptyDriverName,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
