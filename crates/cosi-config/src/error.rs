use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
