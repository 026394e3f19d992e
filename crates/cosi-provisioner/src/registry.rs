//! In-memory bucket registry
//!
//! Keeps the name → record and bucket ID → name maps for every live bucket.
//! Both maps sit behind one lock so a reader never observes one updated
//! without the other. Lookups take the shared lock, every mutation takes the
//! exclusive lock, and no I/O ever happens while either is held.
//!
//! The registry is a process-local cache: it starts empty and is not
//! reconciled against the backend.

use crate::parameters::BucketParameters;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

/// One provisioned bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRecord {
    /// Caller-assigned bucket name
    pub name: String,

    /// Identifier returned by the backend
    pub bucket_id: String,

    /// Parameters supplied at creation
    pub parameters: BucketParameters,
}

impl BucketRecord {
    pub fn new(
        name: impl Into<String>,
        bucket_id: impl Into<String>,
        parameters: BucketParameters,
    ) -> Self {
        Self {
            name: name.into(),
            bucket_id: bucket_id.into(),
            parameters,
        }
    }
}

/// Outcome of [`Registry::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The record was inserted
    Inserted(BucketRecord),
    /// A record with the same name was already present and was kept as is
    Existing(BucketRecord),
}

#[derive(Debug, Default)]
struct Maps {
    by_name: HashMap<String, BucketRecord>,
    by_id: HashMap<String, String>,
}

/// Process-wide bucket registry
#[derive(Debug, Default)]
pub struct Registry {
    maps: RwLock<Maps>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record registered under `name`
    pub fn lookup(&self, name: &str) -> Option<BucketRecord> {
        self.maps.read().by_name.get(name).cloned()
    }

    /// Resolve a bucket ID to its registered name
    pub fn name_for(&self, bucket_id: &str) -> Option<String> {
        self.maps.read().by_id.get(bucket_id).cloned()
    }

    /// Insert a record unless its name is already registered.
    ///
    /// An existing record is never overwritten; the caller decides what a
    /// name collision means.
    pub fn register(&self, record: BucketRecord) -> Registration {
        let mut maps = self.maps.write();

        if let Some(existing) = maps.by_name.get(&record.name) {
            return Registration::Existing(existing.clone());
        }

        // A bucket ID held by another name means that name's container is
        // gone from the backend's point of view.
        if let Some(stale) = maps.by_id.remove(&record.bucket_id) {
            tracing::warn!(
                bucket_id = %record.bucket_id,
                stale_name = %stale,
                name = %record.name,
                "Bucket ID reassigned, dropping stale registry entry"
            );
            maps.by_name.remove(&stale);
        }

        maps.by_id.insert(record.bucket_id.clone(), record.name.clone());
        maps.by_name.insert(record.name.clone(), record.clone());
        Registration::Inserted(record)
    }

    /// Remove the record owning `bucket_id`, if any
    pub fn remove_by_id(&self, bucket_id: &str) -> Option<BucketRecord> {
        let mut maps = self.maps.write();

        let name = maps.by_id.remove(bucket_id)?;
        match maps.by_name.get(&name) {
            Some(record) if record.bucket_id == bucket_id => maps.by_name.remove(&name),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.maps.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all live records, sorted by name
    pub fn records(&self) -> Vec<BucketRecord> {
        let mut records: Vec<BucketRecord> =
            self.maps.read().by_name.values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Check that the name and ID maps are exact inverses of each other
    pub fn is_consistent(&self) -> bool {
        let maps = self.maps.read();

        maps.by_name.len() == maps.by_id.len()
            && maps.by_name.iter().all(|(name, record)| {
                record.name == *name
                    && maps.by_id.get(&record.bucket_id).map(String::as_str) == Some(name.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BucketParameters {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        let record = BucketRecord::new("logs", "acct1/logs", params(&[("tier", "hot")]));

        assert_eq!(
            registry.register(record.clone()),
            Registration::Inserted(record.clone())
        );
        assert_eq!(registry.lookup("logs"), Some(record));
        assert_eq!(registry.name_for("acct1/logs"), Some("logs".to_string()));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_register_never_overwrites() {
        let registry = Registry::new();
        let hot = BucketRecord::new("logs", "acct1/logs", params(&[("tier", "hot")]));
        let cold = BucketRecord::new("logs", "acct1/logs", params(&[("tier", "cold")]));

        registry.register(hot.clone());
        assert_eq!(registry.register(cold), Registration::Existing(hot.clone()));
        assert_eq!(registry.lookup("logs"), Some(hot));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_by_id_clears_both_maps() {
        let registry = Registry::new();
        registry.register(BucketRecord::new("logs", "acct1/logs", BucketParameters::new()));

        let removed = registry.remove_by_id("acct1/logs").unwrap();
        assert_eq!(removed.name, "logs");
        assert!(registry.lookup("logs").is_none());
        assert!(registry.name_for("acct1/logs").is_none());
        assert!(registry.is_empty());
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_remove_unknown_id() {
        let registry = Registry::new();
        registry.register(BucketRecord::new("logs", "acct1/logs", BucketParameters::new()));

        assert!(registry.remove_by_id("acct1/other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reassigned_id_drops_stale_name() {
        let registry = Registry::new();
        registry.register(BucketRecord::new("old", "acct1/shared", BucketParameters::new()));
        registry.register(BucketRecord::new("new", "acct1/shared", BucketParameters::new()));

        assert!(registry.lookup("old").is_none());
        assert_eq!(registry.name_for("acct1/shared"), Some("new".to_string()));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_records_sorted() {
        let registry = Registry::new();
        registry.register(BucketRecord::new("b", "acct/b", BucketParameters::new()));
        registry.register(BucketRecord::new("a", "acct/a", BucketParameters::new()));

        let names: Vec<_> = registry.records().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
