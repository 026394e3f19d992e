//! Bucket parameter maps

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Immutable, order-independent set of string parameters supplied when a
/// bucket is created.
///
/// Two parameter sets are equal iff they hold the same keys with the same
/// values. A request that carried no parameters is the same as an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketParameters(BTreeMap<String, String>);

impl BucketParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Case-insensitive lookup, for providers that treat keys that way
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for BucketParameters {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for BucketParameters {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<Option<HashMap<String, String>>> for BucketParameters {
    fn from(map: Option<HashMap<String, String>>) -> Self {
        map.map(Self::from).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for BucketParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
