//! Virtual disk objects and their identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a virtual disk object, unique across all datastores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiskId(String);

impl DiskId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        DiskId(id.into())
    }

    /// Mints a fresh random identifier.
    pub fn generate() -> Self {
        DiskId(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a datastore, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatastoreRef(String);

impl DatastoreRef {
    /// Wraps a datastore name.
    pub fn new(name: impl Into<String>) -> Self {
        DatastoreRef(name.into())
    }

    /// Returns the datastore name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatastoreRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A descriptive key-value tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl KeyValue {
    /// Builds a tag from key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A first-class virtual disk object in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDisk {
    /// Identifier of the disk.
    pub id: DiskId,
    /// Datastore the disk lives on.
    pub datastore: DatastoreRef,
    /// Human-readable disk name.
    pub name: String,
    /// Provisioned capacity in megabytes.
    pub capacity_mb: u64,
    /// Datastore-relative file path of the disk.
    pub file_path: String,
    /// Descriptive key-value tags attached to the disk.
    pub metadata: Vec<KeyValue>,
    /// Creation timestamp (seconds since epoch).
    pub created_at_secs: u64,
}
