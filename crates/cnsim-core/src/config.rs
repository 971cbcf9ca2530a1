//! Simulated service configuration.

use serde::{Deserialize, Serialize};

use cnsim_disk::DatastoreRef;

/// A datastore known to the simulated service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datastore {
    /// Datastore name.
    pub name: DatastoreRef,
    /// Datastore URL.
    pub url: String,
}

impl Datastore {
    /// Builds a datastore with the conventional URL for its name.
    pub fn named(name: &str) -> Self {
        Self {
            name: DatastoreRef::new(name),
            url: format!("ds:///vmfs/volumes/{name}/"),
        }
    }
}

/// Configuration of one simulated service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Datastore inventory.
    pub datastores: Vec<Datastore>,
}

impl SimConfig {
    /// Resolves the URL of a datastore.
    ///
    /// Datastores outside the configured inventory (e.g. carrying an
    /// imported disk) get the conventional URL for their name.
    pub fn url_for(&self, datastore: &DatastoreRef) -> String {
        self.datastores
            .iter()
            .find(|ds| &ds.name == datastore)
            .map(|ds| ds.url.clone())
            .unwrap_or_else(|| format!("ds:///vmfs/volumes/{datastore}/"))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            datastores: vec![Datastore::named("LocalDS_0")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inventory() {
        let config = SimConfig::default();
        assert_eq!(config.datastores.len(), 1);
        assert_eq!(config.datastores[0].name.as_str(), "LocalDS_0");
    }

    #[test]
    fn test_url_for_configured_and_unknown() {
        let config = SimConfig::default();
        assert_eq!(
            config.url_for(&DatastoreRef::new("LocalDS_0")),
            "ds:///vmfs/volumes/LocalDS_0/"
        );
        assert_eq!(
            config.url_for(&DatastoreRef::new("vsanDatastore")),
            "ds:///vmfs/volumes/vsanDatastore/"
        );
    }
}
