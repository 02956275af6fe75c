pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use crate::core::config::AppConfig;
use disk::DiskCollection;
use memory::MemoryCollection;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tracing::warn;

/// Opens the named persistent collection under the app data path.
///
/// When the disk store cannot be opened (read-only home, locked keyspace),
/// degrades to an in-memory collection so commands still run; only the
/// caching is lost.
pub fn open_collection<K, V>(config: &AppConfig, name: &str) -> Arc<dyn KeyValueCollection<K, V>>
where
    K: Eq + Hash + Send + Sync + Serialize + Debug + 'static,
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    let opened = config
        .default_data_path()
        .and_then(|path| DiskCollection::new(&path.join("cache"), name));

    match opened {
        Ok(collection) => Arc::new(collection),
        Err(e) => {
            warn!("Could not open disk store, using in-memory cache: {e:#}");
            Arc::new(MemoryCollection::new())
        }
    }
}
