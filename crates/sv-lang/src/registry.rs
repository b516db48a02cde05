use std::sync::{Arc, RwLock};

use crate::schema::SchemaSnapshot;

/// Holds the current schema snapshot and supports atomic replacement.
///
/// Readers clone the `Arc` once at the start of a validation pass and keep
/// it for the whole pass, so a concurrent [`SchemaRegistry::replace`] can
/// never expose a partially-updated schema: the pointer is swapped, live
/// snapshots are never mutated.
#[derive(Debug)]
pub struct SchemaRegistry {
    current: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaRegistry {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot to validate against. Cheap; clones a reference.
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a new snapshot. In-flight validations keep the old one.
    pub fn replace(&self, snapshot: SchemaSnapshot) {
        let snapshot = Arc::new(snapshot);
        tracing::info!(blocks = snapshot.block_count(), "schema snapshot replaced");
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(SchemaSnapshot::default())
    }
}
