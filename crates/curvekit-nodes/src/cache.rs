//! Caller-owned cache of baked lookup tables.
//!
//! Nodes evaluated repeatedly with the same curve (every image of a batch,
//! every re-run of an unchanged graph) share one table instead of rebuilding
//! the spline each time. The cache is passed in through
//! [`NodeContext`](crate::node::NodeContext); there is no process-wide state.

use std::collections::HashMap;

use curvekit_core::{ControlPointSet, Interpolation, LookupTable};
use parking_lot::RwLock;

/// Entries kept before the cache is flushed.
pub const MAX_ENTRIES: usize = 256;

type CacheKey = (String, Interpolation);

/// Thread-safe map from `(control points, policy)` to the built table.
#[derive(Debug, Default)]
pub struct LutCache {
    tables: RwLock<HashMap<CacheKey, LookupTable>>,
}

impl LutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `points` under `policy`, built on first use.
    pub fn get_or_build(&self, points: &ControlPointSet, policy: Interpolation) -> LookupTable {
        let key = (points.to_string(), policy);
        if let Some(table) = self.tables.read().get(&key) {
            tracing::debug!(points = %key.0, %policy, "lut cache hit");
            return table.clone();
        }

        tracing::debug!(points = %key.0, %policy, "lut cache miss");
        let table = LookupTable::build(points, policy);
        let mut tables = self.tables.write();
        if tables.len() >= MAX_ENTRIES {
            tracing::debug!("lut cache full; flushing {} entries", tables.len());
            tables.clear();
        }
        tables.entry(key).or_insert(table).clone()
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    pub fn clear(&self) {
        self.tables.write().clear();
    }
}
