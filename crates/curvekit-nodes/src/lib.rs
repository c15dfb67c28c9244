//! Curvekit Nodes — host-facing layer over `curvekit-core`.
//!
//! One typed config per node, batch execution with per-image mask
//! selection, a caller-owned LUT cache, and the host failure policy
//! (log and pass the original image through).

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod node;
pub mod nodes;

// Re-exports for convenience.
pub use batch::{Batch, process_batch, try_process_batch};
pub use cache::LutCache;
pub use config::MaskSettings;
pub use error::NodeError;
pub use node::{Node, NodeContext};
