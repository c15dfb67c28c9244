//! Curvekit Presets — JSON preset documents and their on-disk store.
//!
//! Each node type gets its own directory with shipped `default/` presets
//! and writable `user/` and `shared/` ones. Parameters are kept as opaque
//! JSON so any node config can be stored.

pub mod error;
pub mod preset;
pub mod store;
pub mod timestamp;

// Re-exports for convenience.
pub use error::PresetError;
pub use preset::{Preset, PresetKind, PresetMetadata};
pub use store::{PresetStore, StoredPreset};
pub use timestamp::Timestamp;
