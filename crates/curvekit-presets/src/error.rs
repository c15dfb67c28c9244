use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed preset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("preset not found: {0}")]
    NotFound(String),
    #[error("preset is for node type {found:?}, this store holds {expected:?}")]
    NodeTypeMismatch { expected: String, found: String },
    #[error("invalid preset id: {0:?}")]
    InvalidId(String),
    #[error("default presets are read-only: {0}")]
    ReadOnly(String),
}

impl PresetError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
