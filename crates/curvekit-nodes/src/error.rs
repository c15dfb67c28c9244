use curvekit_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("invalid node config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to serialise report: {0}")]
    Report(serde_json::Error),
    #[error("batch contains no images")]
    EmptyBatch,
    #[error("mask batch has {masks} entries for {images} images")]
    MaskBatch { masks: usize, images: usize },
}
