//! The node abstraction and the host's failure policy.

use curvekit_core::{Mask, PixelBuffer};

use crate::cache::LutCache;
use crate::error::NodeError;

/// State shared by every node evaluation of a graph run.
///
/// Shared across rayon workers by reference; its members synchronise
/// internally.
#[derive(Debug, Default)]
pub struct NodeContext {
    pub luts: LutCache,
}

impl NodeContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// An image-to-image adjustment with an optional opacity mask.
pub trait Node: Send + Sync {
    /// Display name used in log lines.
    fn name(&self) -> &'static str;

    /// Process one image.
    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, ctx: &NodeContext) -> Result<PixelBuffer, NodeError>;

    /// Process one image, passing the original through on failure.
    fn run(&self, image: &PixelBuffer, mask: Option<&Mask>, ctx: &NodeContext) -> PixelBuffer {
        match self.process(image, mask, ctx) {
            Ok(out) => out,
            Err(err) => {
                tracing::error!(node = self.name(), "processing failed, returning original image: {err}");
                image.clone()
            }
        }
    }
}
