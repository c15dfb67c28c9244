//! Batches of images with an optional batch of masks.
//!
//! Mask selection per image:
//!
//! ```text
//! masks.len() == images.len()  → masks[i]
//! otherwise                    → masks[0]   (None when there are no masks)
//! ```

use curvekit_core::{Mask, PixelBuffer};
use rayon::prelude::*;

use crate::error::NodeError;
use crate::node::{Node, NodeContext};

#[derive(Debug, Clone, Default)]
pub struct Batch {
    images: Vec<PixelBuffer>,
    masks: Vec<Mask>,
}

impl Batch {
    pub fn new(images: Vec<PixelBuffer>) -> Self {
        Self {
            images,
            masks: Vec::new(),
        }
    }

    pub fn with_masks(mut self, masks: Vec<Mask>) -> Self {
        self.masks = masks;
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[PixelBuffer] {
        &self.images
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Mask applied to the image at `index`.
    pub fn mask_for(&self, index: usize) -> Option<&Mask> {
        if self.masks.len() == self.images.len() {
            self.masks.get(index)
        } else {
            self.masks.first()
        }
    }

    /// Consume the batch, returning its images.
    pub fn into_images(self) -> Vec<PixelBuffer> {
        self.images
    }
}

/// Run `node` over every image of `batch` in parallel.
///
/// Failures of individual images follow [`Node::run`] (original image kept);
/// output order matches input order.
pub fn process_batch<N: Node + ?Sized>(node: &N, batch: &Batch, ctx: &NodeContext) -> Result<Vec<PixelBuffer>, NodeError> {
    if batch.is_empty() {
        return Err(NodeError::EmptyBatch);
    }
    let masks = batch.masks().len();
    if masks > 1 && masks != batch.len() {
        tracing::warn!("{masks} masks for {} images; using the first mask for every image", batch.len());
    }
    Ok(batch
        .images()
        .par_iter()
        .enumerate()
        .map(|(i, image)| node.run(image, batch.mask_for(i), ctx))
        .collect())
}

/// Strict variant of [`process_batch`]: the first failing image aborts the
/// batch, and a mask batch must hold one mask or one per image.
pub fn try_process_batch<N: Node + ?Sized>(
    node: &N,
    batch: &Batch,
    ctx: &NodeContext,
) -> Result<Vec<PixelBuffer>, NodeError> {
    if batch.is_empty() {
        return Err(NodeError::EmptyBatch);
    }
    let masks = batch.masks().len();
    if masks > 1 && masks != batch.len() {
        return Err(NodeError::MaskBatch {
            masks,
            images: batch.len(),
        });
    }
    batch
        .images()
        .par_iter()
        .enumerate()
        .map(|(i, image)| node.process(image, batch.mask_for(i), ctx))
        .collect()
}
