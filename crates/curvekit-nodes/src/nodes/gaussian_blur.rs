use curvekit_core::blur::blur_image;
use curvekit_core::{Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::config::MaskSettings;
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

/// Radius slider bounds.
pub const RADIUS_RANGE: (f32, f32) = (0.1, 50.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianBlurConfig {
    pub blur_radius: f32,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

impl Default for GaussianBlurConfig {
    fn default() -> Self {
        Self {
            blur_radius: 2.0,
            mask: MaskSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GaussianBlurNode {
    config: GaussianBlurConfig,
}

impl GaussianBlurNode {
    pub fn new(config: GaussianBlurConfig) -> Self {
        Self { config }
    }
}

impl Node for GaussianBlurNode {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        let radius = self.config.blur_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Ok(image.clone());
        }
        let out = blur_image(image, radius.clamp(RADIUS_RANGE.0, RADIUS_RANGE.1));
        self.config.mask.composite(image, out, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_softens_an_edge() {
        let image = PixelBuffer::from_fn(16, 4, 3, |x, _, _| if x < 8 { 0.0 } else { 1.0 });
        let out = GaussianBlurNode::new(GaussianBlurConfig::default())
            .process(&image, None, &NodeContext::new())
            .unwrap();
        let (left, right) = (out.get(7, 2, 0), out.get(8, 2, 0));
        assert!(left > 0.1 && right < 0.9);
        assert!(out.get(0, 2, 0) < 0.01);
    }

    #[test]
    fn test_zero_radius_passes_through() {
        let image = PixelBuffer::from_fn(4, 4, 4, |x, y, c| (x + y + c as u32) as f32 / 9.0);
        let node = GaussianBlurNode::new(GaussianBlurConfig {
            blur_radius: 0.0,
            ..Default::default()
        });
        assert_eq!(node.process(&image, None, &NodeContext::new()).unwrap(), image);
    }
}
