use curvekit_core::grading::{HslParams, apply_hsl};
use curvekit_core::{Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::config::MaskSettings;
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

/// Per-band shifts, e.g. `{"red": {"hue": 10}, "mask_blur": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslConfig {
    #[serde(flatten)]
    pub params: HslParams,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

#[derive(Debug, Clone)]
pub struct HslNode {
    config: HslConfig,
}

impl HslNode {
    pub fn new(config: HslConfig) -> Self {
        Self { config }
    }
}

impl Node for HslNode {
    fn name(&self) -> &'static str {
        "hsl"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        if self.config.params.is_identity() {
            return Ok(image.clone());
        }
        let out = apply_hsl(image, &self.config.params);
        self.config.mask.composite(image, out, mask)
    }
}
