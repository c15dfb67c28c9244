use curvekit_core::grading::{BlendMode, ColorGradingParams, apply_color_grading};
use curvekit_core::{Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::config::MaskSettings;
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradingConfig {
    #[serde(flatten)]
    pub params: ColorGradingParams,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

#[derive(Debug, Clone)]
pub struct ColorGradingNode {
    config: ColorGradingConfig,
}

impl ColorGradingNode {
    pub fn new(config: ColorGradingConfig) -> Self {
        Self { config }
    }
}

impl Node for ColorGradingNode {
    fn name(&self) -> &'static str {
        "color_grading"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        let params = &self.config.params;
        if !params.has_adjustment() && params.blend_mode == BlendMode::Normal {
            return Ok(image.clone());
        }
        let out = apply_color_grading(image, params);
        self.config.mask.composite(image, out, mask)
    }
}
