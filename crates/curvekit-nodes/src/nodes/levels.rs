use curvekit_core::grading::{AutoMode, LevelsParams, apply_levels};
use curvekit_core::{ChannelSelector, Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::config::MaskSettings;
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

/// Upper bound of the clip slider, in percent.
pub const MAX_CLIP_PERCENTAGE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    pub channel: ChannelSelector,
    #[serde(flatten)]
    pub levels: LevelsParams,
    /// Measure the input range from the image. Wins over `auto_contrast`.
    pub auto_levels: bool,
    pub auto_contrast: bool,
    /// Percent of samples clipped at each end by the auto modes.
    pub clip_percentage: f32,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

impl Default for LevelsConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSelector::Rgb,
            levels: LevelsParams::default(),
            auto_levels: false,
            auto_contrast: false,
            clip_percentage: 0.1,
            mask: MaskSettings::default(),
        }
    }
}

impl LevelsConfig {
    fn auto_mode(&self) -> Option<AutoMode> {
        if self.auto_levels {
            Some(AutoMode::Levels)
        } else if self.auto_contrast {
            Some(AutoMode::Contrast)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct LevelsNode {
    config: LevelsConfig,
}

impl LevelsNode {
    pub fn new(config: LevelsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LevelsConfig {
        &self.config
    }

    /// Parameters used for `image`, after the auto range is measured.
    pub fn resolve(&self, image: &PixelBuffer) -> LevelsParams {
        let params = match self.config.auto_mode() {
            Some(mode) => {
                let clip = self.config.clip_percentage.clamp(0.0, MAX_CLIP_PERCENTAGE);
                self.config.levels.with_auto_range(image, self.config.channel, mode, clip)
            }
            None => self.config.levels,
        };
        params.sanitized()
    }
}

impl Node for LevelsNode {
    fn name(&self) -> &'static str {
        "levels"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        let params = self.resolve(image);
        if params.is_identity() {
            tracing::debug!("levels are the identity; image passed through");
            return Ok(image.clone());
        }
        tracing::debug!(
            channel = %self.config.channel,
            "levels in {}–{} γ{} out {}–{}",
            params.input_black,
            params.input_white,
            params.input_midtones,
            params.output_black,
            params.output_white
        );
        let out = apply_levels(image, &params, self.config.channel);
        self.config.mask.composite(image, out, mask)
    }
}
