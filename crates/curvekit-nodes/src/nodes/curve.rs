//! Photoshop-style curves: a master RGB curve followed by per-channel curves.

use curvekit_core::{ChannelSelector, ControlPointSet, Interpolation, Mask, PixelBuffer, apply_lut};
use serde::{Deserialize, Serialize};

use crate::config::{MaskSettings, lenient_interpolation};
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

/// JSON point array of the identity curve.
pub const IDENTITY_CURVE: &str = "[[0,0],[255,255]]";

/// Curves are stored as JSON point arrays, `[[x, y], ...]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub rgb_curve: String,
    pub red_curve: String,
    pub green_curve: String,
    pub blue_curve: String,
    #[serde(deserialize_with = "lenient_interpolation")]
    pub curve_type: Interpolation,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            rgb_curve: IDENTITY_CURVE.to_string(),
            red_curve: IDENTITY_CURVE.to_string(),
            green_curve: IDENTITY_CURVE.to_string(),
            blue_curve: IDENTITY_CURVE.to_string(),
            curve_type: Interpolation::Cubic,
            mask: MaskSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurveNode {
    config: CurveConfig,
    /// Parsed curves in application order.
    curves: [(ChannelSelector, ControlPointSet); 4],
}

impl CurveNode {
    pub fn new(config: CurveConfig) -> Self {
        let curves = [
            (ChannelSelector::Rgb, ControlPointSet::from_json(&config.rgb_curve)),
            (ChannelSelector::Red, ControlPointSet::from_json(&config.red_curve)),
            (ChannelSelector::Green, ControlPointSet::from_json(&config.green_curve)),
            (ChannelSelector::Blue, ControlPointSet::from_json(&config.blue_curve)),
        ];
        Self { config, curves }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    pub fn is_identity(&self) -> bool {
        self.curves.iter().all(|(_, points)| points.is_identity())
    }
}

impl Node for CurveNode {
    fn name(&self) -> &'static str {
        "curve"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        if self.is_identity() {
            tracing::debug!("all curves are the identity; image passed through");
            return Ok(image.clone());
        }

        let mut out = image.clone();
        for (channel, points) in &self.curves {
            if points.is_identity() {
                continue;
            }
            let table = ctx.luts.get_or_build(points, self.config.curve_type);
            out = apply_lut(&out, &table, *channel);
        }
        self.config.mask.composite(image, out, mask)
    }
}
