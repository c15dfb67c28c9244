//! Curve from a `"x,y;x,y;..."` point string, blended toward identity by strength.

use curvekit_core::curve::MAX_STRENGTH;
use curvekit_core::{ChannelSelector, ControlPointSet, Interpolation, Mask, PixelBuffer, apply_lut, parse_control_points};
use serde::{Deserialize, Serialize};

use crate::config::{MaskSettings, lenient_interpolation};
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvePresetConfig {
    /// Control points as `"x,y;x,y;..."`.
    pub points: String,
    #[serde(deserialize_with = "lenient_interpolation")]
    pub interpolation: Interpolation,
    /// `[0, 2]`; 1 applies the curve as drawn.
    pub strength: f32,
    pub channel: ChannelSelector,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

impl Default for CurvePresetConfig {
    fn default() -> Self {
        Self {
            points: "0,0;255,255".to_string(),
            interpolation: Interpolation::Cubic,
            strength: 1.0,
            channel: ChannelSelector::Rgb,
            mask: MaskSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurvePresetNode {
    config: CurvePresetConfig,
    points: ControlPointSet,
}

impl CurvePresetNode {
    pub fn new(config: CurvePresetConfig) -> Self {
        let points = parse_control_points(&config.points);
        Self { config, points }
    }

    pub fn config(&self) -> &CurvePresetConfig {
        &self.config
    }

    pub fn points(&self) -> &ControlPointSet {
        &self.points
    }
}

impl Node for CurvePresetNode {
    fn name(&self) -> &'static str {
        "curve_preset"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        if !(0.0..=MAX_STRENGTH).contains(&self.config.strength) {
            tracing::warn!("strength {} outside [0, {MAX_STRENGTH}]; clamped", self.config.strength);
        }
        let table = ctx
            .luts
            .get_or_build(&self.points, self.config.interpolation)
            .blend_with_identity(self.config.strength);
        if table.is_identity() {
            tracing::debug!("curve preset resolves to the identity; image passed through");
            return Ok(image.clone());
        }
        let out = apply_lut(image, &table, self.config.channel);
        self.config.mask.composite(image, out, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn gradient() -> PixelBuffer {
        PixelBuffer::from_fn(16, 1, 3, |x, _, _| x as f32 / 15.0)
    }

    #[test]
    fn test_zero_strength_is_a_no_op() {
        let node = CurvePresetNode::new(CurvePresetConfig {
            points: "0,255;255,0".to_string(),
            strength: 0.0,
            ..Default::default()
        });
        let image = gradient();
        assert_eq!(node.process(&image, None, &NodeContext::new()).unwrap(), image);
    }

    #[test]
    fn test_half_strength_inversion_is_flat_gray() {
        let node = CurvePresetNode::new(CurvePresetConfig {
            points: "0,255;255,0".to_string(),
            interpolation: Interpolation::Linear,
            strength: 0.5,
            ..Default::default()
        });
        let out = node.process(&gradient(), None, &NodeContext::new()).unwrap();
        assert!(out.data.iter().all(|&v| (v - 0.5).abs() < EPSILON));
    }

    #[test]
    fn test_faint_strength_is_still_applied() {
        let node = CurvePresetNode::new(CurvePresetConfig {
            points: "0,255;255,0".to_string(),
            interpolation: Interpolation::Linear,
            strength: 0.001,
            ..Default::default()
        });
        let image = gradient();
        let out = node.process(&image, None, &NodeContext::new()).unwrap();

        let table = curvekit_core::build_lookup_table(node.points(), Interpolation::Linear).blend_with_identity(0.001);
        assert_eq!(out, apply_lut(&image, &table, ChannelSelector::Rgb));
        assert_ne!(out, image);
    }

    #[test]
    fn test_single_channel_selector() {
        let node = CurvePresetNode::new(CurvePresetConfig {
            points: "0,0;128,220;255,255".to_string(),
            channel: ChannelSelector::Green,
            ..Default::default()
        });
        let image = gradient();
        let out = node.process(&image, None, &NodeContext::new()).unwrap();
        for (a, b) in image.pixels().zip(out.pixels()) {
            assert_eq!(a[0], b[0]);
            assert_eq!(a[2], b[2]);
        }
        assert!(out.get(8, 0, 1) > image.get(8, 0, 1));
    }

    #[test]
    fn test_unknown_interpolation_name_means_linear() {
        let config: CurvePresetConfig =
            crate::config::from_json(r#"{"points": "0,0;128,200;255,255", "interpolation": "bezier"}"#).unwrap();
        assert_eq!(config.interpolation, Interpolation::Linear);
        assert_eq!(config.strength, 1.0);
    }

    #[test]
    fn test_malformed_points_fall_back_to_identity() {
        let node = CurvePresetNode::new(CurvePresetConfig {
            points: "abc;128,200".to_string(),
            ..Default::default()
        });
        assert!(node.points().is_identity());
    }
}
