use curvekit_core::grading::{ToneCurveParams, apply_tone_mapping};
use curvekit_core::{LookupTable, Mask, PixelBuffer};
use serde::{Deserialize, Serialize};

use crate::config::MaskSettings;
use crate::error::NodeError;
use crate::node::{Node, NodeContext};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurveConfig {
    #[serde(flatten)]
    pub params: ToneCurveParams,
    #[serde(flatten)]
    pub mask: MaskSettings,
}

#[derive(Debug, Clone)]
pub struct ToneCurveNode {
    config: ToneCurveConfig,
    table: LookupTable,
}

impl ToneCurveNode {
    /// Bakes the final table once; every image of a batch reuses it.
    pub fn new(config: ToneCurveConfig) -> Self {
        let table = config.params.lookup_table();
        Self { config, table }
    }

    pub fn table(&self) -> &LookupTable {
        &self.table
    }
}

impl Node for ToneCurveNode {
    fn name(&self) -> &'static str {
        "tone_curve"
    }

    fn process(&self, image: &PixelBuffer, mask: Option<&Mask>, _ctx: &NodeContext) -> Result<PixelBuffer, NodeError> {
        if self.table.is_identity() {
            tracing::debug!("tone curve is the identity; image passed through");
            return Ok(image.clone());
        }
        let out = apply_tone_mapping(image, &self.table);
        self.config.mask.composite(image, out, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvekit_core::grading::{CurveMode, CurvePreset};

    #[test]
    fn test_preset_names_from_host_parameters() {
        let config: ToneCurveConfig = crate::config::from_json(
            r#"{"preset": "Strong Contrast", "mode": "Parametric", "point_curve": [[0,0],[255,255]]}"#,
        )
        .unwrap();
        assert_eq!(config.params.preset, CurvePreset::StrongContrast);
        assert_eq!(config.params.mode, CurveMode::Parametric);
        let node = ToneCurveNode::new(config);
        assert!(node.table()[40] < 40.0);
    }

    #[test]
    fn test_identity_passes_through() {
        let image = PixelBuffer::from_fn(3, 3, 3, |x, y, c| (x * 3 + y + c as u32) as f32 / 12.0);
        let node = ToneCurveNode::new(ToneCurveConfig::default());
        assert_eq!(node.process(&image, None, &NodeContext::new()).unwrap(), image);
    }
}
