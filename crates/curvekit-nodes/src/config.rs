//! Settings shared by every node configuration.
//!
//! Node configs deserialize from the host's parameter dictionaries. Field
//! names follow the host widgets (`mask_blur`, `invert_mask`, ...) so stored
//! presets load unchanged; any missing field takes its identity default.

use curvekit_core::{Interpolation, Mask, PixelBuffer, composite_optional};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::NodeError;

/// Upper bound of the mask feather slider.
pub const MAX_MASK_BLUR: f32 = 20.0;

/// Optional-mask handling common to the image nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskSettings {
    /// Feather radius in pixels, `[0, 20]`.
    #[serde(rename = "mask_blur")]
    pub blur: f32,
    #[serde(rename = "invert_mask")]
    pub invert: bool,
}

impl MaskSettings {
    /// Blend `processed` over `original` through `mask`.
    ///
    /// Without a mask the processed image is returned as is.
    pub fn composite(
        &self,
        original: &PixelBuffer,
        processed: PixelBuffer,
        mask: Option<&Mask>,
    ) -> Result<PixelBuffer, NodeError> {
        let blur = if self.blur.is_finite() { self.blur.clamp(0.0, MAX_MASK_BLUR) } else { 0.0 };
        Ok(composite_optional(original, processed, mask, blur, self.invert)?)
    }
}

/// Parse a node config from its JSON parameter dictionary.
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, NodeError> {
    Ok(serde_json::from_str(text)?)
}

/// Build a node config from an already-parsed parameter value (e.g. a preset's `parameters`).
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, NodeError> {
    Ok(serde_json::from_value(value)?)
}

/// Interpolation names from the host are free text; unknown ones mean linear.
pub(crate) fn lenient_interpolation<'de, D>(deserializer: D) -> Result<Interpolation, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(Interpolation::parse_or_linear(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_settings_use_host_names() {
        let settings: MaskSettings = from_json(r#"{"mask_blur": 3.5, "invert_mask": true}"#).unwrap();
        assert_eq!(settings.blur, 3.5);
        assert!(settings.invert);
        let json = serde_json::to_value(settings).unwrap();
        assert_eq!(json["mask_blur"], 3.5);
    }

    #[test]
    fn test_missing_fields_default() {
        let settings: MaskSettings = from_json("{}").unwrap();
        assert_eq!(settings, MaskSettings::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let err = from_json::<MaskSettings>(r#"{"mask_blur": "wide"}"#).unwrap_err();
        assert!(matches!(err, NodeError::Config(_)));
    }

    #[test]
    fn test_composite_without_mask_returns_processed() {
        let original = PixelBuffer::filled(2, 2, 3, 0.0);
        let processed = PixelBuffer::filled(2, 2, 3, 1.0);
        let out = MaskSettings::default().composite(&original, processed.clone(), None).unwrap();
        assert_eq!(out, processed);
    }

    #[test]
    fn test_composite_ignores_non_finite_blur() {
        let original = PixelBuffer::filled(4, 4, 3, 0.0);
        let processed = PixelBuffer::filled(4, 4, 3, 1.0);
        let settings = MaskSettings {
            blur: f32::INFINITY,
            invert: true,
        };
        let out = settings
            .composite(&original, processed, Some(&Mask::filled(4, 4, 0.0)))
            .unwrap();
        assert!(out.data.iter().all(|&v| (v - 1.0).abs() < 1e-5));
    }
}
