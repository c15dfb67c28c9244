//! Camera-Raw style tone curve: base preset, parametric regions, point curve.
//!
//! ```text
//!   Point       point curve only
//!   Parametric  preset curve + region offsets
//!   Combined    parametric first, then the point curve
//! ```
//!
//! The resulting table is applied to luminance only, so hue is kept and
//! saturation is lightly protected.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::channel::{LUMA_REC709, luma};
use crate::curve::lut::{Interpolation, LUT_SIZE, LookupTable};
use crate::curve::points::{ControlPoint, ControlPointSet};

/// Per-unit offset applied to the table for each region step.
const OFFSET_SCALE: f32 = 1.28;

/// Fraction of the luminance-scaled colour kept against its gray.
const SATURATION_PROTECTION: f32 = 0.95;

/// Bounds on the per-pixel luminance ratio.
const RATIO_RANGE: (f32, f32) = (0.1, 10.0);

/// Starting curve for the parametric stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurvePreset {
    #[default]
    Linear,
    #[serde(rename = "Medium Contrast")]
    MediumContrast,
    #[serde(rename = "Strong Contrast")]
    StrongContrast,
    Custom,
}

impl CurvePreset {
    pub fn points(self) -> ControlPointSet {
        let raw: &[(f32, f32)] = match self {
            Self::Linear | Self::Custom => &[(0.0, 0.0), (255.0, 255.0)],
            Self::MediumContrast => &[
                (0.0, 0.0),
                (32.0, 22.0),
                (64.0, 56.0),
                (128.0, 128.0),
                (192.0, 196.0),
                (224.0, 230.0),
                (255.0, 255.0),
            ],
            Self::StrongContrast => &[
                (0.0, 0.0),
                (32.0, 16.0),
                (64.0, 44.0),
                (128.0, 128.0),
                (192.0, 208.0),
                (224.0, 240.0),
                (255.0, 255.0),
            ],
        };
        ControlPointSet::from_points(raw.iter().map(|&(x, y)| ControlPoint::new(x, y)))
    }
}

/// Which curves contribute to the final table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveMode {
    Point,
    Parametric,
    #[default]
    Combined,
}

/// Region sliders, each in `[-100, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametricRegions {
    pub highlights: f32,
    pub lights: f32,
    pub darks: f32,
    pub shadows: f32,
}

impl ParametricRegions {
    pub fn is_zero(&self) -> bool {
        self.highlights == 0.0 && self.lights == 0.0 && self.darks == 0.0 && self.shadows == 0.0
    }
}

/// Smooth weight of `v` inside `[start, end]`, peaking at the centre.
///
/// ```text
/// d = |v − centre| / (width / 2)
/// w = exp(−2d²)         0 outside the region
/// ```
pub fn region_weight(v: f32, start: f32, end: f32) -> f32 {
    if v < start || v > end {
        return 0.0;
    }
    let center = (start + end) * 0.5;
    let d = (v - center).abs() / ((end - start) * 0.5);
    (-2.0 * d * d).exp()
}

/// Offset `base` by the region sliders.
pub fn parametric_table(base: &LookupTable, regions: &ParametricRegions) -> LookupTable {
    let values = std::array::from_fn(|i| {
        let v = i as f32 / 255.0;
        let adjustment = regions.shadows * region_weight(v, 0.0, 0.25) * 0.8
            + regions.darks * region_weight(v, 0.25, 0.5) * 0.6
            + regions.lights * region_weight(v, 0.5, 0.75) * 0.6
            + regions.highlights * region_weight(v, 0.75, 1.0) * 0.8;
        base[i] + adjustment * OFFSET_SCALE
    });
    LookupTable::from_values(values)
}

/// Tone curve parameters. `Default` leaves the image unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneCurveParams {
    pub preset: CurvePreset,
    pub point_curve: ControlPointSet,
    pub regions: ParametricRegions,
    pub mode: CurveMode,
}

impl ToneCurveParams {
    /// Final 256-entry table for the selected mode.
    pub fn lookup_table(&self) -> LookupTable {
        let point = || LookupTable::build(&self.point_curve, Interpolation::Cubic);
        let parametric = || {
            let base = LookupTable::build(&self.preset.points(), Interpolation::Cubic);
            parametric_table(&base, &self.regions)
        };
        match self.mode {
            CurveMode::Point => point(),
            CurveMode::Parametric => parametric(),
            CurveMode::Combined => point().compose(&parametric()),
        }
    }
}

/// Map luminance through `table`, keeping colour.
///
/// RGB is scaled by the Rec. 709 luma ratio (clamped to `[0.1, 10]`), then
/// pulled 5 % toward its own gray. Single-channel images map directly.
/// Alpha is untouched.
pub fn apply_tone_mapping(image: &PixelBuffer, table: &LookupTable) -> PixelBuffer {
    let mut out = image.clone();
    if image.color_channels() < 3 {
        for px in out.pixels_mut() {
            px[0] = table.lookup(px[0]);
        }
        return out;
    }
    for px in out.pixels_mut() {
        let y = luma(px, LUMA_REC709);
        let mapped = table.lookup(y.clamp(0.0, 1.0));
        let ratio = (mapped / y.max(1e-8)).clamp(RATIO_RANGE.0, RATIO_RANGE.1);
        let scaled = [px[0] * ratio, px[1] * ratio, px[2] * ratio];
        let gray = (scaled[0] + scaled[1] + scaled[2]) / 3.0;
        for (dst, v) in px[..3].iter_mut().zip(scaled) {
            *dst = (gray * (1.0 - SATURATION_PROTECTION) + v * SATURATION_PROTECTION).clamp(0.0, 1.0);
        }
    }
    out
}

/// Build the table for `params` and apply it. A table that is the
/// identity returns an unchanged copy.
pub fn apply_tone_curve(image: &PixelBuffer, params: &ToneCurveParams) -> PixelBuffer {
    let table = params.lookup_table();
    if table.is_identity() {
        tracing::debug!("tone curve is the identity; image passed through");
        return image.clone();
    }
    apply_tone_mapping(image, &table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_region_weight_shape() {
        assert_eq!(region_weight(0.125, 0.0, 0.25), 1.0);
        assert!((region_weight(0.25, 0.0, 0.25) - (-2.0f32).exp()).abs() < 1e-6);
        assert_eq!(region_weight(0.3, 0.0, 0.25), 0.0);
    }

    #[test]
    fn test_default_params_are_identity() {
        let params = ToneCurveParams::default();
        assert!(params.lookup_table().is_identity());
        let image = PixelBuffer::from_fn(3, 2, 3, |x, y, c| (x + y + c as u32) as f32 / 6.0);
        assert_eq!(apply_tone_curve(&image, &params), image);
    }

    #[test]
    fn test_contrast_presets_darken_shadows_and_lift_highlights() {
        for preset in [CurvePreset::MediumContrast, CurvePreset::StrongContrast] {
            let params = ToneCurveParams {
                preset,
                mode: CurveMode::Parametric,
                ..Default::default()
            };
            let table = params.lookup_table();
            assert!(table[64] < 64.0, "{preset:?}");
            assert!(table[192] > 192.0, "{preset:?}");
            assert!((table[128] - 128.0).abs() < EPSILON);
        }
        let strong = ToneCurveParams {
            preset: CurvePreset::StrongContrast,
            mode: CurveMode::Parametric,
            ..Default::default()
        };
        let medium = ToneCurveParams {
            preset: CurvePreset::MediumContrast,
            ..strong.clone()
        };
        assert!(strong.lookup_table()[32] < medium.lookup_table()[32]);
    }

    #[test]
    fn test_shadow_slider_lifts_quarter_range_only() {
        let regions = ParametricRegions {
            shadows: 50.0,
            ..Default::default()
        };
        let table = parametric_table(&LookupTable::identity(), &regions);
        // centre of the shadow region: 50 × 0.8 × 1.28
        let centre = (0.125f32 * 255.0) as usize;
        assert!(table[centre] > centre as f32 + 40.0);
        assert_eq!(table[200], 200.0);
    }

    #[test]
    fn test_point_mode_ignores_regions() {
        let params = ToneCurveParams {
            point_curve: ControlPointSet::from_json("[[0,0],[128,160],[255,255]]"),
            regions: ParametricRegions {
                highlights: -80.0,
                ..Default::default()
            },
            mode: CurveMode::Point,
            ..Default::default()
        };
        let table = params.lookup_table();
        assert!((table[128] - 160.0).abs() < EPSILON);
        assert!(table[230] > 230.0 - EPSILON);
    }

    #[test]
    fn test_combined_runs_parametric_then_point() {
        let params = ToneCurveParams {
            preset: CurvePreset::StrongContrast,
            point_curve: ControlPointSet::from_json("[[0,255],[255,0]]"),
            mode: CurveMode::Combined,
            ..Default::default()
        };
        let table = params.lookup_table();
        // inverted point curve applied after the contrast curve
        assert!(table[0] > 250.0);
        assert!(table[255] < 5.0);
    }

    #[test]
    fn test_tone_mapping_keeps_alpha_and_gray_neutral() {
        let image = PixelBuffer::new(1, 1, 4, vec![0.5, 0.5, 0.5, 0.3]).unwrap();
        let brighten = LookupTable::from_values(std::array::from_fn(|i| (i as f32 * 1.5).min(255.0)));
        let out = apply_tone_mapping(&image, &brighten);
        assert!(out.data[0] > 0.7);
        assert!((out.data[0] - out.data[1]).abs() < 1e-6);
        assert_eq!(out.data[3], 0.3);
    }

    #[test]
    fn test_tone_mapping_ratio_is_clamped() {
        let image = PixelBuffer::new(1, 1, 3, vec![0.01, 0.01, 0.01]).unwrap();
        let white = LookupTable::from_values([255.0; LUT_SIZE]);
        let out = apply_tone_mapping(&image, &white);
        assert!((out.data[0] - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_gray_image_maps_directly() {
        let image = PixelBuffer::filled(2, 2, 1, 0.5);
        let invert = LookupTable::from_values(std::array::from_fn(|i| 255.0 - i as f32));
        let out = apply_tone_mapping(&image, &invert);
        assert!(out.data.iter().all(|&v| (v - 128.0 / 255.0).abs() < 1e-6));
    }
}
