//! Three-way colour grading (shadows / midtones / highlights) in CIE Lab.
//!
//! # Algorithm
//!
//! Each region gets a Gaussian weight over normalised lightness
//! `l = L / 100`, recentred by `balance`:
//!
//! ```text
//! shadows     c = 0.15 + 0.1b   w = 0.15   (zero for l ≥ c + 0.2)
//! midtones    c = 0.50 + 0.2b   w = 0.25
//! highlights  c = 0.85 − 0.1b   w = 0.15   (zero for l ≤ c − 0.2)
//! weight = exp(−((l − c) / w)²)
//! ```
//!
//! Inside a region the chroma vector `(a, b)` is rotated by `hue × weight`
//! degrees and scaled by `1 + sat × weight`; lightness is scaled by
//! `1 + lum × weight`. Regions are applied in order, all using weights
//! measured on the input.

use palette::{FromColor, Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::grading::blend::{BlendMode, blend_images};

/// One colour wheel. Saturation and luminance in `[-100, 100]`, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelShift {
    pub hue: f32,
    pub saturation: f32,
    pub luminance: f32,
}

impl WheelShift {
    pub fn is_zero(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.luminance == 0.0
    }
}

/// Colour grading parameters. `Default` is the identity transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradingParams {
    pub shadows: WheelShift,
    pub midtones: WheelShift,
    pub highlights: WheelShift,
    /// Percentage of the chroma change kept, `[0, 100]`.
    pub blend: f32,
    /// Moves the region centres, `[-100, 100]`.
    pub balance: f32,
    /// Multiplier on the chroma change.
    pub overall_strength: f32,
    pub blend_mode: BlendMode,
}

impl Default for ColorGradingParams {
    fn default() -> Self {
        Self {
            shadows: WheelShift::default(),
            midtones: WheelShift::default(),
            highlights: WheelShift::default(),
            blend: 100.0,
            balance: 0.0,
            overall_strength: 1.0,
            blend_mode: BlendMode::Normal,
        }
    }
}

impl ColorGradingParams {
    pub fn has_adjustment(&self) -> bool {
        !(self.shadows.is_zero() && self.midtones.is_zero() && self.highlights.is_zero())
    }

    fn has_luminance_shift(&self) -> bool {
        [self.shadows, self.midtones, self.highlights]
            .iter()
            .any(|w| w.luminance != 0.0)
    }
}

/// Tonal region of a colour wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneRegion {
    Shadows,
    Midtones,
    Highlights,
}

/// Gaussian weight of `lightness` (0–1) for `region`.
pub fn region_weight(lightness: f32, region: ToneRegion, balance: f32) -> f32 {
    let b = balance / 100.0;
    let gaussian = |center: f32, width: f32| {
        let d = (lightness - center) / width;
        (-d * d).exp()
    };
    let w = match region {
        ToneRegion::Shadows => {
            let center = 0.15 + b * 0.1;
            if lightness < center + 0.2 { gaussian(center, 0.15) } else { 0.0 }
        }
        ToneRegion::Midtones => gaussian(0.5 + b * 0.2, 0.25),
        ToneRegion::Highlights => {
            let center = 0.85 - b * 0.1;
            if lightness > center - 0.2 { gaussian(center, 0.15) } else { 0.0 }
        }
    };
    w.clamp(0.0, 1.0)
}

fn grade_lab(lab: Lab, params: &ColorGradingParams) -> Lab {
    let lightness = (lab.l / 100.0).clamp(0.0, 1.0);
    let mut out = lab;
    for (region, wheel) in [
        (ToneRegion::Shadows, params.shadows),
        (ToneRegion::Midtones, params.midtones),
        (ToneRegion::Highlights, params.highlights),
    ] {
        if wheel.is_zero() {
            continue;
        }
        let w = region_weight(lightness, region, params.balance);
        if wheel.luminance != 0.0 {
            out.l *= 1.0 + wheel.luminance / 100.0 * w;
        }
        if wheel.hue != 0.0 || wheel.saturation != 0.0 {
            let hue = out.b.atan2(out.a) + wheel.hue.to_radians() * w;
            let chroma = out.a.hypot(out.b) * (1.0 + wheel.saturation / 100.0 * w);
            out.a = chroma * hue.cos();
            out.b = chroma * hue.sin();
        }
    }

    if !params.has_luminance_shift() {
        out.l = lab.l;
    }
    let keep = params.overall_strength * (params.blend / 100.0).clamp(0.0, 1.0);
    out.a = lab.a + (out.a - lab.a) * keep;
    out.b = lab.b + (out.b - lab.b) * keep;
    out.l = out.l.clamp(0.0, 100.0);
    out
}

/// Grade an RGB(A) image. Alpha is preserved; gray images are returned unchanged.
pub fn apply_color_grading(image: &PixelBuffer, params: &ColorGradingParams) -> PixelBuffer {
    if image.color_channels() < 3 || (!params.has_adjustment() && params.blend_mode == BlendMode::Normal) {
        return image.clone();
    }

    let mut graded = image.clone();
    for px in graded.pixels_mut() {
        let rgb = Srgb::new(px[0].clamp(0.0, 1.0), px[1].clamp(0.0, 1.0), px[2].clamp(0.0, 1.0));
        let lab = grade_lab(Lab::from_color(rgb), params);
        let rgb = Srgb::from_color(lab);
        px[0] = rgb.red.clamp(0.0, 1.0);
        px[1] = rgb.green.clamp(0.0, 1.0);
        px[2] = rgb.blue.clamp(0.0, 1.0);
    }

    // Shapes match by construction.
    blend_images(image, &graded, params.blend_mode).unwrap_or(graded)
}
