//! Photoshop-style levels: input range, midtone gamma, output range.
//!
//! ```text
//! n   = clamp((v − in_black) / (in_white − in_black), 0, 1)
//! out = n^(1 / midtones) × (out_white − out_black) + out_black
//! ```
//!
//! All levels are in 0–255 units. Midtones above 1 brighten.

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::channel::{ChannelSelector, LUMA_REC601, luma};
use crate::scopes::histogram::Histogram;

const LEVEL_MAX: f32 = 255.0;

/// Levels parameters. `Default` is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsParams {
    pub input_black: f32,
    /// Gamma applied as `1 / midtones`, in `[0.1, 9.99]`.
    pub input_midtones: f32,
    pub input_white: f32,
    pub output_black: f32,
    pub output_white: f32,
}

impl Default for LevelsParams {
    fn default() -> Self {
        Self {
            input_black: 0.0,
            input_midtones: 1.0,
            input_white: LEVEL_MAX,
            output_black: 0.0,
            output_white: LEVEL_MAX,
        }
    }
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

impl LevelsParams {
    /// Force every field into its legal range.
    ///
    /// Blacks land in `[0, 254]`, whites in `[black + 1, 255]`.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let input_black = finite_or(self.input_black, d.input_black).clamp(0.0, 254.0);
        let output_black = finite_or(self.output_black, d.output_black).clamp(0.0, 254.0);
        Self {
            input_black,
            input_midtones: finite_or(self.input_midtones, d.input_midtones).clamp(0.1, 9.99),
            input_white: finite_or(self.input_white, d.input_white).clamp(input_black + 1.0, LEVEL_MAX),
            output_black,
            output_white: finite_or(self.output_white, d.output_white).clamp(output_black + 1.0, LEVEL_MAX),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Map one 0–255 level. Expects sanitised parameters.
    pub fn map_level(&self, level: f32) -> f32 {
        let n = ((level - self.input_black) / (self.input_white - self.input_black)).clamp(0.0, 1.0);
        let g = n.powf(1.0 / self.input_midtones);
        (g * (self.output_white - self.output_black) + self.output_black).clamp(0.0, LEVEL_MAX)
    }

    fn map_unit(&self, v: f32) -> f32 {
        self.map_level((v * LEVEL_MAX).clamp(0.0, LEVEL_MAX)) / LEVEL_MAX
    }

    /// Replace the input range with one measured from `image`; midtones reset to 1.
    pub fn with_auto_range(
        self,
        image: &PixelBuffer,
        channel: ChannelSelector,
        mode: AutoMode,
        clip_percentage: f32,
    ) -> Self {
        let (black, white) = auto_input_range(image, channel, mode, clip_percentage);
        Self {
            input_black: black,
            input_white: white,
            input_midtones: 1.0,
            ..self
        }
    }
}

/// How the automatic input range is derived for the composite RGB channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoMode {
    /// Average the per-channel ranges.
    Levels,
    /// Widest range over the three channels.
    Contrast,
}

/// Input `(black, white)` that clip `clip_percentage` % of samples at each end.
///
/// Selecting a channel the image lacks yields the full range.
pub fn auto_input_range(
    image: &PixelBuffer,
    channel: ChannelSelector,
    mode: AutoMode,
    clip_percentage: f32,
) -> (f32, f32) {
    let clip = (finite_or(clip_percentage, 0.1) / 100.0).clamp(0.0, 0.5) as f64;
    let color = image.color_channels();
    let range_of = |values: Vec<f32>| {
        let hist = Histogram::compute(values, 256);
        (hist.quantile_edge(clip), hist.quantile_edge(1.0 - clip))
    };
    let plane = |c: usize| -> Vec<f32> {
        image.pixels().map(|px| (px[c] * LEVEL_MAX).clamp(0.0, LEVEL_MAX)).collect()
    };

    let (black, white) = match channel {
        ChannelSelector::Rgb if color == 3 => {
            let ranges: Vec<(f32, f32)> = (0..3).map(|c| range_of(plane(c))).collect();
            match mode {
                AutoMode::Levels => (
                    ranges.iter().map(|r| r.0).sum::<f32>() / 3.0,
                    ranges.iter().map(|r| r.1).sum::<f32>() / 3.0,
                ),
                AutoMode::Contrast => (
                    ranges.iter().map(|r| r.0).fold(f32::INFINITY, f32::min),
                    ranges.iter().map(|r| r.1).fold(f32::NEG_INFINITY, f32::max),
                ),
            }
        }
        ChannelSelector::Luminance if color == 3 => range_of(
            image
                .pixels()
                .map(|px| (luma(px, LUMA_REC601) * LEVEL_MAX).clamp(0.0, LEVEL_MAX))
                .collect(),
        ),
        ChannelSelector::Rgb | ChannelSelector::Luminance => range_of(plane(0)),
        single => match single.index() {
            Some(c) if c < color => range_of(plane(c)),
            _ => (0.0, LEVEL_MAX),
        },
    };

    let black = black.clamp(0.0, 254.0);
    (black, white.clamp(black + 1.0, LEVEL_MAX))
}

/// Apply levels to the selected channel(s). Alpha is untouched.
///
/// `Luminance` adjusts the HSV value (max channel) and scales RGB by the
/// same ratio; pure black stays black.
pub fn apply_levels(image: &PixelBuffer, params: &LevelsParams, channel: ChannelSelector) -> PixelBuffer {
    let params = params.sanitized();
    let mut out = image.clone();
    let color = image.color_channels();

    if channel == ChannelSelector::Luminance && color == 3 {
        for px in out.pixels_mut() {
            let v = px[0].max(px[1]).max(px[2]).clamp(0.0, 1.0);
            let ratio = if v > 0.0 { params.map_unit(v) / v } else { 1.0 };
            for c in &mut px[..3] {
                *c = (c.clamp(0.0, 1.0) * ratio).clamp(0.0, 1.0);
            }
        }
        return out;
    }

    let targets = channel.targets(color);
    for px in out.pixels_mut() {
        for &c in &targets {
            px[c] = params.map_unit(px[c]);
        }
    }
    out
}
