//! Per-colour-range hue / saturation / lightness adjustment.
//!
//! Hue is measured in half-degrees (0–179), so the eight ranges below cover
//! the wheel with integer bounds. Ranges are processed in wheel order and
//! each sees the result of the previous one: a red pixel pushed into the
//! orange band by the red hue shift then receives the orange adjustment.

use palette::{FromColor, Hsv, RgbHue, Srgb};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// Hue units per full turn.
const HUE_STEPS: f32 = 180.0;

/// One of the eight selectable colour bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueRange {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Magenta,
}

impl HueRange {
    /// Processing order.
    pub const ALL: [Self; 8] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Cyan,
        Self::Blue,
        Self::Purple,
        Self::Magenta,
    ];

    /// Inclusive half-degree spans.
    pub const fn spans(self) -> &'static [(u16, u16)] {
        match self {
            Self::Red => &[(0, 10), (170, 179)],
            Self::Orange => &[(11, 25)],
            Self::Yellow => &[(26, 40)],
            Self::Green => &[(41, 80)],
            Self::Cyan => &[(81, 100)],
            Self::Blue => &[(101, 130)],
            Self::Purple => &[(131, 150)],
            Self::Magenta => &[(151, 169)],
        }
    }

    /// Whether a hue in half-degrees falls in this band (rounded to the nearest step).
    pub fn contains(self, hue_steps: f32) -> bool {
        let h = (hue_steps.round() as i32).rem_euclid(HUE_STEPS as i32) as u16;
        self.spans().iter().any(|&(lo, hi)| (lo..=hi).contains(&h))
    }
}

/// Shifts for one band, each in `[-100, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslShift {
    /// ±100 rotates the hue by ±180°.
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HslShift {
    pub fn is_zero(&self) -> bool {
        self.hue == 0.0 && self.saturation == 0.0 && self.lightness == 0.0
    }

    fn clamped(self) -> Self {
        let c = |v: f32| if v.is_finite() { v.clamp(-100.0, 100.0) } else { 0.0 };
        Self {
            hue: c(self.hue),
            saturation: c(self.saturation),
            lightness: c(self.lightness),
        }
    }
}

/// Shifts for every band. `Default` changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HslParams {
    pub red: HslShift,
    pub orange: HslShift,
    pub yellow: HslShift,
    pub green: HslShift,
    pub cyan: HslShift,
    pub blue: HslShift,
    pub purple: HslShift,
    pub magenta: HslShift,
}

impl HslParams {
    pub fn shift(&self, range: HueRange) -> HslShift {
        match range {
            HueRange::Red => self.red,
            HueRange::Orange => self.orange,
            HueRange::Yellow => self.yellow,
            HueRange::Green => self.green,
            HueRange::Cyan => self.cyan,
            HueRange::Blue => self.blue,
            HueRange::Purple => self.purple,
            HueRange::Magenta => self.magenta,
        }
    }

    pub fn shift_mut(&mut self, range: HueRange) -> &mut HslShift {
        match range {
            HueRange::Red => &mut self.red,
            HueRange::Orange => &mut self.orange,
            HueRange::Yellow => &mut self.yellow,
            HueRange::Green => &mut self.green,
            HueRange::Cyan => &mut self.cyan,
            HueRange::Blue => &mut self.blue,
            HueRange::Purple => &mut self.purple,
            HueRange::Magenta => &mut self.magenta,
        }
    }

    pub fn is_identity(&self) -> bool {
        HueRange::ALL.iter().all(|&r| self.shift(r).is_zero())
    }
}

/// Saturation multiplier: `1 + 2s` when raising, `max(0, 1 + s)` when lowering
/// (`s` as a fraction of 100).
pub fn saturation_factor(shift: f32) -> f32 {
    let s = shift / 100.0;
    if s > 0.0 { 1.0 + 2.0 * s } else { (1.0 + s).max(0.0) }
}

/// Lightness as a power on HSV value; positive shifts brighten.
///
/// ```text
/// l > 0: v^(1 − 0.5 × l)      l < 0: v^(1 + 0.5 × |l|)
/// ```
pub fn adjust_value(value: f32, shift: f32) -> f32 {
    let l = shift / 100.0;
    let power = if l > 0.0 { 1.0 - 0.5 * l } else { 1.0 + 0.5 * l.abs() };
    value.clamp(0.0, 1.0).powf(power).clamp(0.0, 1.0)
}

/// Adjust one `(hue_steps, saturation, value)` triple in band order.
fn adjust_hsv(mut hsv: (f32, f32, f32), params: &HslParams) -> (f32, f32, f32) {
    for range in HueRange::ALL {
        let shift = params.shift(range).clamped();
        if shift.is_zero() || !range.contains(hsv.0) {
            continue;
        }
        if shift.hue != 0.0 {
            hsv.0 = (hsv.0 + shift.hue * 1.8).rem_euclid(HUE_STEPS);
        }
        if shift.saturation != 0.0 {
            hsv.1 = (hsv.1 * saturation_factor(shift.saturation)).clamp(0.0, 1.0);
        }
        if shift.lightness != 0.0 {
            hsv.2 = adjust_value(hsv.2, shift.lightness);
        }
    }
    hsv
}

/// Apply per-band shifts to an RGB(A) image. Alpha is preserved; gray
/// images and all-zero parameters return an unchanged copy.
pub fn apply_hsl(image: &PixelBuffer, params: &HslParams) -> PixelBuffer {
    let mut out = image.clone();
    if params.is_identity() || image.color_channels() < 3 {
        return out;
    }
    for px in out.pixels_mut() {
        let rgb = Srgb::new(px[0].clamp(0.0, 1.0), px[1].clamp(0.0, 1.0), px[2].clamp(0.0, 1.0));
        let hsv: Hsv = Hsv::from_color(rgb);
        let (h, s, v) = adjust_hsv(
            (hsv.hue.into_positive_degrees() / 2.0, hsv.saturation, hsv.value),
            params,
        );
        let hsv: Hsv = Hsv::new(RgbHue::from_degrees(h * 2.0), s, v);
        let rgb = Srgb::from_color(hsv);
        px[0] = rgb.red.clamp(0.0, 1.0);
        px[1] = rgb.green.clamp(0.0, 1.0);
        px[2] = rgb.blue.clamp(0.0, 1.0);
    }
    out
}
