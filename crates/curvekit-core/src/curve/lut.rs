//! 256-entry lookup tables: baking, strength blending, and application.
//!
//! ```text
//!   ControlPointSet ──bake(policy)──→ LookupTable ──blend(strength)──→ LookupTable
//!                                                          │
//!   PixelBuffer ──floor(v×255)──→ index ──table[index]/255─┴──→ PixelBuffer
//! ```
//!
//! Pixel values are quantised by truncation, not rounding, so tables built
//! for existing presets map pixels exactly as before.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::channel::{ChannelSelector, LUMA_REC601, luma};
use crate::curve::points::{ControlPoint, ControlPointSet, DOMAIN_MAX, DOMAIN_MIN};
use crate::curve::spline::{CubicSpline, LinearInterpolator, MonotoneCubic, SplineError};

/// Number of entries in a table (one per 8-bit input level).
pub const LUT_SIZE: usize = 256;

/// Strength range accepted by [`LookupTable::blend_with_identity`].
pub const MAX_STRENGTH: f32 = 2.0;

/// Interpolation policy used to bake control points into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Piecewise-linear between control points.
    Linear,
    /// Natural cubic spline (zero curvature at both ends).
    #[default]
    Cubic,
    /// Clamped cubic spline followed by a running maximum, so the table
    /// never decreases.
    Monotonic,
    /// Fritsch–Carlson monotone cubic (true shape-preserving spline).
    Pchip,
}

impl Interpolation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Monotonic => "monotonic",
            Self::Pchip => "pchip",
        }
    }

    /// Parse a policy name, falling back to `Linear` for unknown names.
    pub fn parse_or_linear(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown interpolation {name:?}; using linear");
            Self::Linear
        })
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            "monotonic" => Ok(Self::Monotonic),
            "pchip" => Ok(Self::Pchip),
            other => Err(format!("unknown interpolation: {other}")),
        }
    }
}

/// Dense mapping from an 8-bit input level to an output level in `[0, 255]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable([f32; LUT_SIZE]);

impl LookupTable {
    /// `table[i] == i`.
    pub fn identity() -> Self {
        Self(std::array::from_fn(|i| i as f32))
    }

    /// Wrap precomputed values, clamping each to `[0, 255]`.
    pub fn from_values(values: [f32; LUT_SIZE]) -> Self {
        Self(values.map(clamp_level))
    }

    /// Bake a normalised control-point set. Never fails; see [`Self::from_points`].
    pub fn build(points: &ControlPointSet, policy: Interpolation) -> Self {
        Self::from_points(points.points(), policy)
    }

    /// Bake raw points, downgrading to linear interpolation when the chosen
    /// spline cannot be constructed (too few or repeated x values).
    pub fn from_points(points: &[ControlPoint], policy: Interpolation) -> Self {
        Self::try_from_points(points, policy).unwrap_or_else(|e| {
            tracing::warn!("{policy} interpolation failed ({e}); falling back to linear");
            Self::linear(points)
        })
    }

    /// Bake raw points with no fallback.
    pub fn try_from_points(points: &[ControlPoint], policy: Interpolation) -> Result<Self, SplineError> {
        let table = match policy {
            Interpolation::Linear => Self::linear(points),
            Interpolation::Cubic => {
                let spline = CubicSpline::natural(points)?;
                Self::sample(|x| spline.evaluate(x))
            }
            Interpolation::Monotonic => {
                let spline = CubicSpline::clamped_to_secants(points)?;
                Self::sample(|x| spline.evaluate(x)).running_max()
            }
            Interpolation::Pchip => {
                let pchip = MonotoneCubic::new(points)?;
                Self::sample(|x| pchip.evaluate(x)).running_max()
            }
        };
        Ok(table)
    }

    fn linear(points: &[ControlPoint]) -> Self {
        let lin = LinearInterpolator {
            control_points: points,
        };
        Self::sample(|x| lin.evaluate(x))
    }

    fn sample(f: impl Fn(f64) -> f64) -> Self {
        Self(std::array::from_fn(|i| clamp_level(f(i as f64) as f32)))
    }

    fn running_max(mut self) -> Self {
        for i in 1..LUT_SIZE {
            if self.0[i] < self.0[i - 1] {
                self.0[i] = self.0[i - 1];
            }
        }
        self
    }

    /// Mix toward the identity mapping.
    ///
    /// ```text
    /// out[i] = i × (1 − strength) + table[i] × strength
    ///        = i + (table[i] − i) × strength
    /// ```
    ///
    /// `strength` is clamped to `[0, 2]`; values above 1 extrapolate past
    /// the curve and are limited by the output clamp. Entries already on
    /// the identity stay exactly on it, and strength 1 returns the table.
    pub fn blend_with_identity(&self, strength: f32) -> Self {
        let s = if strength.is_finite() {
            strength.clamp(0.0, MAX_STRENGTH)
        } else {
            1.0
        };
        if s == 1.0 {
            return self.clone();
        }
        Self(std::array::from_fn(|i| {
            let level = i as f32;
            clamp_level(level + (self.0[i] - level) * s)
        }))
    }

    /// Table equivalent to applying `inner` first and then `self`.
    pub fn compose(&self, inner: &LookupTable) -> Self {
        Self(std::array::from_fn(|i| self.0[level_index(inner.0[i])]))
    }

    pub fn values(&self) -> &[f32; LUT_SIZE] {
        &self.0
    }

    /// True when `table[i] == i` exactly.
    ///
    /// Callers skip the mapping for such tables and pass pixels through
    /// untouched, without the index truncation [`apply_lut`] would apply.
    /// Any other table, however close, is applied.
    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| v == i as f32)
    }

    /// Map a `[0, 1]` value through the table, truncating to the index.
    pub fn lookup(&self, value: f32) -> f32 {
        (self.0[unit_index(value)] / DOMAIN_MAX).clamp(0.0, 1.0)
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<usize> for LookupTable {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

fn clamp_level(v: f32) -> f32 {
    if v.is_nan() {
        DOMAIN_MIN
    } else {
        v.clamp(DOMAIN_MIN, DOMAIN_MAX)
    }
}

/// Index for a `[0, 255]` level (truncating).
fn level_index(level: f32) -> usize {
    // NaN casts to 0
    level.floor().clamp(DOMAIN_MIN, DOMAIN_MAX) as usize
}

/// Index for a `[0, 1]` pixel value (truncating).
fn unit_index(value: f32) -> usize {
    level_index(value * DOMAIN_MAX)
}

/// Bake control points with the given policy. See [`LookupTable::build`].
pub fn build_lookup_table(points: &ControlPointSet, policy: Interpolation) -> LookupTable {
    LookupTable::build(points, policy)
}

/// See [`LookupTable::blend_with_identity`].
pub fn blend_with_identity(table: &LookupTable, strength: f32) -> LookupTable {
    table.blend_with_identity(strength)
}

/// Apply a table to the selected channels of `image`.
///
/// Unselected channels and alpha are copied bit-for-bit. Selecting a
/// channel the image does not have returns an unchanged copy. For
/// [`ChannelSelector::Luminance`] the Rec. 601 luma is mapped and the
/// colour channels are scaled by the same ratio.
pub fn apply_lut(image: &PixelBuffer, table: &LookupTable, channel: ChannelSelector) -> PixelBuffer {
    let mut out = image.clone();
    let color = image.color_channels();

    if channel == ChannelSelector::Luminance && color == 3 {
        out.data.par_chunks_mut(image.channels).for_each(|px| {
            let y = luma(px, LUMA_REC601);
            let mapped = table.lookup(y);
            if y > 1e-6 {
                let ratio = mapped / y;
                for v in &mut px[..3] {
                    *v = (*v * ratio).clamp(0.0, 1.0);
                }
            } else {
                px[..3].fill(mapped);
            }
        });
        return out;
    }

    let targets = channel.targets(color);
    if targets.is_empty() {
        tracing::debug!("channel {channel} not present in {color}-colour image; LUT skipped");
        return out;
    }
    out.data.par_chunks_mut(image.channels).for_each(|px| {
        for &c in &targets {
            px[c] = table.lookup(px[c]);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::points::parse_control_points;

    const EPSILON: f32 = 1e-3;

    const ALL_POLICIES: [Interpolation; 4] = [
        Interpolation::Linear,
        Interpolation::Cubic,
        Interpolation::Monotonic,
        Interpolation::Pchip,
    ];

    fn s_curve() -> ControlPointSet {
        parse_control_points("0,0;64,40;128,128;192,215;255,255")
    }

    #[test]
    fn test_identity_points_bake_identity_for_every_policy() {
        let points = ControlPointSet::identity();
        for policy in ALL_POLICIES {
            let table = build_lookup_table(&points, policy);
            for i in 0..LUT_SIZE {
                assert!(
                    (table[i] - i as f32).abs() < EPSILON,
                    "{policy}: table[{i}] = {}",
                    table[i]
                );
            }
        }
    }

    #[test]
    fn test_linear_scenario() {
        let table = build_lookup_table(&parse_control_points("0,0;128,200;255,255"), Interpolation::Linear);
        assert_eq!(table[0], 0.0);
        assert_eq!(table[128], 200.0);
        assert_eq!(table[255], 255.0);
        assert!((table[64] - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_every_policy_stays_in_range() {
        let wild = parse_control_points("0,255;30,0;60,255;90,0;255,255");
        for policy in ALL_POLICIES {
            for set in [&wild, &s_curve()] {
                let table = build_lookup_table(set, policy);
                assert!(table.values().iter().all(|v| (0.0..=255.0).contains(v)), "{policy}");
            }
        }
    }

    #[test]
    fn test_monotonic_policy_never_decreases() {
        let wild = parse_control_points("0,0;50,200;100,20;180,240;255,100");
        for policy in [Interpolation::Monotonic, Interpolation::Pchip] {
            let table = build_lookup_table(&wild, policy);
            for i in 0..LUT_SIZE - 1 {
                assert!(table[i] <= table[i + 1], "{policy}: {i}");
            }
        }
    }

    #[test]
    fn test_cubic_passes_through_control_points() {
        let table = build_lookup_table(&s_curve(), Interpolation::Cubic);
        assert!((table[64] - 40.0).abs() < EPSILON);
        assert!((table[192] - 215.0).abs() < EPSILON);
    }

    #[test]
    fn test_spline_failure_falls_back_to_linear() {
        let single = [ControlPoint::new(0.0, 0.0)];
        assert!(LookupTable::try_from_points(&single, Interpolation::Cubic).is_err());
        let table = LookupTable::from_points(&single, Interpolation::Cubic);
        assert!(table.values().iter().all(|&v| v == 0.0));

        let repeated = [
            ControlPoint::new(0.0, 0.0),
            ControlPoint::new(100.0, 50.0),
            ControlPoint::new(100.0, 60.0),
            ControlPoint::new(255.0, 255.0),
        ];
        let fallback = LookupTable::from_points(&repeated, Interpolation::Monotonic);
        let linear = LookupTable::from_points(&repeated, Interpolation::Linear);
        assert_eq!(fallback, linear);
    }

    #[test]
    fn test_unknown_policy_name_is_linear() {
        assert_eq!(Interpolation::parse_or_linear("bezier"), Interpolation::Linear);
        assert_eq!(Interpolation::parse_or_linear("Monotonic"), Interpolation::Monotonic);
    }

    #[test]
    fn test_blend_strength_bounds() {
        let table = build_lookup_table(&s_curve(), Interpolation::Cubic);
        assert_eq!(blend_with_identity(&table, 1.0), table);
        assert_eq!(blend_with_identity(&table, 0.0), LookupTable::identity());
    }

    #[test]
    fn test_blend_identity_with_identity_is_identity() {
        let table = build_lookup_table(&ControlPointSet::identity(), Interpolation::Linear);
        let blended = blend_with_identity(&table, 0.5);
        for i in 0..LUT_SIZE {
            assert!((blended[i] - i as f32).abs() < EPSILON);
        }
    }

    #[test]
    fn test_near_identity_table_is_not_identity() {
        let strong = build_lookup_table(&parse_control_points("0,255;255,0"), Interpolation::Linear);
        let faint = blend_with_identity(&strong, 0.001);
        assert!(!faint.is_identity());
        assert!(blend_with_identity(&strong, 0.0).is_identity());
        assert!(blend_with_identity(&LookupTable::identity(), 0.3).is_identity());
    }

    #[test]
    fn test_blend_overshoot_is_clamped() {
        let table = build_lookup_table(&parse_control_points("0,0;128,250;255,255"), Interpolation::Linear);
        let boosted = blend_with_identity(&table, 2.0);
        assert_eq!(boosted[128], 255.0);
        assert_eq!(blend_with_identity(&table, 5.0), boosted);
    }

    #[test]
    fn test_lookup_truncates() {
        let mut values = [0.0; LUT_SIZE];
        values[127] = 10.0;
        values[128] = 200.0;
        let table = LookupTable::from_values(values);
        // 0.5 × 255 = 127.5 → index 127, not 128
        assert!((table.lookup(0.5) - 10.0 / 255.0).abs() < 1e-6);
        assert_eq!(table.lookup(-1.0), 0.0);
        assert_eq!(table.lookup(f32::NAN), 0.0);
    }

    #[test]
    fn test_compose_applies_inner_first() {
        let invert = LookupTable::from_values(std::array::from_fn(|i| 255.0 - i as f32));
        let half = LookupTable::from_values(std::array::from_fn(|i| i as f32 * 0.5));
        let composed = half.compose(&invert);
        assert_eq!(composed[0], 127.5);
        assert_eq!(composed[255], 0.0);
    }

    #[test]
    fn test_apply_red_only_leaves_other_channels_bitwise() {
        let image = PixelBuffer::from_fn(4, 3, 3, |x, y, c| (x + y * 4) as f32 / 12.0 + c as f32 * 0.01);
        let table = build_lookup_table(&parse_control_points("0,0;128,200;255,255"), Interpolation::Linear);
        let out = apply_lut(&image, &table, ChannelSelector::Red);
        let mut red_changed = false;
        for (a, b) in image.pixels().zip(out.pixels()) {
            assert_eq!(a[1].to_bits(), b[1].to_bits());
            assert_eq!(a[2].to_bits(), b[2].to_bits());
            red_changed |= a[0] != b[0];
        }
        assert!(red_changed);
    }

    #[test]
    fn test_apply_rgb_preserves_alpha() {
        let image = PixelBuffer::from_fn(2, 2, 4, |x, _, c| if c == 3 { 0.3 } else { x as f32 * 0.5 });
        let invert = LookupTable::from_values(std::array::from_fn(|i| 255.0 - i as f32));
        let out = apply_lut(&image, &invert, ChannelSelector::Rgb);
        for px in out.pixels() {
            assert_eq!(px[3], 0.3);
        }
        assert_eq!(out.get(0, 0, 0), 1.0);
    }

    #[test]
    fn test_apply_missing_channel_is_noop() {
        let image = PixelBuffer::filled(2, 2, 1, 0.4);
        let invert = LookupTable::from_values(std::array::from_fn(|i| 255.0 - i as f32));
        assert_eq!(apply_lut(&image, &invert, ChannelSelector::Blue), image);
        assert_ne!(apply_lut(&image, &invert, ChannelSelector::Rgb), image);
    }

    #[test]
    fn test_apply_luminance_keeps_gray_neutral() {
        let image = PixelBuffer::filled(2, 1, 3, 0.5);
        let table = build_lookup_table(&parse_control_points("0,0;127,200;255,255"), Interpolation::Linear);
        let out = apply_lut(&image, &table, ChannelSelector::Luminance);
        let px = &out.data[..3];
        assert!((px[0] - px[1]).abs() < 1e-6 && (px[1] - px[2]).abs() < 1e-6);
        assert!(px[0] > 0.5);
    }
}
