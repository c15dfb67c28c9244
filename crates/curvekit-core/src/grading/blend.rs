//! Per-value layer blend modes (`base` is the original, `overlay` the adjusted value).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::CoreError;

/// Guards the dodge and burn divisions.
const DIVISION_GUARD: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
}

impl BlendMode {
    pub const ALL: [Self; 8] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
        Self::ColorDodge,
        Self::ColorBurn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::SoftLight => "soft_light",
            Self::HardLight => "hard_light",
            Self::ColorDodge => "color_dodge",
            Self::ColorBurn => "color_burn",
        }
    }

    /// Blend one value. The result is not clamped.
    pub fn apply(self, base: f32, overlay: f32) -> f32 {
        match self {
            Self::Normal => overlay,
            Self::Multiply => base * overlay,
            Self::Screen => 1.0 - (1.0 - base) * (1.0 - overlay),
            Self::Overlay => {
                if base < 0.5 {
                    2.0 * base * overlay
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - overlay)
                }
            }
            Self::SoftLight => {
                if overlay < 0.5 {
                    2.0 * base * overlay + base * base * (1.0 - 2.0 * overlay)
                } else {
                    2.0 * base * (1.0 - overlay) + base.max(0.0).sqrt() * (2.0 * overlay - 1.0)
                }
            }
            Self::HardLight => {
                if overlay < 0.5 {
                    2.0 * base * overlay
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - overlay)
                }
            }
            Self::ColorDodge => {
                if overlay >= 1.0 {
                    overlay
                } else {
                    base / (1.0 - overlay + DIVISION_GUARD)
                }
            }
            Self::ColorBurn => {
                if overlay <= 0.0 {
                    overlay
                } else {
                    1.0 - (1.0 - base) / (overlay + DIVISION_GUARD)
                }
            }
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlendMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|m| m.label() == name)
            .ok_or(CoreError::InvalidParameter("unknown blend mode"))
    }
}

/// Blend the colour channels of `overlay` onto `base`, clamped to `[0, 1]`.
///
/// Alpha comes from `overlay`. Shapes must match.
pub fn blend_images(base: &PixelBuffer, overlay: &PixelBuffer, mode: BlendMode) -> Result<PixelBuffer, CoreError> {
    if base.shape() != overlay.shape() {
        return Err(CoreError::ShapeMismatch {
            original: base.shape(),
            processed: overlay.shape(),
        });
    }
    let mut out = overlay.clone();
    if mode == BlendMode::Normal {
        return Ok(out);
    }
    let color = base.color_channels();
    for (dst, src) in out.data.chunks_exact_mut(base.channels).zip(base.pixels()) {
        for c in 0..color {
            dst[c] = mode.apply(src[c], dst[c]).clamp(0.0, 1.0);
        }
    }
    Ok(out)
}
