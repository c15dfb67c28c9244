//! Channel selection for per-channel adjustments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Rec. 601 luma weights, used for the Luminance selector and masks.
pub const LUMA_REC601: [f32; 3] = [0.299, 0.587, 0.114];

/// Rec. 709 luma weights.
pub const LUMA_REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Which colour channel(s) an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelSelector {
    /// All colour channels.
    #[default]
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "B")]
    Blue,
    /// Perceived brightness; colour ratios are preserved.
    Luminance,
}

impl ChannelSelector {
    /// Channel index for single-channel selectors.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Red => Some(0),
            Self::Green => Some(1),
            Self::Blue => Some(2),
            Self::Rgb | Self::Luminance => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Red => "R",
            Self::Green => "G",
            Self::Blue => "B",
            Self::Luminance => "Luminance",
        }
    }

    /// Indices to modify on an image with `color_channels` colour channels.
    ///
    /// Empty when the selected channel does not exist in the image.
    /// Luminance reports every colour channel.
    pub fn targets(self, color_channels: usize) -> Vec<usize> {
        match self.index() {
            Some(i) if i < color_channels => vec![i],
            Some(_) => Vec::new(),
            None => (0..color_channels).collect(),
        }
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChannelSelector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "r" | "red" | "0" => Ok(Self::Red),
            "g" | "green" | "1" => Ok(Self::Green),
            "b" | "blue" | "2" => Ok(Self::Blue),
            "luminance" | "luma" | "l" => Ok(Self::Luminance),
            other => Err(CoreError::UnknownChannel(other.to_string())),
        }
    }
}

/// Weighted luma of the first three values of `rgb`.
pub fn luma(rgb: &[f32], weights: [f32; 3]) -> f32 {
    glam::Vec3::from_slice(&rgb[..3]).dot(glam::Vec3::from(weights))
}
