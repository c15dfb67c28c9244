pub mod color_grading;
pub mod curve;
pub mod curve_preset;
pub mod gaussian_blur;
pub mod histogram;
pub mod hsl;
pub mod levels;
pub mod tone_curve;

pub use color_grading::{ColorGradingConfig, ColorGradingNode};
pub use curve::{CurveConfig, CurveNode};
pub use curve_preset::{CurvePresetConfig, CurvePresetNode};
pub use gaussian_blur::{GaussianBlurConfig, GaussianBlurNode};
pub use histogram::{HistogramConfig, HistogramNode, HistogramReport};
pub use hsl::{HslConfig, HslNode};
pub use levels::{LevelsConfig, LevelsNode};
pub use tone_curve::{ToneCurveConfig, ToneCurveNode};
