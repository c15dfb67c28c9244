//! Photo adjustments built on the curve engine: levels, HSL, colour grading,
//! camera-raw tone curve and blend modes.

pub mod blend;
pub mod color_grading;
pub mod hsl;
pub mod levels;
pub mod tone_curve;

pub use blend::{BlendMode, blend_images};
pub use color_grading::{ColorGradingParams, WheelShift, apply_color_grading};
pub use hsl::{HslParams, HslShift, HueRange, apply_hsl};
pub use levels::{AutoMode, LevelsParams, apply_levels, auto_input_range};
pub use tone_curve::{
    CurveMode, CurvePreset, ParametricRegions, ToneCurveParams, apply_tone_curve, apply_tone_mapping,
};
