//! Tone curves: control-point parsing, spline evaluation and LUT baking.

pub mod lut;
pub mod points;
pub mod spline;

pub use lut::{
    Interpolation, LUT_SIZE, LookupTable, MAX_STRENGTH, apply_lut, blend_with_identity,
    build_lookup_table,
};
pub use points::{ControlPoint, ControlPointSet, ParseError, parse_control_points};
pub use spline::{Boundary, CubicSpline, LinearInterpolator, MonotoneCubic, SplineError};
