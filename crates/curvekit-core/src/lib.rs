//! Curvekit Core — pixel math for the curve and colour adjustment nodes.
//!
//! Everything here is a pure function over [`PixelBuffer`]s: control-point
//! parsing, LUT baking and application, mask compositing, blur, and the
//! adjustments layered on top. No host integration and no I/O.

pub mod blur;
pub mod buffer;
pub mod channel;
pub mod curve;
pub mod error;
pub mod grading;
pub mod mask;
pub mod scopes;

// Re-exports for convenience.
pub use buffer::PixelBuffer;
pub use channel::ChannelSelector;
pub use curve::{
    ControlPoint, ControlPointSet, Interpolation, LookupTable, apply_lut, blend_with_identity,
    build_lookup_table, parse_control_points,
};
pub use error::CoreError;
pub use mask::{Mask, composite_optional, composite_with_mask};
