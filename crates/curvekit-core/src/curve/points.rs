//! Control points and their text forms.
//!
//! Two encodings reach this module from the host widgets:
//! ```text
//!   "x1,y1;x2,y2;..."        preset / text widgets
//!   "[[x1,y1],[x2,y2],...]"  curve editor widgets (JSON)
//! ```
//! Both are normalised the same way: clamp to `[0, 255]`, sort by x,
//! collapse duplicate x (first one wins), then anchor at x = 0 and x = 255.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest coordinate of the 8-bit curve domain.
pub const DOMAIN_MIN: f32 = 0.0;
/// Highest coordinate of the 8-bit curve domain.
pub const DOMAIN_MAX: f32 = 255.0;

/// A single `(input, output)` pair the curve passes through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f32,
    pub y: f32,
}

impl ControlPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(DOMAIN_MIN, DOMAIN_MAX),
            y: self.y.clamp(DOMAIN_MIN, DOMAIN_MAX),
        }
    }
}

/// Reasons a control-point string could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("segment {0:?} is not an `x,y` pair")]
    MalformedSegment(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("non-finite coordinate in segment {0:?}")]
    NonFinite(String),
    #[error("invalid point array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sorted, anchored control points.
///
/// Invariants: at least two points, first x = 0, last x = 255, x strictly
/// increasing, every coordinate in `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<[f32; 2]>", into = "Vec<[f32; 2]>")]
pub struct ControlPointSet(Vec<ControlPoint>);

impl ControlPointSet {
    /// The two-point identity curve `[(0,0), (255,255)]`.
    pub fn identity() -> Self {
        Self(vec![
            ControlPoint::new(DOMAIN_MIN, DOMAIN_MIN),
            ControlPoint::new(DOMAIN_MAX, DOMAIN_MAX),
        ])
    }

    /// Normalise an arbitrary list of points. Non-finite points are dropped.
    pub fn from_points(points: impl IntoIterator<Item = ControlPoint>) -> Self {
        let mut pts: Vec<ControlPoint> = points
            .into_iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(ControlPoint::clamped)
            .collect();

        pts.sort_by(|a, b| a.x.total_cmp(&b.x));
        // `dedup_by` drops the later element of each equal run.
        pts.dedup_by(|later, earlier| later.x == earlier.x);

        if pts.first().is_none_or(|p| p.x != DOMAIN_MIN) {
            pts.insert(0, ControlPoint::new(DOMAIN_MIN, DOMAIN_MIN));
        }
        if pts.last().is_none_or(|p| p.x != DOMAIN_MAX) {
            pts.push(ControlPoint::new(DOMAIN_MAX, DOMAIN_MAX));
        }
        Self(pts)
    }

    /// Strict parse of the `"x,y;x,y"` form.
    ///
    /// Any malformed segment rejects the whole string; empty segments are
    /// skipped.
    pub fn try_parse(text: &str) -> Result<Self, ParseError> {
        let mut points = Vec::new();
        for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let fields: Vec<&str> = segment.split(',').map(str::trim).collect();
            let [x, y] = fields.as_slice() else {
                return Err(ParseError::MalformedSegment(segment.to_string()));
            };
            let x = parse_coordinate(x, segment)?;
            let y = parse_coordinate(y, segment)?;
            points.push(ControlPoint::new(x, y));
        }
        Ok(Self::from_points(points))
    }

    /// Strict parse of the `"[[x,y],...]"` JSON form.
    pub fn try_from_json(text: &str) -> Result<Self, ParseError> {
        let raw: Vec<[f32; 2]> = serde_json::from_str(text)?;
        Ok(Self::from(raw))
    }

    /// Lenient JSON parse: malformed input yields the identity curve.
    pub fn from_json(text: &str) -> Self {
        Self::try_from_json(text).unwrap_or_else(|e| {
            tracing::warn!("curve points {text:?} rejected ({e}); using identity curve");
            Self::identity()
        })
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for exactly `[(0,0), (255,255)]`.
    pub fn is_identity(&self) -> bool {
        self.0 == Self::identity().0
    }
}

/// Lenient parse of the `"x,y;x,y"` form used by the host.
///
/// On any parse error the default identity set is returned and a warning
/// is logged. Callers wanting the error should use
/// [`ControlPointSet::try_parse`].
pub fn parse_control_points(text: &str) -> ControlPointSet {
    ControlPointSet::try_parse(text).unwrap_or_else(|e| {
        tracing::warn!("control points {text:?} rejected ({e}); using identity curve");
        ControlPointSet::identity()
    })
}

fn parse_coordinate(field: &str, segment: &str) -> Result<f32, ParseError> {
    let value: f32 = field
        .parse()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))?;
    if !value.is_finite() {
        return Err(ParseError::NonFinite(segment.to_string()));
    }
    Ok(value)
}

impl Default for ControlPointSet {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Vec<[f32; 2]>> for ControlPointSet {
    fn from(raw: Vec<[f32; 2]>) -> Self {
        Self::from_points(raw.into_iter().map(|[x, y]| ControlPoint::new(x, y)))
    }
}

impl From<ControlPointSet> for Vec<[f32; 2]> {
    fn from(set: ControlPointSet) -> Self {
        set.0.into_iter().map(|p| [p.x, p.y]).collect()
    }
}

impl fmt::Display for ControlPointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(set: &ControlPointSet) -> Vec<(f32, f32)> {
        set.points().iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_parse_three_points() {
        let set = ControlPointSet::try_parse("0,0;128,200;255,255").unwrap();
        assert_eq!(xy(&set), vec![(0.0, 0.0), (128.0, 200.0), (255.0, 255.0)]);
    }

    #[test]
    fn test_parse_adds_missing_anchors() {
        let set = parse_control_points("64,32;192,220");
        assert_eq!(
            xy(&set),
            vec![(0.0, 0.0), (64.0, 32.0), (192.0, 220.0), (255.0, 255.0)]
        );
    }

    #[test]
    fn test_parse_sorts_clamps_and_skips_empty_segments() {
        let set = parse_control_points(" 300,-5 ;; 100 , 90;");
        assert_eq!(xy(&set), vec![(0.0, 0.0), (100.0, 90.0), (255.0, 0.0)]);
    }

    #[test]
    fn test_duplicate_x_keeps_first_occurrence() {
        let set = parse_control_points("0,0;128,100;128,200;255,255");
        assert_eq!(xy(&set), vec![(0.0, 0.0), (128.0, 100.0), (255.0, 255.0)]);
    }

    #[test]
    fn test_malformed_segment_rejects_whole_string() {
        assert!(matches!(
            ControlPointSet::try_parse("abc;128,200"),
            Err(ParseError::MalformedSegment(_))
        ));
        let set = parse_control_points("abc;128,200");
        assert!(set.is_identity());
    }

    #[test]
    fn test_three_fields_is_malformed() {
        assert!(ControlPointSet::try_parse("1,2,3").is_err());
        assert!(parse_control_points("0,0;1,2,3;255,255").is_identity());
    }

    #[test]
    fn test_bad_number_and_non_finite() {
        assert!(matches!(
            ControlPointSet::try_parse("0,x"),
            Err(ParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            ControlPointSet::try_parse("0,NaN"),
            Err(ParseError::NonFinite(_))
        ));
    }

    #[test]
    fn test_empty_text_is_identity() {
        assert!(parse_control_points("").is_identity());
        assert!(parse_control_points(" ; ").is_identity());
    }

    #[test]
    fn test_x_values_strictly_increasing_and_anchored() {
        for text in ["10,10;10,20;5,5", "255,0;0,255", "50,50", "0,0;255,255;128,64"] {
            let set = parse_control_points(text);
            let pts = set.points();
            assert!(pts.len() >= 2);
            assert_eq!(pts[0].x, 0.0, "{text}");
            assert_eq!(pts[pts.len() - 1].x, 255.0, "{text}");
            for w in pts.windows(2) {
                assert!(w[0].x < w[1].x, "{text}: {:?}", pts);
            }
        }
    }

    #[test]
    fn test_json_form() {
        let set = ControlPointSet::from_json("[[0,0],[64,80],[255,255]]");
        assert_eq!(xy(&set), vec![(0.0, 0.0), (64.0, 80.0), (255.0, 255.0)]);
        assert!(ControlPointSet::from_json("[[0,0],[64]]").is_identity());
        assert!(ControlPointSet::from_json("not json").is_identity());
    }

    #[test]
    fn test_display_matches_text_form() {
        let set = parse_control_points("0,0;127.5,200;255,255");
        assert_eq!(set.to_string(), "0,0;127.5,200;255,255");
        assert_eq!(parse_control_points(&set.to_string()), set);
    }

    #[test]
    fn test_serde_as_point_array() {
        let set = parse_control_points("0,0;128,200;255,255");
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[[0.0,0.0],[128.0,200.0],[255.0,255.0]]");
        let back: ControlPointSet = serde_json::from_str("[[128,200]]").unwrap();
        assert_eq!(back, set);
    }
}
