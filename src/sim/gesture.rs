//! Pinch tracking and fit judgement
//!
//! The heart of the game: the two contact points define a circle whose
//! radius is the finger gap, and on release that circle's diameter is
//! compared against the target shape's bounding span.

use glam::Vec2;

use super::shape::TargetShape;
use crate::{pinch_center, pinch_diameter};

/// The circle being traced by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    /// Center in screen pixels
    pub center: Vec2,
    /// Diameter in screen pixels
    pub diameter: f32,
}

impl Ring {
    /// Build the ring spanned by two pinch points
    pub fn from_pinch(a: Vec2, b: Vec2) -> Self {
        Self {
            center: pinch_center(a, b),
            diameter: pinch_diameter(a, b),
        }
    }
}

/// Verdict for a released ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// True when the ring's diameter covers the shape's bounding span
    pub covered: bool,
    /// Pixels to spare when covered, pixels short when not
    pub margin: f32,
}

/// Judge whether a traced diameter covers the shape
pub fn judge_fit(ring_diameter: f32, shape: &TargetShape) -> FitResult {
    let span = shape.bounding_span();
    let covered = ring_diameter >= span;
    let margin = if covered {
        ring_diameter - span
    } else {
        span - ring_diameter
    };
    FitResult { covered, margin }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LINE_THICKNESS;
    use crate::sim::shape::ShapeKind;

    fn rect(w: f32, h: f32) -> TargetShape {
        TargetShape {
            kind: ShapeKind::Rect,
            width: w,
            height: h,
            rotation_deg: 30.0,
        }
    }

    #[test]
    fn test_ring_from_pinch() {
        let ring = Ring::from_pinch(Vec2::new(100.0, 200.0), Vec2::new(160.0, 280.0));
        // Fingers 100 px apart -> 200 px diameter, centered between them
        assert!((ring.diameter - 200.0).abs() < 0.001);
        assert!((ring.center.x - 130.0).abs() < 0.001);
        assert!((ring.center.y - 240.0).abs() < 0.001);
    }

    #[test]
    fn test_ring_degenerate_pinch() {
        let p = Vec2::new(50.0, 50.0);
        let ring = Ring::from_pinch(p, p);
        assert_eq!(ring.diameter, 0.0);
        assert_eq!(ring.center, p);
    }

    #[test]
    fn test_judge_covers_diagonal() {
        // 3-4-5: diagonal is 500
        let shape = rect(300.0, 400.0);
        let result = judge_fit(520.0, &shape);
        assert!(result.covered);
        assert!((result.margin - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_judge_falls_short() {
        let shape = rect(300.0, 400.0);
        let result = judge_fit(450.0, &shape);
        assert!(!result.covered);
        assert!((result.margin - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_judge_exact_span_covers() {
        let shape = TargetShape {
            kind: ShapeKind::Disc,
            width: 250.0,
            height: 250.0,
            rotation_deg: 1.0,
        };
        let result = judge_fit(250.0, &shape);
        assert!(result.covered);
        assert_eq!(result.margin, 0.0);
    }

    #[test]
    fn test_judge_line_uses_thickness() {
        let shape = TargetShape {
            kind: ShapeKind::Line,
            width: 120.0,
            height: LINE_THICKNESS,
            rotation_deg: 75.0,
        };
        // Bare width is not enough once thickness counts
        let result = judge_fit(120.0, &shape);
        assert!(!result.covered);
        assert!(result.margin > 0.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_shape() -> impl Strategy<Value = TargetShape> {
            (0u32..3, 51.0f32..500.0, 51.0f32..500.0, 1.0f32..360.0).prop_map(
                |(k, w, h, rot)| {
                    let kind = crate::sim::shape::SHAPE_CYCLE[k as usize];
                    let height = match kind {
                        ShapeKind::Disc => w,
                        ShapeKind::Rect => h,
                        ShapeKind::Line => LINE_THICKNESS,
                    };
                    TargetShape {
                        kind,
                        width: w,
                        height,
                        rotation_deg: rot,
                    }
                },
            )
        }

        proptest! {
            #[test]
            fn margin_is_never_negative(shape in arb_shape(), d in 0.0f32..2000.0) {
                let result = judge_fit(d, &shape);
                prop_assert!(result.margin >= 0.0);
            }

            #[test]
            fn covered_iff_diameter_reaches_span(shape in arb_shape(), d in 0.0f32..2000.0) {
                let result = judge_fit(d, &shape);
                prop_assert_eq!(result.covered, d >= shape.bounding_span());
            }

            #[test]
            fn margin_measures_distance_to_span(shape in arb_shape(), d in 0.0f32..2000.0) {
                let result = judge_fit(d, &shape);
                let span = shape.bounding_span();
                prop_assert!((result.margin - (d - span).abs()).abs() < 1e-3);
            }

            #[test]
            fn span_covers_both_extents(shape in arb_shape()) {
                let span = shape.bounding_span();
                prop_assert!(span >= shape.width - 1e-3);
                prop_assert!(span >= shape.height - 1e-3);
            }
        }
    }
}
