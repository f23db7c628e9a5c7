use nalgebra as na;

/// Signed area of the triangle (a, b, c), doubled.
///
/// Positive when `c` lies to the left of the directed line `a -> b`,
/// negative when it lies to the right and zero when the three points are
/// collinear.
#[inline]
pub fn orientation(a: na::Point2<f32>, b: na::Point2<f32>, c: na::Point2<f32>) -> f32 {
    let ab = b - a;
    let ac = c - a;

    ab.x * ac.y - ab.y * ac.x
}

/// Returns true iff the segments `p1-p2` and `q1-q2` properly cross.
///
/// Both endpoints of each segment have to lie strictly on opposite sides of
/// the other segment's supporting line. Collinear overlap and contact at an
/// endpoint are not crossings.
pub fn segments_cross(
    p1: na::Point2<f32>,
    p2: na::Point2<f32>,
    q1: na::Point2<f32>,
    q2: na::Point2<f32>,
) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    strictly_opposite(d1, d2) && strictly_opposite(d3, d4)
}

#[inline(always)]
fn strictly_opposite(a: f32, b: f32) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> na::Point2<f32> {
        na::Point2::new(x, y)
    }

    #[test]
    fn vertical_step_crosses_horizontal_line() {
        assert!(segments_cross(pt(10.0, 40.0), pt(10.0, 60.0), pt(0.0, 50.0), pt(100.0, 50.0)));
        assert!(segments_cross(pt(10.0, 60.0), pt(10.0, 40.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn diagonal_segments_cross() {
        assert!(segments_cross(pt(0.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(10.0, 0.0)));
    }

    #[test]
    fn step_beside_the_line_does_not_cross() {
        assert!(!segments_cross(pt(150.0, 40.0), pt(150.0, 60.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn step_on_one_side_does_not_cross() {
        assert!(!segments_cross(pt(10.0, 10.0), pt(10.0, 40.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn touching_the_line_is_not_a_crossing() {
        // ends exactly on the line
        assert!(!segments_cross(pt(10.0, 40.0), pt(10.0, 50.0), pt(0.0, 50.0), pt(100.0, 50.0)));
        // starts exactly on the line
        assert!(!segments_cross(pt(10.0, 50.0), pt(10.0, 60.0), pt(0.0, 50.0), pt(100.0, 50.0)));
        // passes through the line's endpoint
        assert!(!segments_cross(pt(0.0, 40.0), pt(0.0, 60.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn collinear_overlap_is_not_a_crossing() {
        assert!(!segments_cross(pt(20.0, 50.0), pt(80.0, 50.0), pt(0.0, 50.0), pt(100.0, 50.0)));
        assert!(!segments_cross(pt(-20.0, 50.0), pt(20.0, 50.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn stationary_point_never_crosses() {
        assert!(!segments_cross(pt(10.0, 40.0), pt(10.0, 40.0), pt(0.0, 50.0), pt(100.0, 50.0)));
    }

    #[test]
    fn orientation_sign() {
        assert!(orientation(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)) > 0.0);
        assert!(orientation(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, -1.0)) < 0.0);
        assert_eq!(orientation(pt(0.0, 0.0), pt(1.0, 0.0), pt(5.0, 0.0)), 0.0);
    }
}
