//! Slice geometry
//!
//! Every sliceable object is a circle. A cut is either a point (tap) or the
//! last segment of the drag trail, tested against that circle.

use glam::Vec2;

/// Closest point on segment `a`-`b` to `p` (projection clamped to the segment)
#[inline]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line_vec = b - a;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq == 0.0 {
        return a; // Degenerate segment
    }

    let t = ((p - a).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// True if `point` lies inside or on the circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// True if the segment touches the circle (tangent counts)
pub fn segment_intersects_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let closest = closest_point_on_segment(center, a, b);
    point_in_circle(closest, center, radius)
}
