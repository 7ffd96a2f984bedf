//! Geometry helpers for edge paths and hit testing

use egui::{Pos2, Rect};

/// Calculates a point on a cubic Bézier curve at parameter t (0.0 to 1.0).
pub fn cubic_bezier_point(t: f32, p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2) -> Pos2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;

    Pos2::new(
        mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x,
        mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y,
    )
}

/// Flattens a cubic Bézier curve into `segments` line segments
pub fn flatten_cubic_bezier(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| cubic_bezier_point(i as f32 / segments as f32, p0, p1, p2, p3))
        .collect()
}

fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(a: Pos2, b: Pos2, p: Pos2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Returns true if segment `a1-a2` touches or crosses segment `b1-b2`
pub fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear and touching cases
    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Returns true if any segment of the polyline crosses segment `p1-p2`
pub fn polyline_intersects_segment(points: &[Pos2], p1: Pos2, p2: Pos2) -> bool {
    points
        .windows(2)
        .any(|pair| segments_intersect(pair[0], pair[1], p1, p2))
}

/// Returns true if segment `a-b` lies inside or crosses the rectangle
pub fn segment_intersects_rect(a: Pos2, b: Pos2, rect: Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
}

/// Returns true if any part of the polyline lies inside or crosses the rectangle
pub fn polyline_intersects_rect(points: &[Pos2], rect: Rect) -> bool {
    match points {
        [] => false,
        [single] => rect.contains(*single),
        _ => points
            .windows(2)
            .any(|pair| segment_intersects_rect(pair[0], pair[1], rect)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints() {
        let p0 = Pos2::new(0.0, 0.0);
        let p3 = Pos2::new(100.0, 50.0);
        let start = cubic_bezier_point(0.0, p0, Pos2::new(50.0, 0.0), Pos2::new(50.0, 50.0), p3);
        let end = cubic_bezier_point(1.0, p0, Pos2::new(50.0, 0.0), Pos2::new(50.0, 50.0), p3);
        assert_eq!(start, p0);
        assert_eq!(end, p3);
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(
            Pos2::new(0.0, 0.0),
            Pos2::new(10.0, 10.0),
            Pos2::new(0.0, 10.0),
            Pos2::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Pos2::new(0.0, 0.0),
            Pos2::new(10.0, 0.0),
            Pos2::new(0.0, 5.0),
            Pos2::new(10.0, 5.0),
        ));
    }

    #[test]
    fn test_segment_rect() {
        let rect = Rect::from_min_max(Pos2::new(10.0, 10.0), Pos2::new(20.0, 20.0));
        // Passes straight through without an endpoint inside
        assert!(segment_intersects_rect(Pos2::new(0.0, 15.0), Pos2::new(30.0, 15.0), rect));
        assert!(!segment_intersects_rect(Pos2::new(0.0, 0.0), Pos2::new(30.0, 0.0), rect));
    }
}
