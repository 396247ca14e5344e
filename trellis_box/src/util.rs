// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Returns whether `point` lies within `rect`, edges included.
///
/// Edge inclusion matters for hit testing: a pointer exactly on a box edge is
/// treated as inside, and two boxes sharing an edge both contain points on it.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Returns whether two rectangles overlap, edges included.
///
/// Rectangles that share (part of) an edge are considered to intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_includes_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains(r, Point::new(0.0, 0.0)));
        assert!(rect_contains(r, Point::new(10.0, 10.0)));
        assert!(rect_contains(r, Point::new(5.0, 5.0)));
        assert!(!rect_contains(r, Point::new(10.1, 5.0)));
        assert!(!rect_contains(r, Point::new(-0.1, 5.0)));
    }

    #[test]
    fn intersect_includes_shared_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        let c = Rect::new(10.5, 0.0, 20.0, 10.0);
        assert!(rects_intersect(a, b));
        assert!(!rects_intersect(a, c));
        assert!(rects_intersect(a, a));
    }
}
