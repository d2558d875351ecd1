//! Integer pixel geometry shared by the element store, the texture cache and
//! the renderers.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in whole pixels.
///
/// `x`/`y` is the top-left corner. Width and height may be zero or negative
/// for degenerate rects; such rects are treated as empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rect from absolute corner coordinates `[x0, y0, x1, y1]`.
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Center point, using integer halving of the size.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Build a rect of the given size centered on `(cx, cy)`.
    pub fn centered_at(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Self {
            x: cx - w / 2,
            y: cy - h / 2,
            w,
            h,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Half-open containment test: the right and bottom edges are outside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersection of two rects, or `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::new(x, y, right - x, bottom - y);
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }
}

/// Rotate an offset vector by `degrees` (clockwise on a y-down screen).
pub fn rotate_offset(x: f32, y: f32, degrees: f32) -> (f32, f32) {
    if degrees == 0.0 {
        return (x, y);
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_from_corners() {
        let r = Rect::from_corners(10, 20, 110, 70);
        assert_eq!(r, Rect::new(10, 20, 100, 50));
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
    }

    #[test]
    fn test_center_and_centered_at() {
        let r = Rect::new(0, 0, 101, 51);
        assert_eq!(r.center(), (50, 25));
        assert_eq!(Rect::centered_at(50, 50, 20, 10), Rect::new(40, 45, 20, 10));
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(0, 0));
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 5));
        assert!(!r.contains(5, 10));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 25, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 25, 50, 75)));

        // Touching edges do not overlap
        let c = Rect::new(100, 0, 10, 10);
        assert_eq!(a.intersect(&c), None);

        // Empty rects never intersect
        assert_eq!(a.intersect(&Rect::new(10, 10, 0, 5)), None);
    }

    #[test]
    fn test_rotate_offset() {
        let (x, y) = rotate_offset(10.0, 0.0, 90.0);
        assert!(approx_eq(x, 0.0));
        assert!(approx_eq(y, 10.0));

        let (x, y) = rotate_offset(3.0, 4.0, 0.0);
        assert_eq!((x, y), (3.0, 4.0));
    }
}
