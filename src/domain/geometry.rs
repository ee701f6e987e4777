/// Axis-aligned geometry primitives for the world.
/// All coordinates are world-space pixels, top-left origin.

/// A 2D point or vector in world pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle. Invariant: `w > 0`, `h > 0` after room
/// validation; construction itself does not check.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle centered at `center` with the given half-extents.
    pub fn from_center(center: Vec2, half_w: f32, half_h: f32) -> Self {
        Rect {
            x: center.x - half_w,
            y: center.y - half_h,
            w: half_w * 2.0,
            h: half_h * 2.0,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict-inequality AABB overlap: rectangles that merely touch
    /// along an edge do NOT overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.x
            && self.x < other.right()
            && self.bottom() > other.y
            && self.y < other.bottom()
    }
}

/// Clamp `v` into `[lo, hi]`.
///
/// When `lo > hi` the result is `lo` (min applied first, max last).
/// Callers that can legitimately hit the inverted case — the camera
/// when the viewport exceeds the world — must center instead of
/// calling this (see `Camera::follow`).
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_basic() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn overlap_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn edge_touching_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Shares the x=10 edge exactly
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        // Shares the y=10 edge exactly
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn contained_rect_overlaps() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 10.0, 10.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn from_center_extents() {
        let r = Rect::from_center(Vec2::new(50.0, 30.0), 8.0, 4.0);
        assert_eq!(r.x, 42.0);
        assert_eq!(r.y, 26.0);
        assert_eq!(r.right(), 58.0);
        assert_eq!(r.bottom(), 34.0);
    }

    #[test]
    fn clamp_in_range() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(12.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn clamp_inverted_bounds_yields_lo() {
        // viewport > world case: lo wins, no NaN, no panic
        assert_eq!(clamp(5.0, 10.0, 0.0), 10.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }
}
