/// Static collision geometry for a room.
///
/// The obstacle set is an immutable ordered list of rectangles, fixed
/// at room load. Border walls are ordinary entries in the list, so the
/// world edge is enforced by the same overlap test as furniture — the
/// hard clamp to world bounds in the step is a second, independent net.

use super::geometry::{Rect, Vec2};

#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    rects: Vec<Rect>,
}

impl ObstacleSet {
    pub fn new(rects: Vec<Rect>) -> Self {
        ObstacleSet { rects }
    }

    /// Does the player bounding box (centered at `center`, given
    /// half-extents) overlap any obstacle? Short-circuits on the first
    /// hit; order affects only early exit, never the result.
    pub fn collides_at(&self, center: Vec2, half_w: f32, half_h: f32) -> bool {
        let body = Rect::from_center(center, half_w, half_h);
        self.rects.iter().any(|r| body.overlaps(r))
    }

    /// Does any obstacle contain this point? Inclusive on the top/left
    /// edge, exclusive on the bottom/right (half-open, so adjacent
    /// rectangles tile without double-claiming a pixel). Used by the
    /// presentation layer when sampling cells; the simulation only
    /// ever uses `collides_at`.
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.rects.iter().any(|r| {
            p.x >= r.x && p.x < r.right() && p.y >= r.y && p.y < r.bottom()
        })
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_block() -> ObstacleSet {
        ObstacleSet::new(vec![Rect::new(100.0, 100.0, 50.0, 50.0)])
    }

    #[test]
    fn collides_inside_block() {
        let set = single_block();
        assert!(set.collides_at(Vec2::new(125.0, 125.0), 10.0, 10.0));
    }

    #[test]
    fn clear_of_block() {
        let set = single_block();
        assert!(!set.collides_at(Vec2::new(300.0, 300.0), 10.0, 10.0));
    }

    #[test]
    fn touching_edge_is_clear() {
        let set = single_block();
        // Body right edge exactly at block's left edge (x = 100)
        assert!(!set.collides_at(Vec2::new(90.0, 125.0), 10.0, 10.0));
        // One pixel further in: overlap
        assert!(set.collides_at(Vec2::new(91.0, 125.0), 10.0, 10.0));
    }

    #[test]
    fn any_of_several_hits() {
        let set = ObstacleSet::new(vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(200.0, 200.0, 10.0, 10.0),
        ]);
        assert!(set.collides_at(Vec2::new(205.0, 205.0), 4.0, 4.0));
        assert!(!set.collides_at(Vec2::new(100.0, 100.0), 4.0, 4.0));
    }

    #[test]
    fn contains_point_is_half_open() {
        let set = single_block(); // (100, 100) to (150, 150)
        assert!(set.contains_point(Vec2::new(100.0, 100.0)));
        assert!(set.contains_point(Vec2::new(149.9, 149.9)));
        assert!(!set.contains_point(Vec2::new(150.0, 125.0)));
        assert!(!set.contains_point(Vec2::new(99.9, 125.0)));
    }

    #[test]
    fn empty_set_never_collides() {
        let set = ObstacleSet::default();
        assert!(!set.collides_at(Vec2::new(0.0, 0.0), 32.0, 32.0));
    }
}
