//! Hitbox geometry
//!
//! A hitbox is an axis-aligned rectangle or an ellipse inscribed in its
//! bounding box. Positions are top-left corners in panel space (y grows down).
//!
//! Intersection is shape-vs-bounds: a hitbox intersects another if it overlaps
//! the other's bounding rectangle. Touching edges do not count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Sides of a rectangle a point lies outside of
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outcode: u8 {
        const LEFT   = 1 << 0;
        const TOP    = 1 << 1;
        const RIGHT  = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Outcode {
    /// Exactly one of TOP/BOTTOM is set
    pub fn vertical_only_one(self) -> bool {
        self.contains(Outcode::TOP) != self.contains(Outcode::BOTTOM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Rect,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub shape: Shape,
    /// Top-left corner of the bounding box
    pub pos: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub fn rect(pos: Vec2, size: Vec2) -> Self {
        Self::new(Shape::Rect, pos, size)
    }

    pub fn ellipse(pos: Vec2, size: Vec2) -> Self {
        Self::new(Shape::Ellipse, pos, size)
    }

    /// Sizes are clamped to be non-negative; non-finite input collapses to zero.
    pub fn new(shape: Shape, pos: Vec2, size: Vec2) -> Self {
        let pos = if pos.is_finite() { pos } else { Vec2::ZERO };
        let size = if size.is_finite() {
            size.max(Vec2::ZERO)
        } else {
            Vec2::ZERO
        };
        Self { shape, pos, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bounding rectangle
    pub fn bounds(&self) -> Hitbox {
        Hitbox::rect(self.pos, self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }

    /// Does this shape overlap `other`'s bounding rectangle?
    pub fn intersects(&self, other: &Hitbox) -> bool {
        self.intersects_rect(other.pos, other.size)
    }

    /// Does this shape overlap the rectangle at `pos` with `size`?
    pub fn intersects_rect(&self, pos: Vec2, size: Vec2) -> bool {
        if self.is_empty() || size.x <= 0.0 || size.y <= 0.0 {
            return false;
        }
        match self.shape {
            Shape::Rect => {
                let min = self.min();
                let max = self.max();
                pos.x + size.x > min.x
                    && pos.y + size.y > min.y
                    && pos.x < max.x
                    && pos.y < max.y
            }
            Shape::Ellipse => {
                // Nearest point of the rectangle in unit-ellipse space
                let n0 = (pos - self.pos) / self.size - Vec2::splat(0.5);
                let n1 = n0 + size / self.size;
                let near = Vec2::new(nearest_to_zero(n0.x, n1.x), nearest_to_zero(n0.y, n1.y));
                near.length_squared() < 0.25
            }
        }
    }

    /// Which sides of this box's bounds `point` lies outside of
    pub fn outcode(&self, point: Vec2) -> Outcode {
        let mut out = Outcode::empty();
        let max = self.max();

        if self.size.x <= 0.0 {
            out |= Outcode::LEFT | Outcode::RIGHT;
        } else if point.x < self.pos.x {
            out |= Outcode::LEFT;
        } else if point.x > max.x {
            out |= Outcode::RIGHT;
        }

        if self.size.y <= 0.0 {
            out |= Outcode::TOP | Outcode::BOTTOM;
        } else if point.y < self.pos.y {
            out |= Outcode::TOP;
        } else if point.y > max.y {
            out |= Outcode::BOTTOM;
        }

        out
    }

    /// Overlap depth of the two bounding boxes per axis (zero when apart)
    pub fn penetration(&self, other: &Hitbox) -> Vec2 {
        let overlap_min = self.min().max(other.min());
        let overlap_max = self.max().min(other.max());
        (overlap_max - overlap_min).max(Vec2::ZERO)
    }
}

/// Closest value to zero within `[lo, hi]`
#[inline]
fn nearest_to_zero(lo: f32, hi: f32) -> f32 {
    if lo > 0.0 {
        lo
    } else if hi < 0.0 {
        hi
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Hitbox {
        Hitbox::rect(Vec2::new(x, y), Vec2::new(w, h))
    }

    fn circle(x: f32, y: f32, d: f32) -> Hitbox {
        Hitbox::ellipse(Vec2::new(x, y), Vec2::splat(d))
    }

    #[test]
    fn test_rect_overlap() {
        assert!(rect(0.0, 0.0, 10.0, 10.0).intersects(&rect(5.0, 5.0, 10.0, 10.0)));
        assert!(!rect(0.0, 0.0, 10.0, 10.0).intersects(&rect(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        assert!(!rect(0.0, 0.0, 10.0, 10.0).intersects(&rect(10.0, 0.0, 10.0, 10.0)));
        assert!(!circle(0.0, 0.0, 10.0).intersects(&rect(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_ellipse_misses_bounding_corner() {
        // Rect sits in the bounding-box corner, outside the circle itself
        let c = circle(0.0, 0.0, 20.0);
        let corner = rect(-2.0, -2.0, 3.0, 3.0);
        assert!(c.bounds().intersects(&corner));
        assert!(!c.intersects(&corner));
    }

    #[test]
    fn test_ellipse_hits_edge() {
        let c = circle(0.0, 0.0, 20.0);
        assert!(c.intersects(&rect(9.0, -1.0, 2.0, 2.0)));
        assert!(c.intersects(&rect(-5.0, 8.0, 30.0, 30.0)));
    }

    #[test]
    fn test_empty_never_intersects() {
        let empty = rect(0.0, 0.0, 0.0, 10.0);
        assert!(!empty.intersects(&rect(0.0, 0.0, 10.0, 10.0)));
        assert!(!rect(0.0, 0.0, 10.0, 10.0).intersects(&empty));
    }

    #[test]
    fn test_outcode() {
        let r = rect(10.0, 10.0, 10.0, 10.0);
        assert_eq!(r.outcode(Vec2::new(15.0, 15.0)), Outcode::empty());
        assert_eq!(r.outcode(Vec2::new(5.0, 15.0)), Outcode::LEFT);
        assert_eq!(r.outcode(Vec2::new(25.0, 25.0)), Outcode::RIGHT | Outcode::BOTTOM);
        assert_eq!(r.outcode(Vec2::new(15.0, 5.0)), Outcode::TOP);
        // On the edge counts as inside
        assert_eq!(r.outcode(Vec2::new(20.0, 10.0)), Outcode::empty());
    }

    #[test]
    fn test_vertical_only_one() {
        assert!(Outcode::TOP.vertical_only_one());
        assert!((Outcode::BOTTOM | Outcode::LEFT).vertical_only_one());
        assert!(!(Outcode::TOP | Outcode::BOTTOM).vertical_only_one());
        assert!(!Outcode::RIGHT.vertical_only_one());
    }

    #[test]
    fn test_sanitizes_input() {
        let h = Hitbox::rect(Vec2::new(f32::NAN, 1.0), Vec2::new(-5.0, 3.0));
        assert_eq!(h.pos, Vec2::ZERO);
        assert_eq!(h.size, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_penetration() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(8.0, 5.0, 10.0, 10.0);
        assert_eq!(a.penetration(&b), Vec2::new(2.0, 5.0));
        assert_eq!(a.penetration(&rect(50.0, 50.0, 1.0, 1.0)), Vec2::ZERO);
    }
}
