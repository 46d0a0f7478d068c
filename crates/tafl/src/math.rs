//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Affine2`] is the 2×3 affine matrix used for every
//! local and world transform; [`Aabb`] is the world-space bounding box.

pub use glam::{Affine2, Mat2, Vec2};

/// An axis-aligned bounding box. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box spanning two corners given in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Convenience for `[min_x, min_y, max_x, max_y]`.
    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
    }

    /// Tightest box around `points`, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |aabb, p| Self {
            min: aabb.min.min(p),
            max: aabb.max.max(p),
        }))
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Union where either side may be absent.
    pub fn union_opt(a: Option<Aabb>, b: Option<Aabb>) -> Option<Aabb> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// `[min_x, min_y, max_x, max_y]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// Inverse of `m`, or `None` when it collapses the plane (zero scale).
pub fn try_inverse(m: &Affine2, epsilon: f32) -> Option<Affine2> {
    let det = m.matrix2.determinant();
    if !det.is_finite() || det.abs() <= epsilon {
        return None;
    }
    Some(m.inverse())
}

/// Map a world-space point into `m`'s local space.
pub fn to_local(m: &Affine2, point: Vec2, epsilon: f32) -> Option<Vec2> {
    try_inverse(m, epsilon).map(|inv| inv.transform_point2(point))
}
