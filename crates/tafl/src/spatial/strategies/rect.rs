//! Rectangles and images: four transformed corners for bounds, an inverse
//! mapped box test (with rounded-corner cut-outs) for hits.

use super::{local_point, to_world};
use crate::config::SpatialConfig;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Image, Rect, Style};
use crate::spatial::hit::Shape;

fn box_aabb(matrix: &Affine2, size: Vec2) -> Option<Aabb> {
    let corners = [
        Vec2::ZERO,
        Vec2::new(size.x, 0.0),
        size,
        Vec2::new(0.0, size.y),
    ];
    Aabb::from_points(to_world(matrix, corners))
}

fn box_contains(matrix: &Affine2, point: Vec2, size: Vec2, radius: f32, config: &SpatialConfig) -> bool {
    let Some(local) = local_point(matrix, point, config) else {
        return false;
    };
    let (min, max) = (Vec2::ZERO.min(size), Vec2::ZERO.max(size));
    if local.x < min.x || local.x > max.x || local.y < min.y || local.y > max.y {
        return false;
    }

    let r = radius.min(size.x.abs() / 2.0).min(size.y.abs() / 2.0);
    if r <= config.epsilon {
        return true;
    }
    // Inside a corner square the point must fall within that corner's
    // circle; elsewhere the clamp lands within `r` of it anyway.
    let centre = Vec2::new(
        local.x.clamp(min.x + r, max.x - r),
        local.y.clamp(min.y + r, max.y - r),
    );
    local.distance(centre) <= r
}

impl Shape for Rect {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, _config: &SpatialConfig) -> Option<Aabb> {
        box_aabb(matrix, Vec2::new(self.width, self.height))
    }

    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        box_contains(matrix, point, Vec2::new(self.width, self.height), self.radius, config)
    }
}

impl Shape for Image {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, _config: &SpatialConfig) -> Option<Aabb> {
        box_aabb(matrix, Vec2::new(self.width, self.height))
    }

    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        box_contains(matrix, point, Vec2::new(self.width, self.height), 0.0, config)
    }
}
