use super::to_world;
use crate::config::SpatialConfig;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Polyline, Style};
use crate::spatial::geom::{distance_to_polyline, point_in_polygon};
use crate::spatial::hit::Shape;

impl Shape for Polyline {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, _config: &SpatialConfig) -> Option<Aabb> {
        Aabb::from_points(to_world(matrix, self.points.iter().copied()))
    }

    /// Closed: ray-cast containment. Open: within `polyline_tolerance` of an
    /// edge. Both in world space, so the tolerance ignores scale.
    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        let world = to_world(matrix, self.points.iter().copied());
        if self.closed {
            point_in_polygon(point, &world)
        } else {
            distance_to_polyline(point, &world, false, config.epsilon) <= config.polyline_tolerance
        }
    }
}
