//! Ellipses and elliptical sectors.
//!
//! Full ellipses are bounded in closed form: under a matrix with columns
//! `a`, `c` the world x extent is `hypot(a.x·rx, c.x·ry)` either side of the
//! centre (and likewise for y). Partial arcs are bounded by a candidate set:
//! both endpoints, the sector origin, and every angle where the world x or y
//! coordinate peaks that lies inside the arc. Without rotation the peaks are
//! the axis angles `{0, π/2, π, 3π/2}`.

use std::f32::consts::PI;

use super::{local_point, to_world};
use crate::config::SpatialConfig;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Circle, Style};
use crate::spatial::geom::{angle_in_arc, point_in_triangle};
use crate::spatial::hit::Shape;

impl Shape for Circle {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, config: &SpatialConfig) -> Option<Aabb> {
        let a = matrix.matrix2.x_axis * self.radius_x;
        let c = matrix.matrix2.y_axis * self.radius_y;

        if self.is_full(config.epsilon) {
            let half = Vec2::new(a.x.hypot(c.x), a.y.hypot(c.y));
            let centre = matrix.translation;
            return Some(Aabb::new(centre - half, centre + half));
        }

        let (start, end) = (self.start_angle, self.end_angle);
        let mut angles = vec![start, end];
        for (p, q) in [(a.x, c.x), (a.y, c.y)] {
            let peak = q.atan2(p);
            angles.extend(
                [peak, peak + PI]
                    .into_iter()
                    .filter(|&t| angle_in_arc(t, start, end, self.clockwise)),
            );
        }
        let local = angles
            .into_iter()
            .map(|t| self.point_at(t))
            .chain(std::iter::once(Vec2::ZERO));
        Aabb::from_points(to_world(matrix, local))
    }

    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        if self.radius_x.abs() <= config.epsilon || self.radius_y.abs() <= config.epsilon {
            return false;
        }
        let Some(local) = local_point(matrix, point, config) else {
            return false;
        };
        let unit = Vec2::new(local.x / self.radius_x, local.y / self.radius_y);
        if unit.length_squared() > 1.0 {
            return false;
        }
        if self.is_full(config.epsilon) {
            return true;
        }

        let angle = unit.y.atan2(unit.x);
        angle_in_arc(angle, self.start_angle, self.end_angle, self.clockwise)
            || point_in_triangle(
                local,
                Vec2::ZERO,
                self.point_at(self.start_angle),
                self.point_at(self.end_angle),
            )
    }
}
