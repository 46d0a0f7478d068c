//! Bézier curves reduce to their samples: bounds are the bounds of the
//! sampled points, and a hit is any sample within the line width.

use super::to_world;
use crate::config::SpatialConfig;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Curve, Style};
use crate::spatial::hit::Shape;

impl Shape for Curve {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, config: &SpatialConfig) -> Option<Aabb> {
        Aabb::from_points(to_world(matrix, self.sample(config.samples())))
    }

    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        let reach = self.style.line_width.max(config.epsilon);
        to_world(matrix, self.sample(config.samples()))
            .into_iter()
            .any(|p| p.distance(point) <= reach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch() -> Curve {
        Curve::quadratic(Vec2::ZERO, Vec2::new(15.0, 30.0), Vec2::new(30.0, 0.0))
    }

    #[test]
    fn bounds_stay_inside_control_hull() {
        let aabb = arch().world_aabb(&Affine2::IDENTITY, &SpatialConfig::default()).unwrap();
        assert_eq!(aabb.min, Vec2::ZERO);
        assert_eq!(aabb.max.x, 30.0);
        // The apex of a symmetric quadratic is half the control height.
        assert!((aabb.max.y - 15.0).abs() < 1e-3);
    }

    #[test]
    fn hit_within_line_width() {
        let curve = arch().with_line_width(2.0);
        let m = Affine2::IDENTITY;
        let cfg = SpatialConfig::default();
        assert!(curve.contains(&m, Vec2::new(15.0, 14.0), &cfg));
        assert!(!curve.contains(&m, Vec2::new(15.0, 10.0), &cfg));
        assert!(!curve.contains(&m, Vec2::new(15.0, 30.0), &cfg));
    }

    #[test]
    fn cubic_under_translation() {
        let curve = Curve::cubic(
            Vec2::ZERO,
            Vec2::new(0.0, 20.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(20.0, 0.0),
        )
        .with_line_width(1.5);
        let m = Affine2::from_translation(Vec2::new(100.0, 100.0));
        let cfg = SpatialConfig::default();
        // t = 0.5 lands on (10, 15).
        assert!(curve.contains(&m, Vec2::new(110.0, 115.0), &cfg));
        assert!(!curve.contains(&m, Vec2::new(10.0, 15.0), &cfg));
    }
}
