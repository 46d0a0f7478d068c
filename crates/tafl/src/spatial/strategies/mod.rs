//! [`Shape`](super::hit::Shape) implementations for the built-in renderables.

mod circle;
mod curve;
mod path;
mod polyline;
mod rect;

use crate::config::SpatialConfig;
use crate::math::{self, Affine2, Vec2};

/// `point` in the local space of `matrix`, or `None` if the matrix is
/// singular (a zero scale), in which case nothing under it can be hit.
pub(crate) fn local_point(matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> Option<Vec2> {
    let local = math::to_local(matrix, point, config.epsilon);
    if local.is_none() {
        log::warn!(
            "world matrix {:?} is not invertible; ({}, {}) cannot be hit-tested",
            matrix,
            point.x,
            point.y
        );
    }
    local
}

pub(crate) fn to_world(matrix: &Affine2, points: impl IntoIterator<Item = Vec2>) -> Vec<Vec2> {
    points
        .into_iter()
        .map(|p| matrix.transform_point2(p))
        .collect()
}
