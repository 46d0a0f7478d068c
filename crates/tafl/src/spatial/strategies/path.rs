//! Paths are flattened to polylines before anything else happens.
//!
//! A compiled path reuses its stored high-resolution flattening; an
//! uncompiled one is flattened at the configured sample rate on every call.
//! Filled paths use the non-zero winding rule either way, so the two forms
//! agree up to sampling error. Open paths are strokes: a compiled path is hit
//! within half the line width of its centreline, an uncompiled one within the
//! full line width.

use std::borrow::Cow;

use super::to_world;
use crate::config::SpatialConfig;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Path, Style};
use crate::spatial::geom::{self, Subpath, distance_to_polyline, winding_number};
use crate::spatial::hit::Shape;

fn local_subpaths<'a>(path: &'a Path, config: &SpatialConfig) -> Cow<'a, [Subpath]> {
    match path.compiled_form() {
        Some(compiled) => Cow::Borrowed(&compiled.subpaths),
        None => Cow::Owned(geom::flatten(path.commands(), config.samples(), config.epsilon)),
    }
}

fn world_subpaths(subpaths: &[Subpath], matrix: &Affine2) -> Vec<Subpath> {
    subpaths
        .iter()
        .map(|s| Subpath {
            points: to_world(matrix, s.points.iter().copied()),
            closed: s.closed,
        })
        .collect()
}

impl Shape for Path {
    fn style(&self) -> &Style {
        &self.style
    }

    fn world_aabb(&self, matrix: &Affine2, config: &SpatialConfig) -> Option<Aabb> {
        let subpaths = local_subpaths(self, config);
        Aabb::from_points(to_world(
            matrix,
            subpaths.iter().flat_map(|s| s.points.iter().copied()),
        ))
    }

    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool {
        let world = world_subpaths(&local_subpaths(self, config), matrix);
        let eps = config.epsilon;
        let compiled = self.compiled_form().is_some();

        if self.is_closed() {
            return world.iter().map(|s| winding_number(point, &s.points)).sum::<i32>() != 0;
        }
        let reach = if compiled {
            self.style.line_width / 2.0
        } else {
            self.style.line_width
        };
        world
            .iter()
            .any(|s| distance_to_polyline(point, &s.points, s.closed, eps) <= reach.max(eps))
    }
}
