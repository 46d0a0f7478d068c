//! # Geometry Primitives
//!
//! Point/segment/polygon predicates, angle arithmetic, and curve sampling
//! shared by the hit-test strategies. Nothing here panics or divides by zero
//! on degenerate input: zero-length segments collapse to point distances and
//! empty inputs resolve to "no hit".
//!
//! ## Angles
//!
//! Angles are radians. An arc runs from `start` to `end`; with `clockwise`
//! set it sweeps through *decreasing* angles, otherwise increasing ones.
//!
//! ```text
//! ccw:  angle ∈ arc  ⇔  (angle − start) mod 2π ≤ (end − start) mod 2π
//! cw:   angle ∈ arc  ⇔  (start − angle) mod 2π ≤ (start − end) mod 2π
//! ```

use std::f32::consts::{PI, TAU};

use crate::math::{Mat2, Vec2};
use crate::shapes::PathCommand;

// ── Angles ───────────────────────────────────────────────────────────

/// Wrap into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

pub fn angle_in_arc(angle: f32, start: f32, end: f32, clockwise: bool) -> bool {
    if clockwise {
        normalize_angle(start - angle) <= normalize_angle(start - end)
    } else {
        normalize_angle(angle - start) <= normalize_angle(end - start)
    }
}

/// Whether the arc covers the whole turn.
pub fn is_full_turn(start: f32, end: f32, epsilon: f32) -> bool {
    (end - start).abs() >= TAU - epsilon
}

/// Signed sweep from `start` to `end`, clamped to one full turn.
pub fn arc_sweep(start: f32, end: f32, clockwise: bool) -> f32 {
    if clockwise {
        if start - end >= TAU {
            -TAU
        } else {
            -normalize_angle(start - end)
        }
    } else if end - start >= TAU {
        TAU
    } else {
        normalize_angle(end - start)
    }
}

// ── Points and segments ─────────────────────────────────────────────

pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2, epsilon: f32) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= epsilon * epsilon {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Smallest distance from `point` to any edge of the polyline.
/// `f32::INFINITY` for an empty polyline.
pub fn distance_to_polyline(point: Vec2, points: &[Vec2], closed: bool, epsilon: f32) -> f32 {
    match points {
        [] => f32::INFINITY,
        [only] => point.distance(*only),
        _ => {
            let open = points
                .windows(2)
                .map(|w| distance_to_segment(point, w[0], w[1], epsilon))
                .fold(f32::INFINITY, f32::min);
            if closed {
                let (first, last) = (points[0], points[points.len() - 1]);
                open.min(distance_to_segment(point, last, first, epsilon))
            } else {
                open
            }
        }
    }
}

/// Even-odd ray cast. The polygon closes implicitly.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x = pi.x + (point.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Signed crossing count around `point`. Non-zero means inside under the
/// non-zero fill rule.
pub fn winding_number(point: Vec2, polygon: &[Vec2]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }
    let mut winding = 0;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let side = (b - a).perp_dot(point - a);
        if a.y <= point.y {
            if b.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Inclusive test; a degenerate triangle contains nothing but its edges.
pub fn point_in_triangle(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(point - a);
    let d2 = (c - b).perp_dot(point - b);
    let d3 = (a - c).perp_dot(point - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

// ── Curves ───────────────────────────────────────────────────────────

pub fn quadratic_point(p0: Vec2, ctrl: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + ctrl * (2.0 * u * t) + p1 * (t * t)
}

pub fn cubic_point(p0: Vec2, c1: Vec2, c2: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p1 * (t * t * t)
}

/// `steps + 1` points from `t = 0` to `t = 1` inclusive.
pub fn sample(steps: usize, f: impl Fn(f32) -> Vec2) -> Vec<Vec2> {
    let steps = steps.max(1);
    (0..=steps).map(|i| f(i as f32 / steps as f32)).collect()
}

/// Point at parametric `angle` on an ellipse rotated by `rotation`.
pub fn ellipse_point(center: Vec2, radii: Vec2, rotation: f32, angle: f32) -> Vec2 {
    let local = Vec2::new(radii.x * angle.cos(), radii.y * angle.sin());
    center + Mat2::from_angle(rotation) * local
}

// ── Paths ────────────────────────────────────────────────────────────

/// One flattened run of a path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subpath {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// A path flattened to polylines in local space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledPath {
    pub subpaths: Vec<Subpath>,
}

impl CompiledPath {
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.subpaths.iter().flat_map(|s| s.points.iter().copied())
    }
}

#[derive(Default)]
struct Flattener {
    done: Vec<Subpath>,
    current: Option<Subpath>,
    /// Where drawing resumes after a close.
    resume: Option<Vec2>,
}

impl Flattener {
    fn last_point(&self) -> Option<Vec2> {
        self.current
            .as_ref()
            .and_then(|s| s.points.last().copied())
            .or(self.resume)
    }

    fn move_to(&mut self, p: Vec2) {
        self.finish();
        self.current = Some(Subpath {
            points: vec![p],
            closed: false,
        });
    }

    /// Start a subpath at `p` unless one is already open.
    fn ensure(&mut self, p: Vec2) {
        if self.current.is_none() {
            let start = self.resume.take().unwrap_or(p);
            self.move_to(start);
        }
    }

    fn line_to(&mut self, p: Vec2) {
        if self.current.is_none() {
            match self.resume {
                Some(_) => self.ensure(p),
                None => {
                    self.move_to(p);
                    return;
                }
            }
        }
        if let Some(current) = self.current.as_mut() {
            current.points.push(p);
        }
    }

    fn extend(&mut self, points: impl IntoIterator<Item = Vec2>) {
        if let Some(current) = self.current.as_mut() {
            current.points.extend(points);
        }
    }

    fn close(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.closed = true;
            self.resume = current.points.first().copied();
            self.done.push(current);
        }
    }

    fn finish(&mut self) {
        if let Some(current) = self.current.take() {
            self.done.push(current);
        }
        self.resume = None;
    }

    fn arc(&mut self, center: Vec2, radii: Vec2, rotation: f32, start: f32, sweep: f32, steps: usize) {
        let first = ellipse_point(center, radii, rotation, start);
        self.line_to(first);
        let points = sample(steps, |t| ellipse_point(center, radii, rotation, start + sweep * t));
        self.extend(points.into_iter().skip(1));
    }
}

/// Flatten `commands` into polylines, `steps` segments per curved command.
///
/// Follows the 2D canvas path model: a drawing command with no current point
/// starts a subpath, arcs draw a connecting line from the current point to
/// their start, and `arc_to` ends at its second tangent point.
pub fn flatten(commands: &[PathCommand], steps: usize, epsilon: f32) -> Vec<Subpath> {
    let mut f = Flattener::default();
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => f.move_to(p),
            PathCommand::LineTo(p) => f.line_to(p),
            PathCommand::QuadraticTo { ctrl, to } => {
                f.ensure(ctrl);
                let Some(from) = f.last_point() else { continue };
                f.extend(sample(steps, |t| quadratic_point(from, ctrl, to, t)).into_iter().skip(1));
            }
            PathCommand::BezierTo { ctrl1, ctrl2, to } => {
                f.ensure(ctrl1);
                let Some(from) = f.last_point() else { continue };
                f.extend(
                    sample(steps, |t| cubic_point(from, ctrl1, ctrl2, to, t))
                        .into_iter()
                        .skip(1),
                );
            }
            PathCommand::Arc {
                center,
                radius,
                start,
                end,
                clockwise,
            } => {
                let sweep = arc_sweep(start, end, clockwise);
                f.arc(center, Vec2::splat(radius), 0.0, start, sweep, steps);
            }
            PathCommand::Ellipse {
                center,
                radii,
                rotation,
                start,
                end,
                clockwise,
            } => {
                let sweep = arc_sweep(start, end, clockwise);
                f.arc(center, radii, rotation, start, sweep, steps);
            }
            PathCommand::ArcTo { ctrl, to, radius } => {
                f.ensure(ctrl);
                let Some(from) = f.last_point() else { continue };
                match arc_to_geometry(from, ctrl, to, radius, epsilon) {
                    Some(ArcToGeometry {
                        center,
                        radius,
                        start,
                        sweep,
                    }) => f.arc(center, Vec2::splat(radius), 0.0, start, sweep, steps),
                    None => f.line_to(ctrl),
                }
            }
            PathCommand::Close => f.close(),
        }
    }
    f.finish();
    f.done
}

struct ArcToGeometry {
    center: Vec2,
    radius: f32,
    start: f32,
    sweep: f32,
}

/// The circle of `radius` tangent to `p0→p1` and `p1→p2`, or `None` when the
/// corner is degenerate and `arc_to` reduces to a straight line.
fn arc_to_geometry(p0: Vec2, p1: Vec2, p2: Vec2, radius: f32, epsilon: f32) -> Option<ArcToGeometry> {
    if radius <= epsilon {
        return None;
    }
    let v1 = (p0 - p1).try_normalize()?;
    let v2 = (p2 - p1).try_normalize()?;
    let cos = v1.dot(v2).clamp(-1.0, 1.0);
    let theta = cos.acos();
    if theta <= epsilon || (PI - theta) <= epsilon {
        return None;
    }
    let tangent = radius / (theta / 2.0).tan();
    let t1 = p1 + v1 * tangent;
    let t2 = p1 + v2 * tangent;
    let bisector = (v1 + v2).try_normalize()?;
    let center = p1 + bisector * (radius / (theta / 2.0).sin());

    let (d1, d2) = (t1 - center, t2 - center);
    let start = d1.y.atan2(d1.x);
    let end = d2.y.atan2(d2.x);
    let mut sweep = end - start;
    if sweep > PI {
        sweep -= TAU;
    } else if sweep < -PI {
        sweep += TAU;
    }
    Some(ArcToGeometry {
        center,
        radius,
        start,
        sweep,
    })
}
