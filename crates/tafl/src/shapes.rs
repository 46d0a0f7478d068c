//! # Shapes — Renderable Components
//!
//! Each type here occupies an entity's single renderable slot: adding a
//! `Circle` to an entity that holds a `Rect` evicts the rect. Geometry is in
//! local space with the origin at the entity's transform origin.
//!
//! ```text
//! Rect / Image   (0,0) ──────── (w,0)       Circle   centred on (0,0)
//!                  │              │                   radii (rx, ry)
//!                (0,h) ──────── (w,h)
//! ```
//!
//! Every shape carries a [`Style`]. The presentation layer reads it to draw;
//! hit testing only looks at [`Style::render`]: hidden shapes cannot be
//! picked.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::spatial::geom::{self, CompiledPath};

/// Segments per curved command when a path is compiled.
pub const COMPILED_PATH_SEGMENTS: usize = 64;

/// Linear RGBA, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Visual parameters shared by every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Visibility. Hidden shapes are neither drawn nor picked.
    pub render: bool,
    pub alpha: f32,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    /// Stroke width; also the hit distance for curves and open paths.
    pub line_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            render: true,
            alpha: 1.0,
            fill: Some(Color::BLACK),
            stroke: None,
            line_width: 1.0,
        }
    }
}

impl Style {
    pub fn hidden() -> Self {
        Self {
            render: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub width: f32,
    pub height: f32,
    /// Corner radius, clamped to half the shorter side.
    pub radius: f32,
    #[serde(default)]
    pub style: Style,
}

impl Rect {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            radius: 0.0,
            style: Style::default(),
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

/// An ellipse, or an elliptical sector when the angles cover less than a
/// full turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius_x: f32,
    pub radius_y: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    /// Sweep from `start_angle` through decreasing angles.
    pub clockwise: bool,
    #[serde(default)]
    pub style: Style,
}

impl Circle {
    pub fn new(radius: f32) -> Self {
        Self::ellipse(radius, radius)
    }

    pub fn ellipse(radius_x: f32, radius_y: f32) -> Self {
        Self {
            radius_x,
            radius_y,
            start_angle: 0.0,
            end_angle: TAU,
            clockwise: false,
            style: Style::default(),
        }
    }

    pub fn with_arc(mut self, start: f32, end: f32, clockwise: bool) -> Self {
        self.start_angle = start;
        self.end_angle = end;
        self.clockwise = clockwise;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn is_full(&self, epsilon: f32) -> bool {
        geom::is_full_turn(self.start_angle, self.end_angle, epsilon)
    }

    /// Local point at parametric `angle`.
    pub fn point_at(&self, angle: f32) -> Vec2 {
        Vec2::new(self.radius_x * angle.cos(), self.radius_y * angle.sin())
    }
}

/// A bitmap drawn into `width × height`. Loading the pixels is up to the
/// presentation layer; `source` is an opaque reference for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: f32,
    pub height: f32,
    pub source: String,
    #[serde(default)]
    pub style: Style,
}

impl Image {
    pub fn new(source: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            source: source.into(),
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    /// Closed polylines are polygons and hit on their interior.
    pub closed: bool,
    #[serde(default)]
    pub style: Style,
}

impl Polyline {
    pub fn open(points: Vec<Vec2>) -> Self {
        Self {
            points,
            closed: false,
            style: Style::default(),
        }
    }

    pub fn closed(points: Vec<Vec2>) -> Self {
        Self {
            closed: true,
            ..Self::open(points)
        }
    }
}

/// A quadratic Bézier, or a cubic one when `control2` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Option<Vec2>,
    pub end: Vec2,
    #[serde(default)]
    pub style: Style,
}

impl Curve {
    pub fn quadratic(start: Vec2, control: Vec2, end: Vec2) -> Self {
        Self {
            start,
            control1: control,
            control2: None,
            end,
            style: Style::default(),
        }
    }

    pub fn cubic(start: Vec2, control1: Vec2, control2: Vec2, end: Vec2) -> Self {
        Self {
            control2: Some(control2),
            ..Self::quadratic(start, control1, end)
        }
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.style.line_width = width;
        self
    }

    pub fn point_at(&self, t: f32) -> Vec2 {
        match self.control2 {
            Some(c2) => geom::cubic_point(self.start, self.control1, c2, self.end, t),
            None => geom::quadratic_point(self.start, self.control1, self.end, t),
        }
    }

    /// `steps + 1` local points along the curve.
    pub fn sample(&self, steps: usize) -> Vec<Vec2> {
        geom::sample(steps, |t| self.point_at(t))
    }
}

/// One step of a [`Path`], following the 2D canvas path API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadraticTo {
        ctrl: Vec2,
        to: Vec2,
    },
    BezierTo {
        ctrl1: Vec2,
        ctrl2: Vec2,
        to: Vec2,
    },
    Arc {
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        clockwise: bool,
    },
    /// Round the corner at `ctrl` towards `to` with a tangent circle.
    ArcTo {
        ctrl: Vec2,
        to: Vec2,
        radius: f32,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        start: f32,
        end: f32,
        clockwise: bool,
    },
    Close,
}

/// An arbitrary command sequence.
///
/// A path may be *compiled*: flattened once at high resolution and kept.
/// Compiled paths hit-test exactly (non-zero fill, stroke distance);
/// uncompiled ones fall back to sampling at the configured resolution.
/// Any edit drops the compiled form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    commands: Vec<PathCommand>,
    #[serde(default)]
    pub style: Style,
    #[serde(skip)]
    compiled: Option<CompiledPath>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self {
            commands,
            ..Self::default()
        }
    }

    pub fn push(mut self, command: PathCommand) -> Self {
        self.commands.push(command);
        self.compiled = None;
        self
    }

    pub fn move_to(self, p: Vec2) -> Self {
        self.push(PathCommand::MoveTo(p))
    }

    pub fn line_to(self, p: Vec2) -> Self {
        self.push(PathCommand::LineTo(p))
    }

    pub fn quadratic_to(self, ctrl: Vec2, to: Vec2) -> Self {
        self.push(PathCommand::QuadraticTo { ctrl, to })
    }

    pub fn bezier_to(self, ctrl1: Vec2, ctrl2: Vec2, to: Vec2) -> Self {
        self.push(PathCommand::BezierTo { ctrl1, ctrl2, to })
    }

    pub fn arc(self, center: Vec2, radius: f32, start: f32, end: f32, clockwise: bool) -> Self {
        self.push(PathCommand::Arc {
            center,
            radius,
            start,
            end,
            clockwise,
        })
    }

    pub fn arc_to(self, ctrl: Vec2, to: Vec2, radius: f32) -> Self {
        self.push(PathCommand::ArcTo { ctrl, to, radius })
    }

    pub fn ellipse(
        self,
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        start: f32,
        end: f32,
        clockwise: bool,
    ) -> Self {
        self.push(PathCommand::Ellipse {
            center,
            radii,
            rotation,
            start,
            end,
            clockwise,
        })
    }

    pub fn close(self) -> Self {
        self.push(PathCommand::Close)
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.style.line_width = width;
        self
    }

    /// Builder form of [`compile`](Self::compile).
    pub fn compiled(mut self) -> Self {
        self.compile();
        self
    }

    pub fn compile(&mut self) {
        self.compiled = Some(CompiledPath {
            subpaths: geom::flatten(&self.commands, COMPILED_PATH_SEGMENTS, f32::EPSILON),
        });
    }

    pub fn compiled_form(&self) -> Option<&CompiledPath> {
        self.compiled.as_ref()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Replace the commands, dropping any compiled form.
    pub fn set_commands(&mut self, commands: Vec<PathCommand>) {
        self.commands = commands;
        self.compiled = None;
    }

    /// A path with any `Close` fills its interior; otherwise it is a stroke.
    pub fn is_closed(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, PathCommand::Close))
    }
}
