//! Convenience re-exports — `use tafl::prelude::*` for the common items.

pub use crate::config::SpatialConfig;
pub use crate::ecs::{Bundle, Component, Entity, Schedule, System, World};
#[cfg(feature = "diagnostics")]
pub use crate::ecs::WorldStats;
pub use crate::error::{ConfigError, EcsError, ErrorKind};
pub use crate::events::{DispatchOutcome, Event, EventHandlers, Propagation};
pub use crate::math::{Aabb, Affine2, Vec2};
pub use crate::shapes::{Circle, Color, Curve, Image, Path, PathCommand, Polyline, Rect, Style};
pub use crate::spatial::{BoundingBox, HitStrategy, Shape};
pub use crate::transform::Transform;
