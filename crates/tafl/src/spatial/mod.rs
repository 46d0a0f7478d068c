//! # Spatial Queries
//!
//! World-space bounding boxes and exact per-shape hit testing, the two
//! halves of picking.
//!
//! - [`geom`]: Point, segment, polygon and curve primitives
//! - [`hit`]: [`Shape`] / [`HitStrategy`] traits and the dispatcher
//! - [`bounds`]: Bottom-up AABB pass and the spatial cache
//! - `strategies`: `Shape` impls for the built-in renderables

pub mod bounds;
pub mod geom;
pub mod hit;
mod strategies;

pub use bounds::{BoundingBox, BoundsSystem, SpatialCache, update_bounds};
pub use hit::{HitStrategy, HitTestDispatcher, Shape, ShapeStrategy};
