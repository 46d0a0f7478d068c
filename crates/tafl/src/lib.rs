//! # Tafl — A 2D Scene-Graph ECS
//!
//! Entities carry components, sit in a parent/child scene tree, and get
//! world transforms, bounding boxes and pointer picking computed for them.
//! There is no renderer: a presentation layer reads the display list, each
//! entity's [`canvas_transform`](ecs::World::canvas_transform) and its shape
//! style, and draws however it likes.
//!
//! ```text
//!  World::update
//!    ├─ user systems        (Schedule, in insertion order)
//!    ├─ transform pass      top-down, dirty-chained
//!    └─ bounds pass         bottom-up, self ∪ children
//!
//!  World::handle_pointer(x, y)
//!    ├─ pick                AABB prune ─▶ exact per-shape hit test
//!    └─ bubble              target ─▶ parent ─▶ ... until Stop
//! ```
//!
//! Start with `use tafl::prelude::*` and a [`World`](ecs::World).

pub mod config;
pub mod ecs;
pub mod error;
pub mod events;
pub mod math;
pub mod prelude;
pub mod shapes;
pub mod spatial;
pub mod transform;
