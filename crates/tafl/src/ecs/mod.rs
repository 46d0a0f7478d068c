//! # ECS — Entities, Components, Archetypes, Scene
//!
//! The data half of the crate. Everything here is plain bookkeeping; the
//! spatial passes and picking that run on top of it live in
//! [`transform`](crate::transform), [`spatial`](crate::spatial) and
//! [`events`](crate::events).
//!
//! ```text
//!   EntityRegistry ──▶ ComponentStore ──events──▶ ArchetypeIndex
//!          │                 (owns data)          (exact-set groups)
//!          └──────────▶ SceneTree ──▶ display list (cached, versioned)
//! ```
//!
//! - [`entity`]: Entity ids, allocated once and never reused
//! - [`component`]: The `Component` trait and the name/renderable registry
//! - [`store`]: Component storage with a single renderable slot per entity
//! - [`archetype`]: Entities grouped by their exact component set
//! - [`hierarchy`]: The scene tree and its display list
//! - [`system`]: Systems and the per-frame schedule
//! - [`world`]: [`World`], which keeps all of the above consistent

pub mod archetype;
pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod store;
pub mod system;
pub mod world;

pub use archetype::{Archetype, ArchetypeIndex, ArchetypeKey};
pub use component::{Component, ComponentId, ComponentRegistry};
pub use entity::Entity;
pub use hierarchy::{Attachment, DisplayEntry, SceneNode, SceneTree};
pub use store::{ComponentEvent, ComponentStore};
pub use system::{Schedule, System};
#[cfg(feature = "diagnostics")]
pub use system::SystemTiming;
pub use world::{Bundle, World};
#[cfg(feature = "diagnostics")]
pub use world::WorldStats;
