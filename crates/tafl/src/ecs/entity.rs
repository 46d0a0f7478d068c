//! # Entity — Opaque Identifiers
//!
//! An [`Entity`] is just a number. It carries no data of its own; the
//! [`ComponentStore`](super::store::ComponentStore) maps entities to their
//! components and the [`SceneTree`](super::hierarchy::SceneTree) places them in
//! the hierarchy.
//!
//! ## Monotonic IDs
//!
//! Identifiers are handed out from a counter and never recycled within a
//! session. That removes the need for generation tags: a stale handle simply
//! refers to an id that is no longer alive, and `exists` reports it as such.
//!
//! ```text
//! create() → 0, 1, 2
//! remove(1)
//! create() → 3          ← 1 is never handed out again
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u32);

impl Entity {
    /// Build a handle from a raw id. Useful in tests and when bridging to
    /// external systems that store ids as integers.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates and tracks live entity ids.
///
/// `alive` is ordered so that [`all`](Self::all) yields ids in creation order.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    next: u32,
    alive: BTreeSet<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id.
    pub fn create(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        self.alive.insert(entity);
        entity
    }

    /// Forget an id. Removing an id that is not alive is a no-op.
    pub fn remove(&mut self, entity: Entity) -> bool {
        self.alive.remove(&entity)
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.alive.contains(&entity)
    }

    /// All live ids, oldest first.
    pub fn all(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }
}
