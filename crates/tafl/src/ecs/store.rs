//! # Component Store — The Authoritative (Entity, Type) → Instance Map
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ ComponentStore                                           │
//! │                                                          │
//! │  instances: ComponentId → Box<dyn Any>   (owns data)     │
//! │  owners:    ComponentId → Entity         (reverse index) │
//! │  entities:  Entity → { TypeId → ComponentId }            │
//! │  renderables: Entity → TypeId            (≤ 1 per entity)│
//! │  events:    pending add/remove notifications             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The store knows nothing about archetypes. Every mutation pushes a
//! [`ComponentEvent`]; the [`World`](super::world::World) drains them right
//! after the call and migrates the entity in the
//! [`ArchetypeIndex`](super::archetype::ArchetypeIndex), so from the caller's
//! side both structures change together.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use super::component::{BoxedComponent, Component, ComponentId, ComponentRegistry};
use super::entity::Entity;
use crate::error::EcsError;

/// Lifecycle notification emitted by every store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEvent {
    Added { entity: Entity, type_id: TypeId },
    Removed { entity: Entity, type_id: TypeId },
}

impl ComponentEvent {
    pub fn entity(&self) -> Entity {
        match *self {
            ComponentEvent::Added { entity, .. } | ComponentEvent::Removed { entity, .. } => entity,
        }
    }
}

#[derive(Debug, Default)]
pub struct ComponentStore {
    registry: ComponentRegistry,
    next_id: u64,
    instances: HashMap<ComponentId, BoxedComponent>,
    owners: HashMap<ComponentId, Entity>,
    entities: HashMap<Entity, HashMap<TypeId, ComponentId>>,
    renderables: HashMap<Entity, TypeId>,
    events: Vec<ComponentEvent>,
}

impl ComponentStore {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    // ── Entity bookkeeping ───────────────────────────────────────────

    /// Make an entity known to the store, with no components.
    pub fn track(&mut self, entity: Entity) {
        self.entities.entry(entity).or_default();
    }

    /// Drop an entity and every component it holds. Returns the removed types.
    ///
    /// No events are emitted: the entity is leaving the world, so there is no
    /// archetype to migrate it into.
    pub fn untrack(&mut self, entity: Entity) -> Vec<TypeId> {
        let Some(components) = self.entities.remove(&entity) else {
            return Vec::new();
        };
        self.renderables.remove(&entity);
        let mut removed = Vec::with_capacity(components.len());
        for (type_id, id) in components {
            self.instances.remove(&id);
            self.owners.remove(&id);
            removed.push(type_id);
        }
        removed
    }

    pub fn is_tracked(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Attach `component` to `entity`.
    ///
    /// Replaces an existing component of the same type in place. If the type
    /// is renderable and the entity already holds a *different* renderable,
    /// that one is evicted first and its type is returned.
    pub fn add<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<TypeId>, EcsError> {
        let type_id = TypeId::of::<T>();
        if !self.entities.contains_key(&entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        let Some(info) = self.registry.info(type_id) else {
            return Err(EcsError::UnregisteredComponent(std::any::type_name::<T>()));
        };
        let renderable = info.renderable;

        // Same type already present: swap the value, keep the handle.
        let existing = self
            .entities
            .get(&entity)
            .and_then(|set| set.get(&type_id))
            .copied();
        if let Some(id) = existing {
            self.instances.insert(id, Box::new(component));
            self.events.push(ComponentEvent::Added { entity, type_id });
            return Ok(None);
        }

        let mut evicted = None;
        if renderable {
            if let Some(previous) = self.renderables.get(&entity).copied() {
                self.remove_present(entity, previous);
                evicted = Some(previous);
            }
            self.renderables.insert(entity, type_id);
        }

        let id = ComponentId(self.next_id);
        self.next_id += 1;
        self.instances.insert(id, Box::new(component));
        self.owners.insert(id, entity);
        self.entities.entry(entity).or_default().insert(type_id, id);
        self.events.push(ComponentEvent::Added { entity, type_id });
        Ok(evicted)
    }

    /// Detach the component of `type_id` from `entity`. Returns whether one
    /// was present.
    pub fn remove(&mut self, entity: Entity, type_id: TypeId) -> Result<bool, EcsError> {
        let present = self
            .entities
            .get(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?
            .contains_key(&type_id);
        if present {
            self.remove_present(entity, type_id);
        }
        Ok(present)
    }

    fn remove_present(&mut self, entity: Entity, type_id: TypeId) {
        let Some(id) = self
            .entities
            .get_mut(&entity)
            .and_then(|set| set.remove(&type_id))
        else {
            return;
        };
        self.instances.remove(&id);
        self.owners.remove(&id);
        if self.renderables.get(&entity) == Some(&type_id) {
            self.renderables.remove(&entity);
        }
        self.events.push(ComponentEvent::Removed { entity, type_id });
    }

    /// Take all pending lifecycle events.
    pub fn drain_events(&mut self) -> Vec<ComponentEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let id = self.component_id(entity, TypeId::of::<T>())?;
        self.resolve(id)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let id = self.component_id(entity, TypeId::of::<T>())?;
        self.instances.get_mut(&id)?.downcast_mut::<T>()
    }

    /// Look up an instance by handle, e.g. while walking an archetype column.
    pub fn resolve<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.instances.get(&id)?.downcast_ref::<T>()
    }

    pub fn get_any(&self, entity: Entity, type_id: TypeId) -> Option<&dyn Any> {
        let id = self.component_id(entity, type_id)?;
        self.instances.get(&id).map(|boxed| &**boxed as &dyn Any)
    }

    pub fn has(&self, entity: Entity, type_id: TypeId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|set| set.contains_key(&type_id))
    }

    pub fn contains<T: Component>(&self, entity: Entity) -> bool {
        self.has(entity, TypeId::of::<T>())
    }

    /// Every component on `entity`, keyed by registered name.
    pub fn get_all(&self, entity: Entity) -> Option<BTreeMap<&str, &dyn Any>> {
        let set = self.entities.get(&entity)?;
        let mut all = BTreeMap::new();
        for (&type_id, id) in set {
            let (Some(name), Some(instance)) =
                (self.registry.name_of(type_id), self.instances.get(id))
            else {
                continue;
            };
            all.insert(name, &**instance as &dyn Any);
        }
        Some(all)
    }

    pub fn component_id(&self, entity: Entity, type_id: TypeId) -> Option<ComponentId> {
        self.entities.get(&entity)?.get(&type_id).copied()
    }

    /// The `(type, handle)` pairs currently held by `entity`.
    pub fn components_of(&self, entity: Entity) -> Option<Vec<(TypeId, ComponentId)>> {
        let set = self.entities.get(&entity)?;
        Some(set.iter().map(|(&t, &id)| (t, id)).collect())
    }

    pub fn owner_of(&self, id: ComponentId) -> Option<Entity> {
        self.owners.get(&id).copied()
    }

    /// The renderable type currently occupying `entity`'s slot.
    pub fn renderable_of(&self, entity: Entity) -> Option<TypeId> {
        self.renderables.get(&entity).copied()
    }

    /// Number of stored component instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
