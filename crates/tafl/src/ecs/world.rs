//! # World — The Composition Root
//!
//! The [`World`] owns every piece of scene state and is the only surface that
//! keeps them consistent with each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ World                                                    │
//! │                                                          │
//! │  entities:   EntityRegistry      ids, never reused       │
//! │  store:      ComponentStore      owns component data     │
//! │  archetypes: ArchetypeIndex      exact-set grouping      │
//! │  scene:      SceneTree           hierarchy + display list│
//! │  spatial:    SpatialCache        matrices, bounds, dirty │
//! │  dispatcher: HitTestDispatcher   one strategy per shape  │
//! │  schedule:   Schedule            user systems            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//!
//! Every mutating call validates first and mutates second, so a rejected call
//! leaves store, index and tree exactly as they were. Component changes go
//! through the store, whose lifecycle events are drained immediately to
//! migrate the entity's archetype; from the caller's side the two always
//! agree.
//!
//! ## Scene Lookups Are Strict
//!
//! World-level scene operations fail with `NodeNotFound` for entities that
//! were never added to the scene. Lazy node creation exists only on the tree
//! itself, as [`SceneTree::get_or_create`].
//!
//! ## Frame
//!
//! [`World::update`] runs the user schedule, then the transform pass, then
//! the bounds pass (skipped when nothing moved). Picking calls
//! [`World::refresh_spatial`] on its own, so it never sees stale bounds.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;

use super::archetype::{ArchetypeIndex, ArchetypeKey};
use super::component::{Component, ComponentRegistry};
use super::entity::{Entity, EntityRegistry};
use super::hierarchy::{DisplayEntry, SceneTree};
use super::store::{ComponentEvent, ComponentStore};
use super::system::{Schedule, System};
use crate::config::SpatialConfig;
use crate::error::EcsError;
use crate::math::Affine2;
use crate::spatial::bounds::{BoundingBox, BoundsSystem, SpatialCache};
use crate::spatial::hit::{HitTestDispatcher, Shape};
use crate::transform::TransformSystem;

pub struct World {
    pub(crate) entities: EntityRegistry,
    pub(crate) store: ComponentStore,
    pub(crate) archetypes: ArchetypeIndex,
    pub(crate) scene: SceneTree,
    pub(crate) spatial: SpatialCache,
    pub(crate) dispatcher: HitTestDispatcher,
    pub(crate) config: SpatialConfig,
    /// Taken out while it runs, so systems can borrow the world mutably.
    schedule: Option<Schedule>,
    #[cfg(feature = "diagnostics")]
    frames: u64,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(SpatialConfig::default())
    }

    pub fn with_config(config: SpatialConfig) -> Self {
        Self {
            entities: EntityRegistry::new(),
            store: ComponentStore::new(ComponentRegistry::with_builtins()),
            archetypes: ArchetypeIndex::new(),
            scene: SceneTree::new(),
            spatial: SpatialCache::default(),
            dispatcher: HitTestDispatcher::new(),
            config,
            schedule: Some(Schedule::new()),
            #[cfg(feature = "diagnostics")]
            frames: 0,
        }
    }

    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Replace the spatial config. Every bounding box is recomputed on the
    /// next pass, since sampling resolution may have changed.
    pub fn set_config(&mut self, config: SpatialConfig) {
        self.config = config;
        let attached: Vec<Entity> = self.scene.display_list().iter().map(|d| d.entity).collect();
        for entity in attached {
            self.spatial.mark_dirty(entity);
        }
    }

    // ── Registration ─────────────────────────────────────────────────

    pub fn registry(&self) -> &ComponentRegistry {
        self.store.registry()
    }

    pub fn register_component<T: Component>(&mut self, name: &str) -> Result<(), EcsError> {
        self.store.registry_mut().register::<T>(name)
    }

    pub fn register_renderable<T: Component>(&mut self, name: &str) -> Result<(), EcsError> {
        self.store.registry_mut().register_renderable::<T>(name)
    }

    /// Register a custom renderable along with a hit strategy for it. The
    /// strategy is tried after the built-in ones.
    pub fn register_shape<S: Shape>(&mut self, name: &str) -> Result<(), EcsError> {
        let known = self.store.registry().is_registered(TypeId::of::<S>());
        self.register_renderable::<S>(name)?;
        if !known {
            self.dispatcher.register::<S>(name);
        }
        Ok(())
    }

    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.add_system(system);
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        self.store.track(entity);
        if let Err(err) = self.sync_archetype(entity) {
            log::error!("new entity {entity} could not be indexed: {err}");
        }
        log::debug!("created entity {entity}");
        entity
    }

    /// Delete `entity` and its components. Its scene node goes too; any
    /// children are detached, not deleted.
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        self.scene.evict(entity);
        self.delete(entity);
        log::debug!("removed entity {entity}");
        Ok(())
    }

    fn delete(&mut self, entity: Entity) {
        self.store.untrack(entity);
        self.store.drain_events();
        self.archetypes.remove_entity(entity);
        self.spatial.forget(entity);
        self.entities.remove(entity);
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.exists(entity)
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.all().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Attach `component` to `entity`, replacing one of the same type. A
    /// renderable evicts whatever renderable the entity held before.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        if !self.entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        let evicted = self.store.add(entity, component)?;
        if let Some(evicted) = evicted {
            log::debug!(
                "{entity}: `{}` evicted by `{}`",
                self.store.registry().name_of(evicted).unwrap_or("?"),
                std::any::type_name::<T>()
            );
        }
        self.apply_store_events()
    }

    /// Detach the component of `type_id`. Returns whether one was present.
    pub fn remove_component(&mut self, entity: Entity, type_id: TypeId) -> Result<bool, EcsError> {
        if !self.entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        let removed = self.store.remove(entity, type_id)?;
        self.apply_store_events()?;
        Ok(removed)
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<bool, EcsError> {
        self.remove_component(entity, TypeId::of::<T>())
    }

    fn apply_store_events(&mut self) -> Result<(), EcsError> {
        let mut changed: Vec<Entity> = Vec::new();
        for event in self.store.drain_events() {
            if let ComponentEvent::Removed { type_id, .. } = event {
                log::trace!(
                    "{}: removed `{}`",
                    event.entity(),
                    self.store.registry().name_of(type_id).unwrap_or("?")
                );
            }
            if !changed.contains(&event.entity()) {
                changed.push(event.entity());
            }
        }
        for entity in changed {
            self.sync_archetype(entity)?;
            self.spatial.touch(entity);
        }
        Ok(())
    }

    fn sync_archetype(&mut self, entity: Entity) -> Result<(), EcsError> {
        let components = self
            .store
            .components_of(entity)
            .ok_or(EcsError::EntityNotFound(entity))?;
        self.archetypes
            .migrate(entity, &components, self.store.registry())?;
        Ok(())
    }

    pub fn get_component(&self, entity: Entity, type_id: TypeId) -> Option<&dyn Any> {
        self.store.get_any(entity, type_id)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store.get::<T>(entity)
    }

    /// Mutable access. The entity's transform and bounds are recomputed on
    /// the next pass whether or not anything was actually changed.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if self.store.contains::<T>(entity) {
            self.spatial.touch(entity);
        }
        self.store.get_mut::<T>(entity)
    }

    pub fn has_component(&self, entity: Entity, type_id: TypeId) -> bool {
        self.store.has(entity, type_id)
    }

    pub fn contains<T: Component>(&self, entity: Entity) -> bool {
        self.store.contains::<T>(entity)
    }

    /// All of `entity`'s components, by registered name.
    pub fn get_all(&self, entity: Entity) -> Option<BTreeMap<&str, &dyn Any>> {
        self.store.get_all(entity)
    }

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Entities whose component set is exactly `types`, in insertion order.
    pub fn get_entities_with(&self, types: &[TypeId]) -> Vec<Entity> {
        ArchetypeKey::from_types(types, self.store.registry())
            .and_then(|key| self.archetypes.query_exact(&key))
            .map(|archetype| archetype.entities().to_vec())
            .unwrap_or_default()
    }

    /// Typed form of [`get_entities_with`](Self::get_entities_with).
    pub fn entities_with<B: Bundle>(&self) -> Vec<Entity> {
        self.get_entities_with(&B::type_ids())
    }

    pub fn archetype_key(&self, entity: Entity) -> Option<&ArchetypeKey> {
        self.archetypes.key_of(entity)
    }

    pub fn archetypes(&self) -> &ArchetypeIndex {
        &self.archetypes
    }

    // ── Scene ────────────────────────────────────────────────────────

    /// Put `entity` into the scene under `parent`, or at the top level.
    /// Moves it (with its subtree) if it is already placed.
    pub fn add_to_scene(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), EcsError> {
        if !self.entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        if let Some(parent) = parent {
            self.require_node(parent)?;
        }
        self.scene.add(entity, parent)?;
        self.spatial.touch(entity);
        log::debug!("scene: {entity} added under {}", describe(parent));
        Ok(())
    }

    /// Move `child`, already in the scene, under `parent` (or the top
    /// level). Descendants and their order come along unchanged.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), EcsError> {
        self.require_node(child)?;
        if let Some(parent) = parent {
            self.require_node(parent)?;
        }
        self.scene.add(child, parent)?;
        self.spatial.touch(child);
        log::debug!("scene: {child} re-parented under {}", describe(parent));
        Ok(())
    }

    /// Take `entity` and its subtree out of the scene without deleting
    /// anything.
    pub fn detach_from_scene(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.require_node(entity)?;
        self.scene.remove(entity)
    }

    /// Delete `entity` and every descendant, from the scene and the world.
    /// Returns the deleted entities, parents before children.
    pub fn remove_from_scene(&mut self, entity: Entity) -> Result<Vec<Entity>, EcsError> {
        self.require_node(entity)?;
        let removed = self.scene.destroy(entity)?;
        for &e in &removed {
            self.delete(e);
        }
        log::debug!("scene: removed {entity} and {} descendants", removed.len() - 1);
        Ok(removed)
    }

    /// `None` for top-level and detached nodes.
    pub fn get_parent(&self, entity: Entity) -> Result<Option<Entity>, EcsError> {
        self.require_node(entity)?;
        Ok(self.scene.parent(entity))
    }

    pub fn children(&self, entity: Entity) -> Result<&[Entity], EcsError> {
        self.require_node(entity)?;
        self.scene
            .children(entity)
            .ok_or(EcsError::NodeNotFound(entity))
    }

    /// Delete every entity in the scene, returned in the order of
    /// [`SceneTree::clear`]. Entities never added to it survive.
    pub fn clear_scene(&mut self) -> Vec<Entity> {
        let removed = self.scene.clear();
        for &e in &removed {
            self.delete(e);
        }
        log::debug!("scene cleared: {} entities removed", removed.len());
        removed
    }

    pub fn scene(&self) -> &SceneTree {
        &self.scene
    }

    pub fn display_list(&mut self) -> &[DisplayEntry] {
        self.scene.display_list()
    }

    fn require_node(&self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.exists(entity) {
            return Err(EcsError::EntityNotFound(entity));
        }
        if !self.scene.contains(entity) {
            return Err(EcsError::NodeNotFound(entity));
        }
        Ok(())
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Run one frame: user systems, then the transform and bounds passes.
    pub fn update(&mut self) -> Result<(), EcsError> {
        if let Some(mut schedule) = self.schedule.take() {
            let result = schedule.run(self);
            self.schedule = Some(schedule);
            result?;
        }
        self.refresh_spatial()?;
        #[cfg(feature = "diagnostics")]
        {
            self.frames += 1;
        }
        Ok(())
    }

    /// Bring world matrices and bounding boxes up to date.
    pub fn refresh_spatial(&mut self) -> Result<(), EcsError> {
        TransformSystem.run(self)?;
        BoundsSystem.run(self)
    }

    /// World matrix from the last transform pass.
    pub fn world_matrix(&self, entity: Entity) -> Option<Affine2> {
        self.spatial.matrix(entity)
    }

    /// The world matrix as the six canvas `setTransform` values.
    pub fn canvas_transform(&self, entity: Entity) -> Option<[f32; 6]> {
        self.world_matrix(entity).map(|m| m.to_cols_array())
    }

    pub fn bounds(&self, entity: Entity) -> Option<&BoundingBox> {
        self.spatial.bounds(entity)
    }

    pub fn dispatcher(&self) -> &HitTestDispatcher {
        &self.dispatcher
    }

    /// A snapshot of world size and cache activity.
    #[cfg(feature = "diagnostics")]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            frames: self.frames,
            entities: self.entities.len(),
            components: self.store.len(),
            archetypes: self.archetypes.len(),
            scene_nodes: self.scene.len(),
            scene_version: self.scene.version(),
            display_list_rebuilds: self.scene.rebuild_count(),
            system_timings: self
                .schedule
                .as_ref()
                .map(|s| {
                    s.timings()
                        .iter()
                        .map(|t| (t.name.clone(), t.duration_us))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(parent: Option<Entity>) -> String {
    parent.map_or_else(|| "root".to_string(), |p| p.to_string())
}

#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Default)]
pub struct WorldStats {
    pub frames: u64,
    pub entities: usize,
    pub components: usize,
    pub archetypes: usize,
    pub scene_nodes: usize,
    pub scene_version: u64,
    pub display_list_rebuilds: u64,
    /// `(system name, microseconds)` from the last frame.
    pub system_timings: Vec<(String, f64)>,
}

// ── Bundles ──────────────────────────────────────────────────────────

/// A tuple of components that can be spawned together.
///
/// Implemented for tuples of up to 8 components.
pub trait Bundle {
    fn type_ids() -> Vec<TypeId>;
    fn type_names() -> Vec<&'static str>;
    /// Add every component to `entity`, in tuple order.
    fn insert_into(self, world: &mut World, entity: Entity) -> Result<(), EcsError>;
}

macro_rules! impl_bundle {
    ($($T:ident),+) => {
        impl<$($T: Component),+> Bundle for ($($T,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$T>()),+]
            }

            fn type_names() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$T>()),+]
            }

            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: Entity) -> Result<(), EcsError> {
                let ($($T,)+) = self;
                $(world.add_component(entity, $T)?;)+
                Ok(())
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

impl World {
    /// Create an entity holding every component in `bundle`.
    ///
    /// All component types are checked before the entity is created, so an
    /// unregistered type leaves the world untouched.
    ///
    /// ```ignore
    /// let e = world.spawn((Transform::from_xy(10.0, 10.0), Rect::new(40.0, 20.0)))?;
    /// ```
    pub fn spawn<B: Bundle>(&mut self, bundle: B) -> Result<Entity, EcsError> {
        let registry = self.store.registry();
        if let Some((_, name)) = B::type_ids()
            .into_iter()
            .zip(B::type_names())
            .find(|(t, _)| !registry.is_registered(*t))
        {
            return Err(EcsError::UnregisteredComponent(name));
        }
        let entity = self.create_entity();
        bundle.insert_into(self, entity)?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHandlers;
    use crate::shapes::{Circle, Rect};
    use crate::transform::Transform;

    #[derive(Debug, PartialEq)]
    struct Health(u32);
    struct Unregistered;

    fn world() -> World {
        let mut world = World::new();
        world.register_component::<Health>("Health").unwrap();
        world
    }

    fn ids<const N: usize>(types: [TypeId; N]) -> Vec<TypeId> {
        types.to_vec()
    }

    #[test]
    fn archetype_tracks_component_set() {
        let mut world = world();
        let e = world.create_entity();
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "");

        world.add_component(e, Health(3)).unwrap();
        world.add_component(e, Transform::IDENTITY).unwrap();
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "Health|Transform");

        world.remove::<Health>(e).unwrap();
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "Transform");
        assert_eq!(
            world.get_entities_with(&ids([TypeId::of::<Transform>()])),
            vec![e]
        );
        assert!(world
            .get_entities_with(&ids([TypeId::of::<Transform>(), TypeId::of::<Health>()]))
            .is_empty());
    }

    #[test]
    fn exact_set_queries() {
        let mut world = world();
        let only_rect = world.spawn((Rect::new(1.0, 1.0),)).unwrap();
        let rect_and_transform = world
            .spawn((Rect::new(1.0, 1.0), Transform::IDENTITY))
            .unwrap();

        assert_eq!(world.entities_with::<(Rect,)>(), vec![only_rect]);
        assert_eq!(
            world.entities_with::<(Transform, Rect)>(),
            vec![rect_and_transform]
        );
        assert!(world.entities_with::<(Unregistered,)>().is_empty());
    }

    #[test]
    fn renderable_eviction_moves_archetype() {
        let mut world = world();
        let e = world.spawn((Rect::new(1.0, 1.0), Transform::IDENTITY)).unwrap();
        world.add_component(e, Circle::new(4.0)).unwrap();

        assert!(!world.has_component(e, TypeId::of::<Rect>()));
        assert!(world.has_component(e, TypeId::of::<Circle>()));
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "Circle|Transform");
        assert!(world.entities_with::<(Rect, Transform)>().is_empty());
    }

    #[test]
    fn rejected_calls_change_nothing() {
        let mut world = world();
        let e = world.create_entity();
        world.add_component(e, Health(1)).unwrap();

        let err = world.add_component(e, Unregistered).unwrap_err();
        assert!(matches!(err, EcsError::UnregisteredComponent(_)));
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "Health");

        let ghost = Entity::from_raw(500);
        assert_eq!(
            world.add_component(ghost, Health(1)),
            Err(EcsError::EntityNotFound(ghost))
        );

        let before = world.entity_count();
        assert!(world.spawn((Health(1), Unregistered)).is_err());
        assert_eq!(world.entity_count(), before);
    }

    #[test]
    fn remove_entity_cleans_everything() {
        let mut world = world();
        let parent = world.spawn((Rect::new(5.0, 5.0),)).unwrap();
        let child = world.spawn((Health(2),)).unwrap();
        world.add_to_scene(parent, None).unwrap();
        world.add_to_scene(child, Some(parent)).unwrap();

        world.remove_entity(parent).unwrap();
        assert!(!world.exists(parent));
        assert!(world.get::<Rect>(parent).is_none());
        assert!(world.archetype_key(parent).is_none());
        assert!(world.entities_with::<(Rect,)>().is_empty());
        assert_eq!(
            world.get_parent(parent),
            Err(EcsError::EntityNotFound(parent))
        );
        // The child survives, detached.
        assert!(world.exists(child));
        assert_eq!(world.get_parent(child), Ok(None));
        assert!(world.display_list().is_empty());

        assert_eq!(
            world.remove_entity(parent),
            Err(EcsError::EntityNotFound(parent))
        );
    }

    #[test]
    fn scene_lookups_are_strict() {
        let mut world = world();
        let loose = world.create_entity();
        let placed = world.create_entity();
        world.add_to_scene(placed, None).unwrap();

        assert_eq!(world.get_parent(loose), Err(EcsError::NodeNotFound(loose)));
        assert_eq!(
            world.set_parent(loose, Some(placed)),
            Err(EcsError::NodeNotFound(loose))
        );
        assert_eq!(
            world.add_to_scene(placed, Some(loose)),
            Err(EcsError::NodeNotFound(loose))
        );
        assert!(!world.scene().contains(loose));
    }

    #[test]
    fn remove_from_scene_deletes_subtree() {
        let mut world = world();
        let a = world.create_entity();
        let b = world.create_entity();
        let c = world.create_entity();
        let other = world.create_entity();
        world.add_to_scene(a, None).unwrap();
        world.add_to_scene(b, Some(a)).unwrap();
        world.add_to_scene(c, Some(b)).unwrap();
        world.add_to_scene(other, None).unwrap();

        assert_eq!(world.remove_from_scene(a).unwrap(), vec![a, b, c]);
        for gone in [a, b, c] {
            assert!(!world.exists(gone));
        }
        assert_eq!(world.entities(), vec![other]);
    }

    #[test]
    fn clear_scene_spares_unplaced_entities() {
        let mut world = world();
        let placed = world.create_entity();
        let loose = world.create_entity();
        world.add_to_scene(placed, None).unwrap();

        assert_eq!(world.clear_scene(), vec![placed]);
        assert!(!world.exists(placed));
        assert!(world.exists(loose));
        assert!(world.scene().is_empty());
    }

    #[test]
    fn update_runs_user_systems_then_passes() {
        let mut world = world();
        let e = world.spawn((Transform::from_xy(0.0, 0.0), Rect::new(2.0, 2.0))).unwrap();
        world.add_to_scene(e, None).unwrap();
        world.add_system(move |world: &mut World| {
            if let Some(t) = world.get_mut::<Transform>(e) {
                t.translate(crate::math::Vec2::new(10.0, 0.0));
            }
        });

        world.update().unwrap();
        world.update().unwrap();
        assert_eq!(world.canvas_transform(e), Some([1.0, 0.0, 0.0, 1.0, 20.0, 0.0]));
        let total = world.bounds(e).unwrap().total_aabb.unwrap();
        assert_eq!(total.min.x, 20.0);
    }

    #[test]
    fn custom_shape_registration() {
        struct Dot {
            style: crate::shapes::Style,
        }
        impl Shape for Dot {
            fn style(&self) -> &crate::shapes::Style {
                &self.style
            }
            fn world_aabb(&self, m: &Affine2, _: &SpatialConfig) -> Option<crate::math::Aabb> {
                let p = m.translation;
                Some(crate::math::Aabb::new(p - 1.0, p + 1.0))
            }
            fn contains(&self, m: &Affine2, point: crate::math::Vec2, _: &SpatialConfig) -> bool {
                m.translation.distance(point) <= 1.0
            }
        }

        let mut world = world();
        world.register_shape::<Dot>("Dot").unwrap();
        world.register_shape::<Dot>("Dot").unwrap();
        assert_eq!(world.dispatcher().len(), 7);

        let e = world
            .spawn((
                Dot {
                    style: Default::default(),
                },
                Transform::from_xy(5.0, 5.0),
            ))
            .unwrap();
        world.add_to_scene(e, None).unwrap();
        assert_eq!(world.pick_entity_at(5.5, 5.0).unwrap(), Some(e));

        // Dot is renderable, so a Rect evicts it.
        world.add_component(e, Rect::new(1.0, 1.0)).unwrap();
        assert!(!world.contains::<Dot>(e));
    }

    #[test]
    fn new_config_recomputes_bounds() {
        use crate::shapes::Path;
        use std::f32::consts::TAU;

        let mut world = world();
        let ring = Path::new()
            .arc(crate::math::Vec2::new(50.0, 50.0), 10.0, 0.0, TAU, false)
            .close();
        let e = world.spawn((Transform::IDENTITY, ring)).unwrap();
        world.add_to_scene(e, None).unwrap();
        world.update().unwrap();
        // 32 steps land a sample exactly on the top of the circle.
        let top = world.bounds(e).unwrap().total_aabb.unwrap().max.y;
        assert!((top - 60.0).abs() < 1e-3);

        // 30 steps of 12° straddle it at 84° and 96°.
        world.set_config(SpatialConfig {
            curve_samples: 30,
            ..SpatialConfig::default()
        });
        assert!(world.bounds(e).unwrap().is_dirty());
        world.update().unwrap();
        let top = world.bounds(e).unwrap().total_aabb.unwrap().max.y;
        assert!(top < 59.96, "top = {top}");
        assert_eq!(world.config().curve_samples, 30);
    }

    #[test]
    fn handlers_are_plain_components() {
        let mut world = world();
        let e = world.spawn((EventHandlers::new(),)).unwrap();
        assert_eq!(world.archetype_key(e).unwrap().as_str(), "EventHandlers");
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn stats_snapshot() {
        let mut world = world();
        let e = world.create_entity();
        world.add_to_scene(e, None).unwrap();
        world.update().unwrap();
        let stats = world.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.entities, 1);
        assert_eq!(stats.scene_nodes, 1);
        assert_eq!(stats.display_list_rebuilds, 1);
    }
}
