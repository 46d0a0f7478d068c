//! # Bounds — Bottom-Up AABB Aggregation
//!
//! Every entity in the scene gets a [`BoundingBox`] with three parts:
//!
//! ```text
//! self_aabb      its own shape, in world space (None without a shape)
//! children_aabb  union of every child's total
//! total_aabb     self ∪ children
//! ```
//!
//! [`update_bounds`] walks the display list in reverse, so children are
//! finished before their parent folds them in. A box's self part is only
//! recomputed when its dirty flag is up; the flag is raised by the transform
//! pass whenever it recomputes a world matrix, and by the world whenever a
//! component changes. The unions are cheap and always recomposed.
//!
//! ## Spatial Cache
//!
//! [`SpatialCache`] is the memoized state the two passes share: world
//! matrices, bounding boxes, the set of entities whose transform must be
//! recomputed regardless of flags (re-parented, component changes), and a
//! staleness bit telling picking whether the passes need to run again.

use std::collections::{HashMap, HashSet};

use crate::ecs::entity::Entity;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::error::EcsError;
use crate::math::{Aabb, Affine2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub self_aabb: Option<Aabb>,
    pub children_aabb: Option<Aabb>,
    pub total_aabb: Option<Aabb>,
    dirty: bool,
}

impl BoundingBox {
    fn new() -> Self {
        Self {
            self_aabb: None,
            children_aabb: None,
            total_aabb: None,
            dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Default)]
pub struct SpatialCache {
    matrices: HashMap<Entity, Affine2>,
    bounds: HashMap<Entity, BoundingBox>,
    forced: HashSet<Entity>,
    stale: bool,
    /// Scene version the bounds were last aggregated against.
    scene_version: Option<u64>,
}

impl SpatialCache {
    pub fn matrix(&self, entity: Entity) -> Option<Affine2> {
        self.matrices.get(&entity).copied()
    }

    pub fn bounds(&self, entity: Entity) -> Option<&BoundingBox> {
        self.bounds.get(&entity)
    }

    /// Whether the bounds need another pass against a tree at `scene_version`.
    pub fn is_stale(&self, scene_version: u64) -> bool {
        self.stale || self.scene_version != Some(scene_version)
    }

    /// Force a transform recompute for `entity` and mark its bounds dirty.
    pub(crate) fn touch(&mut self, entity: Entity) {
        self.forced.insert(entity);
        self.mark_dirty(entity);
    }

    pub(crate) fn is_forced(&self, entity: Entity) -> bool {
        self.forced.contains(&entity)
    }

    pub(crate) fn clear_forced(&mut self) {
        self.forced.clear();
    }

    pub(crate) fn set_matrix(&mut self, entity: Entity, matrix: Affine2) {
        self.matrices.insert(entity, matrix);
        self.mark_dirty(entity);
    }

    pub(crate) fn mark_dirty(&mut self, entity: Entity) {
        self.bounds
            .entry(entity)
            .or_insert_with(BoundingBox::new)
            .dirty = true;
        self.stale = true;
    }

    pub(crate) fn forget(&mut self, entity: Entity) {
        self.matrices.remove(&entity);
        self.bounds.remove(&entity);
        self.forced.remove(&entity);
        self.stale = true;
    }
}

/// Bottom-up bounds pass. Returns how many self boxes were recomputed.
pub fn update_bounds(world: &mut World) -> Result<usize, EcsError> {
    let World {
        scene,
        store,
        spatial,
        dispatcher,
        config,
        ..
    } = world;

    let mut pending: HashMap<Entity, Aabb> = HashMap::new();
    let mut recomputed = 0usize;

    scene.for_each((), true, |entity, parent, _| {
        let children = pending.remove(&entity);
        let matrix = spatial.matrix(entity).unwrap_or(Affine2::IDENTITY);
        let bb = spatial
            .bounds
            .entry(entity)
            .or_insert_with(BoundingBox::new);
        if bb.dirty {
            bb.self_aabb = dispatcher.compute_aabb(store, entity, &matrix, config);
            recomputed += 1;
        }
        bb.children_aabb = children;
        bb.total_aabb = Aabb::union_opt(bb.self_aabb, children);
        bb.dirty = false;

        if let (Some(parent), Some(total)) = (parent, bb.total_aabb) {
            pending
                .entry(parent)
                .and_modify(|acc| *acc = acc.union(&total))
                .or_insert(total);
        }
    })?;

    spatial.stale = false;
    spatial.scene_version = Some(scene.version());
    if recomputed > 0 {
        log::trace!("bounds pass: {recomputed} boxes recomputed");
    }
    Ok(recomputed)
}

/// The built-in bounds pass as a [`System`]. Skips the walk when nothing
/// changed since the last run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsSystem;

impl System for BoundsSystem {
    fn run(&mut self, world: &mut World) -> Result<(), EcsError> {
        if world.spatial.is_stale(world.scene.version()) {
            update_bounds(world)?;
        }
        Ok(())
    }
}
