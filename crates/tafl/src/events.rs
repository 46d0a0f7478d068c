//! # Events — Picking and Bubbling
//!
//! Pointer input resolves to an entity in two steps:
//!
//! 1. **Pick.** [`World::pick_entity_at`] refreshes the spatial passes if
//!    anything changed, then searches the scene depth-first. Siblings are
//!    visited last-added first (they draw on top), subtrees whose total AABB
//!    misses the point are skipped, and children are tried before their
//!    parent. The first entity whose self AABB holds the point *and* whose
//!    shape passes the exact hit test wins.
//!
//! 2. **Bubble.** [`World::dispatch`] walks from the target up through its
//!    scene parents. Each entity with an [`EventHandlers`] component that
//!    handles the event name is called in turn; a handler returning
//!    [`Propagation::Stop`] ends the walk.
//!
//! ```text
//!   root ◀── panel ◀── button        click on button:
//!             │           ▲            button handler → Continue
//!             │       (picked)         panel  handler → Stop
//!             └─ handled, stops        root never sees it
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::ecs::entity::Entity;
use crate::ecs::world::World;
use crate::error::EcsError;
use crate::math::Vec2;
use crate::spatial::bounds::BoundingBox;

/// What a handler receives.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    /// The entity the event was dispatched to.
    pub target: Entity,
    /// The entity whose handler is running.
    pub current_target: Entity,
    /// Surface coordinates, for pointer events.
    pub position: Option<Vec2>,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

type Handler = Box<dyn FnMut(&Event) -> Propagation + Send + Sync>;

/// Per-entity event handlers, keyed by event name.
#[derive(Default)]
pub struct EventHandlers {
    handlers: HashMap<String, Handler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn on(
        mut self,
        name: impl Into<String>,
        handler: impl FnMut(&Event) -> Propagation + Send + Sync + 'static,
    ) -> Self {
        self.insert(name, handler);
        self
    }

    /// Set the handler for `name`, replacing any previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&Event) -> Propagation + Send + Sync + 'static,
    ) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    pub fn handles(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn call(&mut self, event: &Event) -> Option<Propagation> {
        self.handlers.get_mut(&event.name).map(|h| h(event))
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EventHandlers").field("handles", &names).finish()
    }
}

/// How a bubbling walk went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Entities whose handler ran, target first.
    pub handled_by: Vec<Entity>,
    /// The entity whose handler returned [`Propagation::Stop`].
    pub stopped_at: Option<Entity>,
}

impl DispatchOutcome {
    pub fn was_handled(&self) -> bool {
        !self.handled_by.is_empty()
    }

    pub fn stopped(&self) -> bool {
        self.stopped_at.is_some()
    }
}

impl World {
    /// The topmost entity whose shape contains `(x, y)`, in surface
    /// coordinates.
    pub fn pick_entity_at(&mut self, x: f32, y: f32) -> Result<Option<Entity>, EcsError> {
        self.refresh_spatial()?;
        let point = Vec2::new(x, y);
        let picked = self.pick(point);
        log::trace!("pick ({x}, {y}) → {picked:?}");
        Ok(picked)
    }

    /// Depth-first search with an explicit stack of `(entity, children_tried)`
    /// frames. Siblings are pushed in order so the last-added pops first; an
    /// entity's own frame sits under its children's and is tested once they
    /// have all missed.
    fn pick(&self, point: Vec2) -> Option<Entity> {
        let mut stack: Vec<(Entity, bool)> = self
            .scene
            .root_children()
            .iter()
            .map(|&top| (top, false))
            .collect();

        while let Some((entity, children_tried)) = stack.pop() {
            let Some(bb) = self.spatial.bounds(entity) else {
                continue;
            };
            if children_tried {
                if self.hits_self(entity, bb, point) {
                    return Some(entity);
                }
                continue;
            }
            if !bb.total_aabb.is_some_and(|total| total.contains(point)) {
                continue;
            }
            stack.push((entity, true));
            let children = self.scene.children(entity).unwrap_or_default();
            stack.extend(children.iter().map(|&child| (child, false)));
        }
        None
    }

    fn hits_self(&self, entity: Entity, bb: &BoundingBox, point: Vec2) -> bool {
        if !bb.self_aabb.is_some_and(|own| own.contains(point)) {
            return false;
        }
        self.spatial.matrix(entity).is_some_and(|matrix| {
            self.dispatcher
                .hit(&self.store, entity, &matrix, point, &self.config)
        })
    }

    /// Deliver event `name` to `target` and bubble it up the scene.
    pub fn dispatch(
        &mut self,
        target: Entity,
        name: &str,
        payload: Option<Value>,
    ) -> Result<DispatchOutcome, EcsError> {
        self.bubble(target, name, None, payload)
    }

    /// Pick at `(x, y)` and, if something is there, dispatch `name` to it
    /// with the pointer position attached.
    pub fn handle_pointer(
        &mut self,
        name: &str,
        x: f32,
        y: f32,
        payload: Option<Value>,
    ) -> Result<Option<(Entity, DispatchOutcome)>, EcsError> {
        let Some(target) = self.pick_entity_at(x, y)? else {
            return Ok(None);
        };
        let outcome = self.bubble(target, name, Some(Vec2::new(x, y)), payload)?;
        Ok(Some((target, outcome)))
    }

    fn bubble(
        &mut self,
        target: Entity,
        name: &str,
        position: Option<Vec2>,
        payload: Option<Value>,
    ) -> Result<DispatchOutcome, EcsError> {
        if !self.entities.exists(target) {
            return Err(EcsError::EntityNotFound(target));
        }

        let mut event = Event {
            name: name.to_string(),
            target,
            current_target: target,
            position,
            payload,
        };
        let mut outcome = DispatchOutcome::default();
        let mut current = Some(target);
        while let Some(entity) = current {
            event.current_target = entity;
            let result = self
                .store
                .get_mut::<EventHandlers>(entity)
                .and_then(|handlers| handlers.call(&event));
            if let Some(propagation) = result {
                outcome.handled_by.push(entity);
                if propagation == Propagation::Stop {
                    outcome.stopped_at = Some(entity);
                    break;
                }
            }
            current = self.scene.parent(entity);
        }

        if !outcome.was_handled() {
            log::debug!("event `{name}` on {target} had no handler");
        }
        Ok(outcome)
    }
}
