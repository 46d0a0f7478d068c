//! # Hit Testing — One Strategy per Shape
//!
//! A [`HitStrategy`] knows how to bound and hit-test one renderable type. The
//! [`HitTestDispatcher`] holds them in registration order and uses the first
//! whose [`matches`](HitStrategy::matches) accepts the entity:
//!
//! ```text
//! Rect → Circle → Image → Polyline → Curve → Path → (custom shapes…)
//! ```
//!
//! Since an entity holds at most one renderable, at most one strategy can
//! match and the order only matters as a tie-break.
//!
//! Shape types implement the typed [`Shape`] trait; [`ShapeStrategy`] adapts
//! any `Shape` into the type-erased strategy the dispatcher stores.

use std::marker::PhantomData;

use crate::config::SpatialConfig;
use crate::ecs::component::Component;
use crate::ecs::entity::Entity;
use crate::ecs::store::ComponentStore;
use crate::math::{Aabb, Affine2, Vec2};
use crate::shapes::{Circle, Curve, Image, Path, Polyline, Rect, Style};

/// Geometry of a renderable component, in its entity's local space.
pub trait Shape: Component {
    fn style(&self) -> &Style;

    /// World-space bounds under `matrix`, or `None` for empty geometry.
    fn world_aabb(&self, matrix: &Affine2, config: &SpatialConfig) -> Option<Aabb>;

    /// Exact test of the world-space `point` under `matrix`.
    fn contains(&self, matrix: &Affine2, point: Vec2, config: &SpatialConfig) -> bool;
}

pub trait HitStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Does `entity` carry this strategy's shape?
    fn matches(&self, store: &ComponentStore, entity: Entity) -> bool;

    fn compute_aabb(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        config: &SpatialConfig,
    ) -> Option<Aabb>;

    fn hit(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        point: Vec2,
        config: &SpatialConfig,
    ) -> bool;
}

/// Strategy for any [`Shape`] type `S`.
pub struct ShapeStrategy<S> {
    name: String,
    _shape: PhantomData<fn() -> S>,
}

impl<S: Shape> ShapeStrategy<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _shape: PhantomData,
        }
    }
}

impl<S: Shape> HitStrategy for ShapeStrategy<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, store: &ComponentStore, entity: Entity) -> bool {
        store.contains::<S>(entity)
    }

    fn compute_aabb(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        config: &SpatialConfig,
    ) -> Option<Aabb> {
        store.get::<S>(entity)?.world_aabb(matrix, config)
    }

    fn hit(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        point: Vec2,
        config: &SpatialConfig,
    ) -> bool {
        store
            .get::<S>(entity)
            .is_some_and(|shape| shape.style().render && shape.contains(matrix, point, config))
    }
}

pub struct HitTestDispatcher {
    strategies: Vec<Box<dyn HitStrategy>>,
}

impl HitTestDispatcher {
    /// A dispatcher holding the built-in shape strategies.
    pub fn new() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register::<Rect>("Rect");
        dispatcher.register::<Circle>("Circle");
        dispatcher.register::<Image>("Image");
        dispatcher.register::<Polyline>("Polyline");
        dispatcher.register::<Curve>("Curve");
        dispatcher.register::<Path>("Path");
        dispatcher
    }

    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a strategy for `S` after everything already registered.
    pub fn register<S: Shape>(&mut self, name: &str) {
        self.push(Box::new(ShapeStrategy::<S>::new(name)));
    }

    pub fn push(&mut self, strategy: Box<dyn HitStrategy>) {
        log::debug!("hit strategy `{}` registered", strategy.name());
        self.strategies.push(strategy);
    }

    /// The first strategy that accepts `entity`.
    pub fn strategy_for(&self, store: &ComponentStore, entity: Entity) -> Option<&dyn HitStrategy> {
        self.strategies
            .iter()
            .find(|s| s.matches(store, entity))
            .map(|s| s.as_ref())
    }

    /// Self bounds of `entity`; `None` if it has no shape.
    pub fn compute_aabb(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        config: &SpatialConfig,
    ) -> Option<Aabb> {
        self.strategy_for(store, entity)?
            .compute_aabb(store, entity, matrix, config)
    }

    /// Exact hit; `false` if `entity` has no shape.
    pub fn hit(
        &self,
        store: &ComponentStore,
        entity: Entity,
        matrix: &Affine2,
        point: Vec2,
        config: &SpatialConfig,
    ) -> bool {
        self.strategy_for(store, entity)
            .is_some_and(|s| s.hit(store, entity, matrix, point, config))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.name())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for HitTestDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
