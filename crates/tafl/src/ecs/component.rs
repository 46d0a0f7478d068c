//! # Component — Type Registry and Handles
//!
//! Components are plain data. Any `'static + Send + Sync` type qualifies, but
//! a type must be *registered* under a name before it can be attached to an
//! entity. The name is what archetype keys are built from, so two worlds that
//! register the same names produce the same keys regardless of `TypeId`
//! ordering.
//!
//! ## Renderables
//!
//! Registration also records whether a type is *renderable*. An entity holds
//! at most one renderable component; the store checks this flag generically
//! instead of special-casing each shape type.
//!
//! ## Handles
//!
//! Stored component instances are addressed by a [`ComponentId`]. The store
//! owns the instance; archetype columns hold the handle, which is how the two
//! structures share an instance without shared ownership.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::EcsError;

/// Marker trait for anything that can be attached to an entity.
pub trait Component: Any + Send + Sync {}

impl<T: Any + Send + Sync> Component for T {}

/// Handle to a component instance owned by the
/// [`ComponentStore`](super::store::ComponentStore). Never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) u64);

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// What the registry knows about one component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    pub name: String,
    pub type_name: &'static str,
    pub renderable: bool,
}

/// Name ↔ type table. Owned per world (no process-wide globals), so two
/// worlds never see each other's registrations.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentInfo>,
    by_name: HashMap<String, TypeId>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every component type this crate defines.
    pub fn with_builtins() -> Self {
        use crate::events::EventHandlers;
        use crate::shapes::{Circle, Curve, Image, Path, Polyline, Rect};
        use crate::transform::Transform;

        let mut registry = Self::new();
        let builtins: [Result<(), EcsError>; 8] = [
            registry.register::<Transform>("Transform"),
            registry.register::<EventHandlers>("EventHandlers"),
            registry.register_renderable::<Rect>("Rect"),
            registry.register_renderable::<Circle>("Circle"),
            registry.register_renderable::<Image>("Image"),
            registry.register_renderable::<Polyline>("Polyline"),
            registry.register_renderable::<Curve>("Curve"),
            registry.register_renderable::<Path>("Path"),
        ];
        for result in builtins {
            debug_assert!(result.is_ok(), "builtin names are unique");
        }
        registry
    }

    /// Register a plain component type under `name`.
    pub fn register<T: Component>(&mut self, name: &str) -> Result<(), EcsError> {
        self.insert::<T>(name, false)
    }

    /// Register a type that occupies the entity's single renderable slot.
    pub fn register_renderable<T: Component>(&mut self, name: &str) -> Result<(), EcsError> {
        self.insert::<T>(name, true)
    }

    fn insert<T: Component>(&mut self, name: &str, renderable: bool) -> Result<(), EcsError> {
        let type_id = TypeId::of::<T>();
        match (self.by_name.get(name), self.by_type.get(&type_id)) {
            // Same pairing again: refresh the renderable flag only.
            (Some(&existing), Some(_)) if existing == type_id => {
                if let Some(info) = self.by_type.get_mut(&type_id) {
                    info.renderable = renderable;
                }
                return Ok(());
            }
            (None, None) => {}
            _ => return Err(EcsError::DuplicateComponentName(name.to_string())),
        }

        log::debug!(
            "registered component `{}` as {}{}",
            std::any::type_name::<T>(),
            name,
            if renderable { " (renderable)" } else { "" }
        );
        self.by_name.insert(name.to_string(), type_id);
        self.by_type.insert(
            type_id,
            ComponentInfo {
                name: name.to_string(),
                type_name: std::any::type_name::<T>(),
                renderable,
            },
        );
        Ok(())
    }

    pub fn info(&self, type_id: TypeId) -> Option<&ComponentInfo> {
        self.by_type.get(&type_id)
    }

    pub fn name_of(&self, type_id: TypeId) -> Option<&str> {
        self.by_type.get(&type_id).map(|info| info.name.as_str())
    }

    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    pub fn is_renderable(&self, type_id: TypeId) -> bool {
        self.by_type
            .get(&type_id)
            .is_some_and(|info| info.renderable)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// A boxed component instance, type-erased.
pub(crate) type BoxedComponent = Box<dyn Any + Send + Sync>;
