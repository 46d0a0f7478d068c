//! Error types for world, store, and scene operations.
//!
//! Every error here is a contract violation by the caller (or, for
//! [`EcsError::MissingComponent`], an internal invariant breach). None of them
//! are transient, so nothing retries: the failing call is rejected before any
//! state is touched and the error is handed straight back.

use thiserror::Error;

use crate::ecs::Entity;

/// Coarse classification of an [`EcsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entity or scene node does not exist.
    NotFound,
    /// The request conflicts with the current state (unregistered type, cycle, ...).
    InvalidState,
    /// An archetype insertion lacked a component its type set requires.
    MissingData,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EcsError {
    #[error("entity {0} does not exist")]
    EntityNotFound(Entity),

    #[error("entity {0} has no scene node")]
    NodeNotFound(Entity),

    #[error("component type `{0}` is not registered")]
    UnregisteredComponent(&'static str),

    #[error("component name `{0}` conflicts with an existing registration")]
    DuplicateComponentName(String),

    #[error("cannot attach {child} under {parent}: {parent} is {child} or one of its descendants")]
    CyclicHierarchy { child: Entity, parent: Entity },

    #[error("archetype `{archetype}` requires component `{component}` but entity {entity} did not supply it")]
    MissingComponent {
        archetype: String,
        component: String,
        entity: Entity,
    },
}

impl EcsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EcsError::EntityNotFound(_) | EcsError::NodeNotFound(_) => ErrorKind::NotFound,
            EcsError::UnregisteredComponent(_)
            | EcsError::DuplicateComponentName(_)
            | EcsError::CyclicHierarchy { .. } => ErrorKind::InvalidState,
            EcsError::MissingComponent { .. } => ErrorKind::MissingData,
        }
    }
}

/// Failure to load a [`SpatialConfig`](crate::config::SpatialConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid spatial config: {0}")]
    Parse(#[from] serde_json::Error),
}
