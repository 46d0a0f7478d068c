//! # Archetype — Grouping Entities by Exact Component Set
//!
//! An archetype represents one exact combination of component types. Every
//! entity whose current type set is `{Rect, Transform}` lives in the archetype
//! keyed `"Rect|Transform"` and nowhere else: membership is exact-set, so a
//! query for `{Rect}` does not see it.
//!
//! ## Memory Layout
//!
//! ```text
//! Archetype "Rect|Transform"
//!
//! columns:
//!   Rect:      [c3, c7, c9]     ← ComponentId handles into the store
//!   Transform: [c2, c6, c8]
//! entities:    [e1, e4, e5]     ← parallel array
//! ```
//!
//! All arrays have the same length; index `i` in each refers to the same
//! entity. The store owns the instances, the columns only hold handles.
//!
//! ## Migration
//!
//! When an entity's type set changes, [`ArchetypeIndex::migrate`] takes it out
//! of its old archetype and appends it to the one matching its new set,
//! creating that archetype on first use. Archetypes are cached by key and
//! never merged or split.
//!
//! Removal is a linear scan within the archetype followed by an order-keeping
//! splice. Archetypes are expected to stay small; a large scene with many
//! entities sharing one archetype would want an entity → row map instead.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use super::component::{ComponentId, ComponentRegistry};
use super::entity::Entity;
use crate::error::EcsError;

/// Sorted, `|`-joined registered type names. `"Rect|Transform"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeKey(String);

impl ArchetypeKey {
    /// Build a key from type names in any order (duplicates collapse).
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();
        Self(names.join("|"))
    }

    /// Build a key from type ids, resolving names through `registry`.
    ///
    /// Returns `None` if any type is unregistered: no entity can hold such a
    /// type, so no archetype can match.
    pub fn from_types(types: &[TypeId], registry: &ComponentRegistry) -> Option<Self> {
        let names = types
            .iter()
            .map(|&t| registry.name_of(t))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::from_names(names))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ArchetypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchetypeKey({:?})", self.0)
    }
}

impl fmt::Display for ArchetypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A table of entities that all share the same exact component types.
#[derive(Debug)]
pub struct Archetype {
    key: ArchetypeKey,
    /// Component types in key order.
    types: Vec<TypeId>,
    columns: HashMap<TypeId, Vec<ComponentId>>,
    entities: Vec<Entity>,
}

impl Archetype {
    fn new(key: ArchetypeKey, types: Vec<TypeId>) -> Self {
        let columns = types.iter().map(|&t| (t, Vec::new())).collect();
        Self {
            key,
            types,
            columns,
            entities: Vec::new(),
        }
    }

    pub fn key(&self) -> &ArchetypeKey {
        &self.key
    }

    pub fn types(&self) -> &[TypeId] {
        &self.types
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The handle column for `type_id`, parallel to [`entities`](Self::entities).
    pub fn column(&self, type_id: TypeId) -> Option<&[ComponentId]> {
        self.columns.get(&type_id).map(Vec::as_slice)
    }

    pub fn has_component(&self, type_id: TypeId) -> bool {
        self.columns.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Append a row. Every column type must be present in `components`.
    fn push(
        &mut self,
        entity: Entity,
        components: &HashMap<TypeId, ComponentId>,
        registry: &ComponentRegistry,
    ) -> Result<(), EcsError> {
        if let Some(&missing) = self.types.iter().find(|&&t| !components.contains_key(&t)) {
            return Err(EcsError::MissingComponent {
                archetype: self.key.to_string(),
                component: registry.name_of(missing).unwrap_or("?").to_string(),
                entity,
            });
        }
        for (type_id, column) in self.columns.iter_mut() {
            column.push(components[type_id]);
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Splice `entity`'s row out, keeping the order of the remaining rows.
    fn remove(&mut self, entity: Entity) -> bool {
        let Some(row) = self.entities.iter().position(|&e| e == entity) else {
            return false;
        };
        self.entities.remove(row);
        for column in self.columns.values_mut() {
            column.remove(row);
        }
        true
    }
}

/// Secondary, column-oriented index over the component store.
#[derive(Debug, Default)]
pub struct ArchetypeIndex {
    archetypes: HashMap<ArchetypeKey, Archetype>,
    membership: HashMap<Entity, ArchetypeKey>,
}

impl ArchetypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `entity` into the archetype matching exactly `components`.
    ///
    /// `components` must be the entity's full current set; the key is
    /// recomputed from scratch on every call.
    pub fn migrate(
        &mut self,
        entity: Entity,
        components: &[(TypeId, ComponentId)],
        registry: &ComponentRegistry,
    ) -> Result<&ArchetypeKey, EcsError> {
        let mut named = Vec::with_capacity(components.len());
        for &(type_id, _) in components {
            let info = registry
                .info(type_id)
                .ok_or(EcsError::UnregisteredComponent("<unknown>"))?;
            named.push((info.name.as_str(), type_id));
        }
        named.sort_unstable_by(|a, b| a.0.cmp(b.0));
        let key = ArchetypeKey::from_names(named.iter().map(|(n, _)| *n));
        let by_type: HashMap<TypeId, ComponentId> = components.iter().copied().collect();

        self.remove_entity(entity);

        let archetype = self.archetypes.entry(key.clone()).or_insert_with(|| {
            log::trace!("new archetype `{}`", key);
            Archetype::new(key.clone(), named.iter().map(|&(_, t)| t).collect())
        });
        archetype.push(entity, &by_type, registry)?;

        self.membership.insert(entity, key.clone());
        Ok(&self.archetypes[&key].key)
    }

    /// Take `entity` out of whatever archetype holds it.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let Some(key) = self.membership.remove(&entity) else {
            return false;
        };
        self.archetypes
            .get_mut(&key)
            .is_some_and(|archetype| archetype.remove(entity))
    }

    pub fn query_exact(&self, key: &ArchetypeKey) -> Option<&Archetype> {
        self.archetypes.get(key)
    }

    pub fn key_of(&self, entity: Entity) -> Option<&ArchetypeKey> {
        self.membership.get(&entity)
    }

    pub fn archetype_of(&self, entity: Entity) -> Option<&Archetype> {
        self.archetypes.get(self.membership.get(&entity)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.values()
    }

    /// Number of archetypes ever created (empty ones are kept).
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;
    struct C;

    fn registry() -> ComponentRegistry {
        let mut reg = ComponentRegistry::new();
        reg.register::<A>("A").unwrap();
        reg.register::<B>("B").unwrap();
        reg.register::<C>("C").unwrap();
        reg
    }

    fn id(n: u64) -> ComponentId {
        ComponentId(n)
    }

    #[test]
    fn key_is_sorted_and_joined() {
        let key = ArchetypeKey::from_names(["Transform", "Rect", "Rect"]);
        assert_eq!(key.as_str(), "Rect|Transform");
        assert_eq!(ArchetypeKey::from_names([]).as_str(), "");
    }

    #[test]
    fn migrate_places_entity_by_exact_set() {
        let reg = registry();
        let mut index = ArchetypeIndex::new();
        let e = Entity::from_raw(0);
        let a = TypeId::of::<A>();
        let b = TypeId::of::<B>();

        index.migrate(e, &[(b, id(1)), (a, id(0))], &reg).unwrap();
        assert_eq!(index.key_of(e).unwrap().as_str(), "A|B");

        let ab = index.query_exact(&ArchetypeKey::from_names(["A", "B"])).unwrap();
        assert_eq!(ab.entities(), &[e]);
        assert_eq!(ab.column(a), Some(&[id(0)][..]));
        assert_eq!(ab.types(), &[a, b]);

        // {A} alone is a different archetype and does not exist yet.
        assert!(index.query_exact(&ArchetypeKey::from_names(["A"])).is_none());
    }

    #[test]
    fn migrate_moves_between_archetypes() {
        let reg = registry();
        let mut index = ArchetypeIndex::new();
        let e = Entity::from_raw(0);
        let a = TypeId::of::<A>();
        let c = TypeId::of::<C>();

        index.migrate(e, &[(a, id(0))], &reg).unwrap();
        index.migrate(e, &[(a, id(0)), (c, id(1))], &reg).unwrap();

        let only_a = index.query_exact(&ArchetypeKey::from_names(["A"])).unwrap();
        assert!(only_a.is_empty());
        let ac = index.query_exact(&ArchetypeKey::from_names(["A", "C"])).unwrap();
        assert_eq!(ac.entities(), &[e]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn remove_keeps_row_order() {
        let reg = registry();
        let mut index = ArchetypeIndex::new();
        let a = TypeId::of::<A>();
        let entities: Vec<Entity> = (0..4).map(Entity::from_raw).collect();
        for (n, &e) in entities.iter().enumerate() {
            index.migrate(e, &[(a, id(n as u64))], &reg).unwrap();
        }

        assert!(index.remove_entity(entities[1]));
        assert!(!index.remove_entity(entities[1]));

        let arch = index.archetype_of(entities[0]).unwrap();
        assert_eq!(arch.entities(), &[entities[0], entities[2], entities[3]]);
        assert_eq!(arch.column(a), Some(&[id(0), id(2), id(3)][..]));
    }

    #[test]
    fn empty_set_has_empty_key() {
        let reg = registry();
        let mut index = ArchetypeIndex::new();
        let e = Entity::from_raw(0);
        index.migrate(e, &[], &reg).unwrap();
        assert_eq!(index.key_of(e).unwrap().as_str(), "");
    }

    #[test]
    fn unregistered_type_rejected() {
        let reg = registry();
        let mut index = ArchetypeIndex::new();
        struct Stray;
        let err = index
            .migrate(Entity::from_raw(0), &[(TypeId::of::<Stray>(), id(0))], &reg)
            .unwrap_err();
        assert!(matches!(err, EcsError::UnregisteredComponent(_)));
        assert!(index.is_empty());
    }

    #[test]
    fn push_reports_missing_column() {
        let reg = registry();
        let mut arch = Archetype::new(
            ArchetypeKey::from_names(["A", "B"]),
            vec![TypeId::of::<A>(), TypeId::of::<B>()],
        );
        let supplied: HashMap<TypeId, ComponentId> = [(TypeId::of::<A>(), id(0))].into();
        let err = arch.push(Entity::from_raw(3), &supplied, &reg).unwrap_err();
        assert_eq!(
            err,
            EcsError::MissingComponent {
                archetype: "A|B".into(),
                component: "B".into(),
                entity: Entity::from_raw(3),
            }
        );
        assert!(arch.is_empty());
    }
}
