//! # Scene Tree — Parent/Child Relationships
//!
//! The scene tree is a hierarchy over entity ids, independent of component
//! data. A hidden root anchors it; top-level nodes hang off the root and have
//! no parent entity.
//!
//! ```text
//!   (root)
//!   ├── a
//!   │   ├── b
//!   │   └── c        sibling order = insertion order
//!   └── d
//!
//! display list: [(a, -), (b, a), (c, a), (d, -)]
//! ```
//!
//! ## Display List Cache
//!
//! Every structural mutation bumps a version counter. The pre-order display
//! list is rebuilt lazily the first time it is read after the version moved,
//! so repeated reads within an unchanged frame cost nothing.
//!
//! ## Detached Nodes
//!
//! [`SceneTree::remove`] only detaches: the node (and its subtree) stays in
//! the node map but no longer appears in the display list. [`SceneTree::destroy`]
//! deletes the node and all descendants.

use std::collections::HashMap;

use super::entity::Entity;
use crate::error::EcsError;

/// Where a node hangs in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Known to the tree but not reachable from the root.
    Detached,
    /// Direct child of the hidden root.
    Root,
    /// Child of another node.
    Child(Entity),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    entity: Entity,
    attachment: Attachment,
    children: Vec<Entity>,
}

impl SceneNode {
    fn new(entity: Entity) -> Self {
        Self {
            entity,
            attachment: Attachment::Detached,
            children: Vec::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    pub fn parent(&self) -> Option<Entity> {
        match self.attachment {
            Attachment::Child(parent) => Some(parent),
            Attachment::Detached | Attachment::Root => None,
        }
    }

    /// Children in sibling order (first added first).
    pub fn children(&self) -> &[Entity] {
        &self.children
    }
}

/// One display-list row: the entity and its parent (`None` under the root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEntry {
    pub entity: Entity,
    pub parent: Option<Entity>,
}

#[derive(Debug, Default)]
struct DisplayCache {
    version: u64,
    entries: Vec<DisplayEntry>,
}

#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: HashMap<Entity, SceneNode>,
    root: Vec<Entity>,
    version: u64,
    cache: Option<DisplayCache>,
    rebuilds: u64,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Attach `entity` under `parent` (`None` = root), appending it after
    /// existing siblings. An entity that already sits elsewhere is moved,
    /// together with its subtree.
    pub fn add(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), EcsError> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(&parent) {
                return Err(EcsError::NodeNotFound(parent));
            }
            if parent == entity || self.is_ancestor(entity, parent) {
                return Err(EcsError::CyclicHierarchy {
                    child: entity,
                    parent,
                });
            }
        }

        self.nodes
            .entry(entity)
            .or_insert_with(|| SceneNode::new(entity));
        self.unlink(entity);

        let attachment = match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.push(entity);
                }
                Attachment::Child(parent)
            }
            None => {
                self.root.push(entity);
                Attachment::Root
            }
        };
        if let Some(node) = self.nodes.get_mut(&entity) {
            node.attachment = attachment;
        }
        self.bump();
        Ok(())
    }

    /// Detach `entity` (and its subtree) from its parent. The nodes survive.
    pub fn remove(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.nodes.contains_key(&entity) {
            return Err(EcsError::NodeNotFound(entity));
        }
        self.unlink(entity);
        self.bump();
        Ok(())
    }

    /// Detach `entity` and delete it and every descendant from the tree.
    /// Returns the deleted ids in pre-order.
    pub fn destroy(&mut self, entity: Entity) -> Result<Vec<Entity>, EcsError> {
        if !self.nodes.contains_key(&entity) {
            return Err(EcsError::NodeNotFound(entity));
        }
        self.unlink(entity);

        let mut destroyed = Vec::new();
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.iter().rev());
                destroyed.push(current);
            }
        }
        self.bump();
        Ok(destroyed)
    }

    /// Delete just `entity`'s node. Its children become detached.
    pub(crate) fn evict(&mut self, entity: Entity) -> bool {
        if !self.nodes.contains_key(&entity) {
            return false;
        }
        self.unlink(entity);
        if let Some(node) = self.nodes.remove(&entity) {
            for child in node.children {
                if let Some(child) = self.nodes.get_mut(&child) {
                    child.attachment = Attachment::Detached;
                }
            }
        }
        self.bump();
        true
    }

    /// Delete every node. Returns the ids that were in the tree: the display
    /// list first, then each detached subtree in pre-order, ordered by the
    /// id at its top.
    pub fn clear(&mut self) -> Vec<Entity> {
        let mut detached: Vec<Entity> = self
            .nodes
            .values()
            .filter(|node| node.attachment == Attachment::Detached)
            .map(|node| node.entity)
            .collect();
        detached.sort_unstable();
        let removed: Vec<Entity> = self
            .walk_from(&self.root)
            .into_iter()
            .chain(self.walk_from(&detached))
            .map(|entry| entry.entity)
            .collect();
        self.nodes.clear();
        self.root.clear();
        self.bump();
        removed
    }

    fn unlink(&mut self, entity: Entity) {
        let Some(attachment) = self.nodes.get(&entity).map(|n| n.attachment) else {
            return;
        };
        match attachment {
            Attachment::Detached => return,
            Attachment::Root => self.root.retain(|&e| e != entity),
            Attachment::Child(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|&e| e != entity);
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(&entity) {
            node.attachment = Attachment::Detached;
        }
    }

    /// Whether `ancestor` lies on the parent chain of `node`.
    fn is_ancestor(&self, ancestor: Entity, node: Entity) -> bool {
        let mut current = self.parent(node);
        while let Some(e) = current {
            if e == ancestor {
                return true;
            }
            current = self.parent(e);
        }
        false
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn get(&self, entity: Entity) -> Option<&SceneNode> {
        self.nodes.get(&entity)
    }

    /// Fetch `entity`'s node, materializing a fresh detached node on a miss.
    ///
    /// A detached node does not affect the display list, so this does not
    /// bump the version.
    pub fn get_or_create(&mut self, entity: Entity) -> &SceneNode {
        self.nodes
            .entry(entity)
            .or_insert_with(|| SceneNode::new(entity))
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.nodes.get(&entity)?.parent()
    }

    pub fn children(&self, entity: Entity) -> Option<&[Entity]> {
        self.nodes.get(&entity).map(SceneNode::children)
    }

    /// Top-level nodes, in sibling order.
    pub fn root_children(&self) -> &[Entity] {
        &self.root
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.nodes.contains_key(&entity)
    }

    /// Whether `entity` is reachable from the root.
    pub fn is_attached(&self, entity: Entity) -> bool {
        let mut current = entity;
        loop {
            match self.nodes.get(&current).map(|n| n.attachment) {
                Some(Attachment::Root) => return true,
                Some(Attachment::Child(parent)) => current = parent,
                Some(Attachment::Detached) | None => return false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Structural version; bumps on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// How many times the display list has been rebuilt.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Pre-order walk of everything reachable from the root, cached against
    /// the structural version.
    pub fn display_list(&mut self) -> &[DisplayEntry] {
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|cache| cache.version != self.version);
        if stale {
            let entries = self.walk();
            self.rebuilds += 1;
            log::trace!(
                "display list rebuilt: {} entries at version {}",
                entries.len(),
                self.version
            );
            self.cache = Some(DisplayCache {
                version: self.version,
                entries,
            });
        }
        self.cache
            .as_ref()
            .map(|cache| cache.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Visit every node in display-list order (or its reverse).
    ///
    /// Going forward, `visit` receives the value it returned for the node's
    /// parent (`seed` for top-level nodes), which lets parents hand data such
    /// as a world matrix down to their children. Going in reverse, children
    /// come before their parents, so every node receives `seed`.
    ///
    /// Fails with `NodeNotFound` if a cached row names a parent that is no
    /// longer in the node table. Every structural edit bumps the version and
    /// so rebuilds the rows first; this only trips when the rows and the
    /// table have been changed out of step.
    pub fn for_each<A>(
        &mut self,
        seed: A,
        reverse: bool,
        mut visit: impl FnMut(Entity, Option<Entity>, &A) -> A,
    ) -> Result<(), EcsError> {
        self.display_list();
        let Some(cache) = self.cache.as_ref() else {
            return Ok(());
        };
        let nodes = &self.nodes;
        let check_parent = |parent: Option<Entity>| match parent {
            Some(p) if !nodes.contains_key(&p) => Err(EcsError::NodeNotFound(p)),
            _ => Ok(()),
        };

        if reverse {
            for entry in cache.entries.iter().rev() {
                check_parent(entry.parent)?;
                visit(entry.entity, entry.parent, &seed);
            }
            return Ok(());
        }

        let mut carried: HashMap<Entity, A> = HashMap::with_capacity(cache.entries.len());
        for entry in &cache.entries {
            check_parent(entry.parent)?;
            let input = match entry.parent {
                None => &seed,
                Some(parent) => carried
                    .get(&parent)
                    .ok_or(EcsError::NodeNotFound(parent))?,
            };
            let output = visit(entry.entity, entry.parent, input);
            carried.insert(entry.entity, output);
        }
        Ok(())
    }

    fn walk(&self) -> Vec<DisplayEntry> {
        self.walk_from(&self.root)
    }

    /// Pre-order walk of the subtrees under `tops`, in order.
    fn walk_from(&self, tops: &[Entity]) -> Vec<DisplayEntry> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<DisplayEntry> = tops
            .iter()
            .rev()
            .map(|&entity| DisplayEntry {
                entity,
                parent: None,
            })
            .collect();
        while let Some(entry) = stack.pop() {
            out.push(entry);
            if let Some(node) = self.nodes.get(&entry.entity) {
                stack.extend(node.children.iter().rev().map(|&child| DisplayEntry {
                    entity: child,
                    parent: Some(entry.entity),
                }));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    fn entities(tree: &mut SceneTree) -> Vec<u32> {
        tree.display_list().iter().map(|d| d.entity.id()).collect()
    }

    /// ```text
    /// 0
    /// ├── 1
    /// │   └── 3
    /// └── 2
    /// 4
    /// ```
    fn sample() -> SceneTree {
        let mut tree = SceneTree::new();
        tree.add(e(0), None).unwrap();
        tree.add(e(1), Some(e(0))).unwrap();
        tree.add(e(2), Some(e(0))).unwrap();
        tree.add(e(3), Some(e(1))).unwrap();
        tree.add(e(4), None).unwrap();
        tree
    }

    #[test]
    fn display_list_is_preorder() {
        let mut tree = sample();
        assert_eq!(entities(&mut tree), vec![0, 1, 3, 2, 4]);
        let list = tree.display_list();
        assert_eq!(list[0].parent, None);
        assert_eq!(list[2].parent, Some(e(1)));
        assert_eq!(list[4].parent, None);
    }

    #[test]
    fn cache_rebuilds_only_on_version_change() {
        let mut tree = sample();
        tree.display_list();
        tree.display_list();
        assert_eq!(tree.rebuild_count(), 1);

        tree.add(e(5), Some(e(4))).unwrap();
        tree.display_list();
        tree.display_list();
        assert_eq!(tree.rebuild_count(), 2);

        // Lazy materialization is not structural.
        tree.get_or_create(e(9));
        tree.display_list();
        assert_eq!(tree.rebuild_count(), 2);
    }

    #[test]
    fn reparent_moves_subtree_in_order() {
        let mut tree = sample();
        tree.add(e(1), Some(e(4))).unwrap();
        assert_eq!(tree.parent(e(1)), Some(e(4)));
        assert_eq!(tree.children(e(0)), Some(&[e(2)][..]));
        assert_eq!(tree.children(e(1)), Some(&[e(3)][..]));
        assert_eq!(entities(&mut tree), vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn remove_detaches_but_keeps_nodes() {
        let mut tree = sample();
        tree.remove(e(1)).unwrap();
        assert_eq!(entities(&mut tree), vec![0, 2, 4]);
        assert!(tree.contains(e(1)));
        assert!(tree.contains(e(3)));
        assert!(!tree.is_attached(e(3)));
        assert_eq!(tree.children(e(1)), Some(&[e(3)][..]));

        // Re-attaching brings the subtree back.
        tree.add(e(1), None).unwrap();
        assert_eq!(entities(&mut tree), vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn destroy_deletes_descendants() {
        let mut tree = sample();
        let destroyed = tree.destroy(e(0)).unwrap();
        assert_eq!(destroyed, vec![e(0), e(1), e(3), e(2)]);
        assert_eq!(entities(&mut tree), vec![4]);
        for gone in [0, 1, 2, 3] {
            assert!(tree.get(e(gone)).is_none());
        }

        // Re-materializes fresh and childless.
        let node = tree.get_or_create(e(1));
        assert!(node.children().is_empty());
        assert_eq!(node.attachment(), Attachment::Detached);
    }

    #[test]
    fn missing_nodes_are_errors() {
        let mut tree = sample();
        assert_eq!(tree.remove(e(42)), Err(EcsError::NodeNotFound(e(42))));
        assert_eq!(tree.destroy(e(42)), Err(EcsError::NodeNotFound(e(42))));
        assert_eq!(tree.add(e(5), Some(e(42))), Err(EcsError::NodeNotFound(e(42))));
        assert!(!tree.contains(e(5)));
    }

    #[test]
    fn cycles_rejected() {
        let mut tree = sample();
        let version = tree.version();
        assert_eq!(
            tree.add(e(0), Some(e(3))),
            Err(EcsError::CyclicHierarchy { child: e(0), parent: e(3) })
        );
        assert_eq!(
            tree.add(e(1), Some(e(1))),
            Err(EcsError::CyclicHierarchy { child: e(1), parent: e(1) })
        );
        assert_eq!(tree.version(), version);
    }

    #[test]
    fn evict_orphans_children() {
        let mut tree = sample();
        assert!(tree.evict(e(1)));
        assert!(!tree.contains(e(1)));
        assert_eq!(tree.get(e(3)).unwrap().attachment(), Attachment::Detached);
        assert_eq!(entities(&mut tree), vec![0, 2, 4]);
    }

    #[test]
    fn for_each_threads_values_downward() {
        let mut tree = sample();
        let mut depths = Vec::new();
        tree.for_each(0u32, false, |entity, _, &depth| {
            depths.push((entity.id(), depth));
            depth + 1
        })
        .unwrap();
        assert_eq!(depths, vec![(0, 0), (1, 1), (3, 2), (2, 1), (4, 0)]);
    }

    #[test]
    fn for_each_reverse_visits_children_first() {
        let mut tree = sample();
        let mut order = Vec::new();
        tree.for_each((), true, |entity, _, _| order.push(entity.id()))
            .unwrap();
        assert_eq!(order, vec![4, 2, 3, 1, 0]);
    }

    #[test]
    fn for_each_uses_cache() {
        let mut tree = sample();
        tree.for_each((), false, |_, _, _| ()).unwrap();
        tree.for_each((), true, |_, _, _| ()).unwrap();
        assert_eq!(tree.rebuild_count(), 1);
    }

    #[test]
    fn clear_empties_tree_in_order() {
        let mut tree = sample();
        tree.remove(e(1)).unwrap();
        tree.get_or_create(e(9));
        tree.get_or_create(e(7));
        let removed: Vec<u32> = tree.clear().into_iter().map(Entity::id).collect();
        assert_eq!(removed, vec![0, 2, 4, 1, 3, 7, 9]);
        assert!(tree.is_empty());
        assert!(tree.display_list().is_empty());
    }

    #[test]
    fn for_each_rejects_rows_with_vanished_parent() {
        let mut tree = sample();
        tree.display_list();
        // Drop a node without bumping the version, so the cached rows go
        // out of step with the node table.
        tree.nodes.remove(&e(1));
        assert_eq!(
            tree.for_each((), false, |_, _, _| ()),
            Err(EcsError::NodeNotFound(e(1)))
        );
        assert_eq!(
            tree.for_each((), true, |_, _, _| ()),
            Err(EcsError::NodeNotFound(e(1)))
        );
        assert_eq!(tree.rebuild_count(), 1);
    }
}
