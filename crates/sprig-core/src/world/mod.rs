//! Entity arena and typed component storage.
//!
//! Entities are generational handles into an arena. Parent and child links are
//! stored as entity IDs and resolved through the arena, never as owning
//! pointers. Components live in one [`Storage`] per component type.

use crate::{
    alloc::sparse_set::{IndexSlot, SparseSet},
    profiling::profile_function,
};
use thiserror::Error;

mod storage;
mod transform;

pub use storage::Storage;
pub use transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(IndexSlot);

impl Entity {
    /// Slot index, stable for the lifetime of the entity.
    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("entity {0:?} is not alive")]
    StaleEntity(Entity),
    #[error("making {parent:?} the parent of {child:?} would create a cycle")]
    Cycle { child: Entity, parent: Entity },
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<Entity>,
    children: Vec<Entity>,
}

/// Arena of live entities and the parent/child forest over them.
#[derive(Default)]
pub struct Entities {
    nodes: SparseSet<Node>,
    roots: Vec<Entity>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new root entity.
    pub fn spawn(&mut self) -> Entity {
        profile_function!();
        let entity = Entity(self.nodes.push(Node::default()));
        self.roots.push(entity);
        entity
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.nodes.contains(entity.0)
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.nodes.try_get(entity.0).and_then(|node| node.parent)
    }

    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.nodes
            .try_get(entity.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Remove `entity`. Its children are detached and become roots, in order.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), HierarchyError> {
        profile_function!();
        let node = self
            .nodes
            .try_remove(entity.0)
            .ok_or(HierarchyError::StaleEntity(entity))?;
        self.unlink(entity, node.parent);
        for child in node.children {
            if let Some(child_node) = self.nodes.try_get_mut(child.0) {
                child_node.parent = None;
                self.roots.push(child);
            }
        }
        Ok(())
    }

    /// Attach `child` under `parent`, or make it a root again with `None`.
    ///
    /// The child is appended after the parent's existing children.
    pub fn set_parent(
        &mut self,
        child: Entity,
        parent: Option<Entity>,
    ) -> Result<(), HierarchyError> {
        if !self.is_alive(child) {
            return Err(HierarchyError::StaleEntity(child));
        }
        if let Some(parent) = parent {
            if !self.is_alive(parent) {
                return Err(HierarchyError::StaleEntity(parent));
            }
            if self.ancestors_inclusive(parent).any(|e| e == child) {
                return Err(HierarchyError::Cycle { child, parent });
            }
        }

        let old_parent = self.parent(child);
        self.unlink(child, old_parent);
        match parent {
            Some(parent) => {
                self.nodes.get_mut(parent.0).children.push(child);
            }
            None => self.roots.push(child),
        }
        self.nodes.get_mut(child.0).parent = parent;
        Ok(())
    }

    fn unlink(&mut self, entity: Entity, parent: Option<Entity>) {
        let siblings = match parent.and_then(|p| self.nodes.try_get_mut(p.0)) {
            Some(node) => &mut node.children,
            None => &mut self.roots,
        };
        siblings.retain(|e| *e != entity);
    }

    /// `entity`, then its parent, then its grandparent, up to the root.
    pub fn ancestors_inclusive(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        let start = self.is_alive(entity).then_some(entity);
        std::iter::successors(start, move |e| self.parent(*e))
    }

    /// Depth-first pre-order walk: roots in spawn order, each followed by its
    /// children in attachment order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            entities: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

pub struct DepthFirst<'a> {
    entities: &'a Entities,
    stack: Vec<Entity>,
}

impl Iterator for DepthFirst<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let entity = self.stack.pop()?;
        self.stack
            .extend(self.entities.children(entity).iter().rev().copied());
        Some(entity)
    }
}
