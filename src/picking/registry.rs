use crate::scene::{NodeId, Scene};
use std::collections::HashSet;

/// Flat list of ray-testable nodes. Holds handles only; the [`Scene`] owns the nodes.
#[derive(Debug, Default, Clone)]
pub struct PickableRegistry {
    pickables: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl PickableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `root` depth-first and appends every renderable node not already
    /// registered. Returns how many were added.
    pub fn register(&mut self, scene: &Scene, root: NodeId) -> usize {
        let before = self.pickables.len();
        for id in scene.descendants_depth_first(root) {
            let renderable = scene.node(id).is_some_and(|node| node.is_renderable());
            if renderable && self.seen.insert(id) {
                self.pickables.push(id);
            }
        }
        self.pickables.len() - before
    }

    pub fn snapshot(&self) -> &[NodeId] {
        &self.pickables
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.pickables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickables.is_empty()
    }
}
