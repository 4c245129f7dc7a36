//! Minimal transform tree for positioning listeners and emitters.
//!
//! The scene graph here is deliberately small: nodes with a local transform
//! and an optional parent back-reference, resolved to world space on demand.
//! The host application owns the graph and finalizes transforms for a frame
//! before handing it to [`AudioStage::update_frame`](crate::binding::AudioStage::update_frame).

use crate::math::{Mat4, Pose, Quat, Vec3};
use std::collections::HashMap;

/// Lightweight, type-safe handle for scene nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

struct Node {
    transform: Transform,
    parent: Option<NodeId>,
}

/// A tree of transformable nodes, addressed by [`NodeId`].
///
/// World transforms are resolved by walking the parent chain and composing
/// local matrices. Resolution returns `None` for nodes that have been removed
/// or whose ancestry is broken (missing parent, cycle); callers decide how to
/// degrade.
#[derive(Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    next_node_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root node with the given local transform.
    pub fn add_node(&mut self, transform: Transform) -> NodeId {
        self.insert(transform, None)
    }

    /// Adds a node parented to `parent`. The parent reference is non-owning:
    /// removing the parent later leaves the child in place with unresolvable
    /// ancestry.
    pub fn add_child(&mut self, parent: NodeId, transform: Transform) -> NodeId {
        self.insert(transform, Some(parent))
    }

    fn insert(&mut self, transform: Transform, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node { transform, parent });
        id
    }

    /// Removes a node. Children are not removed; their world transforms
    /// become unresolvable until re-parented.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform.position = position;
                true
            }
            None => false,
        }
    }

    /// Re-parents a node (`None` makes it a root). The graph does not forbid
    /// cycles here; resolution detects them and fails soft.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.parent = parent;
                true
            }
            None => false,
        }
    }

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|n| n.transform)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Resolves the world matrix of `id` by composing the parent chain.
    ///
    /// Returns `None` if the node or any ancestor is missing, or if the
    /// ancestry contains a cycle (logged, not fatal).
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        let mut hops = 0usize;

        while let Some(node_id) = current {
            let node = self.nodes.get(&node_id)?;
            chain.push(node.transform.to_matrix());
            current = node.parent;

            hops += 1;
            if hops > self.nodes.len() {
                log::error!("Cyclic parent chain detected while resolving {}", id);
                return None;
            }
        }

        // Chain is child-first; compose root-first.
        let mut world = Mat4::IDENTITY;
        for local in chain.iter().rev() {
            world *= *local;
        }
        Some(world)
    }

    /// World position of a node, if resolvable.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|m| m.w_axis.truncate())
    }

    /// World pose (position + orientation, scale discarded) of a node.
    pub fn world_pose(&self, id: NodeId) -> Option<Pose> {
        self.world_matrix(id).map(|m| {
            let (_, rotation, translation) = m.to_scale_rotation_translation();
            Pose::new(translation, rotation)
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_world_position_is_local_position() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(Transform::from_position(Vec3::X));
        assert_eq!(scene.world_position(node), Some(Vec3::X));
    }

    #[test]
    fn child_composes_with_parent() {
        let mut scene = SceneGraph::new();
        let parent = scene.add_node(Transform::from_position(Vec3::X));
        let child = scene.add_child(parent, Transform::from_position(Vec3::Y));
        assert_eq!(scene.world_position(child), Some(Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn multi_level_hierarchy_composes() {
        let mut scene = SceneGraph::new();
        let grandparent = scene.add_node(Transform::from_position(Vec3::X));
        let parent = scene.add_child(grandparent, Transform::from_position(Vec3::Y));
        let child = scene.add_child(parent, Transform::from_position(Vec3::Z));
        assert_eq!(scene.world_position(child), Some(Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn parent_scale_propagates_to_child() {
        let mut scene = SceneGraph::new();
        let parent = scene.add_node(Transform {
            scale: Vec3::splat(2.0),
            ..Default::default()
        });
        let child = scene.add_child(parent, Transform::from_position(Vec3::X));
        assert_eq!(scene.world_position(child), Some(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn removed_node_is_unresolvable() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(Transform::default());
        assert!(scene.remove_node(node));
        assert_eq!(scene.world_position(node), None);
        assert!(!scene.remove_node(node));
    }

    #[test]
    fn child_of_removed_parent_is_unresolvable() {
        let mut scene = SceneGraph::new();
        let parent = scene.add_node(Transform::default());
        let child = scene.add_child(parent, Transform::from_position(Vec3::X));
        scene.remove_node(parent);
        assert_eq!(scene.world_position(child), None);
        assert!(scene.contains(child));
    }

    #[test]
    fn moving_parent_moves_child() {
        let mut scene = SceneGraph::new();
        let parent = scene.add_node(Transform::default());
        let child = scene.add_child(parent, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));

        scene.set_position(parent, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(scene.world_position(child), Some(Vec3::new(10.0, 5.0, 0.0)));
    }

    #[test]
    fn cyclic_ancestry_fails_soft() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(Transform::default());
        let b = scene.add_child(a, Transform::default());
        scene.set_parent(a, Some(b));

        assert_eq!(scene.world_matrix(a), None);
        assert_eq!(scene.world_matrix(b), None);
        // Nodes survive; only resolution fails.
        assert!(scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn world_pose_carries_rotation() {
        let mut scene = SceneGraph::new();
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let node = scene.add_node(Transform::from_position_rotation(Vec3::ZERO, rotation));

        let pose = scene.world_pose(node).unwrap();
        // Forward (-Z) rotated 90 degrees around Y points toward -X.
        assert!((pose.forward() - (-Vec3::X)).length() < 1e-5);
    }
}
