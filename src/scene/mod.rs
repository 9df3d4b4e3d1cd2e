pub mod context;

use crate::objects::material::Material;
use crate::objects::triangle_mesh::TriangleMesh;
use id_arena::{Arena, Id};
use nalgebra::{Matrix4, Rotation3, Vector3};
use std::sync::Arc;

pub type NodeId = Id<Node>;

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), self.rotation.x)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.rotation.y)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.z);
        Matrix4::new_translation(&self.position)
            * rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

/// A spatial entity. `children` is the owning edge of the tree, `parent` is
/// only a lookup handle.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<Arc<TriangleMesh>>,
    pub material: Option<Box<Material>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn mesh(name: impl Into<String>, mesh: Arc<TriangleMesh>, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            material: Some(Box::new(material)),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether a ray or the rasterizer has anything to hit.
    pub fn is_renderable(&self) -> bool {
        self.mesh.as_ref().is_some_and(|mesh| !mesh.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    nodes: Arena<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` as a new root.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = self.nodes.alloc(node);
        self.roots.push(id);
        id
    }

    /// Inserts `node` under `parent`. Returns `None` if `parent` is not in this scene.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        self.nodes.get(parent)?;
        node.parent = Some(parent);
        let id = self.nodes.alloc(node);
        self.nodes.get_mut(parent)?.children.push(id);
        Some(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Local-to-world matrix, composed from the root down.
    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get(id)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// `root` and everything below it, parents before children, siblings in
    /// insertion order.
    pub fn descendants_depth_first(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Calls `f` for every renderable node with its world matrix.
    pub fn for_each_mesh<F>(&self, mut f: F)
    where
        F: FnMut(NodeId, &Node, &Matrix4<f64>),
    {
        let mut stack: Vec<(NodeId, Matrix4<f64>)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Matrix4::identity()))
            .collect();

        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let world = parent_matrix * node.transform.matrix();
            if node.is_renderable() {
                f(id, node, &world);
            }
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}
