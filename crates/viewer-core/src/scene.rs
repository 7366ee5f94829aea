use glam::{Mat4, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Axis-aligned bounds in a mesh's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One indexed triangle list with a flat base colour.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    pub bounds: Aabb,
}

impl Primitive {
    /// Build a primitive, deriving smooth normals when none are supplied.
    /// Returns `None` for empty geometry.
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        indices: Vec<u32>,
        base_color: [f32; 4],
    ) -> Option<Self> {
        let bounds = Aabb::from_points(&positions)?;
        let normals = match normals {
            Some(n) if n.len() == positions.len() => n,
            _ => smooth_normals(&positions, &indices),
        };
        Some(Self {
            positions,
            normals,
            indices,
            base_color,
            bounds,
        })
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: Option<String>,
    pub primitives: SmallVec<[Primitive; 2]>,
}

impl MeshData {
    pub fn bounds(&self) -> Option<Aabb> {
        let mut it = self.primitives.iter().map(|p| p.bounds);
        let first = it.next()?;
        Some(it.fold(first, |acc, b| acc.union(&b)))
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub local: Mat4,
    /// Transform relative to the scene root, before the model placement.
    pub world: Mat4,
    pub mesh: Option<MeshId>,
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, local: Mat4, mesh: Option<MeshId>) -> Self {
        Self {
            name: name.into(),
            local,
            world: local,
            mesh,
            children: Vec::new(),
        }
    }

    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }
}

/// Arena-backed scene graph. Nodes and meshes are referenced by index.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
    meshes: Vec<MeshData>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(child);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first pre-order over nodes reachable from the roots.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            // glTF forbids cycles and shared children; skip them if present
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Recompute every reachable node's `world` from its ancestors' local transforms.
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        let mut visited = vec![false; self.nodes.len()];
        while let Some((id, parent)) = stack.pop() {
            if id.0 >= self.nodes.len() || std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            let node = &mut self.nodes[id.0];
            node.world = parent * node.local;
            let world = node.world;
            stack.extend(node.children.iter().rev().map(|c| (*c, world)));
        }
    }

    /// Nodes carrying geometry, in traversal order.
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode, &MeshData)> + '_ {
        self.traverse().into_iter().filter_map(move |id| {
            let node = self.node(id)?;
            let mesh = self.mesh(node.mesh?)?;
            Some((id, node, mesh))
        })
    }
}

fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        // area weighted
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(name: &str) -> SceneNode {
        SceneNode::new(name, Mat4::IDENTITY, None)
    }

    #[test]
    fn traverse_is_preorder_with_children_in_order() {
        let mut g = SceneGraph::new();
        let a = g.add_node(empty("a"));
        let a1 = g.add_node(empty("a1"));
        let a2 = g.add_node(empty("a2"));
        let b = g.add_node(empty("b"));
        g.add_child(a, a1);
        g.add_child(a, a2);
        g.add_root(a);
        g.add_root(b);
        let names: Vec<_> = g
            .traverse()
            .into_iter()
            .map(|id| g.node(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, ["a", "a1", "a2", "b"]);
    }

    #[test]
    fn world_transform_composes_parent_first() {
        let mut g = SceneGraph::new();
        let parent = g.add_node(SceneNode::new(
            "p",
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            None,
        ));
        let child = g.add_node(SceneNode::new("c", Mat4::from_scale(Vec3::splat(2.0)), None));
        g.add_child(parent, child);
        g.add_root(parent);
        g.update_world_transforms();
        let p = g.node(child).unwrap().world.transform_point3(Vec3::X);
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn generated_normals_face_out_of_ccw_triangle() {
        let prim = Primitive::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            vec![0, 1, 2],
            [1.0; 4],
        )
        .unwrap();
        assert!(prim.normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn empty_primitive_is_rejected() {
        assert!(Primitive::new(vec![], None, vec![], [1.0; 4]).is_none());
    }
}
