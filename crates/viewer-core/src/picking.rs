use crate::camera::{pointer_to_ndc, PerspectiveCamera};
use crate::ray::{ray_aabb, ray_triangle, Ray};
use crate::registry::PickTargetRegistry;
use crate::scene::{NodeId, SceneGraph};
use glam::{Mat4, Vec2};

#[derive(Clone, Debug, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub name: String,
    /// World-space distance from the camera along the pick ray.
    pub distance: f32,
}

/// Resolve the registered object under the pointer, if any.
///
/// `pointer` is in client pixels, `viewport` the client size in pixels and
/// `model_root` the placement applied on top of the scene's own transforms.
/// Nothing is cached; every call casts a fresh ray.
pub fn resolve(
    pointer: Vec2,
    viewport: Vec2,
    camera: &PerspectiveCamera,
    scene: &SceneGraph,
    registry: &PickTargetRegistry,
    model_root: Mat4,
) -> Option<PickHit> {
    let ray = camera.ray_from_ndc(pointer_to_ndc(pointer, viewport));
    pick_nearest(&ray, scene, registry, model_root)
}

/// Nearest registered hit along a world-space ray. Equal distances keep the
/// earlier registry entry.
pub fn pick_nearest(
    ray: &Ray,
    scene: &SceneGraph,
    registry: &PickTargetRegistry,
    model_root: Mat4,
) -> Option<PickHit> {
    let mut best: Option<(NodeId, f32)> = None;
    for &id in registry.targets() {
        let Some(t) = intersect_node(ray, scene, id, model_root) else {
            continue;
        };
        match best {
            Some((_, bt)) if t >= bt => {}
            _ => best = Some((id, t)),
        }
    }
    let (node, distance) = best?;
    let name = scene.node(node).map(|n| n.name.clone()).unwrap_or_default();
    Some(PickHit {
        node,
        name,
        distance,
    })
}

/// Closest triangle hit on one node's mesh, in world-ray parameter units.
pub fn intersect_node(ray: &Ray, scene: &SceneGraph, id: NodeId, model_root: Mat4) -> Option<f32> {
    let node = scene.node(id)?;
    let mesh = scene.mesh(node.mesh?)?;
    let world = model_root * node.world;
    if world.determinant().abs() < f32::EPSILON * f32::EPSILON {
        // collapsed (e.g. zero scale): nothing to hit
        return None;
    }
    let local = ray.transformed(&world.inverse());
    ray_aabb(&local, &mesh.bounds()?)?;

    let mut nearest: Option<f32> = None;
    for prim in &mesh.primitives {
        if ray_aabb(&local, &prim.bounds).is_none() {
            continue;
        }
        for tri in prim.triangles() {
            if let Some(t) = ray_triangle(&local, &tri) {
                if nearest.map_or(true, |n| t < n) {
                    nearest = Some(t);
                }
            }
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshData, Primitive, SceneNode};
    use glam::Vec3;
    use smallvec::smallvec;

    fn quad_mesh() -> MeshData {
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        let prim = Primitive::new(positions, None, vec![0, 1, 2, 0, 2, 3], [1.0; 4]).unwrap();
        MeshData {
            name: None,
            primitives: smallvec![prim],
        }
    }

    #[test]
    fn zero_scale_root_hits_nothing() {
        let mut g = SceneGraph::new();
        let mesh = g.add_mesh(quad_mesh());
        let n = g.add_node(SceneNode::new("sign", Mat4::IDENTITY, Some(mesh)));
        g.add_root(n);
        g.update_world_transforms();
        let reg = PickTargetRegistry::build(&g);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(pick_nearest(&ray, &g, &reg, Mat4::IDENTITY).is_some());
        assert!(pick_nearest(&ray, &g, &reg, Mat4::from_scale(Vec3::ZERO)).is_none());
    }

    #[test]
    fn distance_accounts_for_model_root_scale() {
        let mut g = SceneGraph::new();
        let mesh = g.add_mesh(quad_mesh());
        let n = g.add_node(SceneNode::new(
            "sign",
            Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0)),
            Some(mesh),
        ));
        g.add_root(n);
        g.update_world_transforms();
        let reg = PickTargetRegistry::build(&g);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = pick_nearest(&ray, &g, &reg, Mat4::from_scale(Vec3::splat(0.5))).unwrap();
        // plane sits at z = -2 after the half scale
        assert!((hit.distance - 12.0).abs() < 1e-4);
    }
}
