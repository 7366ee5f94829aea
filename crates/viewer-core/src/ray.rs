use crate::scene::Aabb;
use glam::{Mat4, Vec3};

const EPSILON: f32 = 1e-7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Map the ray through `m` without renormalising, so a parameter `t` names
    /// the same point before and after the transform.
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            dir: m.transform_vector3(self.dir),
        }
    }
}

/// Slab test. Returns the entry parameter, or the exit parameter when the
/// origin is inside the box.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv = Vec3::new(
        if ray.dir.x != 0.0 { 1.0 / ray.dir.x } else { f32::INFINITY },
        if ray.dir.y != 0.0 { 1.0 / ray.dir.y } else { f32::INFINITY },
        if ray.dir.z != 0.0 { 1.0 / ray.dir.z } else { f32::INFINITY },
    );
    let t0 = (aabb.min - ray.origin) * inv;
    let t1 = (aabb.max - ray.origin) * inv;
    // 0 * inf produces NaN for rays lying in a slab plane; min/max drop NaN
    let tmin = t0.min(t1).max_element();
    let tmax = t0.max(t1).min_element();
    if tmax < tmin.max(0.0) {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}

/// Möller–Trumbore, both windings accepted.
pub fn ray_triangle(ray: &Ray, tri: &[Vec3; 3]) -> Option<f32> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = ray.dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        }
    }

    #[test]
    fn aabb_hit_from_outside() {
        let r = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(ray_aabb(&r, &unit_box()), Some(4.0));
    }

    #[test]
    fn aabb_behind_origin_misses() {
        let r = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(ray_aabb(&r, &unit_box()), None);
    }

    #[test]
    fn aabb_from_inside_reports_exit() {
        let r = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray_aabb(&r, &unit_box()), Some(1.0));
    }

    #[test]
    fn triangle_hit_and_miss() {
        let tri = [Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let hit = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!((ray_triangle(&hit, &tri).unwrap() - 3.0).abs() < 1e-6);
        // back side still counts
        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        assert!(ray_triangle(&back, &tri).is_some());
        let miss = Ray::new(Vec3::new(5.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(ray_triangle(&miss, &tri).is_none());
    }

    #[test]
    fn transformed_ray_keeps_parameter() {
        let r = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let m = Mat4::from_scale(Vec3::splat(0.5));
        let local = r.transformed(&m);
        assert_eq!(m.transform_point3(r.at(4.0)), local.at(4.0));
    }
}
