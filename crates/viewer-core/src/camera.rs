use crate::constants::*;
use crate::ray::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y: CAMERA_FOV_Y_DEG.to_radians(),
            aspect,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed projection with a 0..1 depth range (WebGPU clip space).
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-6), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray from the eye through a point in normalised device
    /// coordinates (x right, y up, both in -1..1).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let p_far = far.truncate() / far.w;
        let dir = (p_far - self.eye).normalize_or_zero();
        Ray::new(self.eye, dir)
    }
}

/// Convert a pointer position in client pixels to device coordinates.
/// Screen y grows downward, device y grows upward.
#[inline]
pub fn pointer_to_ndc(client: Vec2, viewport: Vec2) -> Vec2 {
    let w = viewport.x.max(1.0);
    let h = viewport.y.max(1.0);
    Vec2::new(client.x / w * 2.0 - 1.0, -(client.y / h) * 2.0 + 1.0)
}

/// Spherical coordinates around the +Y axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

/// Orbit camera around a fixed target: drag rotates, wheel dollies, no pan.
///
/// Input accumulates into pending deltas that `update` releases with
/// exponential damping, so a flick keeps gliding for a moment.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_step: f32,
    pub enable_damping: bool,
    camera: PerspectiveCamera,
    pending: Spherical,
    pending_scale: f32,
}

impl OrbitControls {
    pub fn new(camera: PerspectiveCamera) -> Self {
        let mut controls = Self {
            target: camera.target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            damping_factor: ORBIT_DAMPING_FACTOR,
            rotate_speed: ORBIT_ROTATE_SPEED,
            zoom_step: ORBIT_ZOOM_STEP,
            enable_damping: true,
            camera,
            pending: Spherical::default(),
            pending_scale: 1.0,
        };
        controls.camera.target = controls.target;
        controls
    }

    /// The viewer's configured orbit: start position, limits and damping.
    pub fn with_viewer_defaults(aspect: f32) -> Self {
        let mut controls = Self::new(PerspectiveCamera::new(CAMERA_START, ORBIT_TARGET, aspect));
        controls.min_distance = ORBIT_MIN_DISTANCE;
        controls.max_distance = ORBIT_MAX_DISTANCE;
        controls.min_polar = ORBIT_MIN_POLAR;
        controls.max_polar = ORBIT_MAX_POLAR;
        // settle into the limits immediately
        controls.update(0.0);
        controls
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }

    pub fn distance(&self) -> f32 {
        (self.camera.eye - self.target).length()
    }

    pub fn polar_angle(&self) -> f32 {
        Spherical::from_offset(self.camera.eye - self.target).phi
    }

    /// Queue a rotation from a pointer drag of `(dx, dy)` pixels. A drag the
    /// full viewport height turns the camera once around.
    pub fn rotate_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending.theta -= TAU * dx * self.rotate_speed / h;
        self.pending.phi -= TAU * dy * self.rotate_speed / h;
    }

    /// Queue a dolly step from a wheel event; negative `delta_y` moves closer.
    pub fn dolly(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.pending_scale *= self.zoom_step;
        } else if delta_y > 0.0 {
            self.pending_scale /= self.zoom_step;
        }
    }

    /// Apply pending input and limits. Returns true when the camera moved.
    pub fn update(&mut self, dt_sec: f32) -> bool {
        let before = self.camera.eye;
        let mut s = Spherical::from_offset(self.camera.eye - self.target);

        let k = if self.enable_damping {
            frame_damping(self.damping_factor, dt_sec)
        } else {
            1.0
        };
        s.theta += self.pending.theta * k;
        s.phi += self.pending.phi * k;

        s.phi = s.phi.clamp(self.min_polar, self.max_polar);
        // keep away from the poles where the look-at basis degenerates
        s.phi = s.phi.clamp(1e-6, PI - 1e-6);

        s.radius = (s.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        self.camera.eye = self.target + s.to_offset();
        self.camera.target = self.target;

        if self.enable_damping {
            self.pending.theta *= 1.0 - k;
            self.pending.phi *= 1.0 - k;
        } else {
            self.pending = Spherical::default();
        }
        self.pending_scale = 1.0;

        (self.camera.eye - before).length_squared() > 1e-12
    }
}

/// Damping share for a frame of `dt_sec`, equivalent to applying
/// `factor` once per reference frame.
#[inline]
fn frame_damping(factor: f32, dt_sec: f32) -> f32 {
    let frames = (dt_sec.max(0.0)) * ORBIT_REFERENCE_FPS;
    (1.0 - (1.0 - factor.clamp(0.0, 1.0)).powf(frames)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_and_center() {
        let vp = Vec2::new(800.0, 600.0);
        assert_eq!(pointer_to_ndc(Vec2::new(0.0, 0.0), vp), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(Vec2::new(800.0, 600.0), vp), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(Vec2::new(400.0, 300.0), vp), Vec2::ZERO);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = PerspectiveCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 1.5);
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, cam.eye);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(7.0, 1.0, -21.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!((back - v).length() < 1e-4);
    }

    #[test]
    fn damping_share_is_zero_for_no_time_and_grows() {
        assert_eq!(frame_damping(0.05, 0.0), 0.0);
        let one = frame_damping(0.05, 1.0 / 60.0);
        assert!((one - 0.05).abs() < 1e-5);
        assert!(frame_damping(0.05, 1.0) > 0.9);
    }
}
