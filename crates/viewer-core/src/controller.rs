use crate::animator::ScaleAnimator;
use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::constants::MODEL_POSITION;
use crate::interaction::{CursorStyle, InteractionController, Popup};
use crate::picking::{self, PickHit};
use crate::registry::PickTargetRegistry;
use crate::resize::compute_target_scale;
use crate::scene::SceneGraph;
use glam::{Mat4, Quat, Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed,
}

/// All mutable viewer state, driven by the host's event and frame callbacks.
///
/// Every callback runs on the same thread, so there is no locking; the host
/// keeps this behind a single `Rc<RefCell<_>>`.
pub struct SceneController {
    viewport: Vec2,
    target_scale: f32,
    animator: ScaleAnimator,
    scene: Option<SceneGraph>,
    registry: PickTargetRegistry,
    interaction: InteractionController,
    orbit: OrbitControls,
    load_state: LoadState,
}

impl SceneController {
    /// `viewport` is the client area in CSS pixels.
    pub fn new(viewport: Vec2) -> Self {
        let viewport = viewport.max(Vec2::ONE);
        Self {
            viewport,
            target_scale: 1.0,
            animator: ScaleAnimator::default(),
            scene: None,
            registry: PickTargetRegistry::empty(),
            interaction: InteractionController::new(),
            orbit: OrbitControls::with_viewer_defaults(viewport.x / viewport.y),
            load_state: LoadState::Loading,
        }
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height).max(Vec2::ONE);
        self.orbit.set_aspect(self.viewport.x / self.viewport.y);
        self.target_scale = compute_target_scale(width);
    }

    /// Take ownership of a freshly loaded scene. Only the first call counts.
    pub fn on_model_loaded(&mut self, scene: SceneGraph) -> &PickTargetRegistry {
        if self.load_state != LoadState::Loading {
            log::warn!("[scene] model already settled ({:?}); ignoring", self.load_state);
            return &self.registry;
        }
        self.registry = PickTargetRegistry::build(&scene);
        self.scene = Some(scene);
        self.load_state = LoadState::Loaded;
        self.target_scale = compute_target_scale(self.viewport.x);
        &self.registry
    }

    /// Loading failed for good: no model, no targets, no retry.
    pub fn on_model_failed(&mut self) {
        if self.load_state == LoadState::Loading {
            self.load_state = LoadState::Failed;
            self.registry = PickTargetRegistry::empty();
        }
    }

    /// Advance camera damping and the scale animation by one frame.
    pub fn advance_frame(&mut self, delta_seconds: f32) {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.orbit.update(dt);
        if self.scene.is_some() {
            self.animator.step(self.target_scale, dt);
        }
    }

    /// Placement of the whole model: fixed offset, live uniform scale.
    pub fn model_root_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.animator.current),
            Quat::IDENTITY,
            MODEL_POSITION,
        )
    }

    pub fn pick(&self, pointer: Vec2) -> Option<PickHit> {
        let scene = self.scene.as_ref()?;
        if self.registry.is_empty() {
            return None;
        }
        picking::resolve(
            pointer,
            self.viewport,
            self.orbit.camera(),
            scene,
            &self.registry,
            self.model_root_transform(),
        )
    }

    pub fn pointer_move(&self, pointer: Vec2) -> CursorStyle {
        self.interaction.pointer_move(self.pick(pointer).as_ref())
    }

    /// Returns the picked target, if the click landed on one.
    pub fn click(&mut self, pointer: Vec2) -> Option<PickHit> {
        let hit = self.pick(pointer);
        self.interaction.click(hit.as_ref());
        hit
    }

    pub fn close_popup(&mut self) {
        self.interaction.close();
    }

    pub fn popup(&self) -> &Popup {
        self.interaction.popup()
    }

    pub fn current_scale(&self) -> f32 {
        self.animator.current
    }

    pub fn target_scale(&self) -> f32 {
        self.target_scale
    }

    pub fn registry(&self) -> &PickTargetRegistry {
        &self.registry
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        self.orbit.camera()
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }
}
