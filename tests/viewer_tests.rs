// Host-side tests for the viewer core.
// The main crate is wasm-only, so these drive viewer-core directly.

use glam::{Mat4, Vec2, Vec3};
use smallvec::smallvec;
use viewer_core::constants::{POPUP_INITIAL_TEXT, POPUP_PLACEHOLDER_TEXT};
use viewer_core::{
    compute_target_scale, popup_markup, popup_stylesheet, resolve, CursorStyle, InteractionController, LoadState, MeshData,
    OrbitControls, PickHit, PickTargetRegistry, Popup, Primitive, ScaleAnimator, SceneController,
    SceneGraph, SceneNode, ViewerConfig,
};

const WIDE: Vec2 = Vec2::new(1280.0, 720.0);

/// 10x10 double-sided quad in the local XY plane, centred on `center`.
fn quad_mesh(name: &str, center: Vec3) -> MeshData {
    let h = 5.0;
    let positions = vec![
        center + Vec3::new(-h, -h, 0.0),
        center + Vec3::new(h, -h, 0.0),
        center + Vec3::new(h, h, 0.0),
        center + Vec3::new(-h, h, 0.0),
    ];
    let prim = Primitive::new(positions, None, vec![0, 1, 2, 0, 2, 3], [1.0; 4])
        .expect("non-empty quad");
    MeshData {
        name: Some(name.to_string()),
        primitives: smallvec![prim],
    }
}

/// Adds a root mesh node whose quad covers the orbit target once the model
/// is placed at its usual offset. `z` shifts the quad along the view axis.
fn add_quad_node(scene: &mut SceneGraph, name: &str, z: f32) {
    let mesh = scene.add_mesh(quad_mesh(name, Vec3::new(0.0, 4.0, 1.0 + z)));
    let id = scene.add_node(SceneNode::new(name, Mat4::IDENTITY, Some(mesh)));
    scene.add_root(id);
}

fn scene_with(nodes: &[(&str, f32)]) -> SceneGraph {
    let mut scene = SceneGraph::new();
    for (name, z) in nodes {
        add_quad_node(&mut scene, name, *z);
    }
    scene.update_world_transforms();
    scene
}

fn hit(name: &str) -> PickHit {
    PickHit {
        node: viewer_core::NodeId(0),
        name: name.to_string(),
        distance: 1.0,
    }
}

#[test]
fn target_scale_switches_at_1000px() {
    assert_eq!(compute_target_scale(999.0), 0.25);
    assert_eq!(compute_target_scale(1000.0), 1.0);
    for w in [0.0, 320.0, 768.0, 999.99] {
        assert_eq!(compute_target_scale(w), 0.25, "width {}", w);
    }
    for w in [1000.0, 1024.0, 1920.0, 3840.0] {
        assert_eq!(compute_target_scale(w), 1.0, "width {}", w);
    }
}

#[test]
fn animator_fixed_point_is_stable() {
    for start in [0.25_f32, 1.0] {
        let mut a = ScaleAnimator::new(start);
        for dt in [0.0, 0.001, 1.0 / 60.0, 0.5, 10.0] {
            a.step(start, dt);
            assert_eq!(a.current, start);
        }
    }
}

#[test]
fn animator_converges_monotonically_from_below() {
    let mut a = ScaleAnimator::new(0.25);
    let mut prev = a.current;
    for _ in 0..120 {
        a.step(1.0, 1.0 / 60.0);
        assert!(a.current > prev, "{} !> {}", a.current, prev);
        assert!(a.current <= 1.0);
        prev = a.current;
    }
    assert!((1.0 - a.current).abs() < 1e-3);
}

#[test]
fn registry_keeps_matching_nodes_in_order() {
    let scene = scene_with(&[("Sign_A", 0.0), ("tree01", 2.0), ("SIGN_info", 4.0)]);
    let registry = PickTargetRegistry::build(&scene);
    let names: Vec<&str> = registry.names(&scene).collect();
    assert_eq!(names, vec!["Sign_A", "SIGN_info"]);
}

#[test]
fn registry_skips_non_mesh_nodes_and_nested_order_is_depth_first() {
    let mut scene = SceneGraph::new();
    let group = scene.add_node(SceneNode::new("signpost_group", Mat4::IDENTITY, None));
    scene.add_root(group);
    let mesh = scene.add_mesh(quad_mesh("m", Vec3::ZERO));
    let child = scene.add_node(SceneNode::new("design_plate", Mat4::IDENTITY, Some(mesh)));
    scene.add_child(group, child);
    let later = scene.add_node(SceneNode::new("Signboard", Mat4::IDENTITY, Some(mesh)));
    scene.add_root(later);
    scene.update_world_transforms();

    let registry = PickTargetRegistry::build(&scene);
    assert_eq!(registry.targets(), &[child, later]);
    assert!(!registry.contains(group));
}

#[test]
fn resolver_is_deterministic() {
    let scene = scene_with(&[("sign_front", 0.0)]);
    let registry = PickTargetRegistry::build(&scene);
    let orbit = OrbitControls::with_viewer_defaults(WIDE.x / WIDE.y);
    let root = Mat4::from_translation(Vec3::new(0.0, -3.0, -1.0));
    let center = WIDE * 0.5;

    let first = resolve(center, WIDE, orbit.camera(), &scene, &registry, root);
    assert!(first.is_some());
    for _ in 0..5 {
        let again = resolve(center, WIDE, orbit.camera(), &scene, &registry, root);
        assert_eq!(again, first);
    }
}

#[test]
fn resolver_returns_nearest_of_overlapping_targets() {
    // the camera sits on the -z side, so the more negative quad is closer;
    // registry order puts the far one first
    let scene = scene_with(&[("sign_far", 3.0), ("sign_near", -3.0)]);
    let registry = PickTargetRegistry::build(&scene);
    let orbit = OrbitControls::with_viewer_defaults(WIDE.x / WIDE.y);
    let root = Mat4::from_translation(Vec3::new(0.0, -3.0, -1.0));

    let hit = resolve(WIDE * 0.5, WIDE, orbit.camera(), &scene, &registry, root)
        .expect("center ray crosses both quads");
    assert_eq!(hit.name, "sign_near");
}

#[test]
fn resolver_ignores_unregistered_geometry() {
    let scene = scene_with(&[("tree01", -3.0), ("sign_behind", 3.0)]);
    let registry = PickTargetRegistry::build(&scene);
    let orbit = OrbitControls::with_viewer_defaults(WIDE.x / WIDE.y);
    let root = Mat4::from_translation(Vec3::new(0.0, -3.0, -1.0));

    let hit = resolve(WIDE * 0.5, WIDE, orbit.camera(), &scene, &registry, root);
    assert_eq!(hit.map(|h| h.name), Some("sign_behind".to_string()));
}

#[test]
fn resolver_misses_when_pointer_is_off_target() {
    let scene = scene_with(&[("sign", 0.0)]);
    let registry = PickTargetRegistry::build(&scene);
    let orbit = OrbitControls::with_viewer_defaults(WIDE.x / WIDE.y);
    let root = Mat4::from_translation(Vec3::new(0.0, -3.0, -1.0));

    let corner = Vec2::new(1.0, 1.0);
    assert!(resolve(corner, WIDE, orbit.camera(), &scene, &registry, root).is_none());
}

#[test]
fn popup_state_machine() {
    let mut ic = InteractionController::new();
    assert_eq!(*ic.popup(), Popup::Hidden);

    assert!(!ic.click(None));
    assert_eq!(*ic.popup(), Popup::Hidden);

    assert!(ic.click(Some(&hit("Sign_A"))));
    assert_eq!(ic.popup().text(), Some(POPUP_PLACEHOLDER_TEXT));

    // a second click, hit or miss, leaves it open
    ic.click(None);
    assert!(ic.popup().is_shown());

    ic.close();
    assert_eq!(*ic.popup(), Popup::Hidden);
    assert_eq!(ic.pointer_move(Some(&hit("Sign_A"))), CursorStyle::Pointer);
    assert_eq!(*ic.popup(), Popup::Hidden);

    ic.close();
    assert_eq!(*ic.popup(), Popup::Hidden);
}

#[test]
fn popup_text_does_not_depend_on_target() {
    let mut a = InteractionController::new();
    let mut b = InteractionController::new();
    a.click(Some(&hit("Sign_A")));
    b.click(Some(&hit("SIGN_info")));
    assert_eq!(a.popup(), b.popup());
}

#[test]
fn controller_full_flow_on_wide_viewport() {
    let mut c = SceneController::new(WIDE);
    assert_eq!(c.load_state(), LoadState::Loading);
    let center = WIDE * 0.5;

    // nothing to pick before the model arrives
    assert_eq!(c.pointer_move(center), CursorStyle::Default);
    assert!(c.click(center).is_none());
    assert!(!c.popup().is_shown());

    let registry_len = c
        .on_model_loaded(scene_with(&[("Sign_A", 0.0), ("tree01", 6.0)]))
        .len();
    assert_eq!(registry_len, 1);
    assert_eq!(c.load_state(), LoadState::Loaded);
    assert_eq!(c.target_scale(), 1.0);

    c.advance_frame(1.0 / 60.0);
    assert_eq!(c.pointer_move(center), CursorStyle::Pointer);
    assert_eq!(c.pointer_move(Vec2::new(2.0, 2.0)), CursorStyle::Default);

    let picked = c.click(center).expect("sign under the pointer");
    assert_eq!(picked.name, "Sign_A");
    assert!(c.popup().is_shown());

    c.close_popup();
    assert!(!c.popup().is_shown());
    c.pointer_move(center);
    assert!(!c.popup().is_shown());
}

#[test]
fn controller_shrinks_model_on_narrow_viewport() {
    let mut c = SceneController::new(WIDE);
    c.on_model_loaded(scene_with(&[("sign", 0.0)]));
    assert_eq!(c.current_scale(), 1.0);

    c.on_resize(800.0, 600.0);
    assert_eq!(c.target_scale(), 0.25);
    let mut prev = c.current_scale();
    for _ in 0..30 {
        c.advance_frame(1.0 / 60.0);
        assert!(c.current_scale() < prev);
        assert!(c.current_scale() >= 0.25);
        prev = c.current_scale();
    }

    c.on_resize(1000.0, 600.0);
    assert_eq!(c.target_scale(), 1.0);
}

#[test]
fn controller_scale_waits_for_model() {
    let mut c = SceneController::new(Vec2::new(600.0, 800.0));
    c.advance_frame(1.0);
    assert_eq!(c.current_scale(), 1.0);

    c.on_model_loaded(SceneGraph::new());
    assert_eq!(c.target_scale(), 0.25);
    c.advance_frame(1.0);
    assert_eq!(c.current_scale(), 0.25);
}

#[test]
fn failed_load_leaves_nothing_pickable() {
    let mut c = SceneController::new(WIDE);
    c.on_model_failed();
    assert_eq!(c.load_state(), LoadState::Failed);
    assert!(c.registry().is_empty());
    assert!(c.click(WIDE * 0.5).is_none());

    // a late success after a failure is ignored
    c.on_model_loaded(scene_with(&[("sign", 0.0)]));
    assert_eq!(c.load_state(), LoadState::Failed);
    assert!(c.scene().is_none());
}

#[test]
fn orbit_limits_hold_after_input() {
    let mut orbit = OrbitControls::with_viewer_defaults(16.0 / 9.0);
    let within_limits = |o: &OrbitControls| {
        o.distance() >= o.min_distance - 1e-3
            && o.distance() <= o.max_distance + 1e-3
            && o.polar_angle() >= o.min_polar - 1e-4
            && o.polar_angle() <= o.max_polar + 1e-4
    };
    assert!(within_limits(&orbit));

    for _ in 0..50 {
        orbit.dolly(-100.0);
        orbit.rotate_pixels(0.0, -400.0, 720.0);
        orbit.update(1.0 / 60.0);
        assert!(within_limits(&orbit));
    }
    assert!((orbit.distance() - orbit.min_distance).abs() < 1e-2);

    for _ in 0..80 {
        orbit.dolly(100.0);
        orbit.rotate_pixels(0.0, 400.0, 720.0);
        orbit.update(1.0 / 60.0);
        assert!(within_limits(&orbit));
    }
    assert!((orbit.distance() - orbit.max_distance).abs() < 1e-2);
}

#[test]
fn popup_styles_follow_configured_ids() {
    let defaults = ViewerConfig::default();
    let css = popup_stylesheet(&defaults);
    assert!(css.contains("#popup-overlay {"));
    assert!(css.contains("#close-popup {"));

    let cfg = ViewerConfig {
        popup_id: "sign-dialog".to_string(),
        popup_close_id: "sign-dialog-close".to_string(),
        ..ViewerConfig::default()
    };
    let css = popup_stylesheet(&cfg);
    assert!(css.contains("#sign-dialog {"));
    assert_eq!(css.matches("#sign-dialog-close {").count(), 2);
    assert!(!css.contains("#popup-overlay"));
    assert!(!css.contains("#close-popup"));
    assert!(!css.contains('$'));

    let markup = popup_markup(&cfg);
    assert!(markup.contains(r#"<span id="sign-dialog-close">"#));
    assert!(markup.contains(&format!("<p>{}</p>", POPUP_INITIAL_TEXT)));
}
