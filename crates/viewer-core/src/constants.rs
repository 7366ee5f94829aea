use glam::Vec3;

// Shared tuning constants for the viewer. Colours are sRGB hex as authored.

// Responsive model scale
pub const NARROW_VIEWPORT_MAX_PX: f32 = 1000.0; // widths strictly below this are "narrow"
pub const NARROW_SCALE: f32 = 0.25;
pub const WIDE_SCALE: f32 = 1.0;
pub const SCALE_LERP_RATE: f32 = 5.0; // per second, higher = faster

// Picking
pub const PICK_MARKER: &str = "sign"; // matched case-insensitively against mesh node names
pub const POPUP_TITLE: &str = "Information";
pub const POPUP_INITIAL_TEXT: &str = "This is a popup message triggered by clicking a sign object!";
pub const POPUP_PLACEHOLDER_TEXT: &str = "YEEEEE idk what to put here";

// Camera
pub const CAMERA_FOV_Y_DEG: f32 = 30.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(7.0, 2.0, -20.0);

// Orbit controls
pub const ORBIT_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const ORBIT_MIN_DISTANCE: f32 = 20.0;
pub const ORBIT_MAX_DISTANCE: f32 = 40.0;
pub const ORBIT_MIN_POLAR: f32 = 0.6;
pub const ORBIT_MAX_POLAR: f32 = 1.5;
pub const ORBIT_DAMPING_FACTOR: f32 = 0.05; // fraction applied per reference frame
pub const ORBIT_REFERENCE_FPS: f32 = 60.0;
pub const ORBIT_ROTATE_SPEED: f32 = 1.0;
pub const ORBIT_ZOOM_STEP: f32 = 0.95;

// Model placement
pub const MODEL_POSITION: Vec3 = Vec3::new(0.0, -3.0, -1.0);

// Ground
pub const GROUND_SIZE: f32 = 40.0;
pub const GROUND_COLOR: u32 = 0x111111;
/// Ground sits level with the model's origin.
pub const GROUND_Y: f32 = MODEL_POSITION.y;

// Background
pub const CLEAR_COLOR: u32 = 0x60B5E6;

// Lights
pub const DIRECTIONAL_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 0.0);
pub const DIRECTIONAL_LIGHT_INTENSITY: f32 = 5.0;
pub const SPOT_LIGHT_POSITION: Vec3 = Vec3::new(0.0, 25.0, 0.0);
pub const SPOT_LIGHT_INTENSITY: f32 = 3000.0;
pub const SPOT_LIGHT_RANGE: f32 = 10.0;
pub const SPOT_LIGHT_ANGLE: f32 = 0.22;
pub const SPOT_LIGHT_PENUMBRA: f32 = 1.0;
pub const AMBIENT_LIGHT_COLOR: u32 = 0x404040;
pub const AMBIENT_LIGHT_INTENSITY: f32 = 10.0;

// Default material colour for primitives without one
pub const DEFAULT_BASE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Convert a packed `0xRRGGBB` sRGB colour to linear RGB.
pub fn hex_to_linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_black_and_white_map_to_extremes() {
        assert_eq!(hex_to_linear_rgb(0x000000), [0.0, 0.0, 0.0]);
        let white = hex_to_linear_rgb(0xffffff);
        for c in white {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn srgb_mid_grey_is_darker_in_linear() {
        let lin = srgb_to_linear(0.5);
        assert!(lin > 0.2 && lin < 0.22);
    }
}
