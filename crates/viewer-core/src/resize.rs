use crate::constants::{NARROW_SCALE, NARROW_VIEWPORT_MAX_PX, WIDE_SCALE};

/// Target uniform model scale for a viewport `width_px` CSS pixels wide.
///
/// Two tiers, no hysteresis: narrow viewports shrink the model to a quarter.
#[inline]
pub fn compute_target_scale(width_px: f32) -> f32 {
    if width_px < NARROW_VIEWPORT_MAX_PX {
        NARROW_SCALE
    } else {
        WIDE_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(compute_target_scale(999.0), 0.25);
        assert_eq!(compute_target_scale(999.9), 0.25);
        assert_eq!(compute_target_scale(1000.0), 1.0);
    }

    #[test]
    fn degenerate_widths_are_narrow() {
        assert_eq!(compute_target_scale(0.0), 0.25);
        assert_eq!(compute_target_scale(-5.0), 0.25);
    }
}
