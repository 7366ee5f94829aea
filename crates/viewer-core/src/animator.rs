use crate::constants::SCALE_LERP_RATE;

/// Eases the model's uniform scale toward a target, independent of frame rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleAnimator {
    pub current: f32,
    pub rate: f32,
}

impl Default for ScaleAnimator {
    fn default() -> Self {
        // glTF scenes load at unit scale
        Self::new(1.0)
    }
}

impl ScaleAnimator {
    pub fn new(current: f32) -> Self {
        Self {
            current,
            rate: SCALE_LERP_RATE,
        }
    }

    /// Advance one frame. Negative or non-finite deltas count as zero, and the
    /// blend factor saturates at 1 so a long stall lands exactly on `target`.
    pub fn step(&mut self, target: f32, delta_seconds: f32) -> f32 {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        let alpha = (dt * self.rate).clamp(0.0, 1.0);
        self.current = lerp(self.current, target, alpha);
        self.current
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t >= 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_hz_and_thirty_hz_end_up_close() {
        let mut fast = ScaleAnimator::new(1.0);
        let mut slow = ScaleAnimator::new(1.0);
        for _ in 0..60 {
            fast.step(0.25, 1.0 / 60.0);
        }
        for _ in 0..30 {
            slow.step(0.25, 1.0 / 30.0);
        }
        // both converge after one second; the discrete step leaves a small gap
        assert!((fast.current - slow.current).abs() < 0.01);
        assert!(fast.current < 0.26 && slow.current < 0.26);
    }

    #[test]
    fn huge_delta_snaps_without_overshoot() {
        let mut a = ScaleAnimator::new(1.0);
        assert_eq!(a.step(0.25, 120.0), 0.25);
    }

    #[test]
    fn negative_and_nan_deltas_are_ignored() {
        let mut a = ScaleAnimator::new(0.5);
        assert_eq!(a.step(1.0, -1.0), 0.5);
        assert_eq!(a.step(1.0, f32::NAN), 0.5);
    }
}
