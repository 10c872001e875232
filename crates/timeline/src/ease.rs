/// Easing curve applied to a tween's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    Smoothstep,
    /// Quadratic in/out; the tween-library `power1.inOut`.
    #[default]
    EaseInOut,
    /// Cubic ease-in (`power2.in`).
    Power2In,
    /// Cubic ease-out (`power2.out`).
    Power2Out,
}

impl Ease {
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => clamped,
            Ease::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Ease::EaseInOut => {
                if clamped < 0.5 {
                    2.0 * clamped * clamped
                } else {
                    -1.0 + (4.0 - 2.0 * clamped) * clamped
                }
            }
            Ease::Power2In => clamped * clamped * clamped,
            Ease::Power2Out => {
                let inv = 1.0 - clamped;
                1.0 - inv * inv * inv
            }
        }
    }
}
