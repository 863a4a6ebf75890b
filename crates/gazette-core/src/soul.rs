//! The narrative-tone accumulator ("soul").
//!
//! A single unbounded scalar. Positive news pushes it up, negative news
//! down; the sampler reads it through [`SoulAccumulator::tone`], which
//! saturates into `(-1, 1)`.

/// Running sum of every soul delta seen this session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoulAccumulator {
    value: f64,
}

impl SoulAccumulator {
    /// Start at neutral tone.
    pub const fn new() -> Self {
        Self { value: 0.0 }
    }

    /// Add a delta. Non-finite deltas are ignored.
    pub fn integrate(&mut self, delta: f64) {
        if delta.is_finite() {
            self.value += delta;
        } else {
            tracing::warn!(delta, "Ignored non-finite soul delta");
        }
    }

    /// The current accumulated value.
    pub const fn current(&self) -> f64 {
        self.value
    }

    /// `tanh(current / scale)`.
    pub fn tone(&self, scale: f64) -> f64 {
        (self.value / scale).tanh()
    }

    /// Back to neutral.
    pub const fn reset(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_is_additive() {
        let mut soul = SoulAccumulator::new();
        soul.integrate(2.0);
        soul.integrate(-0.5);
        soul.integrate(500.0);
        assert!((soul.current() - 501.5).abs() < 1e-12);
    }

    #[test]
    fn tone_saturates() {
        let mut soul = SoulAccumulator::new();
        assert!(soul.tone(25.0).abs() < 1e-12);
        soul.integrate(1e9);
        assert!((soul.tone(25.0) - 1.0).abs() < 1e-12);
        soul.integrate(-2e9);
        assert!((soul.tone(25.0) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_deltas_are_ignored() {
        let mut soul = SoulAccumulator::new();
        soul.integrate(3.0);
        soul.integrate(f64::NAN);
        soul.integrate(f64::INFINITY);
        assert!((soul.current() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn reset_returns_to_neutral() {
        let mut soul = SoulAccumulator::new();
        soul.integrate(-40.0);
        soul.reset();
        assert!(soul.current().abs() < f64::EPSILON);
    }
}
