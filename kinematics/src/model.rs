use nalgebra::Vector3;

#[cfg(feature = "serde-serialize")]
use serde::Serialize;

use common::constants::GRAVITY_SEED;

/// Parameters of `y(t) = y0 + v0 * t + 0.5 * g * t^2`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct FreeFallParams {
    /// Position at `t = 0` (m)
    pub y0: f64,
    /// Velocity at `t = 0` (m/s)
    pub v0: f64,
    /// Acceleration (m/s^2)
    pub g: f64,
}

impl Default for FreeFallParams {
    /// Starting point of every fit: at rest at the first gate, standard gravity.
    fn default() -> Self {
        Self::new(0.0, 0.0, GRAVITY_SEED)
    }
}

impl FreeFallParams {
    pub fn new(y0: f64, v0: f64, g: f64) -> Self {
        Self { y0, v0, g }
    }

    pub fn evaluate(&self, t: f64) -> f64 {
        self.y0 + self.v0 * t + 0.5 * self.g * t * t
    }

    /// Partial derivatives of the model with respect to `(y0, v0, g)` at `t`.
    /// They do not depend on the parameters.
    pub(crate) fn jacobian_row(t: f64) -> Vector3<f64> {
        Vector3::new(1.0, t, 0.5 * t * t)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.y0.is_finite() && self.v0.is_finite() && self.g.is_finite()
    }
}

impl From<Vector3<f64>> for FreeFallParams {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<FreeFallParams> for Vector3<f64> {
    fn from(p: FreeFallParams) -> Self {
        Vector3::new(p.y0, p.v0, p.g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed() {
        let seed = FreeFallParams::default();
        assert_eq!(seed, FreeFallParams::new(0.0, 0.0, 9.8));
    }

    #[test]
    fn test_evaluate() {
        let params = FreeFallParams::new(0.1, 0.5, 9.8);
        assert_eq!(params.evaluate(0.0), 0.1);
        assert!((params.evaluate(0.2) - (0.1 + 0.1 + 0.196)).abs() < 1e-12);
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let params = FreeFallParams::new(0.05, 0.4, 9.7);
        let t = 0.3;
        let h = 1e-6;
        let row = FreeFallParams::jacobian_row(t);
        let base: Vector3<f64> = params.into();

        for i in 0..3 {
            let mut shifted = base;
            shifted[i] += h;
            let derivative = (FreeFallParams::from(shifted).evaluate(t) - params.evaluate(t)) / h;
            assert!((derivative - row[i]).abs() < 1e-6);
        }
    }
}
