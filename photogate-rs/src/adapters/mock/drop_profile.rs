use common::constants::{MICROS_PER_SEC, N_SENSORS, SENSOR_SPACING_M};

use crate::models::errors::PhotogateError;

/// Speed of an object released 1 cm above the first gate.
const DEFAULT_ENTRY_VELOCITY: f64 = 0.443;
const STANDARD_GRAVITY: f64 = 9.80665;

/// Kinematics of a simulated drop past evenly spaced gates.
#[derive(Clone, Debug, PartialEq)]
pub struct DropProfile {
    pub n_gates: usize,
    /// Distance between adjacent gates (m)
    pub spacing_m: f64,
    /// Downward speed when crossing the first gate (m/s)
    pub entry_velocity: f64,
    /// Acceleration during the fall (m/s^2)
    pub gravity: f64,
}

impl Default for DropProfile {
    fn default() -> Self {
        Self {
            n_gates: N_SENSORS,
            spacing_m: SENSOR_SPACING_M,
            entry_velocity: DEFAULT_ENTRY_VELOCITY,
            gravity: STANDARD_GRAVITY,
        }
    }
}

impl DropProfile {
    /// Checks that every gate is reached in finite time: positive finite gravity and
    /// spacing, finite non-negative entry velocity.
    pub fn validate(&self) -> Result<(), PhotogateError> {
        let invalid = |what: &str, value: f64| -> Result<(), PhotogateError> {
            Err(PhotogateError::Other(format!("Invalid drop {}: {}", what, value)))
        };
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return invalid("gravity", self.gravity);
        }
        if !(self.entry_velocity.is_finite() && self.entry_velocity >= 0.0) {
            return invalid("entry velocity", self.entry_velocity);
        }
        if !(self.spacing_m.is_finite() && self.spacing_m > 0.0) {
            return invalid("gate spacing", self.spacing_m);
        }
        Ok(())
    }

    /// Seconds from the first gate to every gate, solving
    /// `k * spacing = v0 * t + 0.5 * g * t^2` for `t`. Only meaningful for a profile
    /// that passes [`validate`](Self::validate).
    pub fn gate_times_secs(&self) -> Vec<f64> {
        let v0 = self.entry_velocity;
        (0..self.n_gates)
            .map(|gate| {
                let distance = gate as f64 * self.spacing_m;
                ((v0 * v0 + 2.0 * self.gravity * distance).sqrt() - v0) / self.gravity
            })
            .collect()
    }

    /// Gate times rounded to whole microseconds, as the device would report them.
    pub fn gate_offsets_micros(&self) -> Vec<u64> {
        self.gate_times_secs()
            .into_iter()
            .map(|t| (t * MICROS_PER_SEC).round().max(0.0) as u64)
            .collect()
    }
}
