//! Build-time constants of the free-fall rig. There is no configuration file.

/// Distance between adjacent photogates, in meters.
pub const SENSOR_SPACING_M: f64 = 0.10;

/// Number of photogates on the rig. The firmware stops reporting after the last one.
pub const N_SENSORS: usize = 10;

pub const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Serial line speed shared with the firmware.
pub const BAUD_RATE: u32 = 115_200;

/// Upper bound on a single blocking read of the serial line.
pub const READ_TIMEOUT_MILLIS: u64 = 1_000;

/// Seed for the acceleration parameter of the fit, in m/s^2.
pub const GRAVITY_SEED: f64 = 9.8;

/// Number of points of the prediction curve handed to presenters.
pub const SMOOTH_CURVE_POINTS: usize = 100;

/// Three free parameters need at least three samples.
pub const MIN_FIT_SAMPLES: usize = 3;
