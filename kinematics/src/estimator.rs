use log::debug;

#[cfg(feature = "serde-serialize")]
use serde::Serialize;

use common::constants::{MIN_FIT_SAMPLES, SMOOTH_CURVE_POINTS};
use common::{Sample, Series};

use crate::errors::FitError;
use crate::model::FreeFallParams;
use crate::solver;

/// Outcome of fitting a series. A failed fit carries its reason.
pub type FitResult = Result<FreeFallFit, FitError>;

/// A converged free-fall fit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct FreeFallFit {
    params: FreeFallParams,
    /// Model evaluated at evenly spaced times over the span of the series
    smooth_curve: Vec<Sample>,
    n_samples: usize,
}

impl FreeFallFit {
    pub fn get_params(&self) -> &FreeFallParams {
        &self.params
    }

    pub fn y0(&self) -> f64 {
        self.params.y0
    }

    pub fn v0(&self) -> f64 {
        self.params.v0
    }

    pub fn g(&self) -> f64 {
        self.params.g
    }

    pub fn get_smooth_curve(&self) -> &[Sample] {
        &self.smooth_curve
    }

    /// Number of samples the fit was computed from
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

/// Fits `y0 + v0 * t + 0.5 * g * t^2` to a series by nonlinear least squares.
///
/// # Examples
///
/// ```
/// use common::{Sample, Series};
/// use kinematics_rs::{FitError, KinematicFitEstimator};
///
/// let estimator = KinematicFitEstimator::default();
///
/// let series = Series::from_vec("drop", vec![Sample::new(0.0, 0.0), Sample::new(0.14, 0.1)]);
/// assert_eq!(estimator.estimate(&series), Err(FitError::InsufficientData));
///
/// let samples = [0.0, 0.142857, 0.202031, 0.247436]
///     .iter()
///     .enumerate()
///     .map(|(k, t)| Sample::new(*t, k as f64 * 0.1))
///     .collect();
/// let fit = estimator.estimate(&Series::from_vec("drop", samples)).unwrap();
/// assert!((fit.g() - 9.8).abs() < 0.05);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KinematicFitEstimator {
    seed: FreeFallParams,
}

impl KinematicFitEstimator {
    /// Estimator starting every fit from `seed` instead of the default
    pub fn with_seed(seed: FreeFallParams) -> Self {
        Self { seed }
    }

    pub fn get_seed(&self) -> &FreeFallParams {
        &self.seed
    }

    /// Fits the series. Series shorter than `MIN_FIT_SAMPLES` are rejected before the
    /// solver runs. The series is only read.
    pub fn estimate(&self, series: &Series) -> FitResult {
        if series.len() < MIN_FIT_SAMPLES {
            return Err(FitError::InsufficientData);
        }

        let times = series.get_timestamps();
        let positions = series.get_positions();
        let report = solver::levenberg_marquardt(&times, &positions, self.seed).map_err(|e| {
            debug!("Fit of {} samples failed: {}", series.len(), e);
            e
        })?;

        let smooth_curve = match series.time_span() {
            Some((t_min, t_max)) => smooth_curve(&report.params, t_min, t_max),
            None => Vec::new(),
        };
        debug!(
            "Fitted {} samples in {} iterations: g = {:.4}",
            series.len(),
            report.iterations,
            report.params.g
        );

        Ok(FreeFallFit {
            params: report.params,
            smooth_curve,
            n_samples: series.len(),
        })
    }
}

/// Evaluates the model at `SMOOTH_CURVE_POINTS` evenly spaced times, both ends included.
fn smooth_curve(params: &FreeFallParams, t_min: f64, t_max: f64) -> Vec<Sample> {
    let step = (t_max - t_min) / (SMOOTH_CURVE_POINTS - 1) as f64;
    (0..SMOOTH_CURVE_POINTS)
        .map(|i| {
            let t = if i == SMOOTH_CURVE_POINTS - 1 {
                t_max
            } else {
                t_min + step * i as f64
            };
            Sample::new(t, params.evaluate(t))
        })
        .collect()
}
