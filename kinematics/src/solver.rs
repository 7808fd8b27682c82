// Levenberg-Marquardt least squares for the free-fall model.
//
// Residuals are r_i = model(t_i) - y_i and the cost is 0.5 * sum(r_i^2). Every iteration
// solves the damped normal equations (JtJ + lambda * diag(JtJ)) * step = -Jt * r with a
// Cholesky factorisation. Accepted steps shrink lambda, rejected ones grow it.

use log::trace;
use nalgebra::{Matrix3, Vector3};

use crate::errors::FitError;
use crate::model::FreeFallParams;

const MAX_ITERATIONS: usize = 200;
/// Relative cost reduction below which the fit is considered converged
const FTOL: f64 = 1.49012e-8;
/// Relative step size below which the fit is considered converged
const XTOL: f64 = 1.49012e-8;
/// Gradient infinity norm below which the fit is considered converged
const GTOL: f64 = 1e-12;
const INITIAL_LAMBDA: f64 = 1e-3;
const MIN_LAMBDA: f64 = 1e-12;
const MAX_LAMBDA: f64 = 1e16;
const LAMBDA_FACTOR: f64 = 10.0;
/// Floor for the diagonal used in the damping term
const MIN_DIAGONAL: f64 = 1e-12;
/// Smallest accepted ratio between the extreme eigenvalues of JtJ
const MIN_RCOND: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SolverReport {
    pub params: FreeFallParams,
    pub cost: f64,
    pub iterations: usize,
}

fn cost(times: &[f64], positions: &[f64], params: &FreeFallParams) -> f64 {
    0.5 * times
        .iter()
        .zip(positions)
        .map(|(t, y)| {
            let r = params.evaluate(*t) - y;
            r * r
        })
        .sum::<f64>()
}

/// Accumulates JtJ and Jt * r
fn normal_equations(
    times: &[f64],
    positions: &[f64],
    params: &FreeFallParams,
) -> (Matrix3<f64>, Vector3<f64>) {
    let mut jtj = Matrix3::zeros();
    let mut jtr = Vector3::zeros();
    for (t, y) in times.iter().zip(positions) {
        let row = FreeFallParams::jacobian_row(*t);
        let r = params.evaluate(*t) - y;
        jtj += row * row.transpose();
        jtr += row * r;
    }
    (jtj, jtr)
}

/// Rejects problems whose Jacobian does not have full column rank, e.g. fewer than three
/// distinct times.
fn check_rank(jtj: &Matrix3<f64>) -> Result<(), FitError> {
    let eigenvalues = jtj.symmetric_eigenvalues();
    let largest = eigenvalues.amax();
    let smallest = eigenvalues.iter().fold(f64::INFINITY, |m, e| m.min(*e));
    if !(largest > 0.0) || !(smallest > largest * MIN_RCOND) {
        return Err(FitError::FitFailed("singular Jacobian".to_string()));
    }
    Ok(())
}

/// Fits `positions` against `times` starting from `seed`.
///
/// Returns FitFailed on non-finite input or output, a singular Jacobian, or when
/// no convergence criterion is met within `MAX_ITERATIONS`.
pub(crate) fn levenberg_marquardt(
    times: &[f64],
    positions: &[f64],
    seed: FreeFallParams,
) -> Result<SolverReport, FitError> {
    if times.len() != positions.len() {
        return Err(FitError::FitFailed(format!(
            "{} times for {} positions",
            times.len(),
            positions.len()
        )));
    }
    if times.iter().chain(positions).any(|v| !v.is_finite()) {
        return Err(FitError::FitFailed("non-finite sample".to_string()));
    }

    let mut params = seed;
    let mut current_cost = cost(times, positions, &params);
    if !current_cost.is_finite() {
        return Err(FitError::FitFailed("non-finite residuals".to_string()));
    }
    let mut lambda = INITIAL_LAMBDA;

    for iteration in 0..MAX_ITERATIONS {
        let (jtj, jtr) = normal_equations(times, positions, &params);
        if iteration == 0 {
            check_rank(&jtj)?;
        }
        let converged = SolverReport {
            params,
            cost: current_cost,
            iterations: iteration,
        };
        if current_cost == 0.0 || jtr.amax() <= GTOL {
            return Ok(converged);
        }

        // Grow the damping until a step lowers the cost
        loop {
            let mut damped = jtj;
            for i in 0..3 {
                damped[(i, i)] += lambda * jtj[(i, i)].max(MIN_DIAGONAL);
            }
            let Some(cholesky) = damped.cholesky() else {
                lambda *= LAMBDA_FACTOR;
                if lambda > MAX_LAMBDA {
                    return Err(FitError::FitFailed("singular Jacobian".to_string()));
                }
                continue;
            };

            let current: Vector3<f64> = params.into();
            let step = cholesky.solve(&(-jtr));
            let candidate = FreeFallParams::from(current + step);
            let small_step = step.norm() <= XTOL * (current.norm() + XTOL);
            let candidate_cost = cost(times, positions, &candidate);

            if candidate.is_finite() && candidate_cost.is_finite() && candidate_cost < current_cost
            {
                let reduction = (current_cost - candidate_cost) / current_cost;
                trace!(
                    "iteration {}: cost {:e} lambda {:e}",
                    iteration,
                    candidate_cost,
                    lambda
                );
                params = candidate;
                current_cost = candidate_cost;
                lambda = (lambda / LAMBDA_FACTOR).max(MIN_LAMBDA);
                if small_step || reduction <= FTOL {
                    return Ok(SolverReport {
                        params,
                        cost: current_cost,
                        iterations: iteration + 1,
                    });
                }
                break;
            }

            // No step lowers the cost any more
            if small_step {
                return Ok(converged);
            }
            lambda *= LAMBDA_FACTOR;
            if lambda > MAX_LAMBDA {
                return Err(FitError::FitFailed(
                    "damping limit reached without progress".to_string(),
                ));
            }
        }
    }

    Err(FitError::FitFailed(format!(
        "no convergence after {} iterations",
        MAX_ITERATIONS
    )))
}
