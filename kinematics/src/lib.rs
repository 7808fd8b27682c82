//! # Crate kinematics-rs
//!
//! ## kinematics-rs
//!
//! The `kinematics-rs` crate turns the photogate triggers of a drop into a position-vs-time
//! series and fits a constant-acceleration model to it, estimating the gravitational
//! acceleration `g`.
//!
//! Features include:
//! - A sample accumulator placing the k-th trigger of a session `k` gate spacings below
//!   the first gate, with times measured from the first trigger.
//! - A Levenberg-Marquardt fit of `y0 + v0 * t + 0.5 * g * t^2`, seeded at rest with
//!   standard gravity, returning the parameters and a smooth prediction curve.
//! - A session pipeline that consumes triggers in arrival order on a single task,
//!   refits after every trigger and publishes the results.
//!
//! **NOTE** A fit needs at least three samples. Shorter series and failed fits are reported
//! as a [`FitError`] and retried on the next trigger.

pub mod accumulator;
pub mod errors;
pub mod estimator;
pub mod model;
pub mod pipeline;
mod solver;

pub use accumulator::SampleAccumulator;
pub use errors::{FitError, PipelineError};
pub use estimator::{FitResult, FreeFallFit, KinematicFitEstimator};
pub use model::FreeFallParams;
pub use pipeline::{SessionAnalysis, SessionCommand, SessionPipeline, SessionTopic, SessionUpdate};

use log::error;
use std::sync::Arc;

/// Starts the session task for `tag`.
/// Returns a `tokio::task::JoinHandle` for the task and the pipeline to post triggers to and
/// listen on.
pub fn run(tag: &str) -> (tokio::task::JoinHandle<()>, Arc<SessionPipeline>) {
    let pipeline = Arc::new(SessionPipeline::new(tag));

    let pipeline_clone = Arc::clone(&pipeline);
    let handle = tokio::spawn({
        async move {
            if let Err(e) = pipeline_clone.start().await {
                error!("Error in session loop: {}", e);
            }
        }
    });
    (handle, pipeline)
}
