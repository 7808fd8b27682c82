use log::warn;
use std::sync::Arc;
use uuid::Uuid;

use kinematics_rs::{FitError, SessionUpdate};

use super::{analysis_title, gravity_text, READY_FOR_NEW_DROP};

/// Prints session updates on stdout, as text or as JSON lines.
#[derive(Debug, Clone, Default)]
pub struct ConsolePresenter {
    json: bool,
}

impl ConsolePresenter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn handle(&self, _id: Uuid, update: Arc<SessionUpdate>) {
        if self.json {
            match serde_json::to_string(update.as_ref()) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Could not serialize session update: {}", e),
            }
        } else {
            for line in render(&update) {
                println!("{}", line);
            }
        }
    }
}

/// Text lines shown for an update
pub(crate) fn render(update: &SessionUpdate) -> Vec<String> {
    match update {
        SessionUpdate::Trigger { trigger, .. } => vec![trigger.to_string()],
        SessionUpdate::Analysis(analysis) => {
            let mut lines = vec![analysis_title(analysis)];
            match analysis.get_fit() {
                Ok(fit) => lines.push(gravity_text(fit.g())),
                Err(FitError::InsufficientData) => {}
                Err(e) => lines.push(format!("No fit ({})", e.reason())),
            }
            lines
        }
        SessionUpdate::Reset => vec![READY_FOR_NEW_DROP.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{RawTrigger, Sample, Series};
    use kinematics_rs::{KinematicFitEstimator, SessionAnalysis};

    #[test]
    fn test_render_trigger() {
        let update = SessionUpdate::Trigger {
            trigger: RawTrigger::new(3_142_857),
            sample: Sample::new(0.142857, 0.1),
        };
        assert_eq!(render(&update), vec!["3142857 µs"]);
    }

    #[test]
    fn test_render_fit() {
        let samples = [0.0, 0.142857, 0.202031, 0.247436]
            .iter()
            .enumerate()
            .map(|(k, t)| Sample::new(*t, k as f64 * 0.1))
            .collect();
        let series = Series::from_vec("test", samples);
        let fit = KinematicFitEstimator::default().estimate(&series);
        let update = SessionUpdate::Analysis(SessionAnalysis::new(&series, fit));

        assert_eq!(
            render(&update),
            vec!["Analysis (N=4)", "Gravity (g): 9.800 m/s²"]
        );
    }

    #[test]
    fn test_render_failed_fit() {
        let series = Series::from_vec(
            "test",
            vec![
                Sample::new(0.0, 0.0),
                Sample::new(0.0, 0.1),
                Sample::new(0.1, 0.2),
            ],
        );
        let fit = Err(FitError::FitFailed("singular Jacobian".to_string()));
        let update = SessionUpdate::Analysis(SessionAnalysis::new(&series, fit));
        assert_eq!(
            render(&update),
            vec!["Analysis (Insufficient Data)", "No fit (fit_failed)"]
        );
    }

    #[test]
    fn test_render_reset() {
        assert_eq!(render(&SessionUpdate::Reset), vec!["Ready for new drop..."]);
    }

    #[test]
    fn test_update_serializes() {
        let update = SessionUpdate::Trigger {
            trigger: RawTrigger::new(10),
            sample: Sample::new(0.0, 0.0),
        };
        let line = serde_json::to_string(&update).unwrap();
        assert!(line.contains("\"Trigger\""));
    }
}
