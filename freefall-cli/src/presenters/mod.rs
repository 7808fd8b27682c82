mod console;
mod plot;

pub use console::ConsolePresenter;
pub use plot::PlotPresenter;

use kinematics_rs::SessionAnalysis;

pub const WAITING_FOR_DROP: &str = "Waiting for drop...";
pub const READY_FOR_NEW_DROP: &str = "Ready for new drop...";

/// Any analysis without a fit, whatever the reason, reads as insufficient data.
pub fn analysis_title(analysis: &SessionAnalysis) -> String {
    match analysis.get_fit() {
        Ok(_) => format!("Analysis (N={})", analysis.n_samples()),
        Err(_) => "Analysis (Insufficient Data)".to_string(),
    }
}

pub fn gravity_text(g: f64) -> String {
    format!("Gravity (g): {:.3} m/s²", g)
}

pub fn fit_label(g: f64) -> String {
    format!("Fit: g={:.2}", g)
}
