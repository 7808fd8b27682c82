use gnuplot::{AxesCommon, Caption, Color, DashType, Figure, LineStyle, LineWidth, PointSymbol};
use log::warn;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

use common::Sample;
use kinematics_rs::SessionUpdate;

use super::{analysis_title, fit_label, READY_FOR_NEW_DROP};

#[derive(Debug, Default)]
struct PlotData {
    title: String,
    samples: Vec<Sample>,
    curve: Vec<Sample>,
    g: Option<f64>,
    dirty: bool,
}

impl PlotData {
    fn update(&mut self, update: &SessionUpdate) {
        match update {
            SessionUpdate::Analysis(analysis) => {
                self.title = analysis_title(analysis);
                self.samples = analysis.get_samples().to_vec();
                match analysis.get_fit() {
                    Ok(fit) => {
                        self.curve = fit.get_smooth_curve().to_vec();
                        self.g = Some(fit.g());
                    }
                    Err(_) => {
                        self.curve.clear();
                        self.g = None;
                    }
                }
            }
            SessionUpdate::Reset => {
                self.title = READY_FOR_NEW_DROP.to_string();
                self.samples.clear();
                self.curve.clear();
                self.g = None;
            }
            SessionUpdate::Trigger { .. } => return,
        }
        self.dirty = true;
    }
}

fn unzip(samples: &[Sample]) -> (Vec<f64>, Vec<f64>) {
    samples
        .iter()
        .map(|s| (s.get_timestamp(), s.get_position()))
        .unzip()
}

fn draw(figure: &mut Figure, data: &PlotData) {
    figure.clear_axes();
    let axes = figure.axes2d();
    axes.set_title(&data.title, &[]);
    axes.set_x_label("Time (s)", &[]);
    axes.set_y_label("Position (m)", &[]);

    let (t_vals, y_vals) = unzip(&data.samples);
    axes.points(
        &t_vals,
        &y_vals,
        &[Caption("Data"), Color("blue".into()), PointSymbol('O')],
    );
    if let Some(g) = data.g {
        let (t_fit, y_fit) = unzip(&data.curve);
        let label = fit_label(g);
        axes.lines(
            &t_fit,
            &y_fit,
            &[
                Caption(label.as_str()),
                Color("red".into()),
                LineStyle(DashType::Dash),
                LineWidth(2.0),
            ],
        );
    }
}

/// Position-vs-time plot of the current session, redrawn by a background thread.
#[derive(Clone, Default)]
pub struct PlotPresenter(Arc<Mutex<PlotData>>);

impl PlotPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, refresh_period_millis: u64) {
        let plot_data = Arc::clone(&self.0);
        thread::spawn(move || {
            let period = Duration::from_millis(refresh_period_millis);
            let mut figure = Figure::new();
            loop {
                let start_time = Instant::now();
                if let Ok(mut data) = plot_data.lock() {
                    if data.dirty {
                        draw(&mut figure, &data);
                        if let Err(e) = figure.show_and_keep_running() {
                            warn!("Plot disabled: {:?}", e);
                            return;
                        }
                        data.dirty = false;
                    }
                }

                let elapsed_time = start_time.elapsed();
                thread::sleep(period.saturating_sub(elapsed_time));
            }
        });
    }

    pub fn handle(&self, _id: Uuid, update: Arc<SessionUpdate>) {
        if let Ok(mut data) = self.0.lock() {
            data.update(&update);
        }
    }
}
