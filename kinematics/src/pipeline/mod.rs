pub mod sink;
pub mod source;

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[cfg(feature = "serde-serialize")]
use serde::Serialize;

use crate::accumulator::SampleAccumulator;
use crate::errors::PipelineError;
use crate::estimator::{FitResult, KinematicFitEstimator};
use common::{RawTrigger, Sample, Series};
use publisher::PublisherManager;

/// Work items of the session task, consumed in the order they were posted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Trigger(RawTrigger),
    Reset,
    Stop,
}

/// Published kinds of session updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTopic {
    /// One update per ingested trigger
    TriggerLog,
    /// Fit outcomes and resets
    Analysis,
}

impl From<SessionTopic> for usize {
    fn from(topic: SessionTopic) -> usize {
        topic as usize
    }
}

/// Samples of a session together with the outcome of fitting them
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct SessionAnalysis {
    tag: String,
    samples: Vec<Sample>,
    fit: FitResult,
}

impl SessionAnalysis {
    pub fn new(series: &Series, fit: FitResult) -> Self {
        Self {
            tag: series.get_tag().to_string(),
            samples: series.get_samples_ref().to_vec(),
            fit,
        }
    }

    pub fn get_tag(&self) -> &str {
        self.tag.as_str()
    }

    pub fn get_samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn get_fit(&self) -> &FitResult {
        &self.fit
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub enum SessionUpdate {
    /// A trigger and the sample it produced
    Trigger { trigger: RawTrigger, sample: Sample },
    Analysis(SessionAnalysis),
    /// The session was cleared
    Reset,
}

/// Owns the session state. Triggers and resets are queued on an unbounded channel and
/// applied one at a time by the task running [`start`](Self::start), so samples are
/// appended in the order triggers were posted.
#[derive(Clone)]
pub struct SessionPipeline {
    tag: String,
    sender: UnboundedSender<SessionCommand>,
    receiver: Arc<Mutex<Option<UnboundedReceiver<SessionCommand>>>>,
    publishers: PublisherManager<SessionUpdate, SessionTopic>,
    estimator: KinematicFitEstimator,
}

impl SessionPipeline {
    pub fn new(tag: &str) -> Self {
        Self::with_estimator(tag, KinematicFitEstimator::default())
    }

    pub fn with_estimator(tag: &str, estimator: KinematicFitEstimator) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            tag: tag.to_string(),
            sender,
            receiver: Arc::new(Mutex::new(Some(receiver))),
            publishers: PublisherManager::new(&[SessionTopic::TriggerLog, SessionTopic::Analysis]),
            estimator,
        }
    }

    /// Queues a command without waiting for it to be applied.
    /// Returns Closed once the session task has stopped.
    pub fn post(&self, command: SessionCommand) -> Result<(), PipelineError> {
        self.sender.send(command).map_err(|_| PipelineError::Closed)
    }

    /// Queues a session reset
    pub fn reset(&self) -> Result<(), PipelineError> {
        self.post(SessionCommand::Reset)
    }

    /// Stops the session task after the commands already queued
    pub fn stop(&self) -> Result<(), PipelineError> {
        self.post(SessionCommand::Stop)
    }

    /// Applies queued commands until [`stop`](Self::stop) is called.
    /// Returns AlreadyRunning if the session task was started before.
    pub async fn start(&self) -> Result<(), PipelineError> {
        let mut receiver = self
            .receiver
            .lock()
            .map_err(|_| PipelineError::Closed)?
            .take()
            .ok_or(PipelineError::AlreadyRunning)?;
        let mut accumulator = SampleAccumulator::new(&self.tag);
        info!("Waiting for drop...");

        while let Some(command) = receiver.recv().await {
            match command {
                SessionCommand::Trigger(trigger) => self.on_trigger(&mut accumulator, trigger),
                SessionCommand::Reset => self.on_reset(&mut accumulator),
                SessionCommand::Stop => break,
            }
        }
        receiver.close();
        debug!("Session {} stopped with {} samples", self.tag, accumulator.len());
        Ok(())
    }

    fn on_trigger(&self, accumulator: &mut SampleAccumulator, trigger: RawTrigger) {
        let sample = accumulator.ingest(trigger);
        self.notify_listeners(
            SessionTopic::TriggerLog,
            Arc::new(SessionUpdate::Trigger { trigger, sample }),
        );

        let fit = self.estimator.estimate(accumulator.series());
        if let Err(e) = &fit {
            debug!("No fit for {} samples: {}", accumulator.len(), e.reason());
        }
        let analysis = SessionAnalysis::new(accumulator.series(), fit);
        self.notify_listeners(
            SessionTopic::Analysis,
            Arc::new(SessionUpdate::Analysis(analysis)),
        );
    }

    fn on_reset(&self, accumulator: &mut SampleAccumulator) {
        if !accumulator.is_empty() {
            info!("Discarding {} samples", accumulator.len());
        }
        accumulator.reset();
        info!("Ready for new drop...");
        self.notify_listeners(SessionTopic::Analysis, Arc::new(SessionUpdate::Reset));
    }

    pub(crate) fn warn_dropped(&self, trigger: &RawTrigger, error: PipelineError) {
        warn!("Dropping trigger {} for session {}: {}", trigger, self.tag, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FitError;
    use publisher::listener;
    use std::time::Duration;
    use uuid::Uuid;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<SessionUpdate>>,
    }

    impl Recorder {
        fn handle(&self, _id: Uuid, update: Arc<SessionUpdate>) {
            self.updates.lock().unwrap().push((*update).clone());
        }

        fn analyses(&self) -> Vec<SessionAnalysis> {
            self.updates
                .lock()
                .unwrap()
                .iter()
                .filter_map(|u| match u {
                    SessionUpdate::Analysis(a) => Some(a.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    fn spawn_pipeline() -> (
        tokio::task::JoinHandle<Result<(), PipelineError>>,
        SessionPipeline,
        Arc<Recorder>,
    ) {
        let pipeline = SessionPipeline::new("test");
        let recorder = Arc::new(Recorder::default());
        let mut trigger_listener = listener!(recorder.handle);
        let mut analysis_listener = listener!(recorder.handle);
        pipeline
            .register_listener(&mut trigger_listener, &SessionTopic::TriggerLog)
            .unwrap();
        pipeline
            .register_listener(&mut analysis_listener, &SessionTopic::Analysis)
            .unwrap();

        let handle = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.start().await }
        });
        (handle, pipeline, recorder)
    }

    fn post_triggers(pipeline: &SessionPipeline, raw: &[u64]) {
        for r in raw {
            pipeline
                .post(SessionCommand::Trigger(RawTrigger::new(*r)))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_updates_follow_post_order() {
        let (handle, pipeline, recorder) = spawn_pipeline();
        post_triggers(&pipeline, &[3_000_000, 3_142_857, 3_202_031, 3_247_436]);
        pipeline.stop().unwrap();
        handle.await.unwrap().unwrap();

        let updates = recorder.updates.lock().unwrap().clone();
        assert_eq!(updates.len(), 8);
        assert_eq!(
            updates[0],
            SessionUpdate::Trigger {
                trigger: RawTrigger::new(3_000_000),
                sample: Sample::new(0.0, 0.0)
            }
        );

        let analyses = recorder.analyses();
        let reasons: Vec<Option<&str>> = analyses
            .iter()
            .map(|a| a.get_fit().as_ref().err().map(|e| e.reason()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                Some("insufficient_data"),
                Some("insufficient_data"),
                None,
                None
            ]
        );
        let fit = analyses[3].get_fit().as_ref().unwrap();
        assert!((fit.g() - 9.8).abs() < 0.05);
        assert_eq!(analyses[3].n_samples(), 4);
    }

    #[tokio::test]
    async fn test_reset_starts_new_session() {
        let (handle, pipeline, recorder) = spawn_pipeline();
        post_triggers(&pipeline, &[1_000, 2_000]);
        pipeline.reset().unwrap();
        post_triggers(&pipeline, &[5_000_000]);
        pipeline.stop().unwrap();
        handle.await.unwrap().unwrap();

        let updates = recorder.updates.lock().unwrap().clone();
        assert!(updates.contains(&SessionUpdate::Reset));
        let analyses = recorder.analyses();
        let last = analyses.last().unwrap();
        assert_eq!(last.get_samples(), &[Sample::new(0.0, 0.0)]);
        assert_eq!(last.get_fit(), &Err(FitError::InsufficientData));
    }

    #[tokio::test]
    async fn test_post_after_stop_is_closed() {
        let (handle, pipeline, _recorder) = spawn_pipeline();
        pipeline.stop().unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(pipeline.reset(), Err(PipelineError::Closed));
    }

    #[tokio::test]
    async fn test_start_twice() {
        let (handle, pipeline, _recorder) = spawn_pipeline();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(pipeline.start().await, Err(PipelineError::AlreadyRunning));
        pipeline.stop().unwrap();
        handle.await.unwrap().unwrap();
    }
}
