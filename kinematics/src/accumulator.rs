use log::trace;

use common::constants::{MICROS_PER_SEC, SENSOR_SPACING_M};
use common::{RawTrigger, Sample, Series, TriggerParseError};

/// Turns the triggers of a session into position-vs-time samples.
///
/// The first trigger after a reset becomes the time origin. The k-th trigger of the
/// session (zero based) is placed `k * SENSOR_SPACING_M` below the first gate.
/// Triggers are taken as they come: out of order or wrapped timestamps yield negative
/// times and are not corrected.
#[derive(Clone, Debug)]
pub struct SampleAccumulator {
    series: Series,
    origin: Option<RawTrigger>,
}

impl SampleAccumulator {
    pub fn new(tag: &str) -> Self {
        Self {
            series: Series::new(tag),
            origin: None,
        }
    }

    /// Clears the series and forgets the time origin.
    pub fn reset(&mut self) {
        self.series.clear();
        self.origin = None;
    }

    /// Appends the sample for `trigger` and returns it. Always grows the series by one.
    pub fn ingest(&mut self, trigger: RawTrigger) -> Sample {
        let origin = *self.origin.get_or_insert(trigger);
        let timestamp = trigger.micros_since(origin) as f64 / MICROS_PER_SEC;
        let position = self.series.len() as f64 * SENSOR_SPACING_M;

        let sample = Sample::new(timestamp, position);
        trace!("{} -> ({}, {})", trigger, timestamp, position);
        self.series.add_sample(sample);
        sample
    }

    /// Parses a line from the device and ingests it.
    /// On a parse error nothing is appended.
    pub fn ingest_line(&mut self, line: &str) -> Result<Sample, TriggerParseError> {
        let trigger: RawTrigger = line.parse()?;
        Ok(self.ingest(trigger))
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn get_origin(&self) -> Option<RawTrigger> {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
