#[cfg(feature = "serde-serialize")]
use serde::Serialize;

use super::{Sample, SessionTag};

const DEFAULT_SERIES_CAPACITY: usize = 16;

/// Ordered samples of the current session. Append-only until cleared.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct Series {
    buffer: Vec<Sample>,
    tag: SessionTag,
}

impl Series {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: SessionTag::new(tag),
            buffer: Vec::with_capacity(DEFAULT_SERIES_CAPACITY),
        }
    }

    pub fn from_vec(tag: &str, data: Vec<Sample>) -> Self {
        Self {
            tag: SessionTag::new(tag),
            buffer: data,
        }
    }

    pub fn add_sample(&mut self, elem: Sample) {
        self.buffer.push(elem);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_tag(&self) -> &str {
        self.tag.inner()
    }

    pub fn get_samples_ref(&self) -> &[Sample] {
        &self.buffer
    }

    pub fn iter_samples(&self) -> impl Iterator<Item = &Sample> {
        self.buffer.iter()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.buffer.last()
    }

    pub fn get_timestamps(&self) -> Vec<f64> {
        self.buffer.iter().map(|s| s.get_timestamp()).collect()
    }

    pub fn get_positions(&self) -> Vec<f64> {
        self.buffer.iter().map(|s| s.get_position()).collect()
    }

    /// Smallest and largest timestamp, `None` on an empty series.
    /// Timestamps are not assumed to be sorted.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        self.buffer.iter().map(|s| s.get_timestamp()).fold(None, |span, t| match span {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
    }
}
