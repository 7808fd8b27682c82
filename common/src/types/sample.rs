#[cfg(feature = "serde-serialize")]
use serde::Serialize;

/// A point of the position-vs-time series.
///
/// # Examples
///
/// ```
/// use common::Sample;
///
/// let sample = Sample::new(0.1428, 0.1);
///
/// assert_eq!(sample.get_timestamp(), 0.1428);
/// assert_eq!(sample.get_position(), 0.1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct Sample {
    /// Seconds elapsed since the first trigger of the session.
    timestamp: f64,
    /// Meters fallen since the first gate.
    position: f64,
}

impl Sample {
    pub fn new(timestamp: f64, position: f64) -> Self {
        Self {
            timestamp,
            position,
        }
    }

    pub fn get_timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn get_position(&self) -> f64 {
        self.position
    }
}

impl From<(f64, f64)> for Sample {
    fn from((timestamp, position): (f64, f64)) -> Self {
        Self::new(timestamp, position)
    }
}

impl From<Sample> for (f64, f64) {
    fn from(sample: Sample) -> Self {
        (sample.timestamp, sample.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_default() {
        let sample = Sample::default();
        assert_eq!(sample.get_timestamp(), 0.0);
        assert_eq!(sample.get_position(), 0.0);
    }

    #[test]
    fn test_sample_from_tuple() {
        let sample = Sample::from((0.2, 0.3));
        assert_eq!(<(f64, f64)>::from(sample), (0.2, 0.3));
    }

    #[cfg(feature = "serde-serialize")]
    #[test]
    fn test_sample_serialize() {
        let json = serde_json::to_string(&Sample::new(0.5, 0.2)).unwrap();
        assert_eq!(json, r#"{"timestamp":0.5,"position":0.2}"#);
    }
}
