use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde-serialize")]
use serde::Serialize;

/// A photogate trigger: microseconds on the device's own clock.
///
/// The device epoch is arbitrary, only differences between triggers of the
/// same session carry meaning.
///
/// # Examples
///
/// ```
/// use common::RawTrigger;
///
/// let trigger: RawTrigger = "1250000\r\n".parse().unwrap();
/// assert_eq!(trigger.as_micros(), 1_250_000);
/// assert!("12a4".parse::<RawTrigger>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct RawTrigger(u64);

impl RawTrigger {
    pub fn new(micros: u64) -> Self {
        Self(micros)
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Signed distance from `origin` in microseconds. Not clamped: a trigger
    /// older than the origin yields a negative value.
    pub fn micros_since(&self, origin: RawTrigger) -> i128 {
        self.0 as i128 - origin.0 as i128
    }
}

impl From<u64> for RawTrigger {
    fn from(micros: u64) -> Self {
        Self(micros)
    }
}

impl fmt::Display for RawTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} µs", self.0)
    }
}

/// Reasons a line from the device is not a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerParseError {
    /// Nothing left after trimming whitespace.
    Empty,

    /// The line contains something other than decimal digits.
    NotDecimal(String),

    /// Decimal digits, but too large for a 64-bit counter.
    Overflow(String),
}

impl fmt::Display for TriggerParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerParseError::Empty => write!(f, "empty trigger line"),
            TriggerParseError::NotDecimal(line) => write!(f, "not a decimal trigger: {:?}", line),
            TriggerParseError::Overflow(line) => write!(f, "trigger out of range: {}", line),
        }
    }
}

impl std::error::Error for TriggerParseError {}

impl FromStr for RawTrigger {
    type Err = TriggerParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(TriggerParseError::Empty);
        }
        // u64::from_str accepts a leading '+', the wire format does not
        if !line.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TriggerParseError::NotDecimal(line.to_string()));
        }
        line.parse::<u64>()
            .map(RawTrigger)
            .map_err(|_| TriggerParseError::Overflow(line.to_string()))
    }
}
