//! Clock readings and corrections.

use coordsim_types::ProcessId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;

/// Errors parsing a clock reading from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockParseError {
    #[error("invalid clock time {0:?}, expected HH:MM or HH:MM:SS")]
    InvalidTime(String),

    #[error("invalid node clock {0:?}, expected ID=HH:MM")]
    InvalidNodeClock(String),
}

/// Wall-clock reading of one node, in whole seconds since midnight.
///
/// Readings are not wrapped at midnight; a corrected clock past 24:00 shows
/// hours beyond 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(i64);

impl ClockTime {
    /// Build a reading from hours, minutes and seconds.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(
            i64::from(hours) * SECS_PER_HOUR
                + i64::from(minutes) * SECS_PER_MINUTE
                + i64::from(seconds),
        )
    }

    /// Build a reading from hours and minutes.
    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        Self::from_hms(hours, minutes, 0)
    }

    /// Seconds since midnight.
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Offset that moves `self` onto `target`.
    pub fn offset_to(&self, target: ClockTime) -> ClockOffset {
        ClockOffset(target.0 - self.0)
    }

    /// Apply a correction.
    pub fn adjusted(&self, offset: ClockOffset) -> ClockTime {
        ClockTime(self.0 + offset.0)
    }

    /// Floor of the mean of `times`; `None` for no readings.
    pub fn average(times: impl IntoIterator<Item = ClockTime>) -> Option<ClockTime> {
        let (sum, count) = times
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), t| (sum + t.0, count + 1));
        if count == 0 {
            return None;
        }
        Some(ClockTime(sum.div_euclid(count)))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0.div_euclid(SECS_PER_HOUR);
        let minutes = self.0.rem_euclid(SECS_PER_HOUR) / SECS_PER_MINUTE;
        let seconds = self.0.rem_euclid(SECS_PER_MINUTE);
        if seconds == 0 {
            write!(f, "{:02}:{:02}", hours, minutes)
        } else {
            write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
        }
    }
}

impl FromStr for ClockTime {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClockParseError::InvalidTime(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        let fields: Vec<u32> = parts
            .iter()
            .map(|part| part.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;

        match fields.as_slice() {
            [h, m] if *m < 60 => Ok(Self::from_hm(*h, *m)),
            [h, m, sec] if *m < 60 && *sec < 60 => Ok(Self::from_hms(*h, *m, *sec)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

/// Signed clock correction in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockOffset(pub i64);

impl ClockOffset {
    /// Correction in whole seconds.
    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ClockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let magnitude = Duration::from_secs(self.0.unsigned_abs());
        write!(f, "{}{}", sign, humantime::format_duration(magnitude))
    }
}

/// A node and its clock reading, written `ID=HH:MM` on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClock {
    pub id: ProcessId,
    pub time: ClockTime,
}

impl NodeClock {
    pub fn new(id: ProcessId, time: ClockTime) -> Self {
        Self { id, time }
    }
}

impl FromStr for NodeClock {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, time) = s
            .split_once('=')
            .ok_or_else(|| ClockParseError::InvalidNodeClock(s.to_string()))?;
        let id = id
            .parse::<ProcessId>()
            .map_err(|_| ClockParseError::InvalidNodeClock(s.to_string()))?;
        Ok(Self::new(id, time.parse()?))
    }
}
