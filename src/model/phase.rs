//! Build phase: one stage of a remote build execution.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single phase of a build.
///
/// Serialized with the field names the remote build API uses, so a phase
/// list copied out of `batch-get-builds` output deserializes as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPhase {
    /// Phase identifier, e.g. `PROVISIONING`, `BUILD`, or `COMPLETED`.
    pub phase_type: String,

    /// Outcome of the phase. Absent while the phase is still running.
    pub phase_status: Option<String>,

    /// When the phase began.
    #[serde(deserialize_with = "start_time::deserialize")]
    pub start_time: Timestamp,

    /// How long the phase took. Absent while the phase is still running.
    #[serde(rename = "durationInSeconds")]
    pub duration_seconds: Option<u64>,
}

impl BuildPhase {
    /// A phase with no status and no duration yet.
    pub fn new(phase_type: impl Into<String>, start_time: Timestamp) -> Self {
        Self {
            phase_type: phase_type.into(),
            phase_status: None,
            start_time,
            duration_seconds: None,
        }
    }

    // Fixture builder; service data arrives through serde.
    #[cfg_attr(not(test), allow(dead_code))]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.phase_status = Some(status.into());
        self
    }

    #[cfg_attr(not(test), allow(dead_code))]
    #[must_use]
    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}

/// `startTime` arrives as RFC 3339 text from the AWS CLI and as epoch
/// seconds (possibly fractional) from the raw API.
mod start_time {
    use jiff::Timestamp;
    use serde::{Deserialize, Deserializer, de::Error as _};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Seconds(f64),
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => text.parse().map_err(D::Error::custom),
            Wire::Seconds(seconds) => from_epoch_seconds(seconds).map_err(D::Error::custom),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_epoch_seconds(seconds: f64) -> Result<Timestamp, String> {
        if !seconds.is_finite() {
            return Err(format!("invalid epoch seconds: {seconds}"));
        }
        let mut whole = seconds.floor();
        let mut nanos = ((seconds - whole) * 1e9).round() as i32;
        if nanos >= 1_000_000_000 {
            whole += 1.0;
            nanos = 0;
        }
        Timestamp::new(whole as i64, nanos).map_err(|e| e.to_string())
    }
}
