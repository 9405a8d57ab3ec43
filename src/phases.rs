//! Phase history normalization.
//!
//! The remote build service reports phases in the order they started.
//! Every finished phase carries a status and a duration; the phase that is
//! still running carries neither. [`normalize`] fills those in for the last
//! phase so the history can be displayed without further inference.

use crate::model::BuildPhase;

/// Status shown for the phase that is currently running.
pub const IN_PROGRESS: &str = "IN PROGRESS";

/// Status shown for the completion marker when the service left it blank.
pub const SUCCEEDED: &str = "SUCCEEDED";

/// Phase type of the synthetic final phase marking overall completion.
pub const COMPLETED: &str = "COMPLETED";

/// Produce a display-ready phase history.
///
/// Order and length are preserved. Only the last phase is touched:
///
/// - a missing duration becomes `0`;
/// - a missing status becomes [`IN_PROGRESS`], or [`SUCCEEDED`] when the
///   phase is the [`COMPLETED`] marker;
/// - an explicit status is kept.
///
/// Earlier phases pass through unchanged, including any missing fields.
pub fn normalize(mut phases: Vec<BuildPhase>) -> Vec<BuildPhase> {
    if let Some(current) = phases.last_mut() {
        current.duration_seconds.get_or_insert(0);

        if current.phase_status.is_none() {
            let status = if current.phase_type == COMPLETED {
                SUCCEEDED
            } else {
                IN_PROGRESS
            };
            current.phase_status = Some(status.to_string());
        }
    }
    phases
}
