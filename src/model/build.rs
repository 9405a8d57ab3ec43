//! Build record: the phase history kept for one remote build.

use jiff::Timestamp;

use crate::phases;

use super::BuildPhase;

/// The phases recorded for one remote build.
///
/// Phases are stored exactly as reported. [`BuildRecord::phases`] returns
/// the normalized, display-ready history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    /// Remote build identifier, e.g. `my-project:2f1c...`.
    pub build_id: String,

    /// Remote project name, when known.
    pub project: Option<String>,

    /// When the phases were last replaced.
    pub recorded_at: Timestamp,

    phases: Vec<BuildPhase>,
}

impl BuildRecord {
    /// An empty record for the given build.
    pub fn new(build_id: impl Into<String>, project: Option<String>) -> Self {
        Self {
            build_id: build_id.into(),
            project,
            recorded_at: Timestamp::now(),
            phases: Vec::new(),
        }
    }

    /// Rebuild a record from stored parts without touching `recorded_at`.
    pub(crate) fn restore(
        build_id: String,
        project: Option<String>,
        recorded_at: Timestamp,
        phases: Vec<BuildPhase>,
    ) -> Self {
        Self {
            build_id,
            project,
            recorded_at,
            phases,
        }
    }

    /// Replace the recorded phases with a fresh list from the build service.
    pub fn set_phases(&mut self, phases: Vec<BuildPhase>) {
        self.phases = phases;
        self.recorded_at = Timestamp::now();
    }

    /// The phases exactly as they were recorded.
    pub fn raw_phases(&self) -> &[BuildPhase] {
        &self.phases
    }

    /// The display-ready phase history.
    pub fn phases(&self) -> Vec<BuildPhase> {
        phases::normalize(self.phases.clone())
    }

    /// The last phase of the normalized history, if there is one.
    pub fn current_phase(&self) -> Option<BuildPhase> {
        self.phases().pop()
    }
}
