//! Core data model for phaseboard.
//!
//! A build is a sequence of phases reported by the remote build service.
//! [`BuildPhase`] is one element of that sequence, both as it arrives and
//! after normalization. [`BuildRecord`] holds the phases of one build.

mod build;
mod phase;

pub use build::BuildRecord;
pub use phase::BuildPhase;
