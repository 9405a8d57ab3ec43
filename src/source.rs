//! Raw phase input.
//!
//! Phase lists come from the remote build service, usually by way of
//! `aws codebuild batch-get-builds`. Three shapes are accepted:
//!
//! ```text
//! [ { "phaseType": ..., ... }, ... ]                 # bare phase list
//! { "id": ..., "projectName": ..., "phases": [...] }  # one build
//! { "builds": [ { ...one build... } ] }               # batch-get-builds output
//! ```
//!
//! Nothing here checks ordering or where the completion marker sits.

use serde::Deserialize;
use serde_json::Value;

use crate::model::BuildPhase;

/// Errors that can occur while reading raw phase input.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("invalid phase JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input contains no builds")]
    NoBuilds,

    #[error("input contains {0} builds, expected exactly one")]
    MultipleBuilds(usize),

    #[error("input is not a build: expected an \"id\" or \"phases\" key")]
    NotABuild,
}

/// A raw phase list and whatever build metadata came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBuild {
    pub id: Option<String>,
    pub project: Option<String>,
    pub phases: Vec<BuildPhase>,
}

#[derive(Deserialize)]
struct Envelope {
    builds: Vec<WireBuild>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBuild {
    id: Option<String>,
    project_name: Option<String>,
    #[serde(default)]
    phases: Vec<BuildPhase>,
}

impl From<WireBuild> for RawBuild {
    fn from(build: WireBuild) -> Self {
        Self {
            id: build.id,
            project: build.project_name,
            phases: build.phases,
        }
    }
}

/// Parse raw phase input in any of the accepted shapes.
pub fn parse_phases(json: &str) -> Result<RawBuild, SourceError> {
    let value: Value = serde_json::from_str(json)?;

    if value.is_array() {
        return Ok(RawBuild {
            id: None,
            project: None,
            phases: serde_json::from_value(value)?,
        });
    }

    if value.get("builds").is_some() {
        let Envelope { mut builds } = serde_json::from_value(value)?;
        return match builds.len() {
            0 => Err(SourceError::NoBuilds),
            1 => Ok(builds.remove(0).into()),
            n => Err(SourceError::MultipleBuilds(n)),
        };
    }

    // Error bodies from the build service are objects too.
    if value.is_object() && value.get("id").is_none() && value.get("phases").is_none() {
        return Err(SourceError::NotABuild);
    }

    let build: WireBuild = serde_json::from_value(value)?;
    Ok(build.into())
}
