//! CLI interface for phaseboard.
//!
//! Each subcommand is non-interactive: arguments in, output out.
//! Raw phase JSON is read from `--input` or stdin. Tables go to stdout,
//! diagnostics to stderr.

mod format;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{
    config::Config,
    model::{BuildPhase, BuildRecord},
    phases,
    source::{self, RawBuild},
    storage::{Storage, StorageError},
};

use format::{format_build_line, format_phases};

/// phaseboard: phase-by-phase history of remote builds.
#[derive(Debug, Parser)]
#[command(name = "phaseboard", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: tracking a build
  1. aws codebuild batch-get-builds --ids widget:2f1c... > build.json
  2. phaseboard record --input build.json
     → prints the build id
  3. phaseboard show widget:2f1c...
  4. phaseboard forget widget:2f1c...

One-off:
  aws codebuild batch-get-builds --ids widget:2f1c... | phaseboard normalize --json"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize a raw phase list without storing it.
    ///
    /// The last phase gets a status and a duration; earlier phases are
    /// printed as given.
    Normalize {
        /// Read raw phase JSON from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Store the raw phases of a build. Prints the build id.
    ///
    /// Replaces any phases previously recorded for the same build.
    Record {
        /// Build id. Defaults to the `id` field of the input.
        #[arg(long)]
        build: Option<String>,

        /// Project name. Defaults to the `projectName` field of the input.
        #[arg(long)]
        project: Option<String>,

        /// Read raw phase JSON from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show the normalized phase history of a stored build.
    Show {
        /// Build id.
        build: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List stored builds with their current phase.
    List,

    /// Delete a stored build.
    Forget {
        /// Build id.
        build: String,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { input, json } => cmd_normalize(input.as_deref(), json),
        Command::Record {
            build,
            project,
            input,
        } => {
            let storage = open_storage(config)?;
            cmd_record(
                &storage,
                build.as_deref(),
                project.as_deref(),
                input.as_deref(),
            )
        }
        Command::Show { build, json } => cmd_show(&open_storage(config)?, &build, json),
        Command::List => cmd_list(&open_storage(config)?),
        Command::Forget { build } => cmd_forget(&open_storage(config)?, &build),
    }
}

fn open_storage(config: &Config) -> Result<Storage, String> {
    let root = config
        .storage_root()
        .ok_or("could not determine home directory")?;
    Storage::new(&root).map_err(|e| format!("failed to open storage at {}: {e}", root.display()))
}

fn cmd_normalize(input: Option<&Path>, json: bool) -> Result<(), String> {
    let raw = read_raw(input)?;
    println!("{}", render_phases(&phases::normalize(raw.phases), json)?);
    Ok(())
}

fn cmd_record(
    storage: &Storage,
    build: Option<&str>,
    project: Option<&str>,
    input: Option<&Path>,
) -> Result<(), String> {
    let raw = read_raw(input)?;

    let build_id = build
        .map(String::from)
        .or(raw.id)
        .ok_or("no build id: pass --build or include \"id\" in the input")?;
    let project = project.map(String::from).or(raw.project);

    let mut record = match storage.load_build(&build_id) {
        Ok(record) => record,
        Err(StorageError::BuildNotFound(_)) => BuildRecord::new(&build_id, None),
        Err(e) => return Err(format!("failed to load build: {e}")),
    };
    if project.is_some() {
        record.project = project;
    }
    record.set_phases(raw.phases);

    storage
        .save_build(&record)
        .map_err(|e| format!("failed to save build: {e}"))?;

    info!(
        build = %build_id,
        phases = record.raw_phases().len(),
        "recorded build"
    );
    println!("{build_id}");
    Ok(())
}

fn cmd_show(storage: &Storage, build: &str, json: bool) -> Result<(), String> {
    println!("{}", show_build(storage, build, json)?);
    Ok(())
}

/// The normalized history of a stored build, rendered for output.
fn show_build(storage: &Storage, build: &str, json: bool) -> Result<String, String> {
    let record = storage
        .load_build(build)
        .map_err(|e| format!("failed to load build: {e}"))?;
    render_phases(&record.phases(), json)
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let builds = storage
        .list_builds()
        .map_err(|e| format!("failed to list builds: {e}"))?;

    if builds.is_empty() {
        println!("No builds");
        return Ok(());
    }

    for record in &builds {
        println!("{}", format_build_line(record));
    }
    Ok(())
}

fn cmd_forget(storage: &Storage, build: &str) -> Result<(), String> {
    storage
        .remove_build(build)
        .map_err(|e| format!("failed to forget build: {e}"))?;
    info!(build = %build, "forgot build");
    eprintln!("Forgot {build}");
    Ok(())
}

/// Read raw phase JSON from a file, or stdin when no file is given.
fn read_raw(input: Option<&Path>) -> Result<RawBuild, String> {
    let json = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
    };
    source::parse_phases(&json).map_err(|e| e.to_string())
}

/// Render phases as pretty JSON or as a table.
fn render_phases(phases: &[BuildPhase], json: bool) -> Result<String, String> {
    if json {
        serde_json::to_string_pretty(phases)
            .map_err(|e| format!("failed to serialize phases: {e}"))
    } else {
        Ok(format_phases(phases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_record_flags() {
        let cli = Cli::try_parse_from([
            "phaseboard",
            "record",
            "--build",
            "widget:1",
            "--input",
            "build.json",
        ])
        .unwrap();

        match cli.command {
            Command::Record {
                build,
                project,
                input,
            } => {
                assert_eq!(build.as_deref(), Some("widget:1"));
                assert!(project.is_none());
                assert_eq!(input, Some(PathBuf::from("build.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_build() {
        assert!(Cli::try_parse_from(["phaseboard", "show"]).is_err());
    }

    fn write_input(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("build.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn record_takes_id_and_project_from_input() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let input = write_input(
            &dir,
            r#"{"builds": [{"id": "widget:1", "projectName": "widget",
                "phases": [{"phaseType": "SUBMITTED", "startTime": "2024-03-01T12:00:00Z"}]}]}"#,
        );

        cmd_record(&storage, None, None, Some(input.as_path())).unwrap();

        let record = storage.load_build("widget:1").unwrap();
        assert_eq!(record.project.as_deref(), Some("widget"));
        assert_eq!(record.raw_phases().len(), 1);
    }

    #[test]
    fn record_flags_override_input() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let input = write_input(&dir, r#"{"id": "widget:1", "projectName": "widget"}"#);

        cmd_record(&storage, Some("other:9"), Some("other"), Some(input.as_path())).unwrap();

        let record = storage.load_build("other:9").unwrap();
        assert_eq!(record.project.as_deref(), Some("other"));
        assert!(storage.load_build("widget:1").is_err());
    }

    #[test]
    fn record_keeps_known_project_when_input_has_none() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let first = write_input(&dir, r#"{"id": "widget:1", "projectName": "widget"}"#);
        cmd_record(&storage, None, None, Some(first.as_path())).unwrap();

        let second = write_input(
            &dir,
            r#"[{"phaseType": "SUBMITTED", "startTime": "2024-03-01T12:00:00Z"}]"#,
        );
        cmd_record(&storage, Some("widget:1"), None, Some(second.as_path())).unwrap();

        let record = storage.load_build("widget:1").unwrap();
        assert_eq!(record.project.as_deref(), Some("widget"));
        assert_eq!(record.raw_phases().len(), 1);
    }

    #[test]
    fn record_without_build_id_fails() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let input = write_input(
            &dir,
            r#"[{"phaseType": "SUBMITTED", "startTime": "2024-03-01T12:00:00Z"}]"#,
        );

        let err = cmd_record(&storage, None, None, Some(input.as_path())).unwrap_err();
        assert!(err.contains("no build id"));
    }

    #[test]
    fn read_raw_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_raw(Some(dir.path().join("absent.json").as_path())).unwrap_err();

        assert!(err.starts_with("failed to read"));
    }

    #[test]
    fn forget_unknown_build_fails() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();

        let err = cmd_forget(&storage, "missing:1").unwrap_err();
        assert!(err.contains("build not found"));
    }

    #[test]
    fn record_rejects_error_body_and_keeps_history() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let good = write_input(
            &dir,
            r#"{"id": "widget:1", "phases": [
                {"phaseType": "SUBMITTED", "phaseStatus": "SUCCEEDED",
                 "startTime": "2024-03-01T12:00:00Z", "durationInSeconds": 1},
                {"phaseType": "QUEUED", "startTime": "2024-03-01T12:00:01Z"}]}"#,
        );
        cmd_record(&storage, None, None, Some(good.as_path())).unwrap();

        let error_body = write_input(&dir, r#"{"message": "AccessDenied"}"#);
        let err = cmd_record(&storage, Some("widget:1"), None, Some(error_body.as_path()))
            .unwrap_err();
        assert!(err.contains("not a build"));

        let record = storage.load_build("widget:1").unwrap();
        assert_eq!(record.raw_phases().len(), 2);
    }

    fn sample_phases() -> Vec<BuildPhase> {
        let raw = source::parse_phases(
            r#"[
                {"phaseType": "SUBMITTED", "phaseStatus": "SUCCEEDED",
                 "startTime": "2024-03-01T12:00:00Z", "durationInSeconds": 1},
                {"phaseType": "BUILD", "startTime": "2024-03-01T12:00:01Z"}
            ]"#,
        )
        .unwrap();
        phases::normalize(raw.phases)
    }

    #[test]
    fn json_output_completes_last_phase() {
        let out = render_phases(&sample_phases(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        let phases = value.as_array().unwrap();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0]["phaseType"], "SUBMITTED");
        assert_eq!(phases[0]["phaseStatus"], "SUCCEEDED");
        assert_eq!(phases[0]["durationInSeconds"], 1);
        assert_eq!(phases[1]["phaseType"], "BUILD");
        assert_eq!(phases[1]["phaseStatus"], "IN PROGRESS");
        assert_eq!(phases[1]["durationInSeconds"], 0);
        assert_eq!(phases[1]["startTime"], "2024-03-01T12:00:01Z");
    }

    #[test]
    fn json_output_keeps_earlier_absences_as_null() {
        let raw = source::parse_phases(
            r#"[
                {"phaseType": "DOWNLOAD_SOURCE", "startTime": "2024-03-01T12:00:00Z"},
                {"phaseType": "COMPLETED", "startTime": "2024-03-01T12:00:09Z"}
            ]"#,
        )
        .unwrap();

        let out = render_phases(&phases::normalize(raw.phases), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert!(value[0]["phaseStatus"].is_null());
        assert!(value[0]["durationInSeconds"].is_null());
        assert_eq!(value[1]["phaseStatus"], "SUCCEEDED");
        assert_eq!(value[1]["durationInSeconds"], 0);
    }

    #[test]
    fn table_output_renders_phases() {
        let out = render_phases(&sample_phases(), false).unwrap();

        assert!(out.starts_with("PHASE"));
        assert!(out.lines().last().unwrap().contains("IN PROGRESS"));
    }

    #[test]
    fn show_build_renders_normalized_history() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();
        let input = write_input(
            &dir,
            r#"{"id": "widget:1", "phases": [
                {"phaseType": "SUBMITTED", "startTime": "2024-03-01T12:00:00Z"}]}"#,
        );
        cmd_record(&storage, None, None, Some(input.as_path())).unwrap();

        let out = show_build(&storage, "widget:1", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["phaseStatus"], "IN PROGRESS");
        assert_eq!(value[0]["durationInSeconds"], 0);
    }

    #[test]
    fn show_unknown_build_fails() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("store")).unwrap();

        let err = show_build(&storage, "missing:1", false).unwrap_err();
        assert!(err.contains("build not found"));
    }
}
