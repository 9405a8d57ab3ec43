//! Output formatting for CLI display.

use crate::model::{BuildPhase, BuildRecord};

const STARTED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a duration the way a build dashboard shows it: `42s`, `3m 05s`.
pub(super) fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

/// Format a phase history as an aligned table. Missing values show as `-`.
pub(super) fn format_phases(phases: &[BuildPhase]) -> String {
    if phases.is_empty() {
        return "No phases".to_string();
    }

    let rows: Vec<[String; 4]> = phases
        .iter()
        .map(|p| {
            [
                p.phase_type.clone(),
                p.phase_status.clone().unwrap_or_else(|| "-".to_string()),
                p.start_time.strftime(STARTED_FORMAT).to_string(),
                p.duration_seconds
                    .map_or_else(|| "-".to_string(), format_duration),
            ]
        })
        .collect();

    let header = ["PHASE", "STATUS", "STARTED", "DURATION"].map(String::from);
    let mut widths = header.each_ref().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            format!(
                "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of a stored build.
pub(super) fn format_build_line(record: &BuildRecord) -> String {
    let project = record.project.as_deref().unwrap_or("-");
    let count = record.raw_phases().len();
    let current = match record.current_phase() {
        Some(phase) => format!(
            "{} {}",
            phase.phase_type,
            phase.phase_status.as_deref().unwrap_or("-")
        ),
        None => "no phases".to_string(),
    };
    format!("{}  [{project}]  {count} phase(s)  {current}", record.build_id)
}
