//! Build storage: save, load, list, and remove build records.

use jiff::Timestamp;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::model::{BuildPhase, BuildRecord};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Saves a build record, replacing any previous record with the same id.
    ///
    /// The phase list is replaced in a single transaction.
    pub fn save_build(&self, record: &BuildRecord) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO build (id, project, recorded_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET project = excluded.project,
                                           recorded_at = excluded.recorded_at",
            params![
                &record.build_id,
                &record.project,
                record.recorded_at.to_string(),
            ],
        )?;
        tx.execute(
            "DELETE FROM phase WHERE build_id = ?1",
            params![&record.build_id],
        )?;

        for (seq, phase) in record.raw_phases().iter().enumerate() {
            let seq = i64::try_from(seq)
                .map_err(|_| StorageError::OutOfRange(format!("phase index {seq}")))?;
            let duration = phase
                .duration_seconds
                .map(i64::try_from)
                .transpose()
                .map_err(|e| StorageError::OutOfRange(format!("duration_seconds: {e}")))?;
            tx.execute(
                "INSERT INTO phase
                   (build_id, seq, phase_type, phase_status, start_time, duration_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &record.build_id,
                    seq,
                    &phase.phase_type,
                    &phase.phase_status,
                    phase.start_time.to_string(),
                    duration,
                ],
            )?;
        }

        tx.commit()?;
        debug!(
            build = %record.build_id,
            phases = record.raw_phases().len(),
            "saved build"
        );
        Ok(())
    }

    /// Loads a single build record.
    pub fn load_build(&self, build_id: &str) -> Result<BuildRecord> {
        let conn = self.open()?;
        let row = conn
            .query_row(
                "SELECT project, recorded_at FROM build WHERE id = ?1",
                params![build_id],
                |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((project, recorded_at)) = row else {
            return Err(StorageError::BuildNotFound(build_id.to_string()));
        };

        let recorded_at = parse_timestamp(&recorded_at, "recorded_at")?;
        let phases = load_phases(&conn, build_id)?;
        debug!(build = %build_id, phases = phases.len(), "loaded build");

        Ok(BuildRecord::restore(
            build_id.to_string(),
            project,
            recorded_at,
            phases,
        ))
    }

    /// Lists all build records, oldest recording first.
    pub fn list_builds(&self) -> Result<Vec<BuildRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT id, project, recorded_at FROM build")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut builds = Vec::with_capacity(rows.len());
        for (id, project, recorded_at) in rows {
            let recorded_at = parse_timestamp(&recorded_at, "recorded_at")?;
            let phases = load_phases(&conn, &id)?;
            builds.push(BuildRecord::restore(id, project, recorded_at, phases));
        }
        builds.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(builds)
    }

    /// Removes a build record and its phases.
    pub fn remove_build(&self, build_id: &str) -> Result<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM phase WHERE build_id = ?1", params![build_id])?;
        let rows = tx.execute("DELETE FROM build WHERE id = ?1", params![build_id])?;
        if rows == 0 {
            return Err(StorageError::BuildNotFound(build_id.to_string()));
        }
        tx.commit()?;
        debug!(build = %build_id, "removed build");
        Ok(())
    }
}

/// Reads a build's phases in recorded order.
fn load_phases(conn: &Connection, build_id: &str) -> Result<Vec<BuildPhase>> {
    let mut stmt = conn.prepare(
        "SELECT phase_type, phase_status, start_time, duration_seconds
         FROM phase WHERE build_id = ?1 ORDER BY seq",
    )?;
    let rows = stmt
        .query_map(params![build_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(phase_type, phase_status, start_time, duration)| -> Result<BuildPhase> {
            let duration_seconds = duration
                .map(u64::try_from)
                .transpose()
                .map_err(|e| StorageError::Corrupt(format!("invalid duration_seconds: {e}")))?;
            let mut phase = BuildPhase::new(phase_type, parse_timestamp(&start_time, "start_time")?);
            phase.phase_status = phase_status;
            phase.duration_seconds = duration_seconds;
            Ok(phase)
        })
        .collect()
}

fn parse_timestamp(value: &str, column: &str) -> Result<Timestamp> {
    value
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
