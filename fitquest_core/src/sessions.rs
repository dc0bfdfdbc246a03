//! Workout session log.
//!
//! Completed workouts are appended to a JSON Lines file under an exclusive
//! file lock, so several CLI processes can log at once. Appends also hold
//! the log's sidecar lock, which rollup takes before retiring the log.

use crate::{Result, WorkoutSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for logged workouts
pub trait SessionSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()>;
}

/// JSONL-based session sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionSink for JsonlSink {
    fn append(&mut self, session: &WorkoutSession) -> Result<()> {
        // Held until return so a rollup can't retire the log mid-append
        let _guard = crate::lockfile::lock_exclusive(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        // One line per session; a single write keeps lines whole
        let mut line = serde_json::to_string(session)?;
        line.push('\n');
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Logged session {} for {}", session.id, session.item_id);
        Ok(())
    }
}

/// Read every session from a log, skipping lines that fail to parse
pub fn read_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable session at {:?} line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn session_for(item_id: &str, workout: u32) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: "local".into(),
            item_id: item_id.into(),
            workout,
            performed_at: Utc::now(),
            duration_minutes: Some(45),
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("wal").join("sessions.wal");

        let mut sink = JsonlSink::new(&log_path);
        let first = session_for("leg-day", 1);
        sink.append(&first).unwrap();
        sink.append(&session_for("plank", 1)).unwrap();

        let sessions = read_sessions(&log_path).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, first.id);
        assert_eq!(sessions[1].item_id, "plank");
    }

    #[test]
    fn test_missing_log_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let sessions = read_sessions(&temp_dir.path().join("nope.wal")).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&session_for("leg-day", 1)).unwrap();

        let mut file = OpenOptions::new().append(true).open(&log_path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        drop(file);

        sink.append(&session_for("leg-day", 2)).unwrap();

        let sessions = read_sessions(&log_path).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].workout, 2);
    }
}
