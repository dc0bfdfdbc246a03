//! Archive the session log into CSV.
//!
//! The CSV is appended and fsynced before the log is renamed, so a crash
//! part-way through leaves every session in at least one of the two files.

use crate::{Result, WorkoutSession};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV archive
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub workout: u32,
    pub performed_at: String,
    pub duration_minutes: Option<u32>,
}

impl From<&WorkoutSession> for CsvRow {
    fn from(session: &WorkoutSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            user_id: session.user_id.clone(),
            item_id: session.item_id.clone(),
            workout: session.workout,
            performed_at: session.performed_at.to_rfc3339(),
            duration_minutes: session.duration_minutes,
        }
    }
}

/// Append the log's sessions to the CSV archive and retire the log
///
/// Returns the number of sessions archived. The log is renamed to
/// `.wal.processed` rather than deleted.
pub fn archive_sessions(log_path: &Path, csv_path: &Path) -> Result<usize> {
    // Blocks appends from the read until the rename
    let _guard = crate::lockfile::lock_exclusive(log_path)?;
    let sessions = crate::sessions::read_sessions(log_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in log to archive");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only go into a brand new archive
    let needs_headers = file.metadata()?.len() == 0;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        writer.serialize(CsvRow::from(session))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Archived {} sessions to {:?}", sessions.len(), csv_path);

    let processed_path = log_path.with_extension("wal.processed");
    std::fs::rename(log_path, &processed_path)?;
    tracing::info!("Retired session log to {:?}", processed_path);

    Ok(sessions.len())
}

/// Remove retired `.wal.processed` logs from a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let retired = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with(".wal.processed"))
            .unwrap_or(false);

        if retired {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed retired log {:?}", path);
            count += 1;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::{JsonlSink, SessionSink};
    use chrono::Utc;
    use std::fs::File;
    use uuid::Uuid;

    fn session(item_id: &str) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: "local".into(),
            item_id: item_id.into(),
            workout: 1,
            performed_at: Utc::now(),
            duration_minutes: None,
        }
    }

    #[test]
    fn test_archive_creates_csv_and_retires_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&log_path);
        for item in ["leg-day", "plank", "burpee"] {
            sink.append(&session(item)).unwrap();
        }

        assert_eq!(archive_sessions(&log_path, &csv_path).unwrap(), 3);
        assert!(!log_path.exists());
        assert!(log_path.with_extension("wal.processed").exists());

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("id,user_id,item_id,workout"));
    }

    #[test]
    fn test_second_archive_appends_without_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        JsonlSink::new(&log_path).append(&session("a")).unwrap();
        archive_sessions(&log_path, &csv_path).unwrap();
        JsonlSink::new(&log_path).append(&session("b")).unwrap();
        archive_sessions(&log_path, &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_empty_log_is_left_alone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");
        File::create(&log_path).unwrap();

        assert_eq!(archive_sessions(&log_path, &csv_path).unwrap(), 0);
        assert!(log_path.exists());
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_only_removes_retired_logs() {
        let temp_dir = tempfile::tempdir().unwrap();
        File::create(temp_dir.path().join("s1.wal.processed")).unwrap();
        File::create(temp_dir.path().join("s2.wal.processed")).unwrap();
        File::create(temp_dir.path().join("keep.wal")).unwrap();

        assert_eq!(cleanup_processed_logs(temp_dir.path()).unwrap(), 2);
        assert!(temp_dir.path().join("keep.wal").exists());
    }

    #[test]
    fn test_appends_during_archive_are_kept() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let writer_path = log_path.clone();
        let writer = std::thread::spawn(move || {
            let mut sink = JsonlSink::new(&writer_path);
            for _ in 0..40 {
                sink.append(&session("plank")).unwrap();
            }
        });

        let mut archived = 0;
        for _ in 0..10 {
            archived += archive_sessions(&log_path, &csv_path).unwrap();
        }
        writer.join().expect("Writer panicked");

        let remaining = crate::sessions::read_sessions(&log_path).unwrap().len();
        assert_eq!(archived + remaining, 40);
        assert_eq!(
            crate::progress::load_sessions(&log_path, &csv_path).unwrap().len(),
            40
        );
    }
}
