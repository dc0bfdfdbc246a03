//! Per-item progress derived from logged workouts.
//!
//! Sessions come from the live log and the CSV archive; a session can sit in
//! both between a rollup and cleanup, so they are deduplicated by id.

use crate::rollup::CsvRow;
use crate::{Catalog, Error, ProgressRecord, Result, WorkoutSession};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

impl TryFrom<CsvRow> for WorkoutSession {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;
        let performed_at = DateTime::parse_from_rfc3339(&row.performed_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(WorkoutSession {
            id,
            user_id: row.user_id,
            item_id: row.item_id,
            workout: row.workout,
            performed_at,
            duration_minutes: row.duration_minutes,
        })
    }
}

fn load_sessions_from_csv(path: &Path) -> Result<Vec<WorkoutSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sessions = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result.map_err(Error::from).and_then(WorkoutSession::try_from) {
            Ok(session) => sessions.push(session),
            Err(e) => tracing::warn!("Skipping archived session row: {}", e),
        }
    }
    Ok(sessions)
}

/// All sessions from the live log and the archive, newest first
pub fn load_sessions(log_path: &Path, csv_path: &Path) -> Result<Vec<WorkoutSession>> {
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    for session in crate::sessions::read_sessions(log_path)? {
        if seen_ids.insert(session.id) {
            sessions.push(session);
        }
    }

    if csv_path.exists() {
        for session in load_sessions_from_csv(csv_path)? {
            if seen_ids.insert(session.id) {
                sessions.push(session);
            }
        }
    }

    sessions.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
    tracing::debug!("Loaded {} sessions", sessions.len());
    Ok(sessions)
}

/// Progress records for one user, keyed by catalog item id
///
/// A program is complete once every workout number from 1 to its total has
/// been logged at least once. Sessions for items no longer in the catalog
/// are ignored.
pub fn build_progress(
    catalog: &Catalog,
    sessions: &[WorkoutSession],
    user_id: &str,
) -> HashMap<String, ProgressRecord> {
    let mut workouts: HashMap<&str, BTreeSet<u32>> = HashMap::new();
    let mut last_activity: HashMap<&str, DateTime<Utc>> = HashMap::new();

    for session in sessions.iter().filter(|s| s.user_id == user_id) {
        let Some(total) = catalog.total_workouts(&session.item_id) else {
            tracing::debug!("Ignoring session for unknown item {}", session.item_id);
            continue;
        };
        if (1..=total).contains(&session.workout) {
            workouts
                .entry(session.item_id.as_str())
                .or_default()
                .insert(session.workout);
        }
        let last = last_activity
            .entry(session.item_id.as_str())
            .or_insert(session.performed_at);
        if session.performed_at > *last {
            *last = session.performed_at;
        }
    }

    last_activity
        .into_iter()
        .filter_map(|(item_id, last)| {
            let total_count = catalog.total_workouts(item_id)?;
            let completed_count = workouts.get(item_id).map(|w| w.len() as u32).unwrap_or(0);
            Some((
                item_id.to_string(),
                ProgressRecord {
                    completed_count,
                    total_count,
                    is_completed: completed_count >= total_count,
                    last_activity_date: Some(last),
                },
            ))
        })
        .collect()
}

/// Number of distinct programs a user has finished
pub fn programs_completed(catalog: &Catalog, progress: &HashMap<String, ProgressRecord>) -> usize {
    catalog
        .programs
        .iter()
        .filter(|p| progress.get(&p.id).map(|r| r.is_completed).unwrap_or(false))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::sessions::{JsonlSink, SessionSink};
    use chrono::Duration;

    fn session(user: &str, item_id: &str, workout: u32, days_ago: i64) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            user_id: user.into(),
            item_id: item_id.into(),
            workout,
            performed_at: Utc::now() - Duration::days(days_ago),
            duration_minutes: Some(30),
        }
    }

    #[test]
    fn test_program_progress_counts_distinct_workouts() {
        let catalog = build_default_catalog();
        let sessions = vec![
            session("u1", "leg-day", 1, 5),
            session("u1", "leg-day", 1, 4),
            session("u1", "leg-day", 2, 1),
            session("u1", "leg-day", 99, 0),
        ];

        let progress = build_progress(&catalog, &sessions, "u1");
        let record = &progress["leg-day"];
        assert_eq!(record.completed_count, 2);
        assert_eq!(record.total_count, 12);
        assert!(!record.is_completed);
        // Out-of-range workout still counts as activity
        assert_eq!(record.last_activity_date, Some(sessions[3].performed_at));
    }

    #[test]
    fn test_program_completes_when_every_workout_logged() {
        let catalog = build_default_catalog();
        let total = catalog.total_workouts("mobility-flow").unwrap();
        let sessions: Vec<_> = (1..=total)
            .map(|w| session("u1", "mobility-flow", w, 1))
            .collect();

        let progress = build_progress(&catalog, &sessions, "u1");
        assert!(progress["mobility-flow"].is_completed);
        assert_eq!(programs_completed(&catalog, &progress), 1);
    }

    #[test]
    fn test_single_exercise_session_completes_exercise() {
        let catalog = build_default_catalog();
        let sessions = vec![session("u1", "plank", 1, 0)];
        let progress = build_progress(&catalog, &sessions, "u1");
        assert!(progress["plank"].is_completed);
        assert_eq!(programs_completed(&catalog, &progress), 0);
    }

    #[test]
    fn test_other_users_and_unknown_items_ignored() {
        let catalog = build_default_catalog();
        let sessions = vec![
            session("u2", "plank", 1, 0),
            session("u1", "retired-program", 1, 0),
        ];
        assert!(build_progress(&catalog, &sessions, "u1").is_empty());
    }

    #[test]
    fn test_load_sessions_merges_and_dedupes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let archived = session("u1", "plank", 1, 3);
        JsonlSink::new(&log_path).append(&archived).unwrap();
        crate::rollup::archive_sessions(&log_path, &csv_path).unwrap();

        // Same session logged again, plus a newer one
        let mut sink = JsonlSink::new(&log_path);
        sink.append(&archived).unwrap();
        let newest = session("u1", "burpee", 1, 0);
        sink.append(&newest).unwrap();

        let sessions = load_sessions(&log_path, &csv_path).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, newest.id);
        assert_eq!(sessions[1].id, archived.id);
    }
}
