//! File-backed progression store with file locking.
//!
//! All users live in one JSON document. Reads take a shared lock; every
//! mutation holds an exclusive lock on `profiles.json.lock` across the whole
//! load-modify-save cycle, which writes a temp file and renames it over the
//! original.

use crate::backend::{ProgressionBackend, UserRecord, XpRules};
use crate::{Badge, Error, ProgressionState, Result, XpAward};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// On-disk layout of the profile file
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
struct ProfileFile {
    #[serde(default)]
    users: HashMap<String, UserRecord>,
}

impl ProfileFile {
    /// Load profiles with shared locking
    ///
    /// Returns empty profiles if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns empty profiles.
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No profile file found, starting fresh");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open profile file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock profile file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read profile file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<ProfileFile>(&contents) {
            Ok(profiles) => {
                tracing::debug!("Loaded {} profiles from {:?}", profiles.users.len(), path);
                Ok(profiles)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse profile file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Atomically write profiles: temp file, fsync, rename
    ///
    /// Callers hold the sidecar lock.
    fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let parent = path
            .parent()
            .ok_or_else(|| Error::Other(format!("profile path {:?} has no parent", path)))?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profiles to {:?}", path);
        Ok(())
    }
}

/// Progression backend persisting to a JSON profile file
#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
    rules: XpRules,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>, rules: XpRules) -> Self {
        Self {
            path: path.into(),
            rules,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let profiles = ProfileFile::load(&self.path)?;
        Ok(profiles.users.get(user_id).cloned())
    }

    /// Load, modify one user's record, and save
    fn update_user<T, F>(&self, user_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserRecord) -> Result<T>,
    {
        let _guard = crate::lockfile::lock_exclusive(&self.path)?;
        let mut profiles = ProfileFile::load(&self.path)?;
        let record = profiles.users.entry(user_id.to_string()).or_default();
        let result = f(record)?;
        profiles.save(&self.path)?;
        Ok(result)
    }
}

impl ProgressionBackend for ProfileStore {
    fn award_xp(&mut self, user_id: &str, action: &str, multiplier: f64) -> Result<XpAward> {
        let rules = &self.rules;
        let award = self.update_user(user_id, |record| record.credit(rules, action, multiplier))?;
        tracing::info!(
            "Credited {} XP to {} for {} (x{})",
            award.xp_gained,
            user_id,
            action,
            multiplier
        );
        Ok(award)
    }

    fn xp_for_next_level(&self, current_level: u32) -> Result<u64> {
        Ok(self.rules.xp_for_next_level(current_level))
    }

    fn commit_level(&mut self, user_id: &str, level: u32) -> Result<()> {
        let rules = &self.rules;
        self.update_user(user_id, |record| record.commit_level(rules, level))
    }

    fn load_state(&self, user_id: &str) -> Result<ProgressionState> {
        Ok(self
            .read_user(user_id)?
            .map(|r| r.to_state(user_id))
            .unwrap_or_else(|| ProgressionState::new(user_id)))
    }

    fn completed_skills(&self, user_id: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .read_user(user_id)?
            .map(|r| r.completed_skills)
            .unwrap_or_default())
    }

    fn add_completed_skill(&mut self, user_id: &str, skill_id: &str) -> Result<bool> {
        self.update_user(user_id, |record| Ok(record.add_skill(skill_id)))
    }

    fn insert_badge(&mut self, user_id: &str, badge: Badge) -> Result<bool> {
        self.update_user(user_id, |record| Ok(record.add_badge(badge)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rarity;
    use chrono::Utc;

    fn store_in(dir: &Path) -> ProfileStore {
        ProfileStore::new(dir.join("profiles.json"), XpRules::default())
    }

    #[test]
    fn test_award_persists_across_instances() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut store = store_in(temp_dir.path());
        let award = store.award_xp("u1", "workout_complete", 1.0).unwrap();
        assert_eq!(award.xp_gained, 50);
        assert!(!award.leveled_up);

        let reopened = store_in(temp_dir.path());
        let state = reopened.load_state("u1").unwrap();
        assert_eq!(state.current_xp, 50);
        assert_eq!(state.total_xp, 50);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_users_are_isolated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = store_in(temp_dir.path());

        store.add_completed_skill("u1", "plank").unwrap();
        store.award_xp("u2", "daily_login", 1.0).unwrap();

        assert_eq!(store.completed_skills("u1").unwrap().len(), 1);
        assert!(store.completed_skills("u2").unwrap().is_empty());
        assert_eq!(store.load_state("u1").unwrap().total_xp, 0);
        assert_eq!(store.load_state("u2").unwrap().total_xp, 5);
    }

    #[test]
    fn test_commit_level_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = store_in(temp_dir.path());

        let award = store.award_xp("u1", "program_complete", 1.0).unwrap();
        assert!(award.leveled_up);
        store.commit_level("u1", award.new_level).unwrap();

        let state = store.load_state("u1").unwrap();
        assert_eq!(state.level, 2);
        assert_eq!(state.current_xp, 100);
        assert_eq!(state.total_xp, 200);
    }

    #[test]
    fn test_failed_update_leaves_file_untouched() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = store_in(temp_dir.path());

        store.award_xp("u1", "daily_login", 1.0).unwrap();
        assert!(store.award_xp("u1", "not_an_action", 1.0).is_err());
        assert!(store.commit_level("u1", 5).is_err());

        assert_eq!(store.load_state("u1").unwrap().total_xp, 5);
    }

    #[test]
    fn test_duplicate_badge_not_stored_twice() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = store_in(temp_dir.path());
        let badge = Badge {
            id: "level_5".into(),
            name: "Rising Star".into(),
            description: "Reached level 5".into(),
            rarity: Rarity::Rare,
            unlocked_at: Utc::now(),
        };

        assert!(store.insert_badge("u1", badge.clone()).unwrap());
        assert!(!store.insert_badge("u1", badge).unwrap());
        assert_eq!(store.load_state("u1").unwrap().badges.len(), 1);
    }

    #[test]
    fn test_corrupted_profile_file_starts_fresh() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        let state = store.load_state("u1").unwrap();
        assert_eq!(state.level, 1);
        assert_eq!(state.total_xp, 0);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = store_in(temp_dir.path());
        store.award_xp("u1", "daily_login", 1.0).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "profiles.json" && e.file_name() != "profiles.json.lock")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only profiles.json, found extras: {:?}",
            extras
        );
    }

    #[test]
    fn test_concurrent_awards_are_not_lost() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut store = ProfileStore::new(path, XpRules::default());
                    for _ in 0..5 {
                        store.award_xp("u1", "daily_login", 1.0).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let state = store_in(temp_dir.path()).load_state("u1").unwrap();
        assert_eq!(state.total_xp, 200);
        assert_eq!(state.current_xp, 200);
    }
}
