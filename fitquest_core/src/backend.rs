//! XP authority and the progression backend seam.
//!
//! [`ProgressionBackend`] is everything the progression service needs from
//! persistent storage: crediting XP, reporting level thresholds, committing
//! levels, and reading/writing skill completions and badges. The arithmetic
//! itself lives in [`XpRules`] and [`UserRecord`] so every backend computes
//! awards the same way.

use crate::config::XpConfig;
use crate::{Badge, Error, ProgressionState, Result, XpAward};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Storage and XP authority used by the progression service
pub trait ProgressionBackend {
    /// Credit XP for an action and report whether a level threshold was crossed
    fn award_xp(&mut self, user_id: &str, action: &str, multiplier: f64) -> Result<XpAward>;

    /// XP needed to advance from `current_level` to the next level
    fn xp_for_next_level(&self, current_level: u32) -> Result<u64>;

    /// Advance the user's level to `level`, spending the XP for each step.
    /// Levels already reached are left alone.
    fn commit_level(&mut self, user_id: &str, level: u32) -> Result<()>;

    /// Current progression snapshot, or a fresh one for unknown users
    fn load_state(&self, user_id: &str) -> Result<ProgressionState>;

    fn completed_skills(&self, user_id: &str) -> Result<BTreeSet<String>>;

    /// Record a skill completion; false if it was already recorded
    fn add_completed_skill(&mut self, user_id: &str, skill_id: &str) -> Result<bool>;

    /// Record a badge unlock; false if the user already holds it
    fn insert_badge(&mut self, user_id: &str, badge: Badge) -> Result<bool>;
}

// ============================================================================
// XP Rules
// ============================================================================

/// Reward rates and the level threshold curve
#[derive(Clone, Debug)]
pub struct XpRules {
    rewards: HashMap<String, u64>,
    base_threshold: u64,
}

impl XpRules {
    pub fn new(rewards: HashMap<String, u64>, base_threshold: u64) -> Self {
        Self {
            rewards,
            base_threshold,
        }
    }

    pub fn from_config(config: &XpConfig) -> Self {
        Self::new(config.rewards.clone(), config.base_threshold)
    }

    /// Scaled XP for one action
    pub fn xp_for_action(&self, action: &str, multiplier: f64) -> Result<u64> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(Error::InvalidMultiplier(multiplier));
        }
        let base = self
            .rewards
            .get(action)
            .copied()
            .ok_or_else(|| Error::UnknownAction(action.to_string()))?;

        let scaled = (base as f64 * multiplier).round();
        if scaled >= u64::MAX as f64 {
            return Err(Error::InvalidMultiplier(multiplier));
        }
        Ok(scaled as u64)
    }

    /// XP needed to go from `level` to `level + 1`
    ///
    /// Power curve: `round(base * level^1.5)`.
    pub fn xp_for_next_level(&self, level: u32) -> u64 {
        let level = level.max(1) as f64;
        (self.base_threshold as f64 * level.powf(1.5)).round() as u64
    }

    /// Highest level reachable from `level` with `current_xp` banked
    pub fn reachable_level(&self, level: u32, current_xp: u64) -> u32 {
        let mut reached = level;
        let mut remaining = current_xp;
        loop {
            let needed = self.xp_for_next_level(reached);
            if needed == 0 || remaining < needed {
                return reached;
            }
            remaining -= needed;
            reached += 1;
        }
    }
}

impl Default for XpRules {
    fn default() -> Self {
        Self::from_config(&XpConfig::default())
    }
}

// ============================================================================
// Per-user Record
// ============================================================================

fn default_level() -> u32 {
    1
}

/// Stored progression data for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub current_xp: u64,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub completed_skills: BTreeSet<String>,
    #[serde(default)]
    pub badges: BTreeMap<String, Badge>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            level: default_level(),
            current_xp: 0,
            total_xp: 0,
            completed_skills: BTreeSet::new(),
            badges: BTreeMap::new(),
        }
    }
}

impl UserRecord {
    /// Credit XP; the level itself only moves through [`UserRecord::commit_level`]
    pub fn credit(&mut self, rules: &XpRules, action: &str, multiplier: f64) -> Result<XpAward> {
        let xp_gained = rules.xp_for_action(action, multiplier)?;
        let overflow = || Error::Backend(format!("{} XP would overflow the XP total", xp_gained));
        let current_xp = self.current_xp.checked_add(xp_gained).ok_or_else(overflow)?;
        let total_xp = self.total_xp.checked_add(xp_gained).ok_or_else(overflow)?;
        self.current_xp = current_xp;
        self.total_xp = total_xp;

        let new_level = rules.reachable_level(self.level, self.current_xp);
        Ok(XpAward {
            xp_gained,
            leveled_up: new_level > self.level,
            new_level,
        })
    }

    /// Advance to `level`, deducting each step's threshold from banked XP
    ///
    /// A level at or below the current one is a no-op: another process
    /// already committed it.
    pub fn commit_level(&mut self, rules: &XpRules, level: u32) -> Result<()> {
        if level <= self.level {
            tracing::debug!("Level {} already reached (at {})", level, self.level);
            return Ok(());
        }

        let mut remaining = self.current_xp;
        for step in self.level..level {
            let needed = rules.xp_for_next_level(step);
            remaining = remaining.checked_sub(needed).ok_or_else(|| {
                Error::Backend(format!("not enough XP to reach level {}", step + 1))
            })?;
        }

        self.level = level;
        self.current_xp = remaining;
        Ok(())
    }

    pub fn to_state(&self, user_id: &str) -> ProgressionState {
        ProgressionState {
            user_id: user_id.to_string(),
            level: self.level,
            current_xp: self.current_xp,
            total_xp: self.total_xp,
            title: crate::titles::get_title(self.level).to_string(),
            badges: self.badges.clone(),
        }
    }

    pub fn add_skill(&mut self, skill_id: &str) -> bool {
        self.completed_skills.insert(skill_id.to_string())
    }

    pub fn add_badge(&mut self, badge: Badge) -> bool {
        if self.badges.contains_key(&badge.id) {
            return false;
        }
        self.badges.insert(badge.id.clone(), badge);
        true
    }
}

// ============================================================================
// In-memory Backend
// ============================================================================

/// Backend holding every user in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    rules: XpRules,
    users: HashMap<String, UserRecord>,
}

impl MemoryBackend {
    pub fn new(rules: XpRules) -> Self {
        Self {
            rules,
            users: HashMap::new(),
        }
    }

    /// Replace a user's stored record
    pub fn insert_user(&mut self, user_id: &str, record: UserRecord) {
        self.users.insert(user_id.to_string(), record);
    }

    pub fn user(&self, user_id: &str) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    fn user_mut(&mut self, user_id: &str) -> &mut UserRecord {
        self.users.entry(user_id.to_string()).or_default()
    }
}

impl ProgressionBackend for MemoryBackend {
    fn award_xp(&mut self, user_id: &str, action: &str, multiplier: f64) -> Result<XpAward> {
        let rules = self.rules.clone();
        self.user_mut(user_id).credit(&rules, action, multiplier)
    }

    fn xp_for_next_level(&self, current_level: u32) -> Result<u64> {
        Ok(self.rules.xp_for_next_level(current_level))
    }

    fn commit_level(&mut self, user_id: &str, level: u32) -> Result<()> {
        let rules = self.rules.clone();
        self.user_mut(user_id).commit_level(&rules, level)
    }

    fn load_state(&self, user_id: &str) -> Result<ProgressionState> {
        Ok(self
            .users
            .get(user_id)
            .map(|r| r.to_state(user_id))
            .unwrap_or_else(|| ProgressionState::new(user_id)))
    }

    fn completed_skills(&self, user_id: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .users
            .get(user_id)
            .map(|r| r.completed_skills.clone())
            .unwrap_or_default())
    }

    fn add_completed_skill(&mut self, user_id: &str, skill_id: &str) -> Result<bool> {
        Ok(self.user_mut(user_id).add_skill(skill_id))
    }

    fn insert_badge(&mut self, user_id: &str, badge: Badge) -> Result<bool> {
        Ok(self.user_mut(user_id).add_badge(badge))
    }
}
