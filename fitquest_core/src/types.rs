//! Core domain types for FitQuest.
//!
//! This module defines the fundamental types used throughout the system:
//! - Catalog items (programs and exercises) and their tag fields
//! - Per-item progress derived from logged workouts
//! - Per-user progression state, badges and XP award results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Catalog Field Types
// ============================================================================

/// Difficulty tier shared by programs and exercises
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(crate::Error::Other(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// A catalog field holding either one tag or several.
///
/// Program focus, exercise category and equipment come in both shapes in the
/// catalog data; filtering only ever asks whether a value is present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TagValue {
    Scalar(String),
    Collection(Vec<String>),
}

impl TagValue {
    /// True if the scalar equals `value`, or the collection contains it.
    ///
    /// Comparison ignores ASCII case.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TagValue::Scalar(tag) => tag.eq_ignore_ascii_case(value),
            TagValue::Collection(tags) => tags.iter().any(|t| t.eq_ignore_ascii_case(value)),
        }
    }

    /// All tags as string slices, in declaration order
    pub fn values(&self) -> Vec<&str> {
        match self {
            TagValue::Scalar(tag) => vec![tag.as_str()],
            TagValue::Collection(tags) => tags.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TagValue {
    fn from(tag: &str) -> Self {
        TagValue::Scalar(tag.to_string())
    }
}

impl From<Vec<&str>> for TagValue {
    fn from(tags: Vec<&str>) -> Self {
        TagValue::Collection(tags.into_iter().map(String::from).collect())
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.values().join(", "))
    }
}

// ============================================================================
// Catalog Items
// ============================================================================

/// A multi-week workout program
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub description: String,
    pub focus: TagValue,
    /// Coarse bucket such as "8 weeks"
    pub duration: String,
    pub equipment: TagValue,
    pub level: Difficulty,
    pub weeks: u32,
    pub workouts_per_week: u32,
}

impl Program {
    /// Number of workouts that make up the whole program
    pub fn total_workouts(&self) -> u32 {
        self.weeks * self.workouts_per_week
    }
}

/// A single movement from the exercise library
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TagValue,
    pub equipment: TagValue,
    pub difficulty: Difficulty,
    pub muscles: Vec<String>,
}

/// The static catalog of programs and exercises, in display order
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub programs: Vec<Program>,
    pub exercises: Vec<Exercise>,
}

// ============================================================================
// Progress and Sessions
// ============================================================================

/// Completion progress for one catalog item
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    pub completed_count: u32,
    pub total_count: u32,
    pub is_completed: bool,
    pub last_activity_date: Option<DateTime<Utc>>,
}

/// A logged workout against a program or exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: String,
    pub item_id: String,
    /// 1-based workout number within a program; always 1 for exercises
    pub workout: u32,
    pub performed_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
}

// ============================================================================
// Progression Types
// ============================================================================

/// Badge rarity tier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        };
        f.write_str(name)
    }
}

/// An unlocked achievement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub unlocked_at: DateTime<Utc>,
}

/// A user's level, XP and badges
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionState {
    pub user_id: String,
    pub level: u32,
    /// XP accumulated toward the next level
    pub current_xp: u64,
    /// Lifetime XP, never decreases
    pub total_xp: u64,
    pub title: String,
    pub badges: BTreeMap<String, Badge>,
}

impl ProgressionState {
    /// Fresh state for a user who has never earned XP
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            level: 1,
            current_xp: 0,
            total_xp: 0,
            title: crate::titles::get_title(1).to_string(),
            badges: BTreeMap::new(),
        }
    }
}

/// Result of an XP grant as reported by the XP authority
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct XpAward {
    pub xp_gained: u64,
    pub leveled_up: bool,
    /// Highest level the credited XP reaches; equals the current level when
    /// `leveled_up` is false
    pub new_level: u32,
}
