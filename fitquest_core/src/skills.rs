//! Skill prerequisites that gate level milestones.
//!
//! Some levels can only be reached after the user has reported mastery of
//! specific movements. Levels without an entry are open to anyone with the
//! XP for them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Difficulty tier of a gated skill
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    Foundation,
    Intermediate,
    Advanced,
    Elite,
}

/// What counts as mastering a skill
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SkillTarget {
    HoldSeconds(u32),
    Reps(u32),
}

impl fmt::Display for SkillTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillTarget::HoldSeconds(s) => write!(f, "{}s hold", s),
            SkillTarget::Reps(r) => write!(f, "{} reps", r),
        }
    }
}

/// A single skill required to unlock a level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillRequirement {
    pub skill_id: &'static str,
    pub name: &'static str,
    pub tier: SkillTier,
    pub target: SkillTarget,
}

/// Level milestone and the skills it requires
#[derive(Clone, Copy, Debug)]
pub struct LevelGate {
    pub level: u32,
    pub skills: &'static [SkillRequirement],
}

/// Outcome of checking a level's prerequisites against completed skills
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillCheck {
    pub target_level: u32,
    pub satisfied: bool,
    pub missing: Vec<SkillRequirement>,
}

impl SkillCheck {
    /// Human-readable list of missing skill names
    pub fn missing_names(&self) -> String {
        self.missing
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub const SKILL_GATES: &[LevelGate] = &[
    LevelGate {
        level: 5,
        skills: &[
            SkillRequirement {
                skill_id: "push-up",
                name: "Push-up",
                tier: SkillTier::Foundation,
                target: SkillTarget::Reps(20),
            },
            SkillRequirement {
                skill_id: "plank",
                name: "Plank",
                tier: SkillTier::Foundation,
                target: SkillTarget::HoldSeconds(60),
            },
        ],
    },
    LevelGate {
        level: 11,
        skills: &[
            SkillRequirement {
                skill_id: "l-sit",
                name: "L-sit",
                tier: SkillTier::Intermediate,
                target: SkillTarget::HoldSeconds(10),
            },
            SkillRequirement {
                skill_id: "pistol-squat",
                name: "Pistol Squat",
                tier: SkillTier::Intermediate,
                target: SkillTarget::Reps(5),
            },
        ],
    },
    LevelGate {
        level: 16,
        skills: &[
            SkillRequirement {
                skill_id: "pull-up",
                name: "Strict Pull-up",
                tier: SkillTier::Intermediate,
                target: SkillTarget::Reps(10),
            },
            SkillRequirement {
                skill_id: "wall-handstand",
                name: "Wall Handstand",
                tier: SkillTier::Intermediate,
                target: SkillTarget::HoldSeconds(30),
            },
        ],
    },
    LevelGate {
        level: 21,
        skills: &[
            SkillRequirement {
                skill_id: "muscle-up",
                name: "Muscle-up",
                tier: SkillTier::Advanced,
                target: SkillTarget::Reps(1),
            },
            SkillRequirement {
                skill_id: "tuck-front-lever",
                name: "Tuck Front Lever",
                tier: SkillTier::Advanced,
                target: SkillTarget::HoldSeconds(10),
            },
        ],
    },
    LevelGate {
        level: 31,
        skills: &[
            SkillRequirement {
                skill_id: "freestanding-handstand",
                name: "Freestanding Handstand",
                tier: SkillTier::Advanced,
                target: SkillTarget::HoldSeconds(30),
            },
            SkillRequirement {
                skill_id: "handstand-push-up",
                name: "Handstand Push-up",
                tier: SkillTier::Advanced,
                target: SkillTarget::Reps(5),
            },
        ],
    },
    LevelGate {
        level: 41,
        skills: &[
            SkillRequirement {
                skill_id: "tuck-planche",
                name: "Tuck Planche",
                tier: SkillTier::Elite,
                target: SkillTarget::HoldSeconds(10),
            },
            SkillRequirement {
                skill_id: "human-flag",
                name: "Human Flag",
                tier: SkillTier::Elite,
                target: SkillTarget::HoldSeconds(5),
            },
        ],
    },
    LevelGate {
        level: 50,
        skills: &[SkillRequirement {
            skill_id: "one-arm-pull-up",
            name: "One-arm Pull-up",
            tier: SkillTier::Elite,
            target: SkillTarget::Reps(1),
        }],
    },
];

/// Skills required to reach `level`, if the level is gated
pub fn requirements_for(level: u32) -> Option<&'static [SkillRequirement]> {
    SKILL_GATES
        .iter()
        .find(|gate| gate.level == level)
        .map(|gate| gate.skills)
}

/// Look up a gated skill by id
pub fn find_skill(skill_id: &str) -> Option<&'static SkillRequirement> {
    SKILL_GATES
        .iter()
        .flat_map(|gate| gate.skills.iter())
        .find(|skill| skill.skill_id == skill_id)
}

/// Check a level's prerequisites against a set of completed skill ids
pub fn check_requirements(target_level: u32, completed: &BTreeSet<String>) -> SkillCheck {
    let missing: Vec<SkillRequirement> = requirements_for(target_level)
        .unwrap_or(&[])
        .iter()
        .filter(|skill| !completed.contains(skill.skill_id))
        .copied()
        .collect();

    SkillCheck {
        target_level,
        satisfied: missing.is_empty(),
        missing,
    }
}
