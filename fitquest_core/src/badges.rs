//! Built-in badges and the milestones that unlock them.

use crate::Rarity;

/// Static description of an unlockable badge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub milestone: Milestone,
}

/// Counter a badge is keyed on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Milestone {
    Level(u32),
    WorkoutsLogged(usize),
    ProgramsCompleted(usize),
}

pub const BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "first_workout",
        name: "First Steps",
        description: "Logged your first workout",
        rarity: Rarity::Common,
        milestone: Milestone::WorkoutsLogged(1),
    },
    BadgeDefinition {
        id: "ten_workouts",
        name: "Habit Forming",
        description: "Logged 10 workouts",
        rarity: Rarity::Common,
        milestone: Milestone::WorkoutsLogged(10),
    },
    BadgeDefinition {
        id: "fifty_workouts",
        name: "Iron Regular",
        description: "Logged 50 workouts",
        rarity: Rarity::Rare,
        milestone: Milestone::WorkoutsLogged(50),
    },
    BadgeDefinition {
        id: "program_finisher",
        name: "Finisher",
        description: "Completed a full program",
        rarity: Rarity::Rare,
        milestone: Milestone::ProgramsCompleted(1),
    },
    BadgeDefinition {
        id: "level_5",
        name: "Rising Star",
        description: "Reached level 5",
        rarity: Rarity::Common,
        milestone: Milestone::Level(5),
    },
    BadgeDefinition {
        id: "level_10",
        name: "Skill Seeker",
        description: "Reached level 10",
        rarity: Rarity::Rare,
        milestone: Milestone::Level(10),
    },
    BadgeDefinition {
        id: "level_25",
        name: "Adept",
        description: "Reached level 25",
        rarity: Rarity::Epic,
        milestone: Milestone::Level(25),
    },
    BadgeDefinition {
        id: "level_50",
        name: "Legend",
        description: "Reached level 50",
        rarity: Rarity::Legendary,
        milestone: Milestone::Level(50),
    },
];

/// Badges earned by the given counters, in table order
///
/// Already-held badges are included; awarding is idempotent.
pub fn milestone_badges(
    level: u32,
    workouts_logged: usize,
    programs_completed: usize,
) -> Vec<&'static BadgeDefinition> {
    BADGES
        .iter()
        .filter(|badge| match badge.milestone {
            Milestone::Level(min) => level >= min,
            Milestone::WorkoutsLogged(min) => workouts_logged >= min,
            Milestone::ProgramsCompleted(min) => programs_completed >= min,
        })
        .collect()
}
