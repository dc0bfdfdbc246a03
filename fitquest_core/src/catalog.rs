//! Default catalog of workout programs and library exercises.
//!
//! This module provides the built-in programs and exercises for the system.
//! Order matters: the filter engine preserves it, so it is the display order.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

#[allow(clippy::too_many_arguments)]
fn program(
    id: &str,
    name: &str,
    description: &str,
    focus: TagValue,
    equipment: TagValue,
    level: Difficulty,
    weeks: u32,
    workouts_per_week: u32,
) -> Program {
    Program {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        focus,
        duration: format!("{} weeks", weeks),
        equipment,
        level,
        weeks,
        workouts_per_week,
    }
}

fn exercise(
    id: &str,
    name: &str,
    description: &str,
    category: TagValue,
    equipment: TagValue,
    difficulty: Difficulty,
    muscles: &[&str],
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category,
        equipment,
        difficulty,
        muscles: muscles.iter().map(|m| m.to_string()).collect(),
    }
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    use Difficulty::*;

    let programs = vec![
        program(
            "foundations",
            "Bodyweight Foundations",
            "Learn the basic push, pull, squat and hinge patterns with no equipment.",
            vec!["Strength", "Mobility"].into(),
            "None".into(),
            Beginner,
            4,
            3,
        ),
        program(
            "squat-specialist",
            "Squat Specialist",
            "Twice-weekly squat frequency with accessory work for the posterior chain.",
            "Strength".into(),
            vec!["Barbell", "Squat Rack"].into(),
            Intermediate,
            8,
            3,
        ),
        program(
            "engine-builder",
            "Engine Builder",
            "Intervals and steady-state sessions to raise your aerobic ceiling.",
            "Cardio".into(),
            vec!["None", "Jump Rope"].into(),
            Beginner,
            6,
            4,
        ),
        program(
            "leg-day",
            "Leg Day",
            "A lower-body day that includes squats, lunges and single-leg balance work.",
            vec!["Strength", "Hypertrophy"].into(),
            vec!["Dumbbells", "Bench"].into(),
            Intermediate,
            6,
            2,
        ),
        program(
            "calisthenics-skills",
            "Calisthenics Skills",
            "Progressions toward the L-sit, pistol squat, muscle-up and handstand.",
            vec!["Skill", "Strength"].into(),
            vec!["Pull-up Bar", "Parallettes"].into(),
            Advanced,
            12,
            4,
        ),
        program(
            "mobility-flow",
            "Daily Mobility Flow",
            "Short joint-prep routines to open hips, shoulders and thoracic spine.",
            vec!["Mobility", "Flexibility"].into(),
            "None".into(),
            Beginner,
            2,
            7,
        ),
        program(
            "hybrid-athlete",
            "Hybrid Athlete",
            "Concurrent strength and conditioning for athletes who want both.",
            vec!["Strength", "Cardio"].into(),
            vec!["Barbell", "Kettlebell", "Rower"].into(),
            Advanced,
            10,
            5,
        ),
    ];

    let exercises = vec![
        exercise(
            "push-up",
            "Push-up",
            "Hands under shoulders, body in one line, chest to the floor.",
            "push".into(),
            "None".into(),
            Beginner,
            &["chest", "triceps", "shoulders"],
        ),
        exercise(
            "pull-up",
            "Pull-up",
            "Dead hang to chin over bar with a pronated grip.",
            "pull".into(),
            "Pull-up Bar".into(),
            Intermediate,
            &["lats", "biceps"],
        ),
        exercise(
            "goblet-squat",
            "Goblet Squat",
            "Squat holding a weight at the chest, elbows inside the knees.",
            vec!["legs", "squat"].into(),
            vec!["Dumbbells", "Kettlebell"].into(),
            Beginner,
            &["quads", "glutes"],
        ),
        exercise(
            "pistol-squat",
            "Pistol Squat",
            "Single-leg squat to full depth with the free leg held straight.",
            vec!["legs", "skill"].into(),
            "None".into(),
            Advanced,
            &["quads", "glutes", "core"],
        ),
        exercise(
            "romanian-deadlift",
            "Romanian Deadlift",
            "Hip hinge with soft knees, bar tracking the thighs.",
            vec!["legs", "hinge"].into(),
            vec!["Barbell", "Dumbbells"].into(),
            Intermediate,
            &["hamstrings", "glutes", "lower back"],
        ),
        exercise(
            "plank",
            "Plank",
            "Forearm plank holding a posterior pelvic tilt.",
            "core".into(),
            "None".into(),
            Beginner,
            &["core", "shoulders"],
        ),
        exercise(
            "l-sit",
            "L-sit",
            "Support on straight arms with legs held level in front.",
            vec!["core", "skill"].into(),
            vec!["Parallettes", "None"].into(),
            Intermediate,
            &["core", "hip flexors", "triceps"],
        ),
        exercise(
            "kettlebell-swing",
            "Kettlebell Swing",
            "Explosive hip hinge driving the bell to chest height.",
            vec!["hinge", "cardio"].into(),
            "Kettlebell".into(),
            Intermediate,
            &["glutes", "hamstrings"],
        ),
        exercise(
            "burpee",
            "Burpee",
            "Squat, kick back to plank, return and jump.",
            "cardio".into(),
            "None".into(),
            Beginner,
            &["full body"],
        ),
        exercise(
            "muscle-up",
            "Muscle-up",
            "Explosive pull transitioning over the bar into a dip.",
            vec!["pull", "push", "skill"].into(),
            "Pull-up Bar".into(),
            Advanced,
            &["lats", "chest", "triceps"],
        ),
    ];

    Catalog {
        programs,
        exercises,
    }
}

impl Catalog {
    /// Find a program by id
    pub fn program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    /// Find an exercise by id
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// True if either list holds an item with this id
    pub fn contains(&self, id: &str) -> bool {
        self.program(id).is_some() || self.exercise(id).is_some()
    }

    /// Workouts needed to complete an item, if it exists
    pub fn total_workouts(&self, id: &str) -> Option<u32> {
        self.program(id)
            .map(Program::total_workouts)
            .or_else(|| self.exercise(id).map(|_| 1))
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut ids = HashSet::new();

        for program in &self.programs {
            if program.id.is_empty() {
                errors.push("Program has empty ID".to_string());
            }
            if !ids.insert(program.id.as_str()) {
                errors.push(format!("Duplicate catalog ID '{}'", program.id));
            }
            if program.name.is_empty() {
                errors.push(format!("Program '{}' has empty name", program.id));
            }
            if program.total_workouts() == 0 {
                errors.push(format!("Program '{}' has no workouts", program.id));
            }
            if program.focus.values().is_empty() {
                errors.push(format!("Program '{}' has no focus", program.id));
            }
        }

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if !ids.insert(exercise.id.as_str()) {
                errors.push(format!("Duplicate catalog ID '{}'", exercise.id));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.category.values().is_empty() {
                errors.push(format!("Exercise '{}' has no category", exercise.id));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.programs.len(), 7);
        assert_eq!(catalog.exercises.len(), 10);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_cached_catalog_matches_built() {
        let cached = get_default_catalog();
        let built = build_default_catalog();
        let cached_ids: Vec<_> = cached.programs.iter().map(|p| &p.id).collect();
        let built_ids: Vec<_> = built.programs.iter().map(|p| &p.id).collect();
        assert_eq!(cached_ids, built_ids);
    }

    #[test]
    fn test_gated_skills_exist_as_exercises() {
        let catalog = build_default_catalog();
        for id in ["push-up", "plank", "l-sit", "pistol-squat", "pull-up", "muscle-up"] {
            assert!(crate::skills::find_skill(id).is_some());
            assert!(catalog.exercise(id).is_some(), "missing exercise {}", id);
        }
    }

    #[test]
    fn test_total_workouts() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.total_workouts("squat-specialist"), Some(24));
        assert_eq!(catalog.total_workouts("plank"), Some(1));
        assert_eq!(catalog.total_workouts("nope"), None);
    }

    #[test]
    fn test_validate_catches_duplicates_and_empty_programs() {
        let mut catalog = build_default_catalog();
        let mut dup = catalog.programs[0].clone();
        dup.weeks = 0;
        catalog.programs.push(dup);

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate")));
        assert!(errors.iter().any(|e| e.contains("no workouts")));
    }
}
