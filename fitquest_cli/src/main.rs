use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use fitquest_core::badges::milestone_badges;
use fitquest_core::notify::ProgressionEvent;
use fitquest_core::progress::programs_completed;
use fitquest_core::skills::{self, SKILL_GATES};
use fitquest_core::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fitquest")]
#[command(about = "Workout catalog and XP progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    user: Option<String>,
}

/// Filters shared by the program and exercise listings
#[derive(Args)]
struct CommonFilters {
    /// Case-insensitive text search
    #[arg(long)]
    search: Option<String>,

    /// Equipment required
    #[arg(long)]
    equipment: Option<String>,

    /// Only show items you have completed
    #[arg(long)]
    completed: bool,

    /// Only show items logged within this many days
    #[arg(long, value_name = "DAYS")]
    active_within: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workout programs
    Programs {
        #[command(flatten)]
        filters: CommonFilters,

        /// Training focus (e.g. Strength, Cardio)
        #[arg(long)]
        focus: Option<String>,

        /// Program length (e.g. "8 weeks")
        #[arg(long)]
        duration: Option<String>,

        /// Beginner, Intermediate or Advanced
        #[arg(long)]
        level: Option<String>,
    },

    /// List library exercises
    Exercises {
        #[command(flatten)]
        filters: CommonFilters,

        /// Movement category (e.g. push, legs, core)
        #[arg(long)]
        category: Option<String>,

        /// Beginner, Intermediate or Advanced
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Log a completed workout and earn XP
    Log {
        /// Program or exercise id
        item_id: String,

        /// Workout number within the program
        #[arg(long, default_value_t = 1)]
        workout: u32,

        /// How long the workout took
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Award XP for an action
    Award {
        /// Action type (e.g. workout_complete, daily_login)
        action: String,

        #[arg(long, default_value_t = 1.0)]
        multiplier: f64,
    },

    /// Show skill requirements for gated levels
    Skills {
        /// Only show requirements for this level
        #[arg(long)]
        level: Option<u32>,
    },

    /// Mark a gated skill as mastered
    SkillComplete {
        skill_id: String,
    },

    /// Show level, XP and title (default)
    Status,

    /// List unlocked badges
    Badges,

    /// Archive the session log to CSV
    Rollup {
        /// Clean up retired session logs after archiving
        #[arg(long)]
        cleanup: bool,
    },
}

/// File locations under the data directory
struct DataPaths {
    log_dir: PathBuf,
    session_log: PathBuf,
    archive: PathBuf,
    profiles: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let log_dir = data_dir.join("wal");
        Self {
            session_log: log_dir.join("sessions.wal"),
            log_dir,
            archive: data_dir.join("sessions.csv"),
            profiles: data_dir.join("profiles.json"),
        }
    }
}

/// Prints progression events as they happen
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, event: ProgressionEvent) {
        match event {
            ProgressionEvent::Error { .. } => eprintln!("✗ {}", event.message()),
            ProgressionEvent::LevelUp { .. } | ProgressionEvent::BadgeUnlocked(_) => {
                println!("★ {}", event.message())
            }
            _ => println!("  {}", event.message()),
        }
    }
}

type Service = ProgressionService<ProfileStore, ConsoleNotifier>;

fn main() -> Result<()> {
    // Initialize logging
    fitquest_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let user_id = cli.user.unwrap_or_else(|| config.user.id.clone());
    let paths = DataPaths::new(&data_dir);

    let service = ProgressionService::new(
        user_id.as_str(),
        ProfileStore::new(&paths.profiles, XpRules::from_config(&config.xp)),
        ConsoleNotifier,
    );

    match cli.command {
        Some(Commands::Programs {
            filters,
            focus,
            duration,
            level,
        }) => {
            let state = build_filter_state(&filters, focus, duration, level)?;
            cmd_programs(&paths, &user_id, &state)
        }
        Some(Commands::Exercises {
            filters,
            category,
            difficulty,
        }) => {
            let state = build_filter_state(&filters, category, None, difficulty)?;
            cmd_exercises(&paths, &user_id, &state)
        }
        Some(Commands::Log {
            item_id,
            workout,
            minutes,
        }) => cmd_log(&paths, service, &item_id, workout, minutes),
        Some(Commands::Award { action, multiplier }) => cmd_award(service, &action, multiplier),
        Some(Commands::Skills { level }) => cmd_skills(&service, level),
        Some(Commands::SkillComplete { skill_id }) => cmd_skill_complete(service, &skill_id),
        Some(Commands::Badges) => cmd_badges(&service),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        Some(Commands::Status) | None => cmd_status(&service),
    }
}

fn build_filter_state(
    filters: &CommonFilters,
    focus: Option<String>,
    duration: Option<String>,
    level: Option<String>,
) -> Result<FilterState> {
    let active_since = filters.active_within.map(active_cutoff).transpose()?;

    Ok(FilterState {
        search: filters.search.clone().unwrap_or_default(),
        focus: Selection::parse(focus.as_deref()),
        duration: Selection::parse(duration.as_deref()),
        equipment: Selection::parse(filters.equipment.as_deref()),
        level: Selection::parse(level.as_deref()),
        active_since,
        completed_only: filters.completed,
    })
}

/// Start of a window covering the last `days` days
fn active_cutoff(days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(|| Error::Other(format!("--active-within {} days is out of range", days)))
}

fn load_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn load_progress(
    paths: &DataPaths,
    catalog: &Catalog,
    user_id: &str,
) -> Result<(Vec<WorkoutSession>, HashMap<String, ProgressRecord>)> {
    let sessions = load_sessions(&paths.session_log, &paths.archive)?;
    let progress = build_progress(catalog, &sessions, user_id);
    Ok((sessions, progress))
}

fn progress_note(record: Option<&ProgressRecord>) -> String {
    match record {
        Some(r) if r.is_completed => "✓ done".to_string(),
        Some(r) => format!("{}/{}", r.completed_count, r.total_count),
        None => String::new(),
    }
}

fn cmd_programs(paths: &DataPaths, user_id: &str, state: &FilterState) -> Result<()> {
    let catalog = load_catalog()?;
    let (_, progress) = load_progress(paths, catalog, user_id)?;

    let programs = filter_items(&catalog.programs, state, Some(&progress));
    if programs.is_empty() {
        println!("No programs match these filters.");
        return Ok(());
    }

    for program in programs {
        println!(
            "{:<22} {:<26} {:<12} {:<10} {:<13} {}",
            program.id,
            program.name,
            program.focus.to_string(),
            program.duration,
            program.level.to_string(),
            progress_note(progress.get(&program.id))
        );
    }
    Ok(())
}

fn cmd_exercises(paths: &DataPaths, user_id: &str, state: &FilterState) -> Result<()> {
    let catalog = load_catalog()?;
    let (_, progress) = load_progress(paths, catalog, user_id)?;

    let exercises = filter_items(&catalog.exercises, state, Some(&progress));
    if exercises.is_empty() {
        println!("No exercises match these filters.");
        return Ok(());
    }

    for exercise in exercises {
        println!(
            "{:<20} {:<20} {:<18} {:<13} {}",
            exercise.id,
            exercise.name,
            exercise.category.to_string(),
            exercise.difficulty.to_string(),
            progress_note(progress.get(&exercise.id))
        );
    }
    Ok(())
}

fn cmd_log(
    paths: &DataPaths,
    mut service: Service,
    item_id: &str,
    workout: u32,
    minutes: Option<u32>,
) -> Result<()> {
    let catalog = load_catalog()?;
    let user_id = service.user_id().to_string();

    let total = catalog
        .total_workouts(item_id)
        .ok_or_else(|| Error::UnknownItem(item_id.to_string()))?;
    if workout == 0 || workout > total {
        return Err(Error::Other(format!(
            "Workout {} is out of range for {} (1-{})",
            workout, item_id, total
        )));
    }

    let (_, before) = load_progress(paths, catalog, &user_id)?;
    let was_completed = before.get(item_id).map(|r| r.is_completed).unwrap_or(false);

    let session = WorkoutSession {
        id: uuid::Uuid::new_v4(),
        user_id: user_id.clone(),
        item_id: item_id.to_string(),
        workout,
        performed_at: Utc::now(),
        duration_minutes: minutes,
    };
    let mut sink = JsonlSink::new(&paths.session_log);
    sink.append(&session)?;
    println!("✓ Workout logged: {} #{}", item_id, workout);

    // XP failures are reported by the notifier; the workout stays logged
    let action = if catalog.program(item_id).is_some() {
        "workout_complete"
    } else {
        "exercise_complete"
    };
    let _ = service.award_xp(action, 1.0);

    let (sessions, after) = load_progress(paths, catalog, &user_id)?;
    let now_completed = after.get(item_id).map(|r| r.is_completed).unwrap_or(false);
    if catalog.program(item_id).is_some() && now_completed && !was_completed {
        println!("✓ Program complete: {}", item_id);
        let _ = service.award_xp("program_complete", 1.0);
    }

    award_milestone_badges(&mut service, catalog, &sessions, &after);
    Ok(())
}

fn award_milestone_badges(
    service: &mut Service,
    catalog: &Catalog,
    sessions: &[WorkoutSession],
    progress: &HashMap<String, ProgressRecord>,
) {
    let level = match service.state() {
        Ok(state) => state.level,
        Err(e) => {
            tracing::warn!("Skipping badge check: {}", e);
            return;
        }
    };
    let workouts_logged = sessions
        .iter()
        .filter(|s| s.user_id == service.user_id())
        .count();

    for badge in milestone_badges(level, workouts_logged, programs_completed(catalog, progress)) {
        // Badge failures are logged inside the service
        let _ = service.award_badge(badge.id, badge.name, badge.description, badge.rarity);
    }
}

fn cmd_award(mut service: Service, action: &str, multiplier: f64) -> Result<()> {
    service.award_xp(action, multiplier)?;
    Ok(())
}

fn cmd_skills(service: &Service, level: Option<u32>) -> Result<()> {
    let completed: BTreeSet<String> = service.backend().completed_skills(service.user_id())?;

    let gates: Vec<_> = SKILL_GATES
        .iter()
        .filter(|gate| level.map(|l| gate.level == l).unwrap_or(true))
        .collect();

    if gates.is_empty() {
        println!("No skill requirements for that level.");
        return Ok(());
    }

    for gate in gates {
        let check = skills::check_requirements(gate.level, &completed);
        let marker = if check.satisfied { "✓" } else { " " };
        println!("{} Level {}", marker, gate.level);
        for skill in gate.skills {
            let done = if completed.contains(skill.skill_id) { "✓" } else { "·" };
            println!(
                "    {} {:<24} {:<16} {}",
                done, skill.skill_id, skill.target, skill.name
            );
        }
    }
    Ok(())
}

fn cmd_skill_complete(mut service: Service, skill_id: &str) -> Result<()> {
    if !service.mark_skill_complete(skill_id)? {
        println!("Already completed: {}", skill_id);
    }
    Ok(())
}

fn cmd_status(service: &Service) -> Result<()> {
    let state = service.state()?;
    let next = service.xp_for_next_level()?;

    println!("{} · Level {} · {}", state.user_id, state.level, state.title);
    println!(
        "  XP: {} / {} toward level {}",
        state.current_xp,
        next,
        state.level + 1
    );
    println!("  Total XP: {}", state.total_xp);
    println!("  Badges: {}", state.badges.len());

    if state.current_xp >= next {
        let completed = service.backend().completed_skills(service.user_id())?;
        let check = skills::check_requirements(state.level + 1, &completed);
        if !check.satisfied {
            println!(
                "  Level {} is locked until you complete: {}",
                check.target_level,
                check.missing_names()
            );
        }
    }
    Ok(())
}

fn cmd_badges(service: &Service) -> Result<()> {
    let state = service.state()?;
    if state.badges.is_empty() {
        println!("No badges yet.");
        return Ok(());
    }

    let mut badges: Vec<_> = state.badges.values().collect();
    badges.sort_by_key(|b| b.unlocked_at);
    for badge in badges {
        println!(
            "{:<18} {:<10} {}  {}",
            badge.name,
            badge.rarity.to_string(),
            badge.unlocked_at.format("%Y-%m-%d"),
            badge.description
        );
    }
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.session_log.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let count = fitquest_core::rollup::archive_sessions(&paths.session_log, &paths.archive)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.archive.display());

    if cleanup {
        let cleaned = fitquest_core::rollup::cleanup_processed_logs(&paths.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed session logs", cleaned);
        }
    }

    Ok(())
}
