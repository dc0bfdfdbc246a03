#![forbid(unsafe_code)]

//! Core domain model and business logic for FitQuest.
//!
//! This crate provides:
//! - Domain types (programs, exercises, progress, progression state)
//! - The built-in catalog and catalog filtering
//! - Skill-gated XP progression, titles and badges
//! - Persistence (profile store, session log, CSV archive)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
mod lockfile;
pub mod filter;
pub mod titles;
pub mod skills;
pub mod badges;
pub mod backend;
pub mod store;
pub mod notify;
pub mod progression;
pub mod sessions;
pub mod rollup;
pub mod progress;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use filter::{filter_items, FilterState, Selection};
pub use titles::get_title;
pub use backend::{MemoryBackend, ProgressionBackend, XpRules};
pub use store::ProfileStore;
pub use notify::{Notifier, ProgressionEvent};
pub use progression::{AwardOutcome, ProgressionService};
pub use sessions::{JsonlSink, SessionSink};
pub use progress::{build_progress, load_sessions};
