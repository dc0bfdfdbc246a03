//! Progression events and the notifier seam.

use crate::skills::SkillRequirement;
use crate::Badge;
use std::cell::RefCell;
use std::rc::Rc;

/// Something the user should be told about
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressionEvent {
    XpGained {
        action: String,
        xp: u64,
    },
    LevelUp {
        level: u32,
        title: String,
        xp_gained: u64,
    },
    /// XP crossed a threshold but the level's skills are not all complete
    LevelUpBlocked {
        target_level: u32,
        xp_gained: u64,
        missing: Vec<SkillRequirement>,
    },
    BadgeUnlocked(Badge),
    SkillCompleted {
        skill_id: String,
    },
    /// A backend call failed; details go to the log, not the user
    Error {
        message: String,
    },
}

impl ProgressionEvent {
    /// One-line message suitable for a toast
    pub fn message(&self) -> String {
        match self {
            ProgressionEvent::XpGained { action, xp } => {
                format!("+{} XP ({})", xp, action.replace('_', " "))
            }
            ProgressionEvent::LevelUp {
                level,
                title,
                xp_gained,
            } => format!("Level up! You are now level {} ({}). +{} XP", level, title, xp_gained),
            ProgressionEvent::LevelUpBlocked {
                target_level,
                xp_gained,
                missing,
            } => {
                let names: Vec<_> = missing.iter().map(|s| s.name).collect();
                format!(
                    "+{} XP. Complete {} to reach level {}",
                    xp_gained,
                    names.join(" and "),
                    target_level
                )
            }
            ProgressionEvent::BadgeUnlocked(badge) => {
                format!("Badge unlocked: {} ({})", badge.name, badge.rarity)
            }
            ProgressionEvent::SkillCompleted { skill_id } => {
                format!("Skill completed: {}", skill_id)
            }
            ProgressionEvent::Error { message } => message.clone(),
        }
    }
}

/// Receives progression events for display
pub trait Notifier {
    fn notify(&mut self, event: ProgressionEvent);
}

/// Writes events to the log only
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, event: ProgressionEvent) {
        match &event {
            ProgressionEvent::Error { .. } => tracing::warn!("{}", event.message()),
            _ => tracing::info!("{}", event.message()),
        }
    }
}

/// Collects events in memory; clones share the same buffer
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    events: Rc<RefCell<Vec<ProgressionEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressionEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, event: ProgressionEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::requirements_for;

    #[test]
    fn test_blocked_message_names_skills() {
        let event = ProgressionEvent::LevelUpBlocked {
            target_level: 11,
            xp_gained: 50,
            missing: requirements_for(11).unwrap().to_vec(),
        };
        assert_eq!(
            event.message(),
            "+50 XP. Complete L-sit and Pistol Squat to reach level 11"
        );
    }

    #[test]
    fn test_recording_notifier_shares_buffer() {
        let recorder = RecordingNotifier::new();
        let mut handle = recorder.clone();
        handle.notify(ProgressionEvent::XpGained {
            action: "daily_login".into(),
            xp: 5,
        });

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "+5 XP (daily login)");

        recorder.clear();
        assert!(recorder.events().is_empty());
    }
}
