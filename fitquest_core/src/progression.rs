//! Skill-gated XP progression.
//!
//! XP arithmetic belongs to the backend. This service interprets award
//! results: XP is always credited, but a level only moves once every skill
//! registered for it is in the user's completed set. Users can therefore
//! bank XP beyond a gated threshold; the level catches up the next time XP
//! is awarded after the skills are done.

use crate::backend::ProgressionBackend;
use crate::notify::{Notifier, ProgressionEvent};
use crate::skills::{self, SkillCheck};
use crate::titles::get_title;
use crate::{Badge, Error, ProgressionState, Rarity, Result};
use chrono::Utc;

/// What an XP award did to the user's level
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AwardOutcome {
    /// No threshold crossed
    XpGained { xp_gained: u64 },
    /// Level advanced with nothing left blocked
    LeveledUp {
        level: u32,
        title: &'static str,
        xp_gained: u64,
    },
    /// A threshold was crossed but a skill gate stopped the level at `level`
    Capped {
        level: u32,
        xp_gained: u64,
        check: SkillCheck,
    },
}

impl AwardOutcome {
    pub fn xp_gained(&self) -> u64 {
        match self {
            AwardOutcome::XpGained { xp_gained }
            | AwardOutcome::LeveledUp { xp_gained, .. }
            | AwardOutcome::Capped { xp_gained, .. } => *xp_gained,
        }
    }
}

/// Progression operations for a single user
pub struct ProgressionService<B, N> {
    user_id: String,
    backend: B,
    notifier: N,
}

impl<B: ProgressionBackend, N: Notifier> ProgressionService<B, N> {
    pub fn new(user_id: impl Into<String>, backend: B, notifier: N) -> Self {
        Self {
            user_id: user_id.into(),
            backend,
            notifier,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Log a failed backend call and tell the user something went wrong
    fn report<T>(&mut self, what: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::error!("Failed to {} for {}: {}", what, self.user_id, e);
            self.notifier.notify(ProgressionEvent::Error {
                message: format!("Couldn't {}. Please try again.", what),
            });
        }
        result
    }

    /// Fresh progression snapshot from the backend
    pub fn state(&self) -> Result<ProgressionState> {
        self.backend.load_state(&self.user_id)
    }

    /// XP needed to leave the user's current level
    pub fn xp_for_next_level(&self) -> Result<u64> {
        let state = self.state()?;
        self.backend.xp_for_next_level(state.level)
    }

    /// Award XP for an action and apply any level-up the skill gates allow
    pub fn award_xp(&mut self, action: &str, multiplier: f64) -> Result<AwardOutcome> {
        let before = self.state();
        let before = self.report("load your progress", before)?;

        let award = self
            .backend
            .award_xp(&self.user_id, action, multiplier);
        let award = self.report("award XP", award)?;

        if !award.leveled_up {
            tracing::debug!("{} gained {} XP for {}", self.user_id, award.xp_gained, action);
            self.notifier.notify(ProgressionEvent::XpGained {
                action: action.to_string(),
                xp: award.xp_gained,
            });
            return Ok(AwardOutcome::XpGained {
                xp_gained: award.xp_gained,
            });
        }

        let mut reached = before.level;
        let mut blocked = None;
        for target in (before.level + 1)..=award.new_level {
            let check = self.check_skill_requirements(target)?;
            if !check.satisfied {
                blocked = Some(check);
                break;
            }
            reached = target;
        }

        if reached > before.level {
            let committed = self.backend.commit_level(&self.user_id, reached);
            self.report("save your new level", committed)?;

            let title = get_title(reached);
            tracing::info!("{} reached level {} ({})", self.user_id, reached, title);
            self.notifier.notify(ProgressionEvent::LevelUp {
                level: reached,
                title: title.to_string(),
                xp_gained: award.xp_gained,
            });
        }

        match blocked {
            Some(check) => {
                tracing::info!(
                    "{} capped at level {}: level {} needs {}",
                    self.user_id,
                    reached,
                    check.target_level,
                    check.missing_names()
                );
                self.notifier.notify(ProgressionEvent::LevelUpBlocked {
                    target_level: check.target_level,
                    xp_gained: award.xp_gained,
                    missing: check.missing.clone(),
                });
                Ok(AwardOutcome::Capped {
                    level: reached,
                    xp_gained: award.xp_gained,
                    check,
                })
            }
            None => Ok(AwardOutcome::LeveledUp {
                level: reached,
                title: get_title(reached),
                xp_gained: award.xp_gained,
            }),
        }
    }

    /// Check the skills registered for `target_level` against the user's
    /// completed skills. Ungated levels are always satisfied.
    pub fn check_skill_requirements(&mut self, target_level: u32) -> Result<SkillCheck> {
        if skills::requirements_for(target_level).is_none() {
            return Ok(skills::check_requirements(target_level, &Default::default()));
        }

        let completed = self.backend.completed_skills(&self.user_id);
        let completed = self.report("load your skills", completed)?;
        let check = skills::check_requirements(target_level, &completed);

        if !check.satisfied {
            tracing::debug!(
                "Level {} requirements missing for {}: {}",
                target_level,
                self.user_id,
                check.missing_names()
            );
        }
        Ok(check)
    }

    /// Record a badge unlock. Returns false if the user already had it.
    ///
    /// Failures are logged but not shown to the user.
    pub fn award_badge(
        &mut self,
        id: &str,
        name: &str,
        description: &str,
        rarity: Rarity,
    ) -> Result<bool> {
        let badge = Badge {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rarity,
            unlocked_at: Utc::now(),
        };

        match self.backend.insert_badge(&self.user_id, badge.clone()) {
            Ok(true) => {
                tracing::info!("{} unlocked badge {}", self.user_id, id);
                self.notifier.notify(ProgressionEvent::BadgeUnlocked(badge));
                Ok(true)
            }
            Ok(false) => {
                tracing::debug!("{} already holds badge {}", self.user_id, id);
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Failed to award badge {} to {}: {}", id, self.user_id, e);
                Err(e)
            }
        }
    }

    /// Self-report mastery of a gated skill. Returns false if already recorded.
    pub fn mark_skill_complete(&mut self, skill_id: &str) -> Result<bool> {
        if skills::find_skill(skill_id).is_none() {
            return Err(Error::UnknownSkill(skill_id.to_string()));
        }

        let added = self.backend.add_completed_skill(&self.user_id, skill_id);
        let added = self.report("save your skill", added)?;
        if added {
            self.notifier.notify(ProgressionEvent::SkillCompleted {
                skill_id: skill_id.to_string(),
            });
        }
        Ok(added)
    }
}
