//! Points, levels, and badge progression.
//!
//! The profile is a value: [`GamificationProfile::apply_delta`] is a pure
//! transition, and [`add_points`] wraps it in one load → transform → save
//! round against the storage collaborator. Multi-writer safety for the same
//! profile belongs to the collaborator (row lock or version check), not here.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ResultEngine;
use crate::store::{BadgeCatalog, ProfileStore};

/// Accumulated points required to advance one level.
const POINTS_PER_LEVEL: i64 = 100;

/// Badge unlocked at 10 points.
pub const BADGE_FIRST_STEP: &str = "first-step";
/// Badge unlocked at 500 points.
pub const BADGE_SAVER: &str = "saver";
/// Badge unlocked at level 5.
pub const BADGE_BUDGET_EXPERT: &str = "budget-expert";

/// Coarse banding derived purely from the level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl LevelTier {
    /// Maps a level to its tier: ≤ 3 Beginner, 4–7 Intermediate, ≥ 8 Advanced.
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=3 => Self::Beginner,
            4..=7 => Self::Intermediate,
            _ => Self::Advanced,
        }
    }
}

/// One user's progression state.
///
/// Badges are append-only: once unlocked, an identifier is never removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationProfile {
    pub user_id: Uuid,
    pub points: i64,
    pub level: u32,
    pub tier: LevelTier,
    pub badges: BTreeSet<String>,
}

impl GamificationProfile {
    /// Fresh profile: level 1, no points, no badges.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            points: 0,
            level: 1,
            tier: LevelTier::Beginner,
            badges: BTreeSet::new(),
        }
    }

    /// Applies a point delta and recomputes level and tier from the new
    /// total.
    ///
    /// Any delta is accepted; the total is floored at zero so `points ≥ 0`
    /// always holds. The level is a pure function of the total (one level
    /// per 100 points), never incremented independently.
    pub fn apply_delta(&mut self, delta: i64) {
        self.points = self.points.saturating_add(delta).max(0);
        self.level = level_for_points(self.points);
        self.tier = LevelTier::for_level(self.level);
    }

    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.contains(name)
    }
}

fn level_for_points(points: i64) -> u32 {
    u32::try_from(points / POINTS_PER_LEVEL + 1).unwrap_or(u32::MAX)
}

/// Badge identifiers whose thresholds the given state satisfies.
fn threshold_badges(points: i64, level: u32) -> Vec<&'static str> {
    let mut earned = Vec::new();
    if points >= 10 {
        earned.push(BADGE_FIRST_STEP);
    }
    if points >= 500 {
        earned.push(BADGE_SAVER);
    }
    if level >= 5 {
        earned.push(BADGE_BUDGET_EXPERT);
    }
    earned
}

/// A badge as defined in the externally supplied catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub name: String,
    pub description: String,
}

/// Awards `delta` points to a user, creating the profile on first award.
///
/// Thresholds are evaluated against the state *after* the delta; unlocking
/// is idempotent, and a badge the catalog does not define is skipped without
/// error.
pub(crate) fn add_points<S>(store: &S, user_id: Uuid, delta: i64) -> ResultEngine<GamificationProfile>
where
    S: ProfileStore + BadgeCatalog,
{
    let mut profile = store
        .load_profile(user_id)?
        .unwrap_or_else(|| GamificationProfile::new(user_id));
    profile.apply_delta(delta);

    for name in threshold_badges(profile.points, profile.level) {
        if profile.has_badge(name) {
            continue;
        }
        match store.find_badge_by_name(name)? {
            Some(badge) => {
                tracing::debug!(badge = name, user_id = %user_id, "badge unlocked");
                profile.badges.insert(badge.name);
            }
            None => tracing::debug!(badge = name, "badge not in catalog, skipping award"),
        }
    }

    store.save_profile(&profile)?;
    Ok(profile)
}
