//! Collaborator seams for the excluded data-access layer.
//!
//! The engine never talks to a database: it reads per-user snapshots and
//! persists gamification profiles through these traits. Calls are
//! synchronous per the engine's one-shot call model; async transports adapt
//! at the boundary. Collaborator failures map into
//! [`EngineError::Storage`](crate::EngineError::Storage) (or
//! [`KeyNotFound`](crate::EngineError::KeyNotFound) for missing entities)
//! and are propagated unchanged.
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::ResultEngine;
use crate::dashboard::FinancialSnapshot;
use crate::error::EngineError;
use crate::gamification::{BadgeDefinition, GamificationProfile};

/// Read access to one user's persisted financial records.
pub trait RecordsReader {
    /// Returns a consistent snapshot of the user's records.
    fn find_user_records(&self, user_id: Uuid) -> ResultEngine<FinancialSnapshot>;
}

/// Read/write access to gamification profiles.
pub trait ProfileStore {
    fn load_profile(&self, user_id: Uuid) -> ResultEngine<Option<GamificationProfile>>;
    fn save_profile(&self, profile: &GamificationProfile) -> ResultEngine<()>;
}

/// Lookup into the externally managed badge catalog.
pub trait BadgeCatalog {
    fn find_badge_by_name(&self, name: &str) -> ResultEngine<Option<BadgeDefinition>>;
}

/// In-memory implementation of all three collaborator traits.
///
/// Backs the integration tests and callers that do not need durable
/// storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, FinancialSnapshot>>,
    profiles: Mutex<HashMap<Uuid, GamificationProfile>>,
    badges: Mutex<HashMap<String, BadgeDefinition>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the three threshold badges.
    pub fn with_standard_badges() -> Self {
        let store = Self::new();
        for (name, description) in [
            ("first-step", "Earned your first points."),
            ("saver", "Built a serious points streak."),
            ("budget-expert", "Reached level 5."),
        ] {
            store.insert_badge(BadgeDefinition {
                name: name.to_string(),
                description: description.to_string(),
            });
        }
        store
    }

    /// Registers a user snapshot, keyed by its profile's user id.
    pub fn insert_records(&self, snapshot: FinancialSnapshot) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.profile.user_id, snapshot);
    }

    pub fn insert_badge(&self, badge: BadgeDefinition) {
        self.badges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(badge.name.clone(), badge);
    }
}

impl RecordsReader for MemoryStore {
    fn find_user_records(&self, user_id: Uuid) -> ResultEngine<FinancialSnapshot> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(user_id.to_string()))
    }
}

impl ProfileStore for MemoryStore {
    fn load_profile(&self, user_id: Uuid) -> ResultEngine<Option<GamificationProfile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned())
    }

    fn save_profile(&self, profile: &GamificationProfile) -> ResultEngine<()> {
        self.profiles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

impl BadgeCatalog for MemoryStore {
    fn find_badge_by_name(&self, name: &str) -> ResultEngine<Option<BadgeDefinition>> {
        Ok(self
            .badges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned())
    }
}
