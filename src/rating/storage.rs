//! Ladder profile storage interface and implementations
//!
//! The updaters are pure; callers own persistence. This module is the
//! in-process seam they persist into: a storage trait over
//! `LadderProfile`s plus an in-memory implementation.

use crate::error::{LadderError, Result};
use crate::types::{LadderProfile, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage entry for a player's ladder profile with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub profile: LadderProfile,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ProfileEntry {
    pub fn new(profile: LadderProfile) -> Self {
        let now = Utc::now();
        Self {
            profile,
            last_updated: now,
            created_at: now,
        }
    }
}

/// Trait for ladder profile storage operations
pub trait RatingStorage: Send + Sync {
    /// Get a player's profile entry
    fn get(&self, player_id: &PlayerId) -> Result<Option<ProfileEntry>>;

    /// Store or replace a player's profile
    fn upsert(&self, profile: LadderProfile) -> Result<()>;

    /// Get profiles for multiple players
    fn get_many(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, ProfileEntry>>;

    /// Get all stored profiles
    fn all(&self) -> Result<Vec<ProfileEntry>>;

    /// Number of stored profiles
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory ladder storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStorage {
    profiles: RwLock<HashMap<PlayerId, ProfileEntry>>,
}

impl InMemoryRatingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a profile, inserting starting values for unknown players
    pub fn get_or_create(&self, player_id: &PlayerId) -> Result<LadderProfile> {
        if let Some(entry) = self.get(player_id)? {
            return Ok(entry.profile);
        }

        let profile = LadderProfile::new(player_id.clone());
        self.upsert(profile.clone())?;
        Ok(profile)
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn get(&self, player_id: &PlayerId) -> Result<Option<ProfileEntry>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire profiles read lock".to_string(),
            })?;

        Ok(profiles.get(player_id).cloned())
    }

    fn upsert(&self, profile: LadderProfile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire profiles write lock".to_string(),
            })?;

        match profiles.get_mut(&profile.player_id) {
            Some(entry) => {
                entry.profile = profile;
                entry.last_updated = Utc::now();
            }
            None => {
                profiles.insert(profile.player_id.clone(), ProfileEntry::new(profile));
            }
        }

        Ok(())
    }

    fn get_many(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, ProfileEntry>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire profiles read lock".to_string(),
            })?;

        Ok(player_ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|entry| (id.clone(), entry.clone())))
            .collect())
    }

    fn all(&self) -> Result<Vec<ProfileEntry>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire profiles read lock".to_string(),
            })?;

        Ok(profiles.values().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| LadderError::InternalError {
                message: "Failed to acquire profiles read lock".to_string(),
            })?;

        Ok(profiles.len())
    }
}
