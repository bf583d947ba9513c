//! Global tag and lane profile registry.
//!
//! The registry outlives translation runs. Each run borrows it through a
//! [`RegistryContext`], which records whether anything was added so the
//! registry is persisted at most once per run.
pub mod maintenance;
pub mod persist;
pub mod profiles;
pub mod tags;

use crate::config::TranslatorConfig;
use crate::error::TranslateResult;
use bevy::log::info;
use constants::lane_profile::LANE_PROFILE_PREFIX;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use persist::{JsonRegistryFile, RegistryPersister};
pub use profiles::{LaneDescriptor, LaneDirection, LaneProfile, LaneProfileRef};
pub use tags::{TagInfo, TagMask, TagRegistry};

/// Tag slots and lane profiles shared by every zone shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneGraphSettings {
    pub tags: TagRegistry,
    pub lane_profiles: Vec<LaneProfile>,
}

impl ZoneGraphSettings {
    pub fn with_tag_capacity(capacity: usize) -> Self {
        Self {
            tags: TagRegistry::with_capacity(capacity),
            lane_profiles: Vec::new(),
        }
    }

    pub fn profile_by_id(&self, id: Uuid) -> Option<&LaneProfile> {
        self.lane_profiles.iter().find(|profile| profile.id == id)
    }

    pub fn profile_by_ref(&self, reference: &LaneProfileRef) -> Option<&LaneProfile> {
        self.profile_by_id(reference.id)
    }

    pub fn profile_by_name(&self, name: &str) -> Option<&LaneProfile> {
        self.lane_profiles
            .iter()
            .find(|profile| profile.name.as_deref() == Some(name))
    }
}

/// Mutable view of the registry for the duration of one run.
pub struct RegistryContext<'a> {
    settings: &'a mut ZoneGraphSettings,
    modified: bool,
    max_lane_profiles: Option<usize>,
    lane_profile_prefix: String,
}

impl<'a> RegistryContext<'a> {
    pub fn new(settings: &'a mut ZoneGraphSettings) -> Self {
        Self {
            settings,
            modified: false,
            max_lane_profiles: None,
            lane_profile_prefix: LANE_PROFILE_PREFIX.to_string(),
        }
    }

    pub fn with_config(settings: &'a mut ZoneGraphSettings, config: &TranslatorConfig) -> Self {
        Self {
            settings,
            modified: false,
            max_lane_profiles: config.max_lane_profiles,
            lane_profile_prefix: config.lane_profile_prefix.clone(),
        }
    }

    pub fn settings(&self) -> &ZoneGraphSettings {
        self.settings
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn lane_profile_prefix(&self) -> &str {
        &self.lane_profile_prefix
    }

    /// Resolve a tag name to its mask, allocating a slot on first use.
    /// Empty names carry no tag and never touch the registry.
    pub fn tag(&mut self, name: &str) -> TagMask {
        if name.is_empty() {
            return TagMask::NONE;
        }
        self.settings.tags.find_or_create(name, &mut self.modified)
    }

    pub(crate) fn has_profile_capacity(&self) -> bool {
        self.max_lane_profiles
            .is_none_or(|max| self.settings.lane_profiles.len() < max)
    }

    /// Append a new profile and return its index.
    pub(crate) fn push_profile(&mut self, profile: LaneProfile) -> usize {
        self.settings.lane_profiles.push(profile);
        self.modified = true;
        self.settings.lane_profiles.len() - 1
    }

    /// Keep only the profiles `keep` accepts. Removing any marks the
    /// registry modified. Returns the number removed.
    pub(crate) fn retain_profiles<F: FnMut(&LaneProfile) -> bool>(&mut self, keep: F) -> usize {
        let before = self.settings.lane_profiles.len();
        self.settings.lane_profiles.retain(keep);
        let removed = before - self.settings.lane_profiles.len();
        if removed > 0 {
            self.modified = true;
        }
        removed
    }

    /// Persist the registry if this run changed it. Returns whether it did.
    pub fn flush<P: RegistryPersister + ?Sized>(&mut self, persister: &mut P) -> TranslateResult<bool> {
        if !self.modified {
            return Ok(false);
        }
        persister.persist(self.settings)?;
        info!(
            "[ZONE] Registry saved: {} tags in use, {} lane profiles",
            self.settings.tags.slots().iter().filter(|slot| slot.is_valid()).count(),
            self.settings.lane_profiles.len()
        );
        self.modified = false;
        Ok(true)
    }
}
