//! Content-addressed lane profile lookup.
use crate::registry::{LaneDescriptor, LaneProfile, LaneProfileRef, RegistryContext, ZoneGraphSettings};
use bevy::log::{error, info, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// 32-bit content hash of a lane sequence over each lane's canonical bytes.
pub fn content_hash(lanes: &[LaneDescriptor]) -> u32 {
    let mut hasher = Sha256::new();
    for lane in lanes {
        hasher.update(lane.canonical_bytes());
    }
    let digest = hasher.finalize();
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Name given to a profile created without an explicit name: the prefix,
/// one direction glyph per lane from the last lane to the first, then the hash.
pub fn generated_profile_name(prefix: &str, lanes: &[LaneDescriptor], hash: u32) -> String {
    let glyphs: String = lanes.iter().rev().map(|lane| lane.direction.glyph()).collect();
    format!("{}{}_{}", prefix, glyphs, (hash as i32).unsigned_abs())
}

/// Run-scoped profile resolver.
/// Identical lane sequences always resolve to one profile; the hash index is
/// seeded with the profiles already registered so earlier runs are reused.
#[derive(Debug, Default)]
pub struct LaneProfileResolver {
    by_hash: HashMap<u32, LaneProfileRef>,
    by_name: HashMap<String, Option<LaneProfileRef>>,
}

impl LaneProfileResolver {
    pub fn new(settings: &ZoneGraphSettings) -> Self {
        let mut by_hash = HashMap::new();
        for profile in &settings.lane_profiles {
            by_hash
                .entry(content_hash(&profile.lanes))
                .or_insert_with(|| profile.reference());
        }
        Self {
            by_hash,
            by_name: HashMap::new(),
        }
    }

    /// Profile holding exactly `lanes`, registering a new one when none does.
    /// Returns `None` only when the profile table is full.
    pub fn find_or_create(
        &mut self,
        ctx: &mut RegistryContext<'_>,
        lanes: Vec<LaneDescriptor>,
        explicit_name: Option<&str>,
    ) -> Option<LaneProfileRef> {
        let hash = content_hash(&lanes);
        if let Some(found) = self.by_hash.get(&hash) {
            return Some(found.clone());
        }

        if !ctx.has_profile_capacity() {
            error!(
                "[LANE] Cannot create lane profile: table is full ({} profiles)",
                ctx.settings().lane_profiles.len()
            );
            return None;
        }

        let name = match explicit_name.filter(|name| !name.is_empty()) {
            Some(name) if ctx.settings().profile_by_name(name).is_none() => name.to_string(),
            Some(name) => {
                warn!(
                    "[LANE] Lane profile `{}` already exists with other lanes, creating a generated profile instead",
                    name
                );
                generated_profile_name(ctx.lane_profile_prefix(), &lanes, hash)
            }
            None => generated_profile_name(ctx.lane_profile_prefix(), &lanes, hash),
        };
        info!("[LANE] Created lane profile `{}` with {} lanes", name, lanes.len());

        let profile = LaneProfile::new(Some(name), lanes);
        let reference = profile.reference();
        ctx.push_profile(profile);
        self.by_hash.insert(hash, reference.clone());
        Some(reference)
    }

    /// Registered profile named `name`. Lookups are cached per name, misses included.
    pub fn find_by_name(&mut self, settings: &ZoneGraphSettings, name: &str) -> Option<LaneProfileRef> {
        if name.is_empty() {
            return None;
        }
        self.by_name
            .entry(name.to_string())
            .or_insert_with(|| settings.profile_by_name(name).map(LaneProfile::reference))
            .clone()
    }
}
