//! Translator configuration loaded from JSON.
use crate::error::TranslateResult;
use constants::lane_profile::{DEFAULT_REGISTRY_FILE, LANE_PROFILE_PREFIX, MAX_TAGS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings that shape registry allocation and persistence.
/// Missing fields fall back to the workspace constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Number of tag slots in the registry, clamped to the tag mask width.
    pub tag_capacity: usize,
    /// Upper bound on registered lane profiles. `None` means unbounded.
    pub max_lane_profiles: Option<usize>,
    /// Prefix given to generated lane profile names.
    pub lane_profile_prefix: String,
    /// Where the tag/profile registry is persisted.
    pub registry_path: PathBuf,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            tag_capacity: MAX_TAGS,
            max_lane_profiles: None,
            lane_profile_prefix: LANE_PROFILE_PREFIX.to_string(),
            registry_path: PathBuf::from(DEFAULT_REGISTRY_FILE),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> TranslateResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> TranslateResult<Self> {
        let mut config: TranslatorConfig = serde_json::from_str(text)?;
        config.tag_capacity = config.tag_capacity.min(MAX_TAGS);
        Ok(config)
    }
}
