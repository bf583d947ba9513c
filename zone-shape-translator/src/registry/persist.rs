//! Registry persistence.
use super::ZoneGraphSettings;
use crate::config::TranslatorConfig;
use crate::error::TranslateResult;
use bevy::log::info;
use constants::lane_profile::MAX_TAGS;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Destination the registry is written to once a run has modified it.
pub trait RegistryPersister {
    fn persist(&mut self, settings: &ZoneGraphSettings) -> TranslateResult<()>;
}

impl<F> RegistryPersister for F
where
    F: FnMut(&ZoneGraphSettings) -> TranslateResult<()>,
{
    fn persist(&mut self, settings: &ZoneGraphSettings) -> TranslateResult<()> {
        self(settings)
    }
}

/// Registry stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonRegistryFile {
    path: PathBuf,
    tag_capacity: usize,
}

impl JsonRegistryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tag_capacity: MAX_TAGS,
        }
    }

    /// Registry file at the configured path, starting with the configured
    /// number of tag slots when no file exists yet.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self {
            path: config.registry_path.clone(),
            tag_capacity: config.tag_capacity.min(MAX_TAGS),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tag_capacity(&self) -> usize {
        self.tag_capacity
    }

    /// Read the registry back. A missing file yields an empty registry.
    pub fn load(&self) -> TranslateResult<ZoneGraphSettings> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("[ZONE] No registry at {}, starting empty", self.path.display());
                Ok(ZoneGraphSettings::with_tag_capacity(self.tag_capacity))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl RegistryPersister for JsonRegistryFile {
    fn persist(&mut self, settings: &ZoneGraphSettings) -> TranslateResult<()> {
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        info!("[ZONE] Wrote registry: {}", self.path.display());
        Ok(())
    }
}
