//! Fixed-capacity zone graph tag table.
use bevy::log::error;
use constants::lane_profile::MAX_TAGS;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Bitmask over tag slots; slot `i` is bit `i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMask(pub u32);

impl TagMask {
    pub const NONE: TagMask = TagMask(0);

    /// Single-bit mask substituted for tags that cannot be resolved, and for
    /// lanes that declare an empty tag list.
    pub const DEFAULT: TagMask = TagMask(1);

    pub fn slot(index: usize) -> Self {
        TagMask(1u32 << index)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set here.
    pub fn contains(self, other: TagMask) -> bool {
        !other.is_empty() && self.0 & other.0 == other.0
    }

    pub fn add(&mut self, other: TagMask) {
        self.0 |= other.0;
    }
}

impl BitOr for TagMask {
    type Output = TagMask;

    fn bitor(self, rhs: TagMask) -> TagMask {
        TagMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for TagMask {
    fn bitor_assign(&mut self, rhs: TagMask) {
        self.0 |= rhs.0;
    }
}

/// One tag slot. A slot without a name is free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: Option<String>,
    pub tag: TagMask,
}

impl TagInfo {
    pub fn is_valid(&self) -> bool {
        self.name.is_some()
    }
}

/// Tag slot table. Names are assigned append-only into the first free slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRegistry {
    slots: Vec<TagInfo>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_TAGS)
    }
}

impl TagRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity.min(MAX_TAGS))
            .map(|index| TagInfo {
                name: None,
                tag: TagMask::slot(index),
            })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[TagInfo] {
        &self.slots
    }

    pub fn find(&self, name: &str) -> Option<TagMask> {
        self.slots
            .iter()
            .find(|slot| slot.name.as_deref() == Some(name))
            .map(|slot| slot.tag)
    }

    /// Names of every named slot set in `mask`, in slot order.
    pub fn names_in(&self, mask: TagMask) -> impl Iterator<Item = &str> + '_ {
        self.slots
            .iter()
            .filter(move |slot| mask.contains(slot.tag))
            .filter_map(|slot| slot.name.as_deref())
    }

    /// Find the slot named `name`, or claim the first free slot for it.
    /// When the table is full the error is logged and [`TagMask::DEFAULT`]
    /// is returned; existing slots are never touched.
    pub fn find_or_create(&mut self, name: &str, modified: &mut bool) -> TagMask {
        if let Some(tag) = self.find(name) {
            return tag;
        }

        if let Some(slot) = self.slots.iter_mut().find(|slot| !slot.is_valid()) {
            slot.name = Some(name.to_string());
            *modified = true;
            return slot.tag;
        }

        error!("[TAGS] Cannot create zone graph tag `{}`: all {} slots are in use", name, self.slots.len());
        TagMask::DEFAULT
    }
}
