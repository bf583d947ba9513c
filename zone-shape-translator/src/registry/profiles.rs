//! Lane descriptors and lane profiles.
use super::tags::TagMask;
use constants::lane_profile::{LANE_GLYPH_BACKWARD, LANE_GLYPH_FORWARD, LANE_GLYPH_NONE};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneDirection {
    None,
    #[default]
    Forward,
    Backward,
}

impl LaneDirection {
    /// Integer code used by the canonical lane text.
    pub fn code(self) -> u8 {
        match self {
            LaneDirection::None => 0,
            LaneDirection::Forward => 1,
            LaneDirection::Backward => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LaneDirection::None),
            1 => Some(LaneDirection::Forward),
            2 => Some(LaneDirection::Backward),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            LaneDirection::None => LANE_GLYPH_NONE,
            LaneDirection::Forward => LANE_GLYPH_FORWARD,
            LaneDirection::Backward => LANE_GLYPH_BACKWARD,
        }
    }
}

/// One lane of a profile. Width is in host units.
/// Equality and hashing are exact over the width bits, so `0.0` and `-0.0`
/// are different lanes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LaneDescriptor {
    pub width: f32,
    pub direction: LaneDirection,
    pub tags: TagMask,
}

impl LaneDescriptor {
    pub fn new(width: f32, direction: LaneDirection, tags: TagMask) -> Self {
        Self {
            width,
            direction,
            tags,
        }
    }

    /// Fixed byte layout of the lane's fields, independent of memory layout.
    pub fn canonical_bytes(&self) -> [u8; 9] {
        let mut bytes = [0u8; 9];
        bytes[..4].copy_from_slice(&self.width.to_bits().to_le_bytes());
        bytes[4] = self.direction.code();
        bytes[5..].copy_from_slice(&self.tags.bits().to_le_bytes());
        bytes
    }
}

impl PartialEq for LaneDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bytes() == other.canonical_bytes()
    }
}

impl Eq for LaneDescriptor {}

impl Hash for LaneDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bytes().hash(state);
    }
}

/// Reference from a shape to a registered profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneProfileRef {
    pub name: Option<String>,
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneProfile {
    pub name: Option<String>,
    pub id: Uuid,
    pub lanes: Vec<LaneDescriptor>,
}

impl LaneProfile {
    pub fn new(name: Option<String>, lanes: Vec<LaneDescriptor>) -> Self {
        Self {
            name,
            id: Uuid::new_v4(),
            lanes,
        }
    }

    pub fn reference(&self) -> LaneProfileRef {
        LaneProfileRef {
            name: self.name.clone(),
            id: self.id,
        }
    }

    /// Profile generated by the translator rather than authored by hand.
    pub fn is_generated(&self, prefix: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.starts_with(prefix))
    }
}
