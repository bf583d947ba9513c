//! Zone shape object model and its curve-buffer codecs.
pub mod decode;
pub mod encode;
pub mod properties;

use crate::registry::{LaneProfileRef, TagMask};
use bevy::log::warn;
use bevy::math::{Quat, Vec3};
use bevy::prelude::Component;

pub use decode::{DecodedCurve, PartAttributes, decode_part};
pub use encode::{ComponentTransform, ShapeUpload, encode_zone_shapes};

/// Largest number of distinct per-point lane profiles one shape can hold.
/// Index 255 is reserved for "inherit".
pub const MAX_PER_POINT_LANE_PROFILES: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    #[default]
    Spline,
    Polygon,
}

impl ShapeKind {
    pub fn code(self) -> i32 {
        match self {
            ShapeKind::Spline => 0,
            ShapeKind::Polygon => 1,
        }
    }

    pub fn from_code(code: i32) -> Self {
        if code == 1 { ShapeKind::Polygon } else { ShapeKind::Spline }
    }

    /// Kind named by free text: anything mentioning "polygon" is a polygon.
    pub fn parse_code(text: &str) -> i32 {
        if text.to_ascii_lowercase().contains("polygon") {
            ShapeKind::Polygon.code()
        } else {
            ShapeKind::Spline.code()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PointKind {
    #[default]
    Sharp,
    Bezier,
    AutoBezier,
    LaneProfile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolygonRoutingType {
    #[default]
    Bezier,
    Arcs,
}

/// Which lane profile a point uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PointLaneProfile {
    /// The shape's common profile.
    #[default]
    Inherit,
    /// Index into the shape's per-point profile list.
    Index(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapePoint {
    pub position: Vec3,
    pub rotation: Quat,
    pub tangent_length: f32,
    pub inner_turn_radius: f32,
    pub lane_profile: PointLaneProfile,
    pub kind: PointKind,
    pub reverse_lane_profile: bool,
}

impl Default for ShapePoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            tangent_length: 0.0,
            inner_turn_radius: 0.0,
            lane_profile: PointLaneProfile::Inherit,
            kind: PointKind::Sharp,
            reverse_lane_profile: false,
        }
    }
}

/// One zone shape as held by the host object graph.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ZoneShape {
    pub kind: ShapeKind,
    pub tags: TagMask,
    pub common_lane_profile: Option<LaneProfileRef>,
    pub per_point_lane_profiles: Vec<LaneProfileRef>,
    pub points: Vec<ShapePoint>,
    pub reverse_polygon_lane_profiles: bool,
    pub polygon_routing_type: PolygonRoutingType,
}

impl ZoneShape {
    /// Index of `profile` in the per-point list, appending it when new.
    /// A full list leaves the point inheriting the common profile.
    pub fn add_unique_per_point_lane_profile(&mut self, profile: LaneProfileRef) -> PointLaneProfile {
        if let Some(index) = self.per_point_lane_profiles.iter().position(|p| p.id == profile.id) {
            return PointLaneProfile::Index(index as u8);
        }
        if self.per_point_lane_profiles.len() >= MAX_PER_POINT_LANE_PROFILES {
            warn!(
                "[ZONE] Shape already holds {} per-point lane profiles, point inherits instead",
                MAX_PER_POINT_LANE_PROFILES
            );
            return PointLaneProfile::Inherit;
        }
        self.per_point_lane_profiles.push(profile);
        PointLaneProfile::Index((self.per_point_lane_profiles.len() - 1) as u8)
    }

    /// Profile used by point `index`, following inheritance.
    pub fn point_lane_profile(&self, index: usize) -> Option<&LaneProfileRef> {
        match self.points.get(index)?.lane_profile {
            PointLaneProfile::Inherit => self.common_lane_profile.as_ref(),
            PointLaneProfile::Index(slot) => self.per_point_lane_profiles.get(slot as usize),
        }
    }
}
