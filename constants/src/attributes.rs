//! Attribute names read from and written to geometry engine curve datasets.

/// Detail int flag marking a curve dataset as zone shape output (`i@unreal_output_zone_shape = 1`).
pub const ATTRIB_OUTPUT_ZONE_SHAPE: &str = "unreal_output_zone_shape";

/// Shape kind, stored either as an int (0 spline, 1 polygon) or as a string.
pub const ATTRIB_ZONE_SHAPE_TYPE: &str = "unreal_zone_shape_type";

/// Shape tags, a string or a string array of tag names.
pub const ATTRIB_ZONE_SHAPE_TAGS: &str = "unreal_zone_shape_tags";

/// Dictionary array of lane descriptors used to find or create lane profiles.
pub const ATTRIB_ZONE_LANE_PROFILE: &str = "unreal_zone_lane_profile";

/// Names an existing lane profile, or the lane profile created from `unreal_zone_lane_profile`.
pub const ATTRIB_ZONE_LANE_PROFILE_NAME: &str = "unreal_zone_lane_profile_name";

/// Split key grouping curves into separate outputs.
pub const ATTRIB_SPLIT_VALUE: &str = "unreal_split_value";

/// Marks a split group as living in its own container.
pub const ATTRIB_SPLIT_ACTORS: &str = "unreal_split_actors";

/// Partial output mode: 0 replace, 1 modify, 2 remove.
pub const ATTRIB_PARTIAL_OUTPUT_MODE: &str = "unreal_partial_output_mode";

/// Prefix of free-form property attributes.
pub const ATTRIB_PREFIX_PROPERTY: &str = "unreal_uproperty_";

pub const ATTRIB_POSITION: &str = "P";

pub const ATTRIB_ROTATION: &str = "rot";

pub const PARTIAL_OUTPUT_MODE_REPLACE: i32 = 0;
pub const PARTIAL_OUTPUT_MODE_MODIFY: i32 = 1;
pub const PARTIAL_OUTPUT_MODE_REMOVE: i32 = 2;
