//! Shared constants for the zone shape translator workspace.
pub mod attributes;
pub mod coordinate_system;
pub mod lane_profile;
