//! Lane profile text codec, content dedup and attribute reading.
pub mod attributes;
pub mod codec;
pub mod dedup;

pub use attributes::{LaneProfileAttribute, read_lane_profiles};
pub use codec::{LaneStringCache, decode_lane, encode_lane};
pub use dedup::{LaneProfileResolver, content_hash, generated_profile_name};
