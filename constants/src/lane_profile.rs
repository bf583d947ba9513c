//! Lane profile and tag registry limits.

/// Name prefix of lane profiles generated by the translator.
pub const LANE_PROFILE_PREFIX: &str = "LP_HE_";

/// Generated names shorter than this are treated as user-authored during cleanup.
pub const MIN_GENERATED_PROFILE_NAME_LEN: usize = 7;

/// Tag slots available in a zone graph tag mask.
pub const MAX_TAGS: usize = 32;

/// Glyphs used in generated profile names, one per lane from the last lane to the first.
pub const LANE_GLYPH_FORWARD: char = '\u{2191}';
pub const LANE_GLYPH_BACKWARD: char = '\u{2193}';
pub const LANE_GLYPH_NONE: char = 'X';

/// Default registry file written after a run modifies tags or lane profiles.
pub const DEFAULT_REGISTRY_FILE: &str = "zone_graph_settings.json";
