//! Canonical lane text.
//!
//! A lane travels through the dictionary-array attribute as
//! `{"Width":<metres>,"Direction":<code>,"Tags":["<name>",...]}`. A lane
//! with no tag bits set carries no `Tags` key; an empty `Tags` array means
//! the default tag.
use crate::registry::{LaneDescriptor, LaneDirection, RegistryContext, TagMask, TagRegistry};
use bevy::log::debug;
use constants::coordinate_system::{POSITION_SCALE_TO_ENGINE, POSITION_SCALE_TO_HOST};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Encode `lane` with its tag names listed in slot order.
pub fn encode_lane(lane: &LaneDescriptor, tags: &TagRegistry) -> String {
    let width = lane.width * POSITION_SCALE_TO_ENGINE;
    let direction = lane.direction.code();
    if lane.tags.is_empty() {
        return format!("{{\"Width\":{:.6},\"Direction\":{}}}", width, direction);
    }

    let names: Vec<String> = tags
        .names_in(lane.tags)
        .map(|name| Value::String(name.to_string()).to_string())
        .collect();
    format!(
        "{{\"Width\":{:.6},\"Direction\":{},\"Tags\":[{}]}}",
        width,
        direction,
        names.join(",")
    )
}

/// Per-run cache of encoded lane text.
#[derive(Debug, Default)]
pub struct LaneStringCache {
    encoded: HashMap<LaneDescriptor, String>,
}

impl LaneStringCache {
    pub fn get_or_encode(&mut self, lane: &LaneDescriptor, tags: &TagRegistry) -> &str {
        self.encoded
            .entry(*lane)
            .or_insert_with(|| encode_lane(lane, tags))
    }

    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }
}

/// Decode one lane from its canonical text, resolving tag names through the
/// registry. Text that is not a JSON object yields the default lane.
pub fn decode_lane(text: &str, ctx: &mut RegistryContext<'_>) -> LaneDescriptor {
    let mut lane = LaneDescriptor::default();
    let object = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            debug!("[LANE] Lane text is not an object, using defaults: {}", text);
            return lane;
        }
        Err(err) => {
            debug!("[LANE] Malformed lane text ({}), using defaults: {}", err, text);
            return lane;
        }
    };

    if let Some(width) = object.get("Width").and_then(Value::as_f64) {
        lane.width = width as f32 * POSITION_SCALE_TO_HOST;
    }
    lane.direction = decode_direction(&object);
    lane.tags = decode_tags(&object, ctx);
    lane
}

fn decode_direction(object: &Map<String, Value>) -> LaneDirection {
    match object.get("Direction") {
        Some(Value::Number(code)) => code
            .as_f64()
            .and_then(|code| LaneDirection::from_code(code as i64))
            .unwrap_or_else(|| {
                debug!("[LANE] Unknown direction code {}, using Forward", code);
                LaneDirection::Forward
            }),
        Some(Value::String(name)) => match name.as_str() {
            "None" => LaneDirection::None,
            "Backward" => LaneDirection::Backward,
            _ => LaneDirection::Forward,
        },
        _ => LaneDirection::Forward,
    }
}

fn decode_tags(object: &Map<String, Value>, ctx: &mut RegistryContext<'_>) -> TagMask {
    if let Some(Value::Array(names)) = object.get("Tags") {
        let mut mask = TagMask::NONE;
        for name in names.iter().filter_map(Value::as_str) {
            mask |= ctx.tag(name);
        }
        return if mask.is_empty() { TagMask::DEFAULT } else { mask };
    }

    // Older exports carry a single tag name.
    match object.get("Tag").and_then(Value::as_str) {
        Some(name) => ctx.tag(name),
        None => TagMask::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ZoneGraphSettings;

    #[test]
    fn encode_lists_tags_in_slot_order() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut modified = false;
        let a = settings.tags.find_or_create("A", &mut modified);
        let b = settings.tags.find_or_create("B", &mut modified);
        let lane = LaneDescriptor::new(250.0, LaneDirection::Backward, b | a);

        assert_eq!(
            encode_lane(&lane, &settings.tags),
            r#"{"Width":2.500000,"Direction":2,"Tags":["A","B"]}"#
        );
    }

    #[test]
    fn decode_scales_width_and_resolves_tags() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut ctx = RegistryContext::new(&mut settings);
        let lane = decode_lane(r#"{"Width":2.0,"Direction":0,"Tags":["Road","Walk"]}"#, &mut ctx);

        assert_eq!(lane.width, 200.0);
        assert_eq!(lane.direction, LaneDirection::None);
        assert_eq!(lane.tags, TagMask::slot(0) | TagMask::slot(1));
        assert!(ctx.is_modified());
    }

    #[test]
    fn empty_tag_array_is_promoted_to_default() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut ctx = RegistryContext::new(&mut settings);
        let lane = decode_lane(r#"{"Width":1,"Direction":1,"Tags":[]}"#, &mut ctx);
        assert_eq!(lane.tags, TagMask::DEFAULT);
        assert!(!ctx.is_modified());
    }

    #[test]
    fn legacy_direction_strings_and_single_tag() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut ctx = RegistryContext::new(&mut settings);

        let backward = decode_lane(r#"{"Direction":"Backward","Tag":"Bus"}"#, &mut ctx);
        assert_eq!(backward.direction, LaneDirection::Backward);
        assert_eq!(backward.tags, TagMask::slot(0));

        let none = decode_lane(r#"{"Direction":"None"}"#, &mut ctx);
        assert_eq!(none.direction, LaneDirection::None);
        assert_eq!(none.tags, TagMask::NONE);

        let other = decode_lane(r#"{"Direction":"Sideways"}"#, &mut ctx);
        assert_eq!(other.direction, LaneDirection::Forward);
    }

    #[test]
    fn malformed_text_yields_default_lane() {
        let mut settings = ZoneGraphSettings::default();
        let mut ctx = RegistryContext::new(&mut settings);
        let lane = decode_lane("{Width:", &mut ctx);
        assert_eq!(lane, LaneDescriptor::default());
        assert_eq!(lane.width, 0.0);
        assert_eq!(lane.direction, LaneDirection::Forward);
    }

    #[test]
    fn encoded_text_decodes_back() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut modified = false;
        let road = settings.tags.find_or_create("Road", &mut modified);
        let lane = LaneDescriptor::new(300.0, LaneDirection::Forward, road);
        let text = encode_lane(&lane, &settings.tags);

        let mut ctx = RegistryContext::new(&mut settings);
        let decoded = decode_lane(&text, &mut ctx);
        assert!((decoded.width - 300.0).abs() < 1e-3);
        assert_eq!(decoded.direction, lane.direction);
        assert_eq!(decoded.tags, lane.tags);
    }

    #[test]
    fn untagged_lane_omits_tags_and_stays_untagged() {
        let mut settings = ZoneGraphSettings::with_tag_capacity(4);
        let mut ctx = RegistryContext::new(&mut settings);
        let lane = decode_lane(r#"{"Width":2.0,"Direction":1}"#, &mut ctx);
        assert_eq!(lane.tags, TagMask::NONE);

        let text = encode_lane(&lane, &ctx.settings().tags);
        assert_eq!(text, r#"{"Width":2.000000,"Direction":1}"#);
        assert_eq!(decode_lane(&text, &mut ctx), lane);
    }

    #[test]
    fn default_tag_keeps_its_empty_array() {
        let settings = ZoneGraphSettings::with_tag_capacity(4);
        let lane = LaneDescriptor::new(100.0, LaneDirection::Forward, TagMask::DEFAULT);
        assert_eq!(
            encode_lane(&lane, &settings.tags),
            r#"{"Width":1.000000,"Direction":1,"Tags":[]}"#
        );
    }

    #[test]
    fn string_cache_encodes_each_lane_once() {
        let settings = ZoneGraphSettings::default();
        let mut cache = LaneStringCache::default();
        let lane = LaneDescriptor::new(100.0, LaneDirection::Forward, TagMask::NONE);
        let first = cache.get_or_encode(&lane, &settings.tags).to_string();
        let second = cache.get_or_encode(&lane, &settings.tags).to_string();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
