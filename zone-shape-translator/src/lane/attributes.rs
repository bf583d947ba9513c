//! Lane profile attributes on a curve dataset.
use super::codec::decode_lane;
use super::dedup::LaneProfileResolver;
use crate::attribute::{AttributeAccessor, AttributeOwner, AttributeStore, OwnerPair, StorageKind};
use crate::error::{TranslateError, TranslateResult};
use crate::registry::{LaneDescriptor, LaneProfileRef, RegistryContext};
use constants::attributes::{ATTRIB_ZONE_LANE_PROFILE, ATTRIB_ZONE_LANE_PROFILE_NAME};
use std::collections::HashMap;

/// Lane profiles resolved for every element of one owner.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneProfileAttribute {
    pub owner: AttributeOwner,
    /// One entry per element; `None` where no profile could be resolved.
    pub profiles: Vec<Option<LaneProfileRef>>,
}

impl LaneProfileAttribute {
    /// Profile for global point `point` of curve `curve`.
    pub fn profile_at(&self, point: usize, curve: usize) -> Option<&LaneProfileRef> {
        self.profiles
            .get(self.owner.entry_index(point, curve))
            .and_then(Option::as_ref)
    }
}

/// Resolve the lane profiles stored within `pair`.
///
/// Lane text in `unreal_zone_lane_profile` finds or creates a profile per
/// element, named by `unreal_zone_lane_profile_name` when that is present.
/// Elements with no lanes, or datasets carrying only names, resolve by name.
/// Returns `None` when neither attribute exists within `pair`.
pub fn read_lane_profiles<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
    ctx: &mut RegistryContext<'_>,
    resolver: &mut LaneProfileResolver,
    pair: OwnerPair,
) -> TranslateResult<Option<LaneProfileAttribute>> {
    let name_owner = accessor.resolve(ATTRIB_ZONE_LANE_PROFILE_NAME, pair);
    let lanes_owner = accessor.resolve(ATTRIB_ZONE_LANE_PROFILE, pair);
    if name_owner.is_none() && lanes_owner.is_none() {
        return Ok(None);
    }

    let names = match name_owner {
        Some(owner) if accessor.info(ATTRIB_ZONE_LANE_PROFILE_NAME, owner)?.storage == StorageKind::String => {
            accessor.get_string(ATTRIB_ZONE_LANE_PROFILE_NAME, owner)?
        }
        _ => Vec::new(),
    };
    let name_for = |element: usize| -> Option<&str> {
        let index = if name_owner == Some(AttributeOwner::Detail) { 0 } else { element };
        names.get(index).map(String::as_str).filter(|name| !name.is_empty())
    };

    let dictionary_owner = match lanes_owner {
        Some(owner) if accessor.info(ATTRIB_ZONE_LANE_PROFILE, owner)?.storage == StorageKind::DictionaryArray => {
            Some(owner)
        }
        _ => None,
    };

    if let Some(owner) = dictionary_owner {
        let (values, counts) = accessor.get_dictionary_array(ATTRIB_ZONE_LANE_PROFILE, owner)?;
        let mut decoded: HashMap<&str, LaneDescriptor> = HashMap::new();
        let mut profiles = Vec::with_capacity(counts.len());
        let mut offset = 0;

        for (element, &count) in counts.iter().enumerate() {
            if count == 0 {
                profiles.push(name_for(element).and_then(|name| resolver.find_by_name(ctx.settings(), name)));
                continue;
            }

            let texts = values.get(offset..offset + count).ok_or_else(|| {
                TranslateError::shape(
                    ATTRIB_ZONE_LANE_PROFILE,
                    format!("element {} needs entries {}..{} of {}", element, offset, offset + count, values.len()),
                )
            })?;
            let lanes = texts
                .iter()
                .map(|text| *decoded.entry(text.as_str()).or_insert_with(|| decode_lane(text, ctx)))
                .collect();
            profiles.push(resolver.find_or_create(ctx, lanes, name_for(element)));
            offset += count;
        }

        return Ok(Some(LaneProfileAttribute { owner, profiles }));
    }

    let Some(owner) = name_owner else {
        return Ok(None);
    };
    let profiles = names
        .iter()
        .map(|name| resolver.find_by_name(ctx.settings(), name))
        .collect();
    Ok(Some(LaneProfileAttribute { owner, profiles }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeWriter, GeometryBuffer};
    use crate::registry::{LaneProfile, ZoneGraphSettings};

    const LANE_A: &str = r#"{"Width":2.0,"Direction":1,"Tags":[]}"#;
    const LANE_B: &str = r#"{"Width":3.0,"Direction":2,"Tags":["Bus"]}"#;

    #[test]
    fn prim_lanes_dedup_across_curves() {
        let mut buffer = GeometryBuffer::curves(&[2, 2, 2]);
        AttributeWriter::new(&mut buffer)
            .set_dictionary_array(
                ATTRIB_ZONE_LANE_PROFILE,
                AttributeOwner::Prim,
                vec![LANE_A.into(), LANE_A.into(), LANE_B.into()],
                vec![1, 1, 1],
            )
            .unwrap();

        let mut settings = ZoneGraphSettings::default();
        let mut ctx = RegistryContext::new(&mut settings);
        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let attribute = read_lane_profiles(&accessor, &mut ctx, &mut resolver, OwnerPair::CURVES)
            .unwrap()
            .unwrap();

        assert_eq!(attribute.owner, AttributeOwner::Prim);
        assert_eq!(attribute.profiles[0], attribute.profiles[1]);
        assert_ne!(attribute.profiles[0], attribute.profiles[2]);
        assert_eq!(ctx.settings().lane_profiles.len(), 2);
    }

    #[test]
    fn detail_name_applies_to_every_curve() {
        let mut buffer = GeometryBuffer::curves(&[2, 2]);
        let mut writer = AttributeWriter::new(&mut buffer);
        writer
            .set_dictionary_array(
                ATTRIB_ZONE_LANE_PROFILE,
                AttributeOwner::Prim,
                vec![LANE_A.into(), LANE_B.into()],
                vec![1, 1],
            )
            .unwrap();
        writer
            .set_string(ATTRIB_ZONE_LANE_PROFILE_NAME, AttributeOwner::Detail, vec!["Street".into()])
            .unwrap();

        let mut settings = ZoneGraphSettings::default();
        let mut ctx = RegistryContext::new(&mut settings);
        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let attribute = read_lane_profiles(&accessor, &mut ctx, &mut resolver, OwnerPair::CURVES)
            .unwrap()
            .unwrap();

        let names: Vec<_> = attribute
            .profiles
            .iter()
            .map(|p| p.as_ref().and_then(|p| p.name.as_deref()))
            .collect();
        assert_eq!(names, vec![Some("Street"), Some("Street")]);
    }

    #[test]
    fn names_only_resolve_existing_profiles() {
        let mut buffer = GeometryBuffer::curves(&[1, 1]);
        AttributeWriter::new(&mut buffer)
            .set_string(
                ATTRIB_ZONE_LANE_PROFILE_NAME,
                AttributeOwner::Prim,
                vec!["Authored".into(), "Unknown".into()],
            )
            .unwrap();

        let mut settings = ZoneGraphSettings::default();
        settings
            .lane_profiles
            .push(LaneProfile::new(Some("Authored".into()), Vec::new()));
        let mut ctx = RegistryContext::new(&mut settings);
        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let attribute = read_lane_profiles(&accessor, &mut ctx, &mut resolver, OwnerPair::CURVES)
            .unwrap()
            .unwrap();

        assert!(attribute.profiles[0].is_some());
        assert!(attribute.profiles[1].is_none());
        assert!(!ctx.is_modified());
    }

    #[test]
    fn point_level_lanes_index_by_point() {
        let mut buffer = GeometryBuffer::curves(&[2]);
        AttributeWriter::new(&mut buffer)
            .set_dictionary_array(
                ATTRIB_ZONE_LANE_PROFILE,
                AttributeOwner::Point,
                vec![LANE_A.into(), LANE_A.into(), LANE_B.into()],
                vec![2, 1],
            )
            .unwrap();

        let mut settings = ZoneGraphSettings::default();
        let mut ctx = RegistryContext::new(&mut settings);
        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let attribute = read_lane_profiles(&accessor, &mut ctx, &mut resolver, OwnerPair::POINTS)
            .unwrap()
            .unwrap();

        assert_eq!(attribute.owner, AttributeOwner::Point);
        let first = attribute.profile_at(0, 0).unwrap();
        let profile = ctx.settings().profile_by_ref(first).unwrap();
        assert_eq!(profile.lanes.len(), 2);
    }

    #[test]
    fn absent_attributes_yield_none() {
        let buffer = GeometryBuffer::curves(&[1]);
        let mut settings = ZoneGraphSettings::default();
        let mut ctx = RegistryContext::new(&mut settings);
        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let accessor = AttributeAccessor::new(&buffer).unwrap();
        assert!(
            read_lane_profiles(&accessor, &mut ctx, &mut resolver, OwnerPair::POINTS)
                .unwrap()
                .is_none()
        );
    }
}
