//! Curve dataset to zone shapes.
use super::properties::{PropertyAttribute, apply_point_properties, apply_shape_properties, read_property_attributes};
use super::{PointKind, PointLaneProfile, ShapeKind, ShapePoint, ZoneShape};
use crate::attribute::{AttributeAccessor, AttributeOwner, AttributeStore, OwnedValues, OwnerPair, StorageKind};
use crate::error::{TranslateError, TranslateResult};
use crate::lane::{LaneProfileAttribute, LaneProfileResolver, read_lane_profiles};
use crate::partition::CurvePartition;
use crate::reconcile::SplitIdentity;
use crate::registry::{RegistryContext, TagMask};
use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use constants::attributes::{
    ATTRIB_POSITION, ATTRIB_ROTATION, ATTRIB_SPLIT_ACTORS, ATTRIB_ZONE_SHAPE_TAGS, ATTRIB_ZONE_SHAPE_TYPE,
};
use constants::coordinate_system::{euler_to_host, position_to_host, quat_to_host};
use std::collections::HashMap;

/// A freshly decoded shape and the split identity it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCurve {
    pub curve: usize,
    pub identity: SplitIdentity,
    pub shape: ZoneShape,
}

/// Every attribute a dataset contributes to its shapes, read once per dataset.
#[derive(Debug, Clone, Default)]
pub struct PartAttributes {
    pub positions: Vec<Vec3>,
    pub rotations: Option<OwnedValues<Quat>>,
    pub kinds: Option<OwnedValues<i32>>,
    pub tags: Option<OwnedValues<TagMask>>,
    pub split_actors: Option<OwnedValues<i32>>,
    pub point_lane_profiles: Option<LaneProfileAttribute>,
    pub lane_profiles: Option<LaneProfileAttribute>,
    pub properties: Vec<PropertyAttribute>,
}

impl PartAttributes {
    /// Read every shape attribute, registering tags and lane profiles as
    /// they are met. Point lane profiles are resolved before curve ones,
    /// and both before shape tags.
    pub fn read<S: AttributeStore + ?Sized>(
        accessor: &AttributeAccessor<'_, S>,
        ctx: &mut RegistryContext<'_>,
        resolver: &mut LaneProfileResolver,
    ) -> TranslateResult<Self> {
        let positions = read_positions(accessor)?;
        let rotations = read_rotations(accessor)?;

        let kind_owner = accessor.query_owner(ATTRIB_ZONE_SHAPE_TYPE);
        let kinds = kind_owner
            .map(|owner| -> TranslateResult<_> {
                Ok(OwnedValues::new(
                    owner,
                    accessor.get_enum(ATTRIB_ZONE_SHAPE_TYPE, Some(owner), ShapeKind::parse_code)?,
                ))
            })
            .transpose()?;

        let point_lane_profiles = read_lane_profiles(accessor, ctx, resolver, OwnerPair::POINTS)?;
        let lane_profiles = read_lane_profiles(accessor, ctx, resolver, OwnerPair::CURVES)?;
        let tags = read_tags(accessor, ctx)?;

        let split_actors = accessor
            .query_owner(ATTRIB_SPLIT_ACTORS)
            .map(|owner| -> TranslateResult<_> {
                Ok(OwnedValues::new(
                    owner,
                    accessor.get_enum(ATTRIB_SPLIT_ACTORS, Some(owner), parse_flag)?,
                ))
            })
            .transpose()?;

        Ok(Self {
            positions,
            rotations,
            kinds,
            tags,
            split_actors,
            point_lane_profiles,
            lane_profiles,
            properties: read_property_attributes(accessor)?,
        })
    }

    /// Build the shape for `curve`.
    pub fn decode_curve(&self, partition: &CurvePartition, split_value: &str, curve: usize) -> DecodedCurve {
        let points = partition.curve_points(curve);
        let first = points.start;

        let split_actor = self
            .split_actors
            .as_ref()
            .and_then(|values| values.at(first, curve))
            .is_some_and(|flag| *flag >= 1);

        let mut shape = ZoneShape::default();
        if let Some(kind) = self.kinds.as_ref().and_then(|kinds| kinds.at(first, curve)) {
            shape.kind = ShapeKind::from_code(*kind);
        }
        if let Some(tags) = self.tags.as_ref().and_then(|tags| tags.at(first, curve)) {
            shape.tags = *tags;
        }
        shape.common_lane_profile = self
            .lane_profiles
            .as_ref()
            .and_then(|profiles| profiles.profile_at(first, curve))
            .cloned();

        for global_point in points {
            let mut point = ShapePoint {
                position: self.positions.get(global_point).copied().unwrap_or(Vec3::ZERO),
                ..ShapePoint::default()
            };
            if let Some(rotation) = self.rotations.as_ref().and_then(|r| r.at(global_point, curve)) {
                point.rotation = *rotation;
            }

            if let Some(profiles) = self.point_lane_profiles.as_ref().filter(|_| shape.kind == ShapeKind::Polygon) {
                point.kind = PointKind::LaneProfile;
                point.lane_profile = match profiles.profile_at(global_point, curve) {
                    Some(profile) => shape.add_unique_per_point_lane_profile(profile.clone()),
                    None => PointLaneProfile::Inherit,
                };
            }

            apply_point_properties(&self.properties, &mut point, global_point, curve);
            shape.points.push(point);
        }

        apply_shape_properties(&self.properties, &mut shape, first, curve);

        DecodedCurve {
            curve,
            identity: SplitIdentity::new(split_value, split_actor),
            shape,
        }
    }
}

/// Decode every curve of the surviving split groups, group by group.
pub fn decode_part<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
    partition: &CurvePartition,
    ctx: &mut RegistryContext<'_>,
    resolver: &mut LaneProfileResolver,
) -> TranslateResult<Vec<DecodedCurve>> {
    if partition.surviving_groups().next().is_none() {
        return Ok(Vec::new());
    }

    let attributes = PartAttributes::read(accessor, ctx, resolver)?;
    let mut decoded = Vec::new();
    for group in partition.surviving_groups() {
        for &curve in &group.curves {
            decoded.push(attributes.decode_curve(partition, &group.key, curve));
        }
    }

    debug!("[ZONE] Decoded {} zone shapes", decoded.len());
    Ok(decoded)
}

fn parse_flag(text: &str) -> i32 {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => 1,
        other => other.parse().unwrap_or(0),
    }
}

fn read_positions<S: AttributeStore + ?Sized>(accessor: &AttributeAccessor<'_, S>) -> TranslateResult<Vec<Vec3>> {
    if !accessor.exists(ATTRIB_POSITION, AttributeOwner::Point) {
        return Err(TranslateError::MissingAttribute {
            name: ATTRIB_POSITION.to_string(),
            owner: AttributeOwner::Point,
        });
    }

    let (values, tuple_size) = accessor.get_float(ATTRIB_POSITION, AttributeOwner::Point)?;
    if tuple_size < 3 {
        return Err(TranslateError::shape(
            ATTRIB_POSITION,
            format!("positions need 3 components, found {}", tuple_size),
        ));
    }
    Ok(values
        .chunks_exact(tuple_size)
        .map(|p| position_to_host([p[0], p[1], p[2]]))
        .collect())
}

/// Rotations given as quaternions (4 floats) or radian Euler angles (3 floats).
/// Any other layout is ignored.
fn read_rotations<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
) -> TranslateResult<Option<OwnedValues<Quat>>> {
    let Some(owner) = accessor.query_owner(ATTRIB_ROTATION) else {
        return Ok(None);
    };
    let info = accessor.info(ATTRIB_ROTATION, owner)?;
    if info.storage != StorageKind::Float || !(info.tuple_size == 3 || info.tuple_size == 4) {
        debug!(
            "[ZONE] Ignoring `{}`: {:?} storage with tuple size {}",
            ATTRIB_ROTATION, info.storage, info.tuple_size
        );
        return Ok(None);
    }

    let (values, tuple_size) = accessor.get_float(ATTRIB_ROTATION, owner)?;
    let rotations = values
        .chunks_exact(tuple_size)
        .map(|r| {
            if tuple_size == 4 {
                quat_to_host([r[0], r[1], r[2], r[3]])
            } else {
                euler_to_host([r[0], r[1], r[2]])
            }
        })
        .collect();
    Ok(Some(OwnedValues::new(owner, rotations)))
}

/// Shape tags from a string or a string array. Each distinct name is
/// resolved once.
fn read_tags<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
    ctx: &mut RegistryContext<'_>,
) -> TranslateResult<Option<OwnedValues<TagMask>>> {
    let Some(owner) = accessor.query_owner(ATTRIB_ZONE_SHAPE_TAGS) else {
        return Ok(None);
    };

    let mut resolved: HashMap<String, TagMask> = HashMap::new();
    let mut resolve = |name: &str, ctx: &mut RegistryContext<'_>| -> TagMask {
        if let Some(mask) = resolved.get(name) {
            return *mask;
        }
        let mask = ctx.tag(name);
        resolved.insert(name.to_string(), mask);
        mask
    };

    let masks = match accessor.info(ATTRIB_ZONE_SHAPE_TAGS, owner)?.storage {
        StorageKind::String => accessor
            .get_string(ATTRIB_ZONE_SHAPE_TAGS, owner)?
            .iter()
            .map(|name| resolve(name, ctx))
            .collect(),
        StorageKind::StringArray => {
            let (values, counts) = accessor.get_string_array(ATTRIB_ZONE_SHAPE_TAGS, owner)?;
            let mut masks = Vec::with_capacity(counts.len());
            let mut names = values.iter();
            for count in counts {
                let mut mask = TagMask::NONE;
                for name in names.by_ref().take(count) {
                    mask |= resolve(name, ctx);
                }
                masks.push(mask);
            }
            masks
        }
        _ => return Ok(None),
    };
    Ok(Some(OwnedValues::new(owner, masks)))
}
