//! Zone shapes to a curve dataset for upload.
use super::{ShapeKind, ZoneShape};
use crate::attribute::{AttributeOwner, AttributeStore, AttributeWriter, PartInfo};
use crate::error::TranslateResult;
use crate::lane::LaneStringCache;
use crate::registry::{LaneProfile, LaneProfileRef, ZoneGraphSettings};
use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use constants::attributes::{
    ATTRIB_POSITION, ATTRIB_ROTATION, ATTRIB_ZONE_LANE_PROFILE, ATTRIB_ZONE_LANE_PROFILE_NAME, ATTRIB_ZONE_SHAPE_TAGS,
    ATTRIB_ZONE_SHAPE_TYPE,
};
use constants::coordinate_system::{position_to_engine, quat_to_engine};

/// Placement of a shape's owning component in the host world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for ComponentTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ComponentTransform {
    pub const IDENTITY: ComponentTransform = ComponentTransform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    pub fn transform_rotation(&self, rotation: Quat) -> Quat {
        self.rotation * rotation
    }
}

/// One shape queued for upload with the transform of its component.
#[derive(Debug, Clone, Copy)]
pub struct ShapeUpload<'a> {
    pub shape: &'a ZoneShape,
    pub transform: ComponentTransform,
}

impl<'a> ShapeUpload<'a> {
    pub fn new(shape: &'a ZoneShape) -> Self {
        Self {
            shape,
            transform: ComponentTransform::IDENTITY,
        }
    }
}

/// Lane name and lane text columns for one owner.
#[derive(Default)]
struct LaneColumns {
    names: Vec<String>,
    lanes: Vec<String>,
    counts: Vec<usize>,
}

impl LaneColumns {
    fn push(&mut self, profile: Option<&LaneProfile>, settings: &ZoneGraphSettings, cache: &mut LaneStringCache) {
        match profile {
            Some(profile) => {
                self.names.push(profile.name.clone().unwrap_or_default());
                self.counts.push(profile.lanes.len());
                for lane in &profile.lanes {
                    self.lanes.push(cache.get_or_encode(lane, &settings.tags).to_string());
                }
            }
            None => self.push_empty(),
        }
    }

    fn push_empty(&mut self) {
        self.names.push(String::new());
        self.counts.push(0);
    }

    fn write<S: AttributeStore + ?Sized>(self, writer: &mut AttributeWriter<'_, S>, owner: AttributeOwner) -> TranslateResult<()> {
        writer.set_string(ATTRIB_ZONE_LANE_PROFILE_NAME, owner, self.names)?;
        writer.set_dictionary_array(ATTRIB_ZONE_LANE_PROFILE, owner, self.lanes, self.counts)
    }
}

fn lookup<'s>(settings: &'s ZoneGraphSettings, reference: Option<&LaneProfileRef>) -> Option<&'s LaneProfile> {
    reference.and_then(|reference| settings.profile_by_ref(reference))
}

/// Write `shapes` into `store` as one curve per shape.
///
/// Point lane attributes are written only when a polygon is present, curve
/// lane attributes only when a spline is. The output depends on nothing but
/// the shapes and the registry, so repeated calls write identical data.
pub fn encode_zone_shapes<S: AttributeStore + ?Sized>(
    shapes: &[ShapeUpload<'_>],
    settings: &ZoneGraphSettings,
    store: &mut S,
) -> TranslateResult<PartInfo> {
    let mut cache = LaneStringCache::default();
    let mut curve_counts = Vec::with_capacity(shapes.len());
    let mut kinds = Vec::with_capacity(shapes.len());
    let mut positions = Vec::new();
    let mut rotations = Vec::new();
    let mut tag_names = Vec::new();
    let mut tag_counts = Vec::with_capacity(shapes.len());
    let mut point_lanes = LaneColumns::default();
    let mut curve_lanes = LaneColumns::default();
    let mut has_polygon = false;
    let mut has_spline = false;

    for ShapeUpload { shape, transform } in shapes {
        curve_counts.push(shape.points.len());
        kinds.push(shape.kind.code());

        let before = tag_names.len();
        tag_names.extend(settings.tags.names_in(shape.tags).map(str::to_string));
        tag_counts.push(tag_names.len() - before);

        match shape.kind {
            ShapeKind::Spline => {
                has_spline = true;
                curve_lanes.push(lookup(settings, shape.common_lane_profile.as_ref()), settings, &mut cache);
                for _ in &shape.points {
                    point_lanes.push_empty();
                }
            }
            ShapeKind::Polygon => {
                has_polygon = true;
                for index in 0..shape.points.len() {
                    point_lanes.push(lookup(settings, shape.point_lane_profile(index)), settings, &mut cache);
                }
                curve_lanes.push_empty();
            }
        }

        for point in &shape.points {
            positions.extend(position_to_engine(transform.transform_point(point.position)));
            rotations.extend(quat_to_engine(transform.transform_rotation(point.rotation)));
        }
    }

    let point_count: usize = curve_counts.iter().sum();
    let part = PartInfo {
        curve_count: shapes.len(),
        point_count,
        vertex_count: point_count,
    };
    store.set_part_info(part)?;

    let mut writer = AttributeWriter::new(store);
    writer.set_float(ATTRIB_POSITION, AttributeOwner::Point, 3, positions)?;
    drop(writer);
    store.set_curve_counts(&curve_counts)?;

    let mut writer = AttributeWriter::new(store);
    writer.set_float(ATTRIB_ROTATION, AttributeOwner::Point, 4, rotations)?;
    writer.set_int(ATTRIB_ZONE_SHAPE_TYPE, AttributeOwner::Prim, kinds)?;
    writer.set_string_array(ATTRIB_ZONE_SHAPE_TAGS, AttributeOwner::Prim, tag_names, tag_counts)?;
    if has_polygon {
        point_lanes.write(&mut writer, AttributeOwner::Point)?;
    }
    if has_spline {
        curve_lanes.write(&mut writer, AttributeOwner::Prim)?;
    }

    debug!(
        "[INPUT] Encoded {} zone shapes ({} points, {} distinct lanes)",
        part.curve_count,
        part.point_count,
        cache.len()
    );
    Ok(part)
}
