use bevy::ecs::world::World;
use bevy::math::{Quat, Vec3};
use constants::attributes::{ATTRIB_POSITION, ATTRIB_ZONE_LANE_PROFILE, ATTRIB_ZONE_LANE_PROFILE_NAME};
use zone_shape_translator::registry::{LaneDescriptor, LaneDirection, LaneProfile, LaneProfileRef};
use zone_shape_translator::shape::PointLaneProfile;
use zone_shape_translator::{
    AttributeOwner, AttributeWriter, EngineSession, GeometryBuffer, OutputZoneShape, RegistryContext, ShapeKind, ShapePoint, ShapeUpload,
    TranslateResult, ZoneGraphSettings, ZoneShape, ZoneShapeInput,
};

#[derive(Default)]
struct CapturingSession {
    geometry: Option<GeometryBuffer>,
}

impl EngineSession for CapturingSession {
    fn create_node(&mut self, _name: &str) -> TranslateResult<i32> {
        Ok(7)
    }

    fn delete_node(&mut self, _node_id: i32) -> TranslateResult<()> {
        Ok(())
    }

    fn commit_geometry(&mut self, _node_id: i32, geometry: &GeometryBuffer) -> TranslateResult<()> {
        self.geometry = Some(geometry.clone());
        Ok(())
    }
}

fn registry() -> (ZoneGraphSettings, LaneProfileRef, LaneProfileRef) {
    let mut settings = ZoneGraphSettings::with_tag_capacity(8);
    let mut modified = false;
    let road = settings.tags.find_or_create("Road", &mut modified);
    let walk = settings.tags.find_or_create("Walk", &mut modified);

    let street = LaneProfile::new(
        Some("Street".into()),
        vec![
            LaneDescriptor::new(350.0, LaneDirection::Forward, road),
            LaneDescriptor::new(350.0, LaneDirection::Backward, road),
        ],
    );
    let sidewalk = LaneProfile::new(
        Some("Sidewalk".into()),
        vec![LaneDescriptor::new(150.0, LaneDirection::None, walk)],
    );
    let (street_ref, sidewalk_ref) = (street.reference(), sidewalk.reference());
    settings.lane_profiles.extend([street, sidewalk]);
    (settings, street_ref, sidewalk_ref)
}

fn point(x: f32, y: f32, yaw: f32) -> ShapePoint {
    ShapePoint {
        position: Vec3::new(x, y, 20.0),
        rotation: Quat::from_rotation_z(yaw),
        ..ShapePoint::default()
    }
}

fn shapes(street: &LaneProfileRef, sidewalk: &LaneProfileRef, settings: &ZoneGraphSettings) -> Vec<ZoneShape> {
    let spline = ZoneShape {
        kind: ShapeKind::Spline,
        tags: settings.tags.find("Road").unwrap(),
        common_lane_profile: Some(street.clone()),
        points: vec![point(0.0, 0.0, 0.0), point(1000.0, 0.0, 0.3)],
        ..ZoneShape::default()
    };

    let mut polygon = ZoneShape {
        kind: ShapeKind::Polygon,
        tags: settings.tags.find("Walk").unwrap(),
        common_lane_profile: Some(sidewalk.clone()),
        points: vec![point(0.0, 0.0, 0.0), point(500.0, 0.0, 1.0), point(0.0, 500.0, 2.0)],
        ..ZoneShape::default()
    };
    polygon.points[0].lane_profile = polygon.add_unique_per_point_lane_profile(street.clone());
    vec![spline, polygon]
}

fn lanes_of<'s>(settings: &'s ZoneGraphSettings, reference: Option<&LaneProfileRef>) -> Option<&'s [LaneDescriptor]> {
    reference
        .and_then(|reference| settings.profile_by_ref(reference))
        .map(|profile| profile.lanes.as_slice())
}

#[test]
fn uploaded_shapes_decode_back_equal() {
    let (mut settings, street, sidewalk) = registry();
    let originals = shapes(&street, &sidewalk, &settings);
    let uploads: Vec<_> = originals.iter().map(ShapeUpload::new).collect();

    let mut session = CapturingSession::default();
    ZoneShapeInput::new()
        .upload(&mut session, "Crossing", &uploads, &settings)
        .unwrap();
    let geometry = session.geometry.unwrap();

    let expected_profiles = settings.lane_profiles.len();
    let mut world = World::new();
    let mut output = OutputZoneShape::new();
    let mut ctx = RegistryContext::new(&mut settings);
    let report = output
        .update(&[&geometry], &mut ctx, &mut world, &mut |_: &ZoneGraphSettings| -> TranslateResult<()> {
            Ok(())
        })
        .unwrap();

    assert!(!report.registry_modified);
    assert_eq!(ctx.settings().lane_profiles.len(), expected_profiles);
    assert_eq!(report.changed_shapes.len(), originals.len());

    for (original, handle) in originals.iter().zip(&report.changed_shapes) {
        let decoded = world.get::<ZoneShape>(*handle).unwrap();
        assert_eq!(decoded.kind, original.kind);
        assert_eq!(decoded.tags, original.tags);
        assert_eq!(decoded.points.len(), original.points.len());

        for (index, (got, want)) in decoded.points.iter().zip(&original.points).enumerate() {
            assert!(got.position.abs_diff_eq(want.position, 1e-3));
            assert!(got.rotation.abs_diff_eq(want.rotation, 1e-5));
            match original.kind {
                ShapeKind::Spline => assert_eq!(got.lane_profile, PointLaneProfile::Inherit),
                ShapeKind::Polygon => assert_eq!(
                    lanes_of(ctx.settings(), decoded.point_lane_profile(index)),
                    lanes_of(ctx.settings(), original.point_lane_profile(index))
                ),
            }
        }
        if original.kind == ShapeKind::Spline {
            assert_eq!(decoded.common_lane_profile, original.common_lane_profile);
        }
    }
}

#[test]
fn encoding_the_same_shapes_twice_commits_identical_geometry() {
    let (settings, street, sidewalk) = registry();
    let originals = shapes(&street, &sidewalk, &settings);
    let uploads: Vec<_> = originals.iter().map(ShapeUpload::new).collect();

    let mut input = ZoneShapeInput::new();
    let mut session = CapturingSession::default();
    input.upload(&mut session, "Crossing", &uploads, &settings).unwrap();
    let first = session.geometry.take().unwrap();
    input.upload(&mut session, "Crossing", &uploads, &settings).unwrap();
    let second = session.geometry.take().unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn untagged_lanes_decode_back_to_the_same_profile() {
    let mut source = GeometryBuffer::curves(&[2]);
    let mut writer = AttributeWriter::new(&mut source);
    writer
        .set_float(ATTRIB_POSITION, AttributeOwner::Point, 3, vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0])
        .unwrap();
    writer
        .set_dictionary_array(
            ATTRIB_ZONE_LANE_PROFILE,
            AttributeOwner::Prim,
            vec![r#"{"Width":2.0,"Direction":1}"#.to_string()],
            vec![1],
        )
        .unwrap();
    writer
        .set_string(ATTRIB_ZONE_LANE_PROFILE_NAME, AttributeOwner::Prim, vec!["Plain".to_string()])
        .unwrap();

    let mut settings = ZoneGraphSettings::default();
    let mut ctx = RegistryContext::new(&mut settings);
    let mut world = World::new();
    let mut output = OutputZoneShape::new();
    let mut no_persist = |_: &ZoneGraphSettings| -> TranslateResult<()> { Ok(()) };

    let first = output
        .update(&[&source], &mut ctx, &mut world, &mut no_persist)
        .unwrap();
    let decoded = world.get::<ZoneShape>(first.changed_shapes[0]).unwrap().clone();

    let mut session = CapturingSession::default();
    ZoneShapeInput::new()
        .upload(&mut session, "Plain", &[ShapeUpload::new(&decoded)], ctx.settings())
        .unwrap();
    let uploaded = session.geometry.unwrap();

    let second = output
        .update(&[&uploaded], &mut ctx, &mut world, &mut no_persist)
        .unwrap();
    let redecoded = world.get::<ZoneShape>(second.changed_shapes[0]).unwrap();

    assert!(!second.registry_modified);
    assert_eq!(ctx.settings().lane_profiles.len(), 1);
    assert_eq!(redecoded.common_lane_profile, decoded.common_lane_profile);
    assert_eq!(
        decoded.common_lane_profile.as_ref().and_then(|p| p.name.as_deref()),
        Some("Plain")
    );
}
