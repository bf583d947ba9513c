//! Free-form property attributes.
//!
//! An attribute named `unreal_uproperty_<Field>` sets `<Field>` on every
//! point (vertex and point owners) or on the whole shape (prim and detail
//! owners). Field names match case-insensitively, ignoring underscores.
use super::{PointKind, PolygonRoutingType, ShapeKind, ShapePoint, ZoneShape};
use crate::attribute::{AttributeAccessor, AttributeOwner, AttributeStore, StorageKind};
use crate::error::TranslateResult;
use bevy::log::debug;
use bevy::math::Vec3;
use constants::attributes::ATTRIB_PREFIX_PROPERTY;
use constants::coordinate_system::rotator_to_quat;
use thiserror::Error;

/// One element's property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Float(Vec<f32>),
    String(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("no field named `{0}`")]
    UnknownField(String),

    #[error("field `{field}` expects {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("`{value}` is not a valid value for `{field}`")]
    InvalidValue { field: String, value: String },
}

/// Something a property attribute can be written to.
pub trait PropertyTarget {
    fn set_property(&mut self, field: &str, value: &PropertyValue) -> Result<(), PropertyError>;
}

#[derive(Debug, Clone, PartialEq)]
enum PropertyValues {
    Int(Vec<i32>),
    Float { values: Vec<f32>, tuple_size: usize },
    String(Vec<String>),
}

/// Values of one property attribute across its owner's elements.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAttribute {
    pub field: String,
    pub owner: AttributeOwner,
    values: PropertyValues,
}

impl PropertyAttribute {
    pub fn value_at(&self, index: usize) -> Option<PropertyValue> {
        match &self.values {
            PropertyValues::Int(values) => values.get(index).copied().map(PropertyValue::Int),
            PropertyValues::Float { values, tuple_size } => values
                .get(index * tuple_size..(index + 1) * tuple_size)
                .map(|tuple| PropertyValue::Float(tuple.to_vec())),
            PropertyValues::String(values) => values.get(index).cloned().map(PropertyValue::String),
        }
    }
}

/// Every property attribute on the dataset. Array-valued ones are skipped.
pub fn read_property_attributes<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
) -> TranslateResult<Vec<PropertyAttribute>> {
    let mut attributes = Vec::new();
    for (name, owner) in accessor.names_with_prefix(ATTRIB_PREFIX_PROPERTY) {
        let field = name[ATTRIB_PREFIX_PROPERTY.len()..].to_string();
        let values = match accessor.info(&name, owner)?.storage {
            StorageKind::Int => PropertyValues::Int(accessor.get_int(&name, owner)?),
            StorageKind::Float => {
                let (values, tuple_size) = accessor.get_float(&name, owner)?;
                PropertyValues::Float { values, tuple_size }
            }
            StorageKind::String => PropertyValues::String(accessor.get_string(&name, owner)?),
            storage => {
                debug!("[ZONE] Skipping property attribute `{}` with {:?} storage", name, storage);
                continue;
            }
        };
        attributes.push(PropertyAttribute { field, owner, values });
    }
    Ok(attributes)
}

/// Write every point-level property onto `point`. Failures are logged and skipped.
pub fn apply_point_properties(attributes: &[PropertyAttribute], point: &mut ShapePoint, global_point: usize, curve: usize) {
    for attribute in attributes.iter().filter(|a| a.owner.is_point_level()) {
        apply(attribute, point, attribute.owner.entry_index(global_point, curve));
    }
}

/// Write every curve-level property onto `shape`. Failures are logged and skipped.
pub fn apply_shape_properties(attributes: &[PropertyAttribute], shape: &mut ZoneShape, first_point: usize, curve: usize) {
    for attribute in attributes.iter().filter(|a| !a.owner.is_point_level()) {
        apply(attribute, shape, attribute.owner.entry_index(first_point, curve));
    }
}

fn apply<T: PropertyTarget>(attribute: &PropertyAttribute, target: &mut T, index: usize) {
    let Some(value) = attribute.value_at(index) else {
        debug!("[ZONE] Property `{}` has no value at {}", attribute.field, index);
        return;
    };
    if let Err(err) = target.set_property(&attribute.field, &value) {
        debug!("[ZONE] Skipping property `{}`: {}", attribute.field, err);
    }
}

fn normalize(field: &str) -> String {
    field.chars().filter(|c| *c != '_').flat_map(char::to_lowercase).collect()
}

fn as_float(field: &str, value: &PropertyValue) -> Result<f32, PropertyError> {
    match value {
        PropertyValue::Float(values) if !values.is_empty() => Ok(values[0]),
        PropertyValue::Int(value) => Ok(*value as f32),
        PropertyValue::String(text) => text.trim().parse().map_err(|_| PropertyError::InvalidValue {
            field: field.to_string(),
            value: text.clone(),
        }),
        _ => Err(mismatch(field, "a number")),
    }
}

fn as_vec3(field: &str, value: &PropertyValue) -> Result<Vec3, PropertyError> {
    match value {
        PropertyValue::Float(values) if values.len() >= 3 => Ok(Vec3::new(values[0], values[1], values[2])),
        _ => Err(mismatch(field, "three floats")),
    }
}

fn as_bool(field: &str, value: &PropertyValue) -> Result<bool, PropertyError> {
    match value {
        PropertyValue::Int(value) => Ok(*value != 0),
        PropertyValue::Float(values) if !values.is_empty() => Ok(values[0] != 0.0),
        PropertyValue::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(PropertyError::InvalidValue {
                field: field.to_string(),
                value: text.clone(),
            }),
        },
        _ => Err(mismatch(field, "a boolean")),
    }
}

/// Enumeration given as an index or as one of `names`, case-insensitively.
fn as_enum(field: &str, value: &PropertyValue, names: &[&str]) -> Result<usize, PropertyError> {
    let invalid = |value: String| PropertyError::InvalidValue {
        field: field.to_string(),
        value,
    };
    match value {
        PropertyValue::Int(index) => usize::try_from(*index)
            .ok()
            .filter(|index| *index < names.len())
            .ok_or_else(|| invalid(index.to_string())),
        PropertyValue::String(text) => names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(text.trim()))
            .ok_or_else(|| invalid(text.clone())),
        PropertyValue::Float(_) => Err(mismatch(field, "an index or a name")),
    }
}

fn mismatch(field: &str, expected: &'static str) -> PropertyError {
    PropertyError::TypeMismatch {
        field: field.to_string(),
        expected,
    }
}

impl PropertyTarget for ShapePoint {
    fn set_property(&mut self, field: &str, value: &PropertyValue) -> Result<(), PropertyError> {
        match normalize(field).as_str() {
            "position" => self.position = as_vec3(field, value)?,
            // Pitch, yaw and roll in degrees.
            "rotation" => {
                let angles = as_vec3(field, value)?;
                self.rotation = rotator_to_quat(angles.x, angles.y, angles.z);
            }
            "tangentlength" => self.tangent_length = as_float(field, value)?,
            "innerturnradius" => self.inner_turn_radius = as_float(field, value)?,
            "type" => {
                self.kind = match as_enum(field, value, &["Sharp", "Bezier", "AutoBezier", "LaneProfile"])? {
                    0 => PointKind::Sharp,
                    1 => PointKind::Bezier,
                    2 => PointKind::AutoBezier,
                    _ => PointKind::LaneProfile,
                }
            }
            "breverselaneprofile" | "reverselaneprofile" => self.reverse_lane_profile = as_bool(field, value)?,
            _ => return Err(PropertyError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

impl PropertyTarget for ZoneShape {
    fn set_property(&mut self, field: &str, value: &PropertyValue) -> Result<(), PropertyError> {
        match normalize(field).as_str() {
            "shapetype" => {
                self.kind = match as_enum(field, value, &["Spline", "Polygon"])? {
                    0 => ShapeKind::Spline,
                    _ => ShapeKind::Polygon,
                }
            }
            "polygonroutingtype" => {
                self.polygon_routing_type = match as_enum(field, value, &["Bezier", "Arcs"])? {
                    0 => PolygonRoutingType::Bezier,
                    _ => PolygonRoutingType::Arcs,
                }
            }
            "breversepolygonlaneprofiles" | "reversepolygonlaneprofiles" => {
                self.reverse_polygon_lane_profiles = as_bool(field, value)?
            }
            _ => return Err(PropertyError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeWriter, GeometryBuffer};

    #[test]
    fn point_fields_match_loosely() {
        let mut point = ShapePoint::default();
        point
            .set_property("TangentLength", &PropertyValue::Float(vec![25.0]))
            .unwrap();
        point
            .set_property("inner_turn_radius", &PropertyValue::Int(40))
            .unwrap();
        point
            .set_property("Type", &PropertyValue::String("autobezier".into()))
            .unwrap();
        point
            .set_property("bReverseLaneProfile", &PropertyValue::Int(1))
            .unwrap();

        assert_eq!(point.tangent_length, 25.0);
        assert_eq!(point.inner_turn_radius, 40.0);
        assert_eq!(point.kind, PointKind::AutoBezier);
        assert!(point.reverse_lane_profile);
    }

    #[test]
    fn bad_values_are_reported_not_applied() {
        let mut shape = ZoneShape::default();
        assert_eq!(
            shape.set_property("Missing", &PropertyValue::Int(1)),
            Err(PropertyError::UnknownField("Missing".into()))
        );
        assert!(matches!(
            shape.set_property("PolygonRoutingType", &PropertyValue::Int(9)),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert_eq!(shape, ZoneShape::default());
    }

    #[test]
    fn attributes_apply_by_owner() {
        let mut buffer = GeometryBuffer::curves(&[2]);
        let mut writer = AttributeWriter::new(&mut buffer);
        writer
            .set_float("unreal_uproperty_TangentLength", AttributeOwner::Point, 1, vec![10.0, 20.0])
            .unwrap();
        writer
            .set_string(
                "unreal_uproperty_PolygonRoutingType",
                AttributeOwner::Prim,
                vec!["Arcs".into()],
            )
            .unwrap();
        writer
            .set_string_array(
                "unreal_uproperty_Ignored",
                AttributeOwner::Prim,
                vec!["x".into()],
                vec![1],
            )
            .unwrap();

        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let attributes = read_property_attributes(&accessor).unwrap();
        assert_eq!(attributes.len(), 2);

        let mut point = ShapePoint::default();
        apply_point_properties(&attributes, &mut point, 1, 0);
        assert_eq!(point.tangent_length, 20.0);

        let mut shape = ZoneShape::default();
        apply_shape_properties(&attributes, &mut shape, 0, 0);
        assert_eq!(shape.polygon_routing_type, PolygonRoutingType::Arcs);
    }
}
