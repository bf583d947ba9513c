//! Curve partitioning into split groups.
use crate::attribute::{AttributeAccessor, AttributeStore, OwnedValues, StorageKind};
use crate::error::{TranslateError, TranslateResult};
use bevy::log::debug;
use constants::attributes::{
    ATTRIB_PARTIAL_OUTPUT_MODE, ATTRIB_SPLIT_VALUE, PARTIAL_OUTPUT_MODE_MODIFY, PARTIAL_OUTPUT_MODE_REMOVE,
    PARTIAL_OUTPUT_MODE_REPLACE,
};
use std::collections::HashMap;
use std::ops::Range;

/// Split key shared by every curve of a dataset without split values.
pub const UNSPLIT_KEY: &str = "";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PartialOutputMode {
    #[default]
    Replace,
    Modify,
    Remove,
}

impl PartialOutputMode {
    /// Map a raw mode value, clamping out-of-range codes.
    pub fn from_code(code: i32) -> Self {
        match code.clamp(PARTIAL_OUTPUT_MODE_REPLACE, PARTIAL_OUTPUT_MODE_REMOVE) {
            PARTIAL_OUTPUT_MODE_MODIFY => PartialOutputMode::Modify,
            PARTIAL_OUTPUT_MODE_REMOVE => PartialOutputMode::Remove,
            _ => PartialOutputMode::Replace,
        }
    }

    /// Parse a mode stored as text: a number, or the mode name in any case.
    pub fn parse_code(text: &str) -> i32 {
        let text = text.trim();
        if let Ok(code) = text.parse::<i32>() {
            return code;
        }
        match text.to_ascii_lowercase().as_str() {
            "modify" => PARTIAL_OUTPUT_MODE_MODIFY,
            "remove" => PARTIAL_OUTPUT_MODE_REMOVE,
            _ => PARTIAL_OUTPUT_MODE_REPLACE,
        }
    }
}

/// Curves sharing one split key.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroup {
    pub key: String,
    pub mode: PartialOutputMode,
    /// Member curve indices in dataset order. Always empty for `Remove`.
    pub curves: Vec<usize>,
}

/// Result of partitioning one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvePartition {
    /// Groups in the order their key was first seen.
    pub groups: Vec<SplitGroup>,
    /// First global point index of every curve.
    pub curve_starts: Vec<usize>,
    pub point_counts: Vec<usize>,
    /// True when any curve asked for `Modify` or `Remove`.
    pub partial_update: bool,
}

impl CurvePartition {
    /// Global point indices of `curve`.
    pub fn curve_points(&self, curve: usize) -> Range<usize> {
        let start = self.curve_starts.get(curve).copied().unwrap_or(0);
        let count = self.point_counts.get(curve).copied().unwrap_or(0);
        start..start + count
    }

    /// Groups that produce shapes.
    pub fn surviving_groups(&self) -> impl Iterator<Item = &SplitGroup> {
        self.groups.iter().filter(|group| group.mode != PartialOutputMode::Remove)
    }

    /// Keys of the groups in `mode`.
    pub fn keys_with_mode(&self, mode: PartialOutputMode) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(move |group| group.mode == mode)
            .map(|group| group.key.as_str())
    }
}

/// Bucket curves by split key in one forward pass.
///
/// A `Remove` curve clears every member its key collected so far and marks
/// the group removed; later curves with that key are skipped whatever their
/// mode. The running point offset advances for every curve, skipped or not.
pub fn partition_curves(
    point_counts: &[usize],
    split_keys: Option<&OwnedValues<String>>,
    modes: Option<&OwnedValues<i32>>,
) -> TranslateResult<CurvePartition> {
    let mut partition = CurvePartition {
        point_counts: point_counts.to_vec(),
        curve_starts: Vec::with_capacity(point_counts.len()),
        ..CurvePartition::default()
    };
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut offset = 0;

    for (curve, &count) in point_counts.iter().enumerate() {
        partition.curve_starts.push(offset);
        let start = offset;
        offset += count;

        let key = match split_keys {
            Some(keys) => keys
                .at(start, curve)
                .ok_or_else(|| out_of_range(ATTRIB_SPLIT_VALUE, curve))?
                .as_str(),
            None => UNSPLIT_KEY,
        };
        let mode = match (split_keys, modes) {
            (Some(_), Some(modes)) => PartialOutputMode::from_code(
                *modes
                    .at(start, curve)
                    .ok_or_else(|| out_of_range(ATTRIB_PARTIAL_OUTPUT_MODE, curve))?,
            ),
            _ => PartialOutputMode::Replace,
        };
        if mode != PartialOutputMode::Replace {
            partition.partial_update = true;
        }

        let index = match group_index.get(key) {
            Some(&index) => index,
            None => {
                partition.groups.push(SplitGroup {
                    key: key.to_string(),
                    mode,
                    curves: Vec::new(),
                });
                group_index.insert(key.to_string(), partition.groups.len() - 1);
                partition.groups.len() - 1
            }
        };

        let group = &mut partition.groups[index];
        if group.mode == PartialOutputMode::Remove {
            continue;
        }
        if mode == PartialOutputMode::Remove {
            group.mode = PartialOutputMode::Remove;
            group.curves.clear();
            continue;
        }
        group.curves.push(curve);
    }

    Ok(partition)
}

fn out_of_range(name: &str, curve: usize) -> TranslateError {
    TranslateError::shape(name, format!("no value for curve {}", curve))
}

/// Read split keys, partial output modes and curve sizes from a dataset and
/// partition its curves.
pub fn read_partition<S: AttributeStore + ?Sized>(accessor: &AttributeAccessor<'_, S>) -> TranslateResult<CurvePartition> {
    let part = accessor.store().part_info()?;
    let point_counts = accessor.store().curve_counts()?;
    let counted: usize = point_counts.iter().sum();
    if counted != part.point_count {
        return Err(TranslateError::CurveCountMismatch {
            counted,
            expected: part.point_count,
        });
    }

    let split_keys = read_split_keys(accessor)?;
    let modes = match (&split_keys, accessor.query_owner(ATTRIB_PARTIAL_OUTPUT_MODE)) {
        (Some(_), Some(owner)) => Some(OwnedValues::new(
            owner,
            accessor.get_enum(ATTRIB_PARTIAL_OUTPUT_MODE, Some(owner), PartialOutputMode::parse_code)?,
        )),
        _ => None,
    };

    let partition = partition_curves(&point_counts, split_keys.as_ref(), modes.as_ref())?;
    debug!(
        "[ZONE] Partitioned {} curves into {} split groups (partial update: {})",
        point_counts.len(),
        partition.groups.len(),
        partition.partial_update
    );
    Ok(partition)
}

fn read_split_keys<S: AttributeStore + ?Sized>(
    accessor: &AttributeAccessor<'_, S>,
) -> TranslateResult<Option<OwnedValues<String>>> {
    let Some(owner) = accessor.query_owner(ATTRIB_SPLIT_VALUE) else {
        return Ok(None);
    };

    let values = match accessor.info(ATTRIB_SPLIT_VALUE, owner)?.storage {
        StorageKind::String => accessor.get_string(ATTRIB_SPLIT_VALUE, owner)?,
        StorageKind::Int => accessor
            .get_int(ATTRIB_SPLIT_VALUE, owner)?
            .into_iter()
            .map(|value| value.to_string())
            .collect(),
        StorageKind::Float => {
            let (values, tuple_size) = accessor.get_float(ATTRIB_SPLIT_VALUE, owner)?;
            values.into_iter().step_by(tuple_size).map(|value| value.to_string()).collect()
        }
        other => {
            return Err(TranslateError::shape(
                ATTRIB_SPLIT_VALUE,
                format!("split values cannot be read from {:?} storage", other),
            ));
        }
    };
    Ok(Some(OwnedValues::new(owner, values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeOwner, AttributeWriter, GeometryBuffer};

    fn prim_keys(keys: &[&str]) -> OwnedValues<String> {
        OwnedValues::new(AttributeOwner::Prim, keys.iter().map(|k| k.to_string()).collect())
    }

    fn prim_modes(modes: &[i32]) -> OwnedValues<i32> {
        OwnedValues::new(AttributeOwner::Prim, modes.to_vec())
    }

    #[test]
    fn unsplit_dataset_is_one_replace_group() {
        let partition = partition_curves(&[2, 3, 1], None, None).unwrap();
        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].key, UNSPLIT_KEY);
        assert_eq!(partition.groups[0].mode, PartialOutputMode::Replace);
        assert_eq!(partition.groups[0].curves, vec![0, 1, 2]);
        assert_eq!(partition.curve_starts, vec![0, 2, 5]);
        assert!(!partition.partial_update);
    }

    #[test]
    fn remove_after_modify_clears_group() {
        let keys = prim_keys(&["K", "K"]);
        let modes = prim_modes(&[PARTIAL_OUTPUT_MODE_MODIFY, PARTIAL_OUTPUT_MODE_REMOVE]);
        let partition = partition_curves(&[2, 2], Some(&keys), Some(&modes)).unwrap();

        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].mode, PartialOutputMode::Remove);
        assert!(partition.groups[0].curves.is_empty());
        assert!(partition.partial_update);
    }

    #[test]
    fn remove_before_modify_skips_later_curves() {
        let keys = prim_keys(&["K", "K"]);
        let modes = prim_modes(&[PARTIAL_OUTPUT_MODE_REMOVE, PARTIAL_OUTPUT_MODE_MODIFY]);
        let partition = partition_curves(&[2, 2], Some(&keys), Some(&modes)).unwrap();

        assert_eq!(partition.groups[0].mode, PartialOutputMode::Remove);
        assert!(partition.groups[0].curves.is_empty());
    }

    #[test]
    fn offsets_advance_past_removed_curves() {
        let keys = prim_keys(&["A", "B", "A"]);
        let modes = prim_modes(&[PARTIAL_OUTPUT_MODE_REMOVE, PARTIAL_OUTPUT_MODE_MODIFY, 9]);
        let partition = partition_curves(&[4, 2, 3], Some(&keys), Some(&modes)).unwrap();

        assert_eq!(partition.curve_starts, vec![0, 4, 6]);
        assert_eq!(partition.curve_points(1), 4..6);
        assert_eq!(partition.groups[1].curves, vec![1]);
        assert_eq!(partition.keys_with_mode(PartialOutputMode::Remove).collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn modes_are_ignored_without_split_values() {
        let modes = prim_modes(&[PARTIAL_OUTPUT_MODE_REMOVE]);
        let partition = partition_curves(&[2], None, Some(&modes)).unwrap();
        assert_eq!(partition.groups[0].mode, PartialOutputMode::Replace);
        assert_eq!(partition.groups[0].curves, vec![0]);
    }

    #[test]
    fn mode_codes_clamp_and_parse() {
        assert_eq!(PartialOutputMode::from_code(-3), PartialOutputMode::Replace);
        assert_eq!(PartialOutputMode::from_code(7), PartialOutputMode::Remove);
        assert_eq!(PartialOutputMode::parse_code("Modify"), PARTIAL_OUTPUT_MODE_MODIFY);
        assert_eq!(PartialOutputMode::parse_code(" 2 "), PARTIAL_OUTPUT_MODE_REMOVE);
    }

    #[test]
    fn read_partition_uses_int_split_values() {
        let mut buffer = GeometryBuffer::curves(&[1, 1, 1]);
        let mut writer = AttributeWriter::new(&mut buffer);
        writer.set_int(ATTRIB_SPLIT_VALUE, AttributeOwner::Prim, vec![3, 5, 3]).unwrap();
        writer
            .set_string(
                ATTRIB_PARTIAL_OUTPUT_MODE,
                AttributeOwner::Detail,
                vec!["modify".into()],
            )
            .unwrap();

        let accessor = AttributeAccessor::new(&buffer).unwrap();
        let partition = read_partition(&accessor).unwrap();
        let keys: Vec<_> = partition.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["3", "5"]);
        assert_eq!(partition.groups[0].curves, vec![0, 2]);
        assert!(partition.partial_update);
    }

    #[test]
    fn point_count_mismatch_is_structural() {
        let mut buffer = GeometryBuffer::curves(&[2, 2]);
        let mut info = buffer.part_info().unwrap();
        info.point_count = 5;
        buffer.set_part_info(info).unwrap();

        let accessor = AttributeAccessor::new(&buffer).unwrap();
        assert!(matches!(
            read_partition(&accessor),
            Err(TranslateError::CurveCountMismatch { counted: 4, expected: 5 })
        ));
    }
}
