//! Owner-scoped attribute storage contract.
//!
//! Curve datasets attach values at one of four granularities. For curves,
//! every point has exactly one vertex, so vertex and point values share an
//! index space; prim values are indexed by curve and detail values hold a
//! single entry for the whole dataset.
pub mod accessor;
pub mod buffer;
pub mod owner;

use crate::error::TranslateResult;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use accessor::{AttributeAccessor, AttributeWriter};
pub use buffer::GeometryBuffer;
pub use owner::OwnerPair;

/// Granularity an attribute value is attached at, ordered fine to coarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeOwner {
    Vertex,
    Point,
    Prim,
    Detail,
}

impl AttributeOwner {
    pub const ALL: [AttributeOwner; 4] = [
        AttributeOwner::Vertex,
        AttributeOwner::Point,
        AttributeOwner::Prim,
        AttributeOwner::Detail,
    ];

    /// Index of the value that applies to global point `point` of curve `curve`.
    pub fn entry_index(self, point: usize, curve: usize) -> usize {
        match self {
            AttributeOwner::Vertex | AttributeOwner::Point => point,
            AttributeOwner::Prim => curve,
            AttributeOwner::Detail => 0,
        }
    }

    /// True for the per-point granularities.
    pub fn is_point_level(self) -> bool {
        matches!(self, AttributeOwner::Vertex | AttributeOwner::Point)
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AttributeOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeOwner::Vertex => "vertex",
            AttributeOwner::Point => "point",
            AttributeOwner::Prim => "prim",
            AttributeOwner::Detail => "detail",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    Int,
    Float,
    String,
    StringArray,
    DictionaryArray,
}

impl StorageKind {
    pub fn is_array(self) -> bool {
        matches!(self, StorageKind::StringArray | StorageKind::DictionaryArray)
    }
}

/// Layout of one attribute as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub exists: bool,
    pub owner: AttributeOwner,
    pub storage: StorageKind,
    /// Number of elements (points, curves, or 1 for detail).
    pub count: usize,
    /// Components per element for scalar storage.
    pub tuple_size: usize,
    /// Sum of all per-element array lengths for array storage.
    pub total_array_elements: usize,
}

impl AttributeInfo {
    pub fn new(owner: AttributeOwner, storage: StorageKind, count: usize, tuple_size: usize) -> Self {
        Self {
            exists: true,
            owner,
            storage,
            count,
            tuple_size,
            total_array_elements: 0,
        }
    }

    /// Info reported for an attribute that is not present.
    pub fn missing(owner: AttributeOwner) -> Self {
        Self {
            exists: false,
            owner,
            storage: StorageKind::Int,
            count: 0,
            tuple_size: 0,
            total_array_elements: 0,
        }
    }
}

/// Typed attribute payload.
/// Array variants store every element's entries back to back, with `counts`
/// giving the entry count of each element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeData {
    Int(Vec<i32>),
    Float(Vec<f32>),
    String(Vec<String>),
    StringArray { values: Vec<String>, counts: Vec<usize> },
    DictionaryArray { values: Vec<String>, counts: Vec<usize> },
}

impl AttributeData {
    pub fn storage(&self) -> StorageKind {
        match self {
            AttributeData::Int(_) => StorageKind::Int,
            AttributeData::Float(_) => StorageKind::Float,
            AttributeData::String(_) => StorageKind::String,
            AttributeData::StringArray { .. } => StorageKind::StringArray,
            AttributeData::DictionaryArray { .. } => StorageKind::DictionaryArray,
        }
    }

    /// Number of elements this payload describes for the given tuple size.
    pub fn element_count(&self, tuple_size: usize) -> usize {
        let tuple_size = tuple_size.max(1);
        match self {
            AttributeData::Int(values) => values.len() / tuple_size,
            AttributeData::Float(values) => values.len() / tuple_size,
            AttributeData::String(values) => values.len() / tuple_size,
            AttributeData::StringArray { counts, .. }
            | AttributeData::DictionaryArray { counts, .. } => counts.len(),
        }
    }

    /// Total entries across all elements of an array payload.
    pub fn total_array_elements(&self) -> usize {
        match self {
            AttributeData::StringArray { values, .. }
            | AttributeData::DictionaryArray { values, .. } => values.len(),
            _ => 0,
        }
    }
}

/// Attribute values tagged with the owner they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedValues<T> {
    pub owner: AttributeOwner,
    pub values: Vec<T>,
}

impl<T> OwnedValues<T> {
    pub fn new(owner: AttributeOwner, values: Vec<T>) -> Self {
        Self { owner, values }
    }

    /// Value for global point `point` of curve `curve`.
    pub fn at(&self, point: usize, curve: usize) -> Option<&T> {
        self.values.get(self.owner.entry_index(point, curve))
    }
}

/// Element counts of one curve dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    pub curve_count: usize,
    pub point_count: usize,
    pub vertex_count: usize,
}

/// Read/write access to a curve dataset held by the geometry engine.
/// Every call may fail with a transport error, which aborts the run.
pub trait AttributeStore {
    fn part_info(&self) -> TranslateResult<PartInfo>;

    fn set_part_info(&mut self, info: PartInfo) -> TranslateResult<()>;

    /// Names of every attribute attached at `owner`.
    fn attribute_names(&self, owner: AttributeOwner) -> TranslateResult<Vec<String>>;

    fn attribute_info(&self, name: &str, owner: AttributeOwner) -> TranslateResult<AttributeInfo>;

    fn attribute_data(&self, name: &str, owner: AttributeOwner) -> TranslateResult<AttributeData>;

    fn add_attribute(&mut self, name: &str, info: &AttributeInfo) -> TranslateResult<()>;

    fn set_attribute_data(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        data: AttributeData,
    ) -> TranslateResult<()>;

    /// Point count of every curve, in curve order.
    fn curve_counts(&self) -> TranslateResult<Vec<usize>>;

    fn set_curve_counts(&mut self, counts: &[usize]) -> TranslateResult<()>;
}
