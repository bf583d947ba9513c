//! In-memory curve dataset.
use super::{AttributeData, AttributeInfo, AttributeOwner, AttributeStore, PartInfo};
use crate::error::{TranslateError, TranslateResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredAttribute {
    name: String,
    info: AttributeInfo,
    data: Option<AttributeData>,
}

/// Curve dataset held in memory, serialisable for comparison and transfer.
/// Attributes keep their declaration order, so two buffers built by the same
/// sequence of writes serialise to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryBuffer {
    part: PartInfo,
    curve_counts: Vec<usize>,
    attributes: Vec<StoredAttribute>,
}

impl GeometryBuffer {
    /// Empty dataset with the given per-curve point counts.
    pub fn curves(counts: &[usize]) -> Self {
        let point_count = counts.iter().sum();
        Self {
            part: PartInfo {
                curve_count: counts.len(),
                point_count,
                vertex_count: point_count,
            },
            curve_counts: counts.to_vec(),
            attributes: Vec::new(),
        }
    }

    /// Declare and fill an attribute in one step.
    pub fn insert(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        tuple_size: usize,
        data: AttributeData,
    ) -> TranslateResult<()> {
        let mut info = AttributeInfo::new(owner, data.storage(), data.element_count(tuple_size), tuple_size);
        info.total_array_elements = data.total_array_elements();
        self.add_attribute(name, &info)?;
        self.set_attribute_data(name, owner, data)
    }

    pub fn to_json(&self) -> TranslateResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn position(&self, name: &str, owner: AttributeOwner) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name == name && a.info.owner == owner)
    }

    fn expected_count(&self, owner: AttributeOwner) -> usize {
        match owner {
            AttributeOwner::Vertex => self.part.vertex_count,
            AttributeOwner::Point => self.part.point_count,
            AttributeOwner::Prim => self.part.curve_count,
            AttributeOwner::Detail => 1,
        }
    }
}

impl AttributeStore for GeometryBuffer {
    fn part_info(&self) -> TranslateResult<PartInfo> {
        Ok(self.part)
    }

    fn set_part_info(&mut self, info: PartInfo) -> TranslateResult<()> {
        self.part = info;
        Ok(())
    }

    fn attribute_names(&self, owner: AttributeOwner) -> TranslateResult<Vec<String>> {
        Ok(self
            .attributes
            .iter()
            .filter(|a| a.info.owner == owner && a.data.is_some())
            .map(|a| a.name.clone())
            .collect())
    }

    fn attribute_info(&self, name: &str, owner: AttributeOwner) -> TranslateResult<AttributeInfo> {
        Ok(self
            .position(name, owner)
            .map(|idx| self.attributes[idx].info.clone())
            .unwrap_or_else(|| AttributeInfo::missing(owner)))
    }

    fn attribute_data(&self, name: &str, owner: AttributeOwner) -> TranslateResult<AttributeData> {
        self.position(name, owner)
            .and_then(|idx| self.attributes[idx].data.clone())
            .ok_or_else(|| TranslateError::MissingAttribute {
                name: name.to_string(),
                owner,
            })
    }

    fn add_attribute(&mut self, name: &str, info: &AttributeInfo) -> TranslateResult<()> {
        let expected = self.expected_count(info.owner);
        if info.count != expected {
            return Err(TranslateError::shape(
                name,
                format!("declared {} elements on {}, dataset has {}", info.count, info.owner, expected),
            ));
        }

        let stored = StoredAttribute {
            name: name.to_string(),
            info: info.clone(),
            data: None,
        };
        match self.position(name, info.owner) {
            Some(idx) => self.attributes[idx] = stored,
            None => self.attributes.push(stored),
        }
        Ok(())
    }

    fn set_attribute_data(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        data: AttributeData,
    ) -> TranslateResult<()> {
        let idx = self
            .position(name, owner)
            .ok_or_else(|| TranslateError::Store(format!("attribute `{}` on {} was never added", name, owner)))?;
        let attribute = &mut self.attributes[idx];

        if data.storage() != attribute.info.storage {
            return Err(TranslateError::shape(
                name,
                format!("declared {:?}, received {:?}", attribute.info.storage, data.storage()),
            ));
        }
        let count = data.element_count(attribute.info.tuple_size);
        if count != attribute.info.count {
            return Err(TranslateError::shape(
                name,
                format!("declared {} elements, received {}", attribute.info.count, count),
            ));
        }

        attribute.info.total_array_elements = data.total_array_elements();
        attribute.data = Some(data);
        Ok(())
    }

    fn curve_counts(&self) -> TranslateResult<Vec<usize>> {
        Ok(self.curve_counts.clone())
    }

    fn set_curve_counts(&mut self, counts: &[usize]) -> TranslateResult<()> {
        if counts.len() != self.part.curve_count {
            return Err(TranslateError::CurveCountMismatch {
                counted: counts.len(),
                expected: self.part.curve_count,
            });
        }
        self.curve_counts = counts.to_vec();
        Ok(())
    }
}
