//! Typed reads and writes over an [`AttributeStore`].
use super::owner::{self, OwnerPair};
use super::{AttributeData, AttributeInfo, AttributeOwner, AttributeStore, StorageKind};
use crate::error::{TranslateError, TranslateResult};

/// Typed reader over one curve dataset.
/// Attribute names are fetched once per owner so existence checks stay local.
pub struct AttributeAccessor<'a, S: AttributeStore + ?Sized> {
    store: &'a S,
    names: [Vec<String>; 4],
}

impl<'a, S: AttributeStore + ?Sized> AttributeAccessor<'a, S> {
    pub fn new(store: &'a S) -> TranslateResult<Self> {
        let names = [
            store.attribute_names(AttributeOwner::Vertex)?,
            store.attribute_names(AttributeOwner::Point)?,
            store.attribute_names(AttributeOwner::Prim)?,
            store.attribute_names(AttributeOwner::Detail)?,
        ];
        Ok(Self { store, names })
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn exists(&self, name: &str, owner: AttributeOwner) -> bool {
        self.names[owner.slot()].iter().any(|n| n == name)
    }

    /// Owner of `name` within `pair`, fine owner first.
    pub fn resolve(&self, name: &str, pair: OwnerPair) -> Option<AttributeOwner> {
        owner::resolve(|n, o| self.exists(n, o), name, pair)
    }

    /// Finest owner of `name` across every granularity.
    pub fn query_owner(&self, name: &str) -> Option<AttributeOwner> {
        owner::query(|n, o| self.exists(n, o), name)
    }

    /// Every attribute whose name starts with `prefix`, with its owner.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<(String, AttributeOwner)> {
        let mut found = Vec::new();
        for owner in AttributeOwner::ALL {
            for name in &self.names[owner.slot()] {
                if name.starts_with(prefix) {
                    found.push((name.clone(), owner));
                }
            }
        }
        found
    }

    pub fn info(&self, name: &str, owner: AttributeOwner) -> TranslateResult<AttributeInfo> {
        self.store.attribute_info(name, owner)
    }

    pub fn get_int(&self, name: &str, owner: AttributeOwner) -> TranslateResult<Vec<i32>> {
        match self.store.attribute_data(name, owner)? {
            AttributeData::Int(values) => Ok(values),
            other => Err(unexpected(name, StorageKind::Int, &other)),
        }
    }

    /// Float values flattened, with the tuple size they were stored with.
    pub fn get_float(&self, name: &str, owner: AttributeOwner) -> TranslateResult<(Vec<f32>, usize)> {
        let info = self.info(name, owner)?;
        match self.store.attribute_data(name, owner)? {
            AttributeData::Float(values) => Ok((values, info.tuple_size.max(1))),
            other => Err(unexpected(name, StorageKind::Float, &other)),
        }
    }

    pub fn get_string(&self, name: &str, owner: AttributeOwner) -> TranslateResult<Vec<String>> {
        match self.store.attribute_data(name, owner)? {
            AttributeData::String(values) => Ok(values),
            other => Err(unexpected(name, StorageKind::String, &other)),
        }
    }

    pub fn get_string_array(
        &self,
        name: &str,
        owner: AttributeOwner,
    ) -> TranslateResult<(Vec<String>, Vec<usize>)> {
        match self.store.attribute_data(name, owner)? {
            AttributeData::StringArray { values, counts } => Ok((values, counts)),
            other => Err(unexpected(name, StorageKind::StringArray, &other)),
        }
    }

    pub fn get_dictionary_array(
        &self,
        name: &str,
        owner: AttributeOwner,
    ) -> TranslateResult<(Vec<String>, Vec<usize>)> {
        match self.store.attribute_data(name, owner)? {
            AttributeData::DictionaryArray { values, counts } => Ok((values, counts)),
            other => Err(unexpected(name, StorageKind::DictionaryArray, &other)),
        }
    }

    /// Read an enumeration stored either as ints or as strings.
    /// Strings are mapped through `parse`; an absent owner or any other
    /// storage yields an empty vector.
    pub fn get_enum<F>(&self, name: &str, owner: Option<AttributeOwner>, parse: F) -> TranslateResult<Vec<i32>>
    where
        F: Fn(&str) -> i32,
    {
        let Some(owner) = owner else {
            return Ok(Vec::new());
        };
        match self.store.attribute_data(name, owner)? {
            AttributeData::Int(values) => Ok(values),
            AttributeData::Float(values) => Ok(values.into_iter().map(|v| v as i32).collect()),
            AttributeData::String(values) => Ok(values.iter().map(|v| parse(v)).collect()),
            _ => Ok(Vec::new()),
        }
    }
}

fn unexpected(name: &str, expected: StorageKind, found: &AttributeData) -> TranslateError {
    TranslateError::shape(
        name,
        format!("expected {:?} storage, found {:?}", expected, found.storage()),
    )
}

/// Typed writer that declares each attribute before filling it.
pub struct AttributeWriter<'a, S: AttributeStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: AttributeStore + ?Sized> AttributeWriter<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    fn write(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        tuple_size: usize,
        data: AttributeData,
    ) -> TranslateResult<()> {
        let mut info = AttributeInfo::new(owner, data.storage(), data.element_count(tuple_size), tuple_size);
        info.total_array_elements = data.total_array_elements();
        self.store.add_attribute(name, &info)?;
        self.store.set_attribute_data(name, owner, data)
    }

    pub fn set_int(&mut self, name: &str, owner: AttributeOwner, values: Vec<i32>) -> TranslateResult<()> {
        self.write(name, owner, 1, AttributeData::Int(values))
    }

    pub fn set_float(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        tuple_size: usize,
        values: Vec<f32>,
    ) -> TranslateResult<()> {
        self.write(name, owner, tuple_size, AttributeData::Float(values))
    }

    pub fn set_string(&mut self, name: &str, owner: AttributeOwner, values: Vec<String>) -> TranslateResult<()> {
        self.write(name, owner, 1, AttributeData::String(values))
    }

    pub fn set_string_array(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        values: Vec<String>,
        counts: Vec<usize>,
    ) -> TranslateResult<()> {
        self.write(name, owner, 1, AttributeData::StringArray { values, counts })
    }

    pub fn set_dictionary_array(
        &mut self,
        name: &str,
        owner: AttributeOwner,
        values: Vec<String>,
        counts: Vec<usize>,
    ) -> TranslateResult<()> {
        self.write(name, owner, 1, AttributeData::DictionaryArray { values, counts })
    }
}
