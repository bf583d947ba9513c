//! Translation between geometry engine curve datasets and zone shapes.
//!
//! Curve datasets flagged as zone shape output are decoded into
//! [`ZoneShape`] components, deduplicating lane profiles and tags into the
//! shared [`ZoneGraphSettings`] registry. Zone shapes going the other way
//! are encoded into a curve dataset and committed to an engine input node.
pub mod attribute;
pub mod config;
pub mod error;
pub mod input;
pub mod lane;
pub mod output;
pub mod partition;
pub mod reconcile;
pub mod registry;
pub mod shape;

pub use attribute::{AttributeAccessor, AttributeOwner, AttributeStore, AttributeWriter, GeometryBuffer};
pub use config::TranslatorConfig;
pub use error::{TranslateError, TranslateResult};
pub use input::{EngineSession, ZoneShapeInput};
pub use output::{OutputZoneShape, UpdateReport};
pub use reconcile::{ObjectGraph, SplitIdentity, ZoneShapeOutput};
pub use registry::{JsonRegistryFile, RegistryContext, RegistryPersister, ZoneGraphSettings};
pub use shape::{ComponentTransform, ShapeKind, ShapePoint, ShapeUpload, ZoneShape};
