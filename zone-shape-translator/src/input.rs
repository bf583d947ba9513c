//! Zone shape input: host shape objects uploaded as a curve dataset.
use crate::attribute::GeometryBuffer;
use crate::error::TranslateResult;
use crate::registry::ZoneGraphSettings;
use crate::shape::{ShapeUpload, encode_zone_shapes};
use bevy::log::info;
use uuid::Uuid;

/// Geometry engine session that owns input nodes.
pub trait EngineSession {
    /// Create an input node and return its id.
    fn create_node(&mut self, name: &str) -> TranslateResult<i32>;

    fn delete_node(&mut self, node_id: i32) -> TranslateResult<()>;

    /// Replace the geometry held by `node_id`.
    fn commit_geometry(&mut self, node_id: i32, geometry: &GeometryBuffer) -> TranslateResult<()>;
}

/// Input node fed from a set of zone shapes. The node is created on the
/// first upload and reused afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneShapeInput {
    node_id: Option<i32>,
}

impl ZoneShapeInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_id(&self) -> Option<i32> {
        self.node_id
    }

    /// Encode `shapes` and commit them to this input's node.
    pub fn upload<E: EngineSession + ?Sized>(
        &mut self,
        session: &mut E,
        owner_name: &str,
        shapes: &[ShapeUpload<'_>],
        settings: &ZoneGraphSettings,
    ) -> TranslateResult<i32> {
        let node_id = match self.node_id {
            Some(node_id) => node_id,
            None => {
                let name = node_name(owner_name);
                let node_id = session.create_node(&name)?;
                info!("[INPUT] Created input node {} ({})", name, node_id);
                self.node_id = Some(node_id);
                node_id
            }
        };

        let mut geometry = GeometryBuffer::default();
        let part = encode_zone_shapes(shapes, settings, &mut geometry)?;
        session.commit_geometry(node_id, &geometry)?;
        info!(
            "[INPUT] Uploaded {} zone shapes ({} points) to node {}",
            part.curve_count, part.point_count, node_id
        );
        Ok(node_id)
    }

    /// Delete the node, if one was created. The node id is kept when the
    /// session refuses the delete.
    pub fn destroy<E: EngineSession + ?Sized>(&mut self, session: &mut E) -> TranslateResult<()> {
        let Some(node_id) = self.node_id else {
            return Ok(());
        };
        session.delete_node(node_id)?;
        self.node_id = None;
        info!("[INPUT] Deleted input node {}", node_id);
        Ok(())
    }
}

fn node_name(owner_name: &str) -> String {
    format!("{}_zone_shape_{:08X}", owner_name, Uuid::new_v4().as_u128() as u32)
}
