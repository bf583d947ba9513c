//! Zone shape output: curve datasets in, host shape objects out.
use crate::attribute::{AttributeAccessor, AttributeOwner, AttributeStore};
use crate::error::TranslateResult;
use crate::lane::LaneProfileResolver;
use crate::partition::{CurvePartition, PartialOutputMode, read_partition};
use crate::reconcile::{ObjectGraph, Reconciler, ZoneShapeOutput};
use crate::registry::{RegistryContext, RegistryPersister};
use crate::shape::{DecodedCurve, decode_part};
use bevy::ecs::entity::Entity;
use bevy::log::info;
use constants::attributes::ATTRIB_OUTPUT_ZONE_SHAPE;
use std::collections::HashSet;

/// Summary of one output update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Objects created or rewritten, in placement order.
    pub changed_shapes: Vec<Entity>,
    pub destroyed_shapes: usize,
    /// The registry gained tags or profiles and was persisted.
    pub registry_modified: bool,
}

impl UpdateReport {
    /// The zone graph needs rebuilding.
    pub fn needs_rebuild(&self) -> bool {
        !self.changed_shapes.is_empty()
    }
}

/// Shape objects produced from zone shape curve datasets, kept across runs.
#[derive(Debug, Clone, Default)]
pub struct OutputZoneShape {
    outputs: Vec<ZoneShapeOutput>,
}

impl OutputZoneShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> &[ZoneShapeOutput] {
        &self.outputs
    }

    /// A dataset is zone shape output when its detail flag is non-zero.
    pub fn is_valid_part<S: AttributeStore + ?Sized>(store: &S) -> TranslateResult<bool> {
        let accessor = AttributeAccessor::new(store)?;
        if !accessor.exists(ATTRIB_OUTPUT_ZONE_SHAPE, AttributeOwner::Detail) {
            return Ok(false);
        }
        let flags = accessor.get_enum(ATTRIB_OUTPUT_ZONE_SHAPE, Some(AttributeOwner::Detail), |text| {
            text.trim().parse().unwrap_or(0)
        })?;
        Ok(flags.first().is_some_and(|flag| *flag != 0))
    }

    /// Translate `parts` into shape objects.
    ///
    /// Every dataset is decoded before anything is written, so a failing
    /// dataset leaves the object graph untouched. The registry is flushed
    /// once, before the object graph changes.
    pub fn update<S, G, P>(
        &mut self,
        parts: &[&S],
        ctx: &mut RegistryContext<'_>,
        graph: &mut G,
        persister: &mut P,
    ) -> TranslateResult<UpdateReport>
    where
        S: AttributeStore + ?Sized,
        G: ObjectGraph + ?Sized,
        P: RegistryPersister + ?Sized,
    {
        let mut partitions = Vec::with_capacity(parts.len());
        for part in parts {
            let accessor = AttributeAccessor::new(*part)?;
            partitions.push(read_partition(&accessor)?);
        }
        let partial_update = partitions.iter().any(|partition| partition.partial_update);

        let mut resolver = LaneProfileResolver::new(ctx.settings());
        let mut decoded: Vec<DecodedCurve> = Vec::new();
        for (part, partition) in parts.iter().zip(&partitions) {
            let accessor = AttributeAccessor::new(*part)?;
            decoded.extend(decode_part(&accessor, partition, ctx, &mut resolver)?);
        }

        let registry_modified = ctx.flush(persister)?;

        let previous = std::mem::take(&mut self.outputs);
        let mut reconciler = if partial_update {
            let (modified, removed) = split_value_sets(&partitions);
            Reconciler::partial_update(previous, &modified, &removed, graph)
        } else {
            Reconciler::full_replacement(previous, graph)
        };

        for curve in decoded {
            reconciler.place(graph, curve.identity, curve.shape);
        }
        let reconciled = reconciler.finish(graph);
        self.outputs = reconciled.outputs;

        let report = UpdateReport {
            changed_shapes: reconciled.changed,
            destroyed_shapes: reconciled.destroyed,
            registry_modified,
        };
        if report.needs_rebuild() {
            info!(
                "[ZONE] {} zone shapes updated, {} destroyed. Rebuild the zone graph",
                report.changed_shapes.len(),
                report.destroyed_shapes
            );
        }
        Ok(report)
    }

    /// Destroy every shape object this output owns.
    pub fn destroy<G: ObjectGraph + ?Sized>(&mut self, graph: &mut G) {
        for output in self.outputs.drain(..) {
            output.destroy(graph);
        }
    }

    /// Add the split value of every output placed in its own container.
    pub fn collect_split_values(&self, split_values: &mut HashSet<String>) {
        for output in self.outputs.iter().filter(|output| output.is_split_actor()) {
            split_values.insert(output.split_value().to_string());
        }
    }
}

/// Split values of the groups to rewrite and of the groups to remove.
fn split_value_sets(partitions: &[CurvePartition]) -> (HashSet<String>, HashSet<String>) {
    let mut modified = HashSet::new();
    let mut removed = HashSet::new();
    for partition in partitions {
        removed.extend(partition.keys_with_mode(PartialOutputMode::Remove).map(str::to_string));
        modified.extend(
            partition
                .keys_with_mode(PartialOutputMode::Replace)
                .chain(partition.keys_with_mode(PartialOutputMode::Modify))
                .map(str::to_string),
        );
    }
    modified.retain(|key| !removed.contains(key));
    (modified, removed)
}
