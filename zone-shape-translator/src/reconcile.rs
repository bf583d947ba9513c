//! Matching decoded shapes against the previous generation of outputs.
use crate::shape::ZoneShape;
use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::log::debug;
use bevy::prelude::Component;
use std::collections::HashSet;

/// Split group a shape object was produced for.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SplitIdentity {
    pub split_value: String,
    /// The group lives in its own container.
    pub split_actor: bool,
}

impl SplitIdentity {
    pub fn new(split_value: impl Into<String>, split_actor: bool) -> Self {
        Self {
            split_value: split_value.into(),
            split_actor,
        }
    }
}

/// A shape object owned by the output, referenced by a non-owning handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneShapeOutput {
    pub handle: Option<Entity>,
    pub identity: SplitIdentity,
}

impl ZoneShapeOutput {
    pub fn can_reuse(&self, identity: &SplitIdentity) -> bool {
        self.identity == *identity
    }

    pub fn is_split_actor(&self) -> bool {
        self.identity.split_actor
    }

    pub fn split_value(&self) -> &str {
        &self.identity.split_value
    }

    /// True when the handle still names a live object.
    pub fn is_live<G: ObjectGraph + ?Sized>(&self, graph: &G) -> bool {
        self.handle.is_some_and(|handle| graph.find(handle))
    }

    pub fn destroy<G: ObjectGraph + ?Sized>(&self, graph: &mut G) {
        if let Some(handle) = self.handle {
            graph.destroy(handle);
        }
    }
}

/// Host-side store of shape objects.
pub trait ObjectGraph {
    /// Reuse `handle` when it is live, otherwise create a new object.
    fn create_or_reuse(&mut self, handle: Option<Entity>, identity: &SplitIdentity) -> Entity;

    fn destroy(&mut self, handle: Entity);

    fn find(&self, handle: Entity) -> bool;

    /// Replace the shape data held by `handle`.
    fn commit(&mut self, handle: Entity, shape: ZoneShape);
}

impl ObjectGraph for World {
    fn create_or_reuse(&mut self, handle: Option<Entity>, identity: &SplitIdentity) -> Entity {
        if let Some(handle) = handle {
            if let Ok(mut entity) = self.get_entity_mut(handle) {
                entity.insert(identity.clone());
                return handle;
            }
        }
        self.spawn(identity.clone()).id()
    }

    fn destroy(&mut self, handle: Entity) {
        if self.entities().contains(handle) {
            self.despawn(handle);
        }
    }

    fn find(&self, handle: Entity) -> bool {
        self.entities().contains(handle)
    }

    fn commit(&mut self, handle: Entity, shape: ZoneShape) {
        if let Ok(mut entity) = self.get_entity_mut(handle) {
            entity.insert(shape);
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// The output collection to store for the next run.
    pub outputs: Vec<ZoneShapeOutput>,
    /// Handles written during this run, in placement order.
    pub changed: Vec<Entity>,
    pub destroyed: usize,
}

/// Working state of one reconciliation.
///
/// Candidates are previous outputs that new shapes may take over; each is
/// taken at most once. Whatever is left when [`Reconciler::finish`] runs is
/// destroyed, along with outputs whose group was removed.
#[derive(Debug, Default)]
pub struct Reconciler {
    candidates: Vec<ZoneShapeOutput>,
    removed: Vec<ZoneShapeOutput>,
    outputs: Vec<ZoneShapeOutput>,
    changed: Vec<Entity>,
}

impl Reconciler {
    /// Every live previous output becomes a reuse candidate.
    pub fn full_replacement<G: ObjectGraph + ?Sized>(previous: Vec<ZoneShapeOutput>, graph: &G) -> Self {
        let total = previous.len();
        let candidates: Vec<_> = previous.into_iter().filter(|output| output.is_live(graph)).collect();
        if candidates.len() != total {
            debug!("[ZONE] Dropped {} outputs whose objects no longer exist", total - candidates.len());
        }
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// Outputs in `removed_values` are destroyed, outputs in `modified_values`
    /// become reuse candidates and every other live output is kept as is.
    pub fn partial_update<G: ObjectGraph + ?Sized>(
        previous: Vec<ZoneShapeOutput>,
        modified_values: &HashSet<String>,
        removed_values: &HashSet<String>,
        graph: &G,
    ) -> Self {
        let mut reconciler = Self::default();
        for output in previous {
            if !output.is_live(graph) {
                continue;
            }
            if removed_values.contains(output.split_value()) {
                reconciler.removed.push(output);
            } else if modified_values.contains(output.split_value()) {
                reconciler.candidates.push(output);
            } else {
                reconciler.outputs.push(output);
            }
        }
        reconciler
    }

    /// Remove and return the first candidate with `identity`.
    pub fn take_match(&mut self, identity: &SplitIdentity) -> Option<ZoneShapeOutput> {
        let index = self.candidates.iter().position(|output| output.can_reuse(identity))?;
        Some(self.candidates.remove(index))
    }

    /// Place `shape` on a matching previous object, or on a new one.
    pub fn place<G: ObjectGraph + ?Sized>(&mut self, graph: &mut G, identity: SplitIdentity, shape: ZoneShape) -> Entity {
        let previous = self.take_match(&identity).and_then(|output| output.handle);
        let handle = graph.create_or_reuse(previous, &identity);
        graph.commit(handle, shape);

        self.outputs.push(ZoneShapeOutput {
            handle: Some(handle),
            identity,
        });
        self.changed.push(handle);
        handle
    }

    pub fn candidates(&self) -> &[ZoneShapeOutput] {
        &self.candidates
    }

    /// Destroy unmatched candidates and removed outputs.
    pub fn finish<G: ObjectGraph + ?Sized>(self, graph: &mut G) -> Reconciled {
        let mut destroyed = 0;
        for output in self.candidates.iter().chain(&self.removed) {
            output.destroy(graph);
            destroyed += 1;
        }
        Reconciled {
            outputs: self.outputs,
            changed: self.changed,
            destroyed,
        }
    }
}
