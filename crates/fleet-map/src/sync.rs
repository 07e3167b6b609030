//! Incremental marker synchronization.
//!
//! Each telemetry snapshot yields a full list of descriptors, but the map
//! engine only receives what changed since the previous pass, keyed by
//! vehicle id.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use fleet_core::VehicleId;

use crate::projector::MarkerDescriptor;

/// Changes between two marker sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerDiff {
    /// New ids, in input order.
    pub added: Vec<MarkerDescriptor>,
    /// Existing ids whose descriptor changed, in input order.
    pub updated: Vec<MarkerDescriptor>,
    /// Ids no longer present, sorted.
    pub removed: Vec<VehicleId>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Markers currently applied to the engine.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: HashMap<VehicleId, MarkerDescriptor>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, id: &VehicleId) -> Option<&MarkerDescriptor> {
        self.markers.get(id)
    }

    /// Replace the set with `next` and return what changed.
    ///
    /// If `next` repeats an id, the last descriptor wins.
    pub fn reconcile(&mut self, next: Vec<MarkerDescriptor>) -> MarkerDiff {
        let mut seen: HashSet<VehicleId> = HashSet::with_capacity(next.len());
        let mut latest: Vec<MarkerDescriptor> = Vec::with_capacity(next.len());

        for marker in next.into_iter().rev() {
            if seen.insert(marker.id.clone()) {
                latest.push(marker);
            } else {
                warn!(vehicle = %marker.id, "Duplicate vehicle id in snapshot, keeping last record");
            }
        }
        latest.reverse();

        let mut diff = MarkerDiff::default();
        let mut removed: Vec<VehicleId> = self
            .markers
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();
        removed.sort();
        for id in &removed {
            self.markers.remove(id);
        }
        diff.removed = removed;

        for marker in latest {
            match self.markers.get(&marker.id) {
                None => {
                    self.markers.insert(marker.id.clone(), marker.clone());
                    diff.added.push(marker);
                }
                Some(current) if *current != marker => {
                    self.markers.insert(marker.id.clone(), marker.clone());
                    diff.updated.push(marker);
                }
                Some(_) => {}
            }
        }

        diff
    }

    /// Empty the set, returning every id that was present (sorted).
    pub fn clear(&mut self) -> Vec<VehicleId> {
        let mut ids: Vec<_> = self.markers.drain().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }
}
