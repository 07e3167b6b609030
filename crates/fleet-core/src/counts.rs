//! Aggregate vehicle counters.

use serde::{Deserialize, Serialize};

use crate::status::MotionState;
use crate::types::VehicleTelemetry;

/// Fleet-wide counters shown in the widget's top overlay.
///
/// Always derived from a vehicle snapshot with [`count`]; buckets use the
/// classified state, so they agree with the markers and sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub total: usize,
    pub moving: usize,
    pub stopped: usize,
    pub offline: usize,
}

impl AggregateCounts {
    /// Count for one state.
    pub fn get(&self, state: MotionState) -> usize {
        match state {
            MotionState::Moving => self.moving,
            MotionState::Stopped => self.stopped,
            MotionState::Offline => self.offline,
        }
    }

    /// Buckets sum to the total.
    pub fn is_consistent(&self) -> bool {
        self.moving + self.stopped + self.offline == self.total
    }
}

/// Count vehicles per classified motion state.
pub fn count(vehicles: &[VehicleTelemetry]) -> AggregateCounts {
    vehicles.iter().fold(
        AggregateCounts {
            total: vehicles.len(),
            ..Default::default()
        },
        |mut counts, vehicle| {
            match vehicle.motion_state() {
                MotionState::Moving => counts.moving += 1,
                MotionState::Stopped => counts.stopped += 1,
                MotionState::Offline => counts.offline += 1,
            }
            counts
        },
    )
}
