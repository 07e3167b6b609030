//! Motion state classification.
//!
//! The data source reports a free-form status token per vehicle. The widget
//! only knows three states, and anything it cannot recognise is shown as
//! offline so an unclassifiable vehicle never appears to be active.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current activity of a tracked vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Moving,
    Stopped,
    Offline,
}

impl MotionState {
    /// All states in legend/counter order.
    pub const ALL: [MotionState; 3] = [Self::Moving, Self::Stopped, Self::Offline];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Moving => "Moving",
            Self::Stopped => "Stopped",
            Self::Offline => "Offline",
        }
    }

    /// Machine key, also used as the metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moving => "moving",
            Self::Stopped => "stopped",
            Self::Offline => "offline",
        }
    }

    /// Position in [`MotionState::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Moving => 0,
            Self::Stopped => 1,
            Self::Offline => 2,
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn recognize(token: &str) -> Option<MotionState> {
    let token = token.trim();
    MotionState::ALL
        .into_iter()
        .find(|state| token.eq_ignore_ascii_case(state.as_str()))
}

/// Classify a raw status token.
///
/// Matching ignores surrounding whitespace and ASCII case. Missing, empty and
/// unknown tokens all classify as [`MotionState::Offline`].
pub fn classify(token: Option<&str>) -> MotionState {
    token.and_then(recognize).unwrap_or(MotionState::Offline)
}

/// Whether `token` names one of the known states.
pub fn is_recognized(token: Option<&str>) -> bool {
    token.and_then(recognize).is_some()
}
