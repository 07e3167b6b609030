//! Map widget error types.

use fleet_core::MotionState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("Icon asset unavailable for {state}: {reason}")]
    IconAsset { state: MotionState, reason: String },
}

pub type MapResult<T> = Result<T, MapError>;
