use thiserror::Error;

use crate::track::TrackError;

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("timestamp error: {0}")]
    Timestamp(#[from] TrackError),
    #[error("segment has no fixes")]
    EmptySegment,
}
