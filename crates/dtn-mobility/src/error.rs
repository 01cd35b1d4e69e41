use dtn_core::Position;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("movement to {0:?} would leave the simulation space")]
    OutOfBounds(Position),

    #[error("requested step of {requested:.3} exceeds model_speed_limit {limit:.3}")]
    SpeedLimitExceeded { requested: f32, limit: f32 },

    #[error("invalid movement pattern configuration: {0}")]
    InvalidPattern(String),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
