use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing configuration error: {0}")]
    Config(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
