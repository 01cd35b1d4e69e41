use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("handshake configuration error: {0}")]
    Config(String),
}

pub type HandshakeResult<T> = Result<T, HandshakeError>;
