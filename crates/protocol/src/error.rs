use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unknown discrete command token: {0:?}")]
    UnknownToken(String),
    #[error("axis reading {0} outside [-255, 255]")]
    AxisOutOfRange(i16),
}
