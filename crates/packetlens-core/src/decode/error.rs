use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

/// A packet label string that does not name a known protocol or endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized label '{0}'")]
pub struct LabelError(pub String);
