use thiserror::Error;

/// Errors returned when configuring a generator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("code length must be at least 1")]
    ZeroLength,
    #[error("alphabet must not be empty")]
    EmptyAlphabet,
}
