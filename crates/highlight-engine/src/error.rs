use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Malformed analysis: {0}")]
    MalformedAnalysis(String),

    #[error("Invalid class code: {0}")]
    InvalidClassCode(String),

    #[error("Random source unavailable: {0}")]
    Randomness(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
