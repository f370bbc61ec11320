use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] sakiyomi_core::ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] sakiyomi_core::FetchError),

    #[error(transparent)]
    NoValidPrice(#[from] sakiyomi_core::NoValidPrice),

    #[error(transparent)]
    Browser(#[from] sakiyomi_core::BrowserError),

    #[error(transparent)]
    Submission(#[from] sakiyomi_core::StageFailure),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Fetch(_) => 3,
            Self::NoValidPrice(_) => 3,
            Self::Browser(_) => 4,
            Self::Submission(_) => 4,
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
