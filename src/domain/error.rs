use thiserror::Error;

/// Message shown for every remote, transport or resolution failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to download. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least one YouTube URL")]
    MissingSource,

    #[error("Please enter at least one valid YouTube URL")]
    NoValidSource,

    #[error("Please select a quality option")]
    MissingQuality,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A download is already in progress")]
    Busy,

    #[error("Server responded with status {0}")]
    Remote(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not read response: {0}")]
    Resolution(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Save cancelled")]
    SaveCancelled,
}

impl AppError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Busy => self.to_string(),
            AppError::Remote(_) | AppError::Transport(_) | AppError::Resolution(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::Io(e) => format!("Failed to save file: {}", e),
            AppError::SaveCancelled => "Download cancelled".to_string(),
        }
    }
}
