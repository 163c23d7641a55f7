use qr_profiles::ProfileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InlineFieldParseError {
    #[error("Invalid field: expected key=value, got '{0}'")]
    InvalidKeyValPair(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Couldn't load config: {0}")]
    ConfigLoadError(String),

    #[error("Could not open storage: {0}")]
    StorageOpenError(String),

    #[error("Owner was not provided (use --owner)")]
    OwnerMissing,

    #[error("Failed to save contact card: {0}")]
    CardSaveError(String),

    #[error(transparent)]
    ProfileError(#[from] ProfileError),
}
