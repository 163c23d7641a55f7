use thiserror::Error;

use crate::id::{OwnerId, ProfileId};

pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Profile not found: {0}")]
    NotFound(ProfileId),
    #[error("QR code not found: {0}")]
    CodeNotFound(String),
    #[error("No active profile found for owner {0}")]
    NoActiveProfile(OwnerId),
    #[error(
        "Activation of {profile} was interrupted after deactivating the \
         other profiles of {owner}: {source}"
    )]
    ActivationInterrupted {
        owner: OwnerId,
        profile: ProfileId,
        source: Box<ProfileError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parsing error")]
    Parse,
    #[error("Storage error: {0} {1}")]
    Storage(String, String),
}

impl ProfileError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for the kinds a scan can legitimately end with.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::CodeNotFound(_) | Self::NoActiveProfile(_)
        )
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<uuid::Error> for ProfileError {
    fn from(_: uuid::Error) -> Self {
        Self::Parse
    }
}

impl From<url::ParseError> for ProfileError {
    fn from(e: url::ParseError) -> Self {
        Self::Validation(format!("invalid URL: {}", e))
    }
}
