//! Profiles behind a single printed code.
//!
//! An owner keeps several profiles (website, email, phone, WhatsApp,
//! brochure, vCard) and marks at most one of them active. Scanning the
//! owner's public code resolves to that active profile and to the action
//! it stands for.

use std::sync::Once;

pub mod action;
pub mod atomic;
pub mod config;
pub mod errors;
pub mod id;
pub mod manager;
pub mod profile;
pub mod resolver;
pub mod scan;
pub mod storage;
pub mod vcard;

pub use action::{Action, ActionHandler, Effect};
pub use config::Config;
pub use errors::{ProfileError, Result};
pub use id::{OwnerId, ProfileId, PublicCode};
pub use manager::ProfileSetManager;
pub use profile::{Payload, Profile, ProfileChanges, ProfileType};
pub use resolver::ProfileResolver;
pub use scan::{ScanLink, ScanOutcome, Scanner};
pub use storage::{CodeStore, FileStore, MemoryStore, ProfileStore};
pub use vcard::ContactCard;

// Folder inside the storage root holding the versioned snapshots
pub const SNAPSHOT_FOLDER: &str = "snapshots";
pub const CONFIG_FILE: &str = "qr-profiles.json";

static INIT: Once = Once::new();

/// Set up logging once per process. Used by tests and benches;
/// binaries install their own logger.
pub fn initialize() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
        log::info!("Initializing qr-profiles");
    });
}
