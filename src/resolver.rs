use std::sync::Arc;

use crate::id::{OwnerId, PublicCode};
use crate::profile::Profile;
use crate::storage::{CodeFilter, CodeStore, Order, ProfileFilter, ProfileStore};
use crate::{ProfileError, Result};

/// Turns a scanned public code into the owner's active profile.
///
/// The lookup goes code → owner → active profile, so owners can switch
/// profiles without reprinting their code.
pub struct ProfileResolver<S> {
    store: Arc<S>,
}

impl<S> ProfileResolver<S>
where
    S: ProfileStore + CodeStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn owner_of(&self, code: &str) -> Result<OwnerId> {
        let code = code.trim();
        self.store
            .query_codes(&CodeFilter::Code(PublicCode::from(code)))?
            .into_iter()
            .next()
            .map(|record| record.owner_id)
            .ok_or_else(|| ProfileError::CodeNotFound(code.to_owned()))
    }

    pub fn resolve(&self, code: &str) -> Result<Profile> {
        let owner_id = self.owner_of(code)?;
        log::trace!("code {} belongs to {}", code, owner_id);

        let mut active = self
            .store
            .query(&ProfileFilter::active_of(&owner_id), Order::NewestFirst)?;
        if active.len() > 1 {
            // Only reachable if something wrote behind the manager's back.
            log::error!(
                "{} has {} active profiles, using the newest",
                owner_id,
                active.len()
            );
        }
        if active.is_empty() {
            return Err(ProfileError::NoActiveProfile(owner_id));
        }
        Ok(active.swap_remove(0))
    }
}
