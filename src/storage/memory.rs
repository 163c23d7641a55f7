use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{
    check_code_unique, CodeFilter, CodeRecord, CodeStore, Order, ProfileFilter,
    ProfileStore,
};
use crate::id::{ProfileId, PublicCode};
use crate::profile::{Profile, ProfileChanges};
use crate::{ProfileError, Result};

const LABEL: &str = "memory";

#[derive(Default)]
struct Tables {
    profiles: BTreeMap<ProfileId, Profile>,
    codes: BTreeMap<PublicCode, CodeRecord>,
}

/// Process-local store. Every call holds the table lock for its whole
/// duration, so a batch update is observed either fully or not at all.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> ProfileError {
    ProfileError::Storage(LABEL.to_owned(), "lock poisoned".to_owned())
}

impl ProfileStore for MemoryStore {
    fn insert(&self, profile: Profile) -> Result<()> {
        let mut tables = self.write()?;
        if tables.profiles.contains_key(&profile.id) {
            return Err(ProfileError::Storage(
                LABEL.to_owned(),
                format!("profile {} already exists", profile.id),
            ));
        }
        log::trace!("inserting profile {}", profile.id);
        tables.profiles.insert(profile.id, profile);
        Ok(())
    }

    fn update(
        &self,
        id: &ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile> {
        let mut tables = self.write()?;
        let profile = tables
            .profiles
            .get_mut(id)
            .ok_or(ProfileError::NotFound(*id))?;
        changes.apply_to(profile, Utc::now())?;
        Ok(profile.clone())
    }

    fn update_batch(
        &self,
        batch: Vec<(ProfileId, ProfileChanges)>,
    ) -> Result<()> {
        let mut tables = self.write()?;
        let now = Utc::now();

        // Work on copies so a failing step leaves the table untouched.
        let mut staged = Vec::with_capacity(batch.len());
        for (id, changes) in &batch {
            let mut profile = tables
                .profiles
                .get(id)
                .cloned()
                .ok_or(ProfileError::NotFound(*id))?;
            changes.apply_to(&mut profile, now)?;
            staged.push(profile);
        }
        for profile in staged {
            tables.profiles.insert(profile.id, profile);
        }
        Ok(())
    }

    fn delete(&self, id: &ProfileId) -> Result<()> {
        self.write()?
            .profiles
            .remove(id)
            .map(|_| ())
            .ok_or(ProfileError::NotFound(*id))
    }

    fn query(
        &self,
        filter: &ProfileFilter,
        order: Order,
    ) -> Result<Vec<Profile>> {
        let tables = self.read()?;
        let mut found: Vec<Profile> = match filter.id {
            Some(id) => tables
                .profiles
                .get(&id)
                .filter(|profile| filter.matches(profile))
                .cloned()
                .into_iter()
                .collect(),
            None => tables
                .profiles
                .values()
                .filter(|profile| filter.matches(profile))
                .cloned()
                .collect(),
        };
        order.sort(&mut found);
        Ok(found)
    }
}

impl CodeStore for MemoryStore {
    fn insert_code(&self, record: CodeRecord) -> Result<()> {
        let mut tables = self.write()?;
        check_code_unique(LABEL, tables.codes.values(), &record)?;
        tables.codes.insert(record.code.clone(), record);
        Ok(())
    }

    fn query_codes(&self, filter: &CodeFilter) -> Result<Vec<CodeRecord>> {
        let tables = self.read()?;
        Ok(tables
            .codes
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}
