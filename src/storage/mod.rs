//! Persistence seam of the crate.
//!
//! The manager and the resolver only see the two traits below, so any
//! engine offering insert/update/delete/query over profiles and public
//! codes can back them.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OwnerId, ProfileId, PublicCode};
use crate::profile::{Profile, ProfileChanges};
use crate::{ProfileError, Result};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Selection over the profile collection. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct ProfileFilter {
    pub id: Option<ProfileId>,
    pub owner_id: Option<OwnerId>,
    pub active: Option<bool>,
}

impl ProfileFilter {
    pub fn owner(owner_id: &OwnerId) -> Self {
        Self {
            owner_id: Some(owner_id.clone()),
            ..Default::default()
        }
    }

    pub fn active_of(owner_id: &OwnerId) -> Self {
        Self {
            owner_id: Some(owner_id.clone()),
            active: Some(true),
            ..Default::default()
        }
    }

    pub fn id(id: ProfileId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        self.id.map_or(true, |id| profile.id == id)
            && self
                .owner_id
                .as_ref()
                .map_or(true, |owner| &profile.owner_id == owner)
            && self
                .active
                .map_or(true, |active| profile.active == active)
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default)]
pub enum Order {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl Order {
    /// Sort by creation time; ties are broken by id to keep the order stable.
    pub fn sort(&self, profiles: &mut [Profile]) {
        profiles.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if *self == Order::NewestFirst {
            profiles.reverse();
        }
    }
}

/// Mapping from a public code to its owner.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecord {
    pub code: PublicCode,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub enum CodeFilter {
    Code(PublicCode),
    Owner(OwnerId),
}

impl CodeFilter {
    pub fn matches(&self, record: &CodeRecord) -> bool {
        match self {
            CodeFilter::Code(code) => &record.code == code,
            CodeFilter::Owner(owner) => &record.owner_id == owner,
        }
    }
}

pub trait ProfileStore: Send + Sync {
    /// Add a new profile. Fails if the id is already taken.
    fn insert(&self, profile: Profile) -> Result<()>;

    /// Apply a partial update and return the stored result.
    fn update(
        &self,
        id: &ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile>;

    /// Apply several updates as one unit.
    ///
    /// The default applies them one by one. When a step fails after others
    /// have gone through, the error is `ProfileError::Storage` naming how
    /// many were applied, so the caller can tell a partial write from an
    /// untouched store. Stores that can do better override this.
    fn update_batch(
        &self,
        batch: Vec<(ProfileId, ProfileChanges)>,
    ) -> Result<()> {
        let total = batch.len();
        for (applied, (id, changes)) in batch.into_iter().enumerate() {
            if let Err(e) = self.update(&id, changes) {
                if applied == 0 {
                    return Err(e);
                }
                return Err(ProfileError::Storage(
                    "batch".to_owned(),
                    format!("{} of {} updates applied: {}", applied, total, e),
                ));
            }
        }
        Ok(())
    }

    fn delete(&self, id: &ProfileId) -> Result<()>;

    fn query(
        &self,
        filter: &ProfileFilter,
        order: Order,
    ) -> Result<Vec<Profile>>;
}

pub trait CodeStore: Send + Sync {
    /// Add a code mapping. Fails if either the code or the owner already
    /// has one.
    fn insert_code(&self, record: CodeRecord) -> Result<()>;

    fn query_codes(&self, filter: &CodeFilter) -> Result<Vec<CodeRecord>>;
}

/// Reject a code record that would break the one-to-one mapping.
pub(crate) fn check_code_unique<'a>(
    label: &str,
    existing: impl IntoIterator<Item = &'a CodeRecord>,
    record: &CodeRecord,
) -> Result<()> {
    for other in existing {
        if other.code == record.code {
            return Err(ProfileError::Storage(
                label.to_owned(),
                format!("code {} is already assigned", record.code),
            ));
        }
        if other.owner_id == record.owner_id {
            return Err(ProfileError::Storage(
                label.to_owned(),
                format!("owner {} already has a code", record.owner_id),
            ));
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::phone_profile;
    use super::*;

    #[test]
    fn filter_combines_fields() {
        let mut profile = phone_profile("alice", 0);
        profile.active = true;
        let alice = OwnerId::new("alice").unwrap();
        let bob = OwnerId::new("bob").unwrap();

        assert!(ProfileFilter::default().matches(&profile));
        assert!(ProfileFilter::owner(&alice).matches(&profile));
        assert!(ProfileFilter::active_of(&alice).matches(&profile));
        assert!(!ProfileFilter::active_of(&bob).matches(&profile));
        assert!(!ProfileFilter::id(ProfileId::generate()).matches(&profile));
    }

    #[test]
    fn order_sorts_by_creation_time() {
        let old = phone_profile("alice", 30);
        let new = phone_profile("alice", 1);
        let mut profiles = vec![old.clone(), new.clone()];

        Order::NewestFirst.sort(&mut profiles);
        assert_eq!(profiles[0].id, new.id);

        Order::OldestFirst.sort(&mut profiles);
        assert_eq!(profiles[0].id, old.id);
    }

    #[test]
    fn code_uniqueness_checks_both_sides() {
        let record = |code: &str, owner: &str| CodeRecord {
            code: PublicCode::from(code),
            owner_id: OwnerId::new(owner).unwrap(),
            created_at: Utc::now(),
        };
        let existing = vec![record("abc", "alice")];

        let check = |code: &str, owner: &str| {
            check_code_unique("test", &existing, &record(code, owner))
        };

        assert!(check("def", "bob").is_ok());
        assert!(matches!(
            check("abc", "bob"),
            Err(ProfileError::Storage(_, message))
                if message.contains("code abc")
        ));
        assert!(matches!(
            check("def", "alice"),
            Err(ProfileError::Storage(_, message))
                if message.contains("owner alice")
        ));
    }
}
