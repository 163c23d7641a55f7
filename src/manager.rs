use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::id::{OwnerId, ProfileId, PublicCode};
use crate::profile::{Payload, Profile, ProfileChanges, ProfileType};
use crate::storage::{
    CodeFilter, CodeRecord, CodeStore, Order, ProfileFilter, ProfileStore,
};
use crate::{ProfileError, Result};

const CODE_ATTEMPTS: usize = 3;

/// Owner-facing operations on a set of profiles.
///
/// All mutations go through one writer lock, and activation is written as a
/// single batch (deactivations first, then the target), so at no point can
/// a reader find two active profiles for the same owner.
pub struct ProfileSetManager<S> {
    store: Arc<S>,
    writer: Mutex<()>,
}

impl<S> ProfileSetManager<S>
where
    S: ProfileStore + CodeStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer.lock().map_err(|_| {
            ProfileError::Storage(
                "manager".to_owned(),
                "writer lock poisoned".to_owned(),
            )
        })
    }

    /// Create an inactive profile after checking its name and payload.
    pub fn create(
        &self,
        owner_id: &OwnerId,
        name: &str,
        kind: ProfileType,
        payload: Payload,
    ) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::validation("profile name is required"));
        }
        if payload.kind() != kind {
            return Err(ProfileError::validation(format!(
                "payload of a {} profile was given for type {}",
                payload.kind(),
                kind
            )));
        }
        payload.validate()?;

        let now = Utc::now();
        let profile = Profile {
            id: ProfileId::generate(),
            owner_id: owner_id.clone(),
            name: name.to_owned(),
            active: false,
            payload,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.lock()?;
        self.store.insert(profile.clone())?;
        log::info!(
            "created {} profile {} for {}",
            profile.kind(),
            profile.id,
            owner_id
        );
        Ok(profile)
    }

    /// Same as [`create`](Self::create), from a type name and flat form
    /// fields.
    pub fn create_from_fields(
        &self,
        owner_id: &OwnerId,
        name: &str,
        kind: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<Profile> {
        let kind: ProfileType = kind.parse()?;
        self.create(owner_id, name, kind, Payload::from_fields(kind, fields))
    }

    pub fn get(&self, id: &ProfileId) -> Result<Profile> {
        self.store
            .query(&ProfileFilter::id(*id), Order::default())?
            .into_iter()
            .next()
            .ok_or(ProfileError::NotFound(*id))
    }

    /// Mark a profile active or inactive.
    ///
    /// Activating deactivates every other profile of the same owner in the
    /// same write. Deactivating touches only the target and may leave the
    /// owner without an active profile.
    pub fn set_active(&self, id: &ProfileId, desired: bool) -> Result<Profile> {
        let _guard = self.lock()?;
        let target = self.get(id)?;

        if !desired {
            let profile = self
                .store
                .update(id, ProfileChanges::active(false))?;
            log::info!("deactivated profile {}", id);
            return Ok(profile);
        }

        let others: Vec<ProfileId> = self
            .store
            .query(
                &ProfileFilter::active_of(&target.owner_id),
                Order::default(),
            )?
            .into_iter()
            .map(|profile| profile.id)
            .filter(|other| other != id)
            .collect();

        let mut batch: Vec<(ProfileId, ProfileChanges)> = others
            .iter()
            .map(|other| (*other, ProfileChanges::active(false)))
            .collect();
        batch.push((*id, ProfileChanges::active(true)));

        if let Err(e) = self.store.update_batch(batch) {
            return Err(self.activation_failed(&target, !others.is_empty(), e));
        }

        log::info!(
            "activated profile {} for {} ({} deactivated)",
            id,
            target.owner_id,
            others.len()
        );
        self.get(id)
    }

    /// Tell an interrupted activation apart from one that changed nothing.
    fn activation_failed(
        &self,
        target: &Profile,
        had_others: bool,
        error: ProfileError,
    ) -> ProfileError {
        if !had_others {
            return error;
        }
        let degraded = self
            .store
            .query(
                &ProfileFilter::active_of(&target.owner_id),
                Order::default(),
            )
            .map(|active| active.is_empty())
            .unwrap_or(false);
        if !degraded {
            return error;
        }
        log::error!(
            "{} has no active profile after a failed activation of {}",
            target.owner_id,
            target.id
        );
        ProfileError::ActivationInterrupted {
            owner: target.owner_id.clone(),
            profile: target.id,
            source: Box::new(error),
        }
    }

    /// Change the name and/or payload. The payload must keep the type.
    pub fn edit(
        &self,
        id: &ProfileId,
        name: Option<String>,
        payload: Option<Payload>,
    ) -> Result<Profile> {
        let name = match name {
            Some(name) if name.trim().is_empty() => {
                return Err(ProfileError::validation("profile name is required"))
            }
            Some(name) => Some(name.trim().to_owned()),
            None => None,
        };
        if let Some(payload) = &payload {
            payload.validate()?;
        }

        let changes = ProfileChanges {
            name,
            payload,
            active: None,
        };
        if changes.is_empty() {
            return self.get(id);
        }

        let _guard = self.lock()?;
        let profile = self.store.update(id, changes)?;
        log::info!("edited profile {}", id);
        Ok(profile)
    }

    /// Remove a profile for good. Deleting the active one leaves the owner
    /// with no active profile; nothing is promoted in its place.
    pub fn delete(&self, id: &ProfileId) -> Result<()> {
        let _guard = self.lock()?;
        self.store.delete(id)?;
        log::info!("deleted profile {}", id);
        Ok(())
    }

    /// All profiles of an owner, newest first.
    pub fn list(&self, owner_id: &OwnerId) -> Result<Vec<Profile>> {
        self.store
            .query(&ProfileFilter::owner(owner_id), Order::NewestFirst)
    }

    pub fn code_of(&self, owner_id: &OwnerId) -> Result<Option<PublicCode>> {
        Ok(self
            .store
            .query_codes(&CodeFilter::Owner(owner_id.clone()))?
            .into_iter()
            .next()
            .map(|record| record.code))
    }

    /// The owner's public code, created on first request.
    pub fn issue_code(&self, owner_id: &OwnerId) -> Result<PublicCode> {
        let _guard = self.lock()?;
        if let Some(code) = self.code_of(owner_id)? {
            return Ok(code);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let record = CodeRecord {
                code: PublicCode::generate(),
                owner_id: owner_id.clone(),
                created_at: Utc::now(),
            };
            match self.store.insert_code(record.clone()) {
                Ok(()) => {
                    log::info!("issued code {} for {}", record.code, owner_id);
                    return Ok(record.code);
                }
                Err(e) if attempt < CODE_ATTEMPTS => {
                    log::warn!("code {} rejected: {}", record.code, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{EmailPayload, PhonePayload};
    use crate::storage::MemoryStore;

    fn manager() -> ProfileSetManager<MemoryStore> {
        ProfileSetManager::new(Arc::new(MemoryStore::new()))
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn email(address: &str) -> Payload {
        Payload::Email(EmailPayload {
            address: address.to_owned(),
        })
    }

    #[test]
    fn create_email_profile() {
        let manager = manager();
        let profile = manager
            .create(
                &owner("alice"),
                "Work",
                ProfileType::Email,
                email("a@b.com"),
            )
            .unwrap();
        assert!(!profile.active);
        assert_eq!(profile.kind(), ProfileType::Email);
        assert_eq!(manager.get(&profile.id).unwrap(), profile);
    }

    #[test]
    fn create_email_without_address_fails() {
        let manager = manager();
        let result = manager.create(
            &owner("alice"),
            "Work",
            ProfileType::Email,
            email(""),
        );
        assert!(matches!(result, Err(ProfileError::Validation(_))));
        assert!(manager.list(&owner("alice")).unwrap().is_empty());
    }

    #[test]
    fn create_requires_name() {
        let manager = manager();
        let result = manager.create(
            &owner("alice"),
            "   ",
            ProfileType::Email,
            email("a@b.com"),
        );
        assert!(matches!(result, Err(ProfileError::Validation(_))));
    }

    #[test]
    fn create_rejects_mismatched_payload() {
        let manager = manager();
        let result = manager.create(
            &owner("alice"),
            "Work",
            ProfileType::Phone,
            email("a@b.com"),
        );
        assert!(matches!(result, Err(ProfileError::Validation(_))));
    }

    #[test]
    fn create_from_fields_rejects_unknown_type() {
        let manager = manager();
        let result = manager.create_from_fields(
            &owner("alice"),
            "Fax",
            "fax",
            &BTreeMap::new(),
        );
        assert!(matches!(result, Err(ProfileError::Validation(_))));
    }

    #[test]
    fn activation_switches_profiles() {
        let manager = manager();
        let alice = owner("alice");
        let p = manager
            .create(&alice, "P", ProfileType::Email, email("p@x.com"))
            .unwrap();
        let q = manager
            .create(&alice, "Q", ProfileType::Email, email("q@x.com"))
            .unwrap();

        assert!(manager.set_active(&p.id, true).unwrap().active);
        assert!(manager.set_active(&q.id, true).unwrap().active);

        assert!(!manager.get(&p.id).unwrap().active);
        assert!(manager.get(&q.id).unwrap().active);
    }

    #[test]
    fn activation_leaves_other_owners_alone() {
        let manager = manager();
        let a = manager
            .create(&owner("alice"), "A", ProfileType::Email, email("a@x.com"))
            .unwrap();
        let b = manager
            .create(&owner("bob"), "B", ProfileType::Email, email("b@x.com"))
            .unwrap();

        manager.set_active(&a.id, true).unwrap();
        manager.set_active(&b.id, true).unwrap();
        assert!(manager.get(&a.id).unwrap().active);
        assert!(manager.get(&b.id).unwrap().active);
    }

    #[test]
    fn deactivation_touches_only_the_target() {
        let manager = manager();
        let alice = owner("alice");
        let p = manager
            .create(&alice, "P", ProfileType::Email, email("p@x.com"))
            .unwrap();
        manager.set_active(&p.id, true).unwrap();

        let p = manager.set_active(&p.id, false).unwrap();
        assert!(!p.active);
        assert!(manager
            .list(&alice)
            .unwrap()
            .iter()
            .all(|profile| !profile.active));
    }

    #[test]
    fn set_active_on_missing_profile() {
        let manager = manager();
        let id = ProfileId::generate();
        assert!(matches!(
            manager.set_active(&id, true),
            Err(ProfileError::NotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn delete_missing_profile() {
        let manager = manager();
        assert!(matches!(
            manager.delete(&ProfileId::generate()),
            Err(ProfileError::NotFound(_))
        ));
    }

    #[test]
    fn list_is_newest_first() {
        let manager = manager();
        let alice = owner("alice");
        let first = manager
            .create(&alice, "First", ProfileType::Email, email("1@x.com"))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = manager
            .create(&alice, "Second", ProfileType::Email, email("2@x.com"))
            .unwrap();
        manager
            .create(
                &owner("bob"),
                "Other",
                ProfileType::Email,
                email("3@x.com"),
            )
            .unwrap();

        let ids: Vec<_> = manager
            .list(&alice)
            .unwrap()
            .into_iter()
            .map(|profile| profile.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn edit_keeps_type() {
        let manager = manager();
        let profile = manager
            .create(
                &owner("alice"),
                "Work",
                ProfileType::Email,
                email("a@b.com"),
            )
            .unwrap();

        let edited = manager
            .edit(
                &profile.id,
                Some("Office".to_owned()),
                Some(email("c@d.com")),
            )
            .unwrap();
        assert_eq!(edited.name, "Office");
        assert_eq!(edited.payload, email("c@d.com"));
        assert_eq!(edited.created_at, profile.created_at);

        let phone = Payload::Phone(PhonePayload {
            number: "123".to_owned(),
        });
        assert!(matches!(
            manager.edit(&profile.id, None, Some(phone)),
            Err(ProfileError::Validation(_))
        ));
        assert!(matches!(
            manager.edit(&profile.id, Some(" ".to_owned()), None),
            Err(ProfileError::Validation(_))
        ));
    }

    #[test]
    fn issue_code_is_stable() {
        let manager = manager();
        let alice = owner("alice");
        assert_eq!(manager.code_of(&alice).unwrap(), None);

        let code = manager.issue_code(&alice).unwrap();
        assert_eq!(manager.issue_code(&alice).unwrap(), code);
        assert_eq!(manager.code_of(&alice).unwrap(), Some(code.clone()));
        assert_ne!(manager.issue_code(&owner("bob")).unwrap(), code);
    }
}
