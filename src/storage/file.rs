use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{
    check_code_unique, CodeFilter, CodeRecord, CodeStore, Order, ProfileFilter,
    ProfileStore,
};
use crate::atomic::{load_json, modify_json, AtomicFile};
use crate::id::{ProfileId, PublicCode};
use crate::profile::{Profile, ProfileChanges};
use crate::{ProfileError, Result, SNAPSHOT_FOLDER};

const STORAGE_VERSION: i32 = 1;

/// Everything the store persists, written as one JSON document.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: i32,
    profiles: BTreeMap<ProfileId, Profile>,
    codes: BTreeMap<PublicCode, CodeRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            profiles: BTreeMap::new(),
            codes: BTreeMap::new(),
        }
    }
}

/// Store persisted under a directory as versioned JSON snapshots.
///
/// Each mutation rewrites the whole snapshot through [`AtomicFile`], so a
/// batch is committed in one step and readers never see half of it.
pub struct FileStore {
    label: String,
    root: PathBuf,
    file: AtomicFile,
}

impl FileStore {
    /// Open (or create) a store under `root` with a diagnostic label.
    pub fn new(label: String, root: &Path) -> Result<Self> {
        let file = AtomicFile::new(root.join(SNAPSHOT_FOLDER), &label)?;
        log::info!("{} opened at {}", label, root.display());
        Ok(Self {
            label,
            root: root.to_path_buf(),
            file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn verify_version(&self, snapshot: &Snapshot) -> Result<()> {
        match snapshot.version.cmp(&STORAGE_VERSION) {
            std::cmp::Ordering::Equal => Ok(()),
            std::cmp::Ordering::Less => Err(ProfileError::Storage(
                self.label.clone(),
                "Storage format is older than the app".to_owned(),
            )),
            std::cmp::Ordering::Greater => Err(ProfileError::Storage(
                self.label.clone(),
                "Storage format is newer than the app".to_owned(),
            )),
        }
    }

    fn read<R>(&self, reader: impl FnOnce(&Snapshot) -> R) -> Result<R> {
        let snapshot: Snapshot = load_json(&self.file)?.unwrap_or_default();
        self.verify_version(&snapshot)?;
        Ok(reader(&snapshot))
    }

    fn modify<R>(
        &self,
        mut operator: impl FnMut(&mut Snapshot) -> Result<R>,
    ) -> Result<R> {
        modify_json(&self.file, |snapshot: &mut Snapshot| {
            self.verify_version(snapshot)?;
            operator(snapshot)
        })
    }
}

impl ProfileStore for FileStore {
    fn insert(&self, profile: Profile) -> Result<()> {
        self.modify(|snapshot| {
            if snapshot.profiles.contains_key(&profile.id) {
                return Err(ProfileError::Storage(
                    self.label.clone(),
                    format!("profile {} already exists", profile.id),
                ));
            }
            snapshot
                .profiles
                .insert(profile.id, profile.clone());
            Ok(())
        })?;
        log::info!("{} profile {} has been written", self.label, profile.id);
        Ok(())
    }

    fn update(
        &self,
        id: &ProfileId,
        changes: ProfileChanges,
    ) -> Result<Profile> {
        self.modify(|snapshot| {
            let profile = snapshot
                .profiles
                .get_mut(id)
                .ok_or(ProfileError::NotFound(*id))?;
            changes.apply_to(profile, Utc::now())?;
            Ok(profile.clone())
        })
    }

    fn update_batch(
        &self,
        batch: Vec<(ProfileId, ProfileChanges)>,
    ) -> Result<()> {
        self.modify(|snapshot| {
            let now = Utc::now();
            for (id, changes) in &batch {
                let profile = snapshot
                    .profiles
                    .get_mut(id)
                    .ok_or(ProfileError::NotFound(*id))?;
                changes.apply_to(profile, now)?;
            }
            Ok(())
        })?;
        log::info!(
            "{} {} profiles have been updated",
            self.label,
            batch.len()
        );
        Ok(())
    }

    fn delete(&self, id: &ProfileId) -> Result<()> {
        self.modify(|snapshot| {
            snapshot
                .profiles
                .remove(id)
                .map(|_| ())
                .ok_or(ProfileError::NotFound(*id))
        })
    }

    fn query(
        &self,
        filter: &ProfileFilter,
        order: Order,
    ) -> Result<Vec<Profile>> {
        let mut found = self.read(|snapshot| {
            snapshot
                .profiles
                .values()
                .filter(|profile| filter.matches(profile))
                .cloned()
                .collect::<Vec<_>>()
        })?;
        log::trace!("{} query matched {} profiles", self.label, found.len());
        order.sort(&mut found);
        Ok(found)
    }
}

impl CodeStore for FileStore {
    fn insert_code(&self, record: CodeRecord) -> Result<()> {
        self.modify(|snapshot| {
            check_code_unique(&self.label, snapshot.codes.values(), &record)?;
            snapshot
                .codes
                .insert(record.code.clone(), record.clone());
            Ok(())
        })
    }

    fn query_codes(&self, filter: &CodeFilter) -> Result<Vec<CodeRecord>> {
        self.read(|snapshot| {
            snapshot
                .codes
                .values()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect()
        })
    }
}
