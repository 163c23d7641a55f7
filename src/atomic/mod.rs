mod file;

use serde::{de::DeserializeOwned, Serialize};
use std::io::{BufReader, BufWriter, ErrorKind, Write};

pub use file::{AtomicFile, Draft, Version};

use crate::Result;

/// Load the latest JSON snapshot, or `None` before the first commit.
pub fn load_json<T: DeserializeOwned>(
    atomic_file: &AtomicFile,
) -> Result<Option<T>> {
    let latest = atomic_file.load()?;
    match latest.open()? {
        Some(file) => Ok(Some(serde_json::from_reader(BufReader::new(file))?)),
        None => Ok(None),
    }
}

/// Read-modify-write of a JSON snapshot.
///
/// `operator` runs against the latest committed value (or `T::default()`).
/// If it fails nothing is written. If another writer commits in between,
/// the whole cycle starts over on the fresher value.
pub fn modify_json<T, R>(
    atomic_file: &AtomicFile,
    mut operator: impl FnMut(&mut T) -> Result<R>,
) -> Result<R>
where
    T: Serialize + DeserializeOwned + Default,
{
    loop {
        let latest = atomic_file.load()?;
        let mut value = match latest.open()? {
            Some(file) => serde_json::from_reader(BufReader::new(file))?,
            None => T::default(),
        };
        let output = operator(&mut value)?;

        let draft = atomic_file.draft()?;
        let mut writer = BufWriter::new(&draft);
        serde_json::to_writer(&mut writer, &value)?;
        writer.flush()?;
        drop(writer);
        match atomic_file.commit(&latest, draft) {
            Ok(()) => return Ok(output),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                log::debug!("snapshot changed underneath, retrying");
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
