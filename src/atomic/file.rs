use std::fs::{self, File};
use std::io::{self, ErrorKind};
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Committed versions kept on disk after a commit.
const KEPT_VERSIONS: usize = 10;
const DRAFT_PREFIX: &str = ".draft-";

/// Uncommitted content, removed from disk when dropped.
pub struct Draft {
    file: File,
    path: PathBuf,
}

impl Draft {
    fn create_in(directory: &Path) -> io::Result<Self> {
        let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        let path = directory.join(format!("{DRAFT_PREFIX}{suffix}"));
        let file = File::create(&path)?;
        Ok(Self { file, path })
    }
}

impl io::Write for &Draft {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&self.file).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&self.file).flush()
    }
}

impl Drop for Draft {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// One committed snapshot. `number == 0` stands for "never written".
#[derive(Clone, Debug)]
pub struct Version {
    pub number: usize,
    pub path: PathBuf,
}

impl Version {
    pub fn open(&self) -> io::Result<Option<File>> {
        if self.number == 0 {
            return Ok(None);
        }
        File::open(&self.path).map(Some)
    }
}

/// A directory of numbered snapshots named `<dir>_<writer>.<number>`.
///
/// Commits go through a [`Draft`] that is hard-linked under the next
/// number. Linking fails when the name is taken, which makes the commit a
/// compare-and-swap; readers only ever open complete files.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AtomicFile {
    directory: PathBuf,
    prefix: String,
}

impl AtomicFile {
    pub fn new(path: impl Into<PathBuf>, writer: &str) -> io::Result<Self> {
        let directory = path.into();
        fs::create_dir_all(&directory)?;
        let Some(name) = directory.file_name().and_then(|name| name.to_str())
        else {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} has no usable directory name", directory.display()),
            ));
        };
        let prefix = format!("{name}_{writer}.");
        Ok(Self { directory, prefix })
    }

    /// All committed files, drafts excluded.
    fn versions(&self) -> io::Result<Vec<Version>> {
        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.directory)?.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(DRAFT_PREFIX) {
                continue;
            }
            if let Some(number) = version_number(name) {
                versions.push(Version {
                    number,
                    path: entry.path(),
                });
            }
        }
        Ok(versions)
    }

    fn is_own(&self, version: &Version) -> bool {
        version
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.starts_with(&self.prefix))
    }

    /// The newest committed version. Two writers can land on the same
    /// number; our own file wins the tie.
    pub fn load(&self) -> io::Result<Version> {
        let versions = self.versions()?;
        let newest = versions.iter().map(|v| v.number).max().unwrap_or(0);
        let mut candidates: Vec<Version> = versions
            .into_iter()
            .filter(|v| v.number == newest)
            .collect();

        if candidates.is_empty() {
            return Ok(Version {
                number: 0,
                path: self.path_of(0),
            });
        }
        if candidates.len() > 1 {
            log::warn!(
                "{} snapshots share version {}",
                candidates.len(),
                newest
            );
        }
        let chosen = candidates
            .iter()
            .position(|v| self.is_own(v))
            .unwrap_or(0);
        Ok(candidates.swap_remove(chosen))
    }

    pub fn draft(&self) -> io::Result<Draft> {
        Draft::create_in(&self.directory)
    }

    fn path_of(&self, number: usize) -> PathBuf {
        self.directory.join(format!("{}{number}", self.prefix))
    }

    /// Commit `draft` as the version right after `base`.
    ///
    /// Fails with `ErrorKind::AlreadyExists` when something newer than
    /// `base` was committed in the meantime.
    pub fn commit(&self, base: &Version, draft: Draft) -> io::Result<()> {
        draft.file.sync_data()?;
        let next = base.number + 1;
        let already_newer = self
            .versions()?
            .iter()
            .any(|v| v.number > base.number);
        if already_newer {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("version {} is no longer the latest", base.number),
            ));
        }

        if let Err(err) = fs::hard_link(&draft.path, self.path_of(next)) {
            // Some filesystems report a failure after creating the link.
            #[cfg(unix)]
            if draft.path.metadata()?.nlink() != 2 {
                return Err(err);
            }
            #[cfg(not(unix))]
            return Err(err);
        }

        let removed = self.prune(next);
        if removed > 0 {
            log::debug!("removed {} old snapshots", removed);
        }
        Ok(())
    }

    fn prune(&self, latest: usize) -> usize {
        let Ok(versions) = self.versions() else {
            return 0;
        };
        versions
            .into_iter()
            .filter(|v| v.number + KEPT_VERSIONS <= latest)
            .filter(|v| fs::remove_file(&v.path).is_ok())
            .count()
    }
}

fn version_number(file_name: &str) -> Option<usize> {
    let (_, number) = file_name.rsplit_once('.')?;
    number.parse().ok()
}
