//! Vault writer.
//!
//! Notes land in `<vault>/<YYYY-MM>[/<subfolder>]/<slug>.md`. The filename is
//! resolved against the live directory and the file is created only if it
//! does not exist yet; losing that race to another writer re-resolves the
//! name, up to [`MAX_WRITE_ATTEMPTS`] times.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::naming::{
    resolve_collision, CollisionPolicy, DirectoryNames, FilenameCandidate, FilenameResolution,
};

/// Re-resolution attempts after losing a create race.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// A note that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenNote {
    pub path: PathBuf,
    pub resolution: FilenameResolution,
}

/// Root directory of an Obsidian vault.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open an existing vault directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Configuration(format!(
                "vault path {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a note captured at `captured_at` belongs in.
    #[must_use]
    pub fn target_dir(&self, captured_at: DateTime<Utc>, subfolder: Option<&str>) -> PathBuf {
        let dated = self.root.join(captured_at.format("%Y-%m").to_string());
        match subfolder.map(str::trim).filter(|s| !s.is_empty()) {
            Some(subfolder) => dated.join(subfolder),
            None => dated,
        }
    }

    /// Write `contents` under `dir`, creating the directory if needed.
    pub fn write_note(
        &self,
        dir: &Path,
        candidate: &FilenameCandidate,
        policy: CollisionPolicy,
        contents: &str,
    ) -> Result<WrittenNote> {
        fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let names = DirectoryNames::new(dir);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let resolution = resolve_collision(candidate, &names, policy);
            let path = dir.join(&resolution.filename);

            match create_file(&path, policy, contents) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "wrote note");
                    return Ok(WrittenNote { path, resolution });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        path = %path.display(),
                        attempt,
                        "filename taken by a concurrent writer, resolving again"
                    );
                }
                Err(source) => return Err(Error::Write { path, source }),
            }
        }

        Err(Error::Write {
            path: dir.join(format!("{}.md", candidate.base)),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("no free filename after {MAX_WRITE_ATTEMPTS} attempts"),
            ),
        })
    }
}

fn create_file(path: &Path, policy: CollisionPolicy, contents: &str) -> io::Result<()> {
    let mut file = match policy {
        CollisionPolicy::Overwrite => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
        CollisionPolicy::Suffix => OpenOptions::new().write(true).create_new(true).open(path)?,
    };
    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    remove_on_error(path, written)
}

/// Delete a note whose contents could not be fully written, so the partial
/// file does not hold the name.
fn remove_on_error(path: &Path, result: io::Result<()>) -> io::Result<()> {
    if let Err(ref err) = result {
        tracing::warn!(path = %path.display(), error = %err, "removing partially written note");
        if let Err(remove_err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %remove_err, "could not remove partial note");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::FilenameSource;
    use chrono::TimeZone;

    fn candidate(base: &str) -> FilenameCandidate {
        FilenameCandidate {
            base: base.to_string(),
            source: FilenameSource::Title,
        }
    }

    #[test]
    fn test_failed_write_removes_partial_note() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("partial.md");
        fs::write(&path, "---\ntitle: cut off").unwrap();

        let result = remove_on_error(&path, Err(io::Error::other("disk full")));

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_successful_write_keeps_note() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("done.md");
        fs::write(&path, "complete").unwrap();

        assert!(remove_on_error(&path, Ok(())).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_target_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let vault = Vault::open(tmp.path()).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();

        assert_eq!(vault.target_dir(at, None), tmp.path().join("2024-03"));
        assert_eq!(
            vault.target_dir(at, Some("reading")),
            tmp.path().join("2024-03").join("reading")
        );
    }

    #[test]
    fn test_open_rejects_missing_dir() {
        assert!(matches!(
            Vault::open("/nonexistent/vault"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_write_suffixes_on_collision() {
        let tmp = tempfile::tempdir().unwrap();
        let vault = Vault::open(tmp.path()).unwrap();
        let dir = tmp.path().join("2024-03");

        let first = vault
            .write_note(&dir, &candidate("note"), CollisionPolicy::Suffix, "one")
            .unwrap();
        let second = vault
            .write_note(&dir, &candidate("note"), CollisionPolicy::Suffix, "two")
            .unwrap();

        assert_eq!(first.resolution.filename, "note.md");
        assert_eq!(second.resolution.filename, "note-1.md");
        assert_eq!(fs::read_to_string(&first.path).unwrap(), "one");
        assert_eq!(fs::read_to_string(&second.path).unwrap(), "two");
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let vault = Vault::open(tmp.path()).unwrap();
        let dir = tmp.path().to_path_buf();

        vault
            .write_note(&dir, &candidate("note"), CollisionPolicy::Suffix, "a much longer body")
            .unwrap();
        let written = vault
            .write_note(&dir, &candidate("note"), CollisionPolicy::Overwrite, "short")
            .unwrap();

        assert_eq!(written.resolution.filename, "note.md");
        assert_eq!(fs::read_to_string(written.path).unwrap(), "short");
    }
}
