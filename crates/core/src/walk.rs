//! Directory walker
//!
//! Walks a local directory depth-first and yields every regular file (or
//! symlink to one) together with the object name it is uploaded under. Entries come out in directory
//! read order, which is platform dependent. The first walk error ends the
//! iteration.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::naming::{directory_prefix, nested_object_name};

/// A file found by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Local file path
    pub path: PathBuf,
    /// Remote object name
    pub object_name: String,
}

/// Lazy depth-first walk over the regular files of a directory
pub struct DirectoryWalk {
    root: PathBuf,
    prefix: String,
    entries: walkdir::IntoIter,
    done: bool,
}

impl DirectoryWalk {
    /// Start a walk of `dir`, naming objects under `prefix/<dir base name>/`
    pub fn new(dir: &Path, prefix: Option<&str>) -> Result<Self> {
        let metadata = std::fs::metadata(dir).map_err(|e| {
            Error::InvalidPath(format!("Cannot access directory {}: {e}", dir.display()))
        })?;
        if !metadata.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{} is not a directory, use the 'file' command to upload a file",
                dir.display()
            )));
        }

        let root = std::fs::canonicalize(dir)?;
        let base_name = root
            .file_name()
            .ok_or_else(|| {
                Error::InvalidPath(format!("{} has no directory name", root.display()))
            })?
            .to_string_lossy()
            .into_owned();

        let prefix = directory_prefix(prefix, &base_name);
        tracing::debug!(root = %root.display(), %prefix, "walking directory");

        Ok(Self {
            entries: WalkDir::new(&root).follow_links(false).into_iter(),
            root,
            prefix,
            done: false,
        })
    }

    /// Absolute path of the walked directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Prefix shared by every object name of this walk, ending in `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Iterator for DirectoryWalk {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                // Linked files are uploaded under the link's name; links are
                // never descended into
                match std::fs::metadata(entry.path()) {
                    Ok(target) if target.is_file() => {}
                    Ok(_) => continue,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(Error::InvalidPath(format!(
                            "Broken symlink {}: {e}",
                            entry.path().display()
                        ))));
                    }
                }
            } else if !file_type.is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => {
                    self.done = true;
                    return Some(Err(Error::General(format!(
                        "{} is outside of {}",
                        entry.path().display(),
                        self.root.display()
                    ))));
                }
            };

            let object_name = nested_object_name(&self.prefix, &relative.to_string_lossy());
            return Some(Ok(WalkEntry {
                path: entry.into_path(),
                object_name,
            }));
        }
    }
}
