//! Source file lookup by name.
//!
//! A source root is scanned once. Lookups then walk the scanned list in
//! depth-first order where the files of a directory come before its
//! sub-directories and siblings are sorted by name, so the first match is
//! the shallowest one in the first directory that holds it.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use gridstore_core::{GridError, GridResult};
use walkdir::{DirEntry, WalkDir};

/// Every file below a source root, in lookup order.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    root: PathBuf,
    files: Vec<PathBuf>,
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
}

impl DirectoryTree {
    pub fn scan(root: &Path) -> GridResult<Self> {
        if !root.is_dir() {
            return Err(GridError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source root {} is not a directory", root.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by(files_first) {
            let entry = entry.map_err(|e| GridError::Other(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        tracing::debug!(root = %root.display(), files = files.len(), "scanned source root");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// First file whose name equals `name`.
    pub fn locate(&self, name: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|path| path.file_name().is_some_and(|f| f == name))
            .map(PathBuf::as_path)
    }

    /// Like [`locate`](Self::locate), but a miss is [`GridError::MissingFile`].
    pub fn require(&self, name: &str) -> GridResult<PathBuf> {
        self.locate(name)
            .map(Path::to_path_buf)
            .ok_or_else(|| GridError::MissingFile(name.to_string()))
    }
}
