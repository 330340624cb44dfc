//! Output directory for compiled PDFs.
//!
//! Files are written under collision-free names and handed out at most once:
//! a successful [`OutputStore::retrieve`] deletes the file it read.
//!
//! The existence check in [`OutputStore::persist`] and the following write
//! are not atomic. Two concurrent requests asking for the same name inside the
//! same microsecond can still pick the same final name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::obs;

const PDF_SUFFIX: &str = ".pdf";
const DEFAULT_PREFIX: &str = "output_";

/// Errors from output store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A PDF persisted in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub name: String,
}

/// Process-wide output directory, passed around explicitly.
#[derive(Debug)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a fresh name derived from `requested_name`.
    ///
    /// Without a name, `output_<timestamp>` is used. `.pdf` is appended when
    /// missing. An existing file is never overwritten: the name gets a
    /// microsecond timestamp suffix instead.
    pub fn persist(&self, bytes: &[u8], requested_name: Option<&str>) -> StoreResult<StoredFile> {
        let mut name = match requested_name.filter(|n| !n.is_empty()) {
            Some(requested) => {
                validate_name(requested)?;
                requested.to_string()
            }
            None => format!("{DEFAULT_PREFIX}{}", Local::now().format("%Y%m%d_%H%M%S")),
        };
        if !name.ends_with(PDF_SUFFIX) {
            name.push_str(PDF_SUFFIX);
        }

        let mut path = self.root.join(&name);
        if self.exists(&name) {
            let stem = &name[..name.len() - PDF_SUFFIX.len()];
            name = format!(
                "{stem}_{}{PDF_SUFFIX}",
                Local::now().format("%Y%m%d_%H%M%S_%6f")
            );
            path = self.root.join(&name);
        }

        fs::write(&path, bytes)?;
        obs::emit_artifact_stored(&name, bytes.len());
        Ok(StoredFile { path, name })
    }

    /// Read and delete the file called `name`.
    ///
    /// Deletion failures are logged and otherwise ignored, so a file that
    /// cannot be removed may be served again.
    pub fn retrieve(&self, name: &str) -> StoreResult<Vec<u8>> {
        if validate_name(name).is_err() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let path = self.root.join(name);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        if let Err(e) = fs::remove_file(&path) {
            obs::emit_artifact_delete_failed(name, &e);
        }
        obs::emit_artifact_retrieved(name, bytes.len());
        Ok(bytes)
    }

    /// Whether a file called `name` is waiting in the store.
    pub fn exists(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.root.join(name).is_file()
    }
}

/// Reject names that would escape the store root.
fn validate_name(name: &str) -> StoreResult<()> {
    let escapes = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if escapes {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
