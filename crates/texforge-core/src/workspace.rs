//! Per-request scratch directories.
//!
//! A [`Workspace`] owns one temporary directory holding the source of a single
//! compilation attempt. The directory is removed when the guard is closed or
//! dropped, so every exit path of a pipeline run tears it down.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::obs;

/// Fixed name of the LaTeX source inside every workspace.
pub const MAIN_SOURCE: &str = "main.tex";

/// Fixed name of the PDF the compiler produces from [`MAIN_SOURCE`].
pub const MAIN_PDF: &str = "main.pdf";

/// Fixed name of the bibliography database inside every workspace.
pub const BIBLIOGRAPHY_FILE: &str = "references.bib";

const DIR_PREFIX: &str = "texforge-";

/// Exclusively owned scratch directory for one compilation request.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Allocate a fresh, uniquely named directory and write `source` into it.
    ///
    /// The directory is created under `scratch_root` when given, otherwise
    /// under the system temporary directory.
    pub fn open(scratch_root: Option<&Path>, source: &str) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);
        let dir = match scratch_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        let workspace = Self { dir };
        workspace.write_source(source)?;
        debug!(path = %workspace.path().display(), "Opened workspace");
        Ok(workspace)
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn main_source(&self) -> PathBuf {
        self.path().join(MAIN_SOURCE)
    }

    /// Where the compiler leaves its output for [`Self::main_source`].
    pub fn main_pdf(&self) -> PathBuf {
        self.path().join(MAIN_PDF)
    }

    pub fn bibliography(&self) -> PathBuf {
        self.path().join(BIBLIOGRAPHY_FILE)
    }

    /// Replace the content of the main source file.
    pub fn write_source(&self, source: &str) -> io::Result<()> {
        fs::write(self.main_source(), source)
    }

    pub fn write_bibliography(&self, bib: &str) -> io::Result<()> {
        fs::write(self.bibliography(), bib)
    }

    /// Remove the directory and everything in it.
    ///
    /// Removal errors are logged and discarded.
    pub fn close(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            obs::emit_cleanup_failed(&path, &e);
        }
    }
}
