//! Fake toolchains for integration tests.
//!
//! Each fake tool is a small shell script; the pipeline invokes it exactly as
//! it would invoke chktex or tectonic.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use texforge_core::Toolchain;

pub const MINIMAL_DOC: &str =
    "\\documentclass{article}\\begin{document}Hello\\end{document}";

/// Compiler that writes a small PDF and chatters on stderr.
pub const COMPILER_OK: &str = r#"#!/bin/sh
echo "note: Running TeX ..." >&2
printf '%%PDF-1.5 fake' > "$3/main.pdf"
"#;

/// Compiler that fails with diagnostics on both streams.
pub const COMPILER_FAIL: &str = r#"#!/bin/sh
echo "note: Running TeX ..." >&2
echo "" >&2
echo "error: main.tex:1: Undefined control sequence" >&2
echo "l.1 undefined command"
echo "note: skipping"
exit 1
"#;

/// Compiler that fails without saying anything.
pub const COMPILER_SILENT_FAIL: &str = "#!/bin/sh\nexit 3\n";

/// Compiler that reports success but produces nothing.
pub const COMPILER_NO_PDF: &str = "#!/bin/sh\nexit 0\n";

/// Compiler that never finishes.
pub const COMPILER_HANG: &str = "#!/bin/sh\nexec sleep 30\n";

/// Linter that reports one warning and exits non-zero like chktex does.
pub const LINTER_WARN: &str = r#"#!/bin/sh
echo "Warning 24 in $2 line 1: Delete this space to maintain correct pagereferences."
exit 2
"#;

pub const LINTER_CLEAN: &str = "#!/bin/sh\nexit 0\n";

pub const LINTER_HANG: &str = "#!/bin/sh\nexec sleep 30\n";

/// Directory holding fake tools plus a scratch root for workspaces.
pub struct FakeTools {
    pub dir: tempfile::TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("scratch")).expect("scratch dir");
        Self { dir }
    }

    /// Write an executable script and return its path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, body).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    pub fn scratch(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    /// Workspaces still present under the scratch root.
    pub fn leftover_workspaces(&self) -> usize {
        fs::read_dir(self.scratch()).expect("read scratch").count()
    }

    pub fn toolchain(&self, linter: &Path, compiler: &Path) -> Toolchain {
        Toolchain {
            linter: linter.to_string_lossy().to_string(),
            compiler: compiler.to_string_lossy().to_string(),
            lint_timeout_secs: 10,
            compile_timeout_secs: 60,
            scratch_root: Some(self.scratch()),
        }
    }
}

/// Whether a real tectonic binary is on PATH.
pub fn tectonic_available() -> bool {
    std::process::Command::new("tectonic")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
