//! Command line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use texforge_core::Toolchain;
use tracing::Level;

#[derive(Debug, Clone, Parser)]
#[command(name = "texforged")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LaTeX to PDF compile service", long_about = None)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "TEXFORGE_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "TEXFORGE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Directory where compiled PDFs wait for download
    #[arg(long, env = "TEXFORGE_OUTPUT_DIR", default_value = "/tmp/latex-pdfs")]
    pub output_dir: PathBuf,

    /// Base URL used in download links (default: http://localhost:<port>)
    #[arg(long, env = "TEXFORGE_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Linter executable
    #[arg(long, env = "TEXFORGE_LINTER", default_value = "chktex")]
    pub linter: String,

    /// Typesetting engine executable
    #[arg(long, env = "TEXFORGE_COMPILER", default_value = "tectonic")]
    pub compiler: String,

    #[arg(long, env = "TEXFORGE_LINT_TIMEOUT_SECS", default_value_t = 10)]
    pub lint_timeout_secs: u64,

    #[arg(long, env = "TEXFORGE_COMPILE_TIMEOUT_SECS", default_value_t = 60)]
    pub compile_timeout_secs: u64,

    /// Parent directory for per-request workspaces (default: system temp dir)
    #[arg(long, env = "TEXFORGE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            linter: self.linter.clone(),
            compiler: self.compiler.clone(),
            lint_timeout_secs: self.lint_timeout_secs,
            compile_timeout_secs: self.compile_timeout_secs,
            scratch_root: self.scratch_dir.clone(),
        }
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["texforged"]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.output_dir, PathBuf::from("/tmp/latex-pdfs"));
        assert_eq!(config.public_url(), "http://localhost:8000");
        assert_eq!(config.log_level(), Level::INFO);

        let toolchain = config.toolchain();
        assert_eq!(toolchain.linter, "chktex");
        assert_eq!(toolchain.compiler, "tectonic");
        assert_eq!(toolchain.lint_timeout_secs, 10);
        assert_eq!(toolchain.compile_timeout_secs, 60);
        assert_eq!(toolchain.scratch_root, None);
    }

    #[test]
    fn test_public_url_follows_port() {
        let config = Config::try_parse_from(["texforged", "--port", "4000"]).unwrap();
        assert_eq!(config.public_url(), "http://localhost:4000");
    }

    #[test]
    fn test_explicit_flags() {
        let config = Config::try_parse_from([
            "texforged",
            "--host",
            "127.0.0.1",
            "--public-url",
            "https://pdf.example.test",
            "--compiler",
            "/opt/tectonic",
            "--compile-timeout-secs",
            "5",
            "--scratch-dir",
            "/var/tmp/tex",
            "-v",
            "--json",
        ])
        .unwrap();

        assert_eq!(config.addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.public_url(), "https://pdf.example.test");
        assert_eq!(config.log_level(), Level::DEBUG);
        assert!(config.json);

        let toolchain = config.toolchain();
        assert_eq!(toolchain.compiler, "/opt/tectonic");
        assert_eq!(toolchain.compile_timeout_secs, 5);
        assert_eq!(toolchain.scratch_root, Some(PathBuf::from("/var/tmp/tex")));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["texforged", "--port", "nope"]).is_err());
    }
}
