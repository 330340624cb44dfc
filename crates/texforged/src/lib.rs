//! texforged - texforge service daemon
//!
//! Serves the `compile_latex` MCP tool over streamable HTTP at `/mcp` and
//! hands out compiled PDFs once each at `/download/{filename}`.

pub mod config;
pub mod error;
pub mod mcp;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use mcp::TexforgeMcp;
pub use server::{router, serve, AppState};
