//! Bibliography injection.
//!
//! When a request carries a bibliography it is written next to the main
//! source, and a `\addbibresource` directive pointing at it is added unless
//! the document already declares a bibliography source.

use std::io;

use crate::workspace::{Workspace, BIBLIOGRAPHY_FILE};

const ADDBIBRESOURCE: &str = "\\addbibresource{";
const BIBLIOGRAPHY: &str = "\\bibliography{";
const BEGIN_DOCUMENT: &str = "\\begin{document}";

/// Whether `source` already names a bibliography database.
pub fn has_bib_directive(source: &str) -> bool {
    source.contains(ADDBIBRESOURCE) || source.contains(BIBLIOGRAPHY)
}

/// Insert `\addbibresource{references.bib}` before the first `\begin{document}`.
///
/// Sources that already declare a bibliography, or that have no
/// `\begin{document}`, are returned unchanged.
pub fn with_bib_resource(source: &str) -> String {
    if has_bib_directive(source) {
        return source.to_string();
    }

    match source.find(BEGIN_DOCUMENT) {
        Some(at) => {
            let directive = format!("\\addbibresource{{{BIBLIOGRAPHY_FILE}}}\n");
            let mut out = String::with_capacity(source.len() + directive.len());
            out.push_str(&source[..at]);
            out.push_str(&directive);
            out.push_str(&source[at..]);
            out
        }
        None => source.to_string(),
    }
}

/// Merge `bib` into the workspace and return the source to compile.
///
/// An absent or empty bibliography leaves both the source and the workspace
/// untouched. Otherwise the bibliography file is written and the main source
/// is replaced by the result of [`with_bib_resource`].
pub fn inject(workspace: &Workspace, source: &str, bib: Option<&str>) -> io::Result<String> {
    let Some(bib) = bib.filter(|b| !b.is_empty()) else {
        return Ok(source.to_string());
    };

    workspace.write_bibliography(bib)?;
    let rewritten = with_bib_resource(source);
    workspace.write_source(&rewritten)?;
    Ok(rewritten)
}
