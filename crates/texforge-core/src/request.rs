//! Compile request input.

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// LaTeX source of the main document.
    pub source: String,

    /// BibTeX database content, if the document cites anything.
    pub bibliography: Option<String>,

    /// Name requested for the stored PDF.
    pub requested_name: Option<String>,
}

impl CompileRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            bibliography: None,
            requested_name: None,
        }
    }

    pub fn with_bibliography(mut self, bib: impl Into<String>) -> Self {
        self.bibliography = Some(bib.into());
        self
    }

    pub fn with_requested_name(mut self, name: impl Into<String>) -> Self {
        self.requested_name = Some(name.into());
        self
    }

    /// The bibliography, treating an empty string as absent.
    pub fn bibliography(&self) -> Option<&str> {
        self.bibliography.as_deref().filter(|b| !b.is_empty())
    }
}
