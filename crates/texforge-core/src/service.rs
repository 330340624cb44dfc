//! Compile service facade.
//!
//! Turns a `compile_latex` tool call into a pipeline run plus persistence,
//! and renders the single text payload returned to the caller. Every failure
//! becomes payload text starting with `Error:`; nothing here is reported as a
//! protocol fault.

use std::sync::Arc;

use tracing::{warn, Instrument};
use uuid::Uuid;

use crate::blocking::run_blocking;
use crate::obs;
use crate::pipeline::CompilePipeline;
use crate::request::CompileRequest;
use crate::store::{OutputStore, StoreResult, StoredFile};

/// Payload returned when the `latex` argument is missing or empty.
pub const MISSING_LATEX: &str = "Error: Missing 'latex' parameter";

/// Arguments of the `compile_latex` tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileLatexArgs {
    pub latex: Option<String>,
    pub bibliography: Option<String>,
    pub filename: Option<String>,
}

impl CompileLatexArgs {
    /// Convert into a pipeline request, or `None` when `latex` is missing.
    pub fn into_request(self) -> Option<CompileRequest> {
        let source = self.latex.filter(|l| !l.is_empty())?;
        Some(CompileRequest {
            source,
            bibliography: self.bibliography,
            requested_name: self.filename,
        })
    }
}

/// Entry point shared by the tool server and the download route.
#[derive(Debug, Clone)]
pub struct CompileService {
    pipeline: CompilePipeline,
    store: Arc<OutputStore>,
    public_url: String,
}

impl CompileService {
    /// `public_url` is the externally visible base URL used to build
    /// download links (for example `http://localhost:8000`).
    pub fn new(pipeline: CompilePipeline, store: Arc<OutputStore>, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self {
            pipeline,
            store,
            public_url,
        }
    }

    pub fn store(&self) -> &Arc<OutputStore> {
        &self.store
    }

    pub fn pipeline(&self) -> &CompilePipeline {
        &self.pipeline
    }

    /// Link under which a stored file can be fetched once.
    pub fn download_url(&self, name: &str) -> String {
        format!("{}/download/{}", self.public_url, name)
    }

    /// Handle a `compile_latex` call and return its text payload.
    pub async fn compile_latex(&self, args: CompileLatexArgs) -> String {
        let Some(request) = args.into_request() else {
            return MISSING_LATEX.to_string();
        };

        let request_id = Uuid::new_v4().to_string();
        let span = obs::compile_span(&request_id);
        self.handle(&request_id, request).instrument(span).await
    }

    async fn handle(&self, request_id: &str, request: CompileRequest) -> String {
        obs::emit_compile_started(
            request_id,
            request.source.len(),
            request.bibliography().is_some(),
        );

        let artifact = match self.pipeline.run(&request).await {
            Ok(artifact) => artifact,
            Err(e) => return format!("Error: {e}"),
        };

        let size_bytes = artifact.size_bytes();
        let store = Arc::clone(&self.store);
        let requested_name = request.requested_name.clone();
        let persisted = run_blocking(move || {
            store.persist(artifact.bytes(), requested_name.as_deref())
        })
        .await;
        let stored = match persisted {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to persist compiled PDF");
                return format!("Error: {e}");
            }
        };

        self.success_message(&stored, size_bytes, request.bibliography().is_some())
    }

    fn success_message(&self, stored: &StoredFile, size_bytes: usize, with_bibliography: bool) -> String {
        let bib_note = if with_bibliography {
            " with bibliography"
        } else {
            ""
        };
        format!(
            "PDF{bib_note} compiled successfully!\n\nFile saved to: {}\nSize: {size_bytes} bytes\n\nDownload: {}",
            stored.path.display(),
            self.download_url(&stored.name)
        )
    }

    /// One-shot retrieval for the download route.
    ///
    /// Blocking; async callers go through [`run_blocking`].
    pub fn download(&self, name: &str) -> StoreResult<Vec<u8>> {
        self.store.retrieve(name)
    }
}
