//! MCP tool surface.
//!
//! One tool, `compile_latex`. Every outcome, including failures and calls to
//! unknown tools, comes back as a successful call whose single text item is
//! the payload.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::schemars;
use rmcp::service::RequestContext;
use rmcp::{tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler};
use serde::Deserialize;
use texforge_core::{CompileLatexArgs, CompileService};

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[schemars(transform = require_latex)]
pub struct CompileLatexRequest {
    /// Complete LaTeX document source
    #[schemars(description = "Complete LaTeX document source")]
    pub latex: Option<String>,

    /// BibTeX database; enables biblatex references when given
    #[serde(default)]
    #[schemars(description = "BibTeX database contents (optional)")]
    pub bibliography: Option<String>,

    /// Preferred output file name; `.pdf` is appended when missing
    #[serde(default)]
    #[schemars(description = "Output file name without directories (optional)")]
    pub filename: Option<String>,
}

/// `latex` stays an `Option` so a missing value reaches the service and gets
/// its error payload, but clients are told it is required.
fn require_latex(schema: &mut schemars::Schema) {
    schema.insert("required".to_string(), serde_json::json!(["latex"]));
}

impl From<CompileLatexRequest> for CompileLatexArgs {
    fn from(request: CompileLatexRequest) -> Self {
        CompileLatexArgs {
            latex: request.latex,
            bibliography: request.bibliography,
            filename: request.filename,
        }
    }
}

#[derive(Clone)]
pub struct TexforgeMcp {
    service: Arc<CompileService>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TexforgeMcp {
    pub fn new(service: Arc<CompileService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Compile a LaTeX document to PDF. Optionally pass a BibTeX bibliography and an output file name. Returns the saved path, size and a one-time download link, or an error message with compiler diagnostics.")]
    pub async fn compile_latex(
        &self,
        Parameters(request): Parameters<CompileLatexRequest>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.service.compile_latex(request.into()).await;
        Ok(CallToolResult::success(vec![Content::text(payload)]))
    }
}

impl TexforgeMcp {
    /// Payload for a call naming a tool this server does not have.
    fn unknown_tool(&self, name: &str) -> Option<CallToolResult> {
        let known = self.tool_router.list_all().iter().any(|t| t.name == name);
        (!known).then(|| CallToolResult::success(vec![Content::text(format!("Unknown tool: {name}"))]))
    }
}

impl ServerHandler for TexforgeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("texforge compiles LaTeX to PDF. Call 'compile_latex' with the full document source; fetch the result once from the returned download link.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if let Some(result) = self.unknown_tool(&request.name) {
            return Ok(result);
        }
        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }
}
