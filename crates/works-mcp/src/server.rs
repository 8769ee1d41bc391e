use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use works_tools::{WorksToolSource, WorksToolsError};

const INSTRUCTIONS: &str = "Tools for the Works productivity suite: my tasks and task \
categories, my default calendar's events, and calendars. Datetimes are ISO-8601 \
(e.g. 2024-01-15T09:00:00+09:00); task due dates are YYYY-MM-DD.";

/// MCP handler that exposes one [`WorksToolSource`] over a single session.
#[derive(Clone)]
pub struct WorksMcpServer {
    source: WorksToolSource,
}

impl WorksMcpServer {
    pub fn new(source: WorksToolSource) -> Self {
        Self { source }
    }
}

impl ServerHandler for WorksMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Works MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.source.list_tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.map_or(Value::Null, Value::Object);
        self.source
            .call_tool(&request.name, arguments)
            .await
            .map_err(map_tool_error)
    }
}

/// `call_tool` reports every other failure as an `isError` result, so the only error that
/// reaches the protocol is an unknown tool name.
fn map_tool_error(e: WorksToolsError) -> ErrorData {
    ErrorData::invalid_params(e.to_string(), None)
}
