//! MCP tool server over stdio.
//!
//! Exposes the session operations as eight tools. Calls are serialized on one
//! session lock. Failures come back as error tool results, not protocol errors.

use crate::session::{ConfigureRequest, Session};
use relay_core::error::RelayError;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct RelayServer {
    session: Arc<Mutex<Session>>,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureSlackArgs {
    /// Slack webhook URL (optional if SLACK_WEBHOOK_URL is set)
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Session identifier
    #[serde(default)]
    pub session_id: Option<String>,
    /// Enable progress tracking notifications
    #[serde(default)]
    pub enable_progress: Option<bool>,
    /// Enable compact prompt notifications
    #[serde(default)]
    pub enable_compact_prompts: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendCompactPromptArgs {
    /// The prompt text to format and send
    pub prompt: String,
    /// Session identifier
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskArgs {
    /// Unique task identifier
    pub task_id: String,
    /// Human-readable task name
    pub task_name: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskArgs {
    /// Task identifier to mark as completed
    pub task_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCurrentTaskArgs {
    /// Name of the current task
    pub task_name: String,
}

fn reply(result: Result<String, RelayError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            warn!("tool call failed: {e}");
            Ok(CallToolResult::error(vec![Content::text(format!("Error: {e}"))]))
        }
    }
}

#[tool_router]
impl RelayServer {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "configure_slack",
        description = "Configure Slack webhook URL and settings (webhook URL optional if SLACK_WEBHOOK_URL is set)"
    )]
    pub async fn configure_slack(
        &self,
        Parameters(args): Parameters<ConfigureSlackArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let mut session = self.session.lock().await;
        reply(session.configure(ConfigureRequest {
            webhook_url: args.webhook_url,
            session_id: args.session_id,
            enable_progress: args.enable_progress,
            enable_compact_prompts: args.enable_compact_prompts,
        }))
    }

    #[tool(
        name = "send_compact_prompt",
        description = "Send a compact formatted prompt to Slack"
    )]
    pub async fn send_compact_prompt(
        &self,
        Parameters(args): Parameters<SendCompactPromptArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let session = self.session.lock().await;
        reply(session.send_compact_prompt(&args.prompt, args.session_id).await)
    }

    #[tool(name = "add_task", description = "Add a task to the progress tracker")]
    pub async fn add_task(
        &self,
        Parameters(args): Parameters<AddTaskArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let mut session = self.session.lock().await;
        reply(Ok(session.add_task(&args.task_id, &args.task_name)))
    }

    #[tool(name = "complete_task", description = "Mark a task as completed")]
    pub async fn complete_task(
        &self,
        Parameters(args): Parameters<CompleteTaskArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let mut session = self.session.lock().await;
        reply(session.complete_task(&args.task_id).await)
    }

    #[tool(name = "set_current_task", description = "Set the currently active task")]
    pub async fn set_current_task(
        &self,
        Parameters(args): Parameters<SetCurrentTaskArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let mut session = self.session.lock().await;
        reply(Ok(session.set_current_task(&args.task_name)))
    }

    #[tool(name = "send_progress", description = "Send current progress to Slack")]
    pub async fn send_progress(&self) -> Result<CallToolResult, ErrorData> {
        let session = self.session.lock().await;
        reply(session.send_progress().await)
    }

    #[tool(name = "get_progress", description = "Get current progress information")]
    pub async fn get_progress(&self) -> Result<CallToolResult, ErrorData> {
        let session = self.session.lock().await;
        reply(serde_json::to_string_pretty(&session.progress_report()).map_err(RelayError::from))
    }

    #[tool(name = "reset_progress", description = "Reset all progress tracking")]
    pub async fn reset_progress(&self) -> Result<CallToolResult, ErrorData> {
        let mut session = self.session.lock().await;
        reply(Ok(session.reset_progress()))
    }
}

#[tool_handler]
impl ServerHandler for RelayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "relay".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Relay".to_string()),
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "Send compact prompts and task progress to Slack. Call configure_slack first \
                 unless SLACK_WEBHOOK_URL is set."
                    .to_string(),
            ),
        }
    }
}

/// Serve the tools on stdin/stdout until the client disconnects.
pub async fn serve(session: Session) -> anyhow::Result<()> {
    info!("relay MCP server running on stdio");
    let service = RelayServer::new(session)
        .serve(rmcp::transport::stdio())
        .await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::config::RelayConfig;
    use rmcp::model::CallToolRequestParam;
    use rmcp_in_process_transport::in_process::TokioInProcess;

    fn args(value: serde_json::Value) -> Option<serde_json::Map<String, serde_json::Value>> {
        value.as_object().cloned()
    }

    fn text(result: &CallToolResult) -> String {
        result.content[0].as_text().unwrap().text.clone()
    }

    #[tokio::test]
    async fn test_smoke_lists_tools() -> anyhow::Result<()> {
        let server = RelayServer::new(Session::new(RelayConfig::default()));
        let tokio_in_process = TokioInProcess::new(server).await?;
        let service = ().serve(tokio_in_process).await?;

        let info = service.peer_info().unwrap();
        assert_eq!(info.server_info.name, "relay");

        let tools = service.list_tools(Default::default()).await?;
        let mut names: Vec<String> = tools.tools.iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "add_task",
                "complete_task",
                "configure_slack",
                "get_progress",
                "reset_progress",
                "send_compact_prompt",
                "send_progress",
                "set_current_task",
            ]
        );

        service.cancel().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_task_tools_round_trip() -> anyhow::Result<()> {
        let server = RelayServer::new(Session::new(RelayConfig::default()));
        let tokio_in_process = TokioInProcess::new(server).await?;
        let service = ().serve(tokio_in_process).await?;

        let added = service
            .call_tool(CallToolRequestParam {
                name: "add_task".into(),
                arguments: args(serde_json::json!({"taskId": "t1", "taskName": "Write tests"})),
            })
            .await?;
        assert_eq!(text(&added), "Task added: Write tests");

        service
            .call_tool(CallToolRequestParam {
                name: "complete_task".into(),
                arguments: args(serde_json::json!({"taskId": "t1"})),
            })
            .await?;

        let progress = service
            .call_tool(CallToolRequestParam {
                name: "get_progress".into(),
                arguments: None,
            })
            .await?;
        let report: serde_json::Value = serde_json::from_str(&text(&progress))?;
        assert_eq!(report["completed"], 1);
        assert_eq!(report["total"], 1);
        assert_eq!(report["completionRate"], 100.0);

        service.cancel().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_unconfigured_send_is_error_result() -> anyhow::Result<()> {
        let server = RelayServer::new(Session::new(RelayConfig::default()));
        let tokio_in_process = TokioInProcess::new(server).await?;
        let service = ().serve(tokio_in_process).await?;

        let result = service
            .call_tool(CallToolRequestParam {
                name: "send_progress".into(),
                arguments: None,
            })
            .await?;
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).starts_with("Error: "));
        assert!(text(&result).contains("configure_slack"));

        service.cancel().await?;
        Ok(())
    }
}
