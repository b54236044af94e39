//! Destination client: Azure AI Agent Service.
//!
//! Auth is an Azure AD bearer token. The service reuses the Assistants API
//! wire shapes, so agents live under `/assistants` on the project's agents
//! base URL.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::clients::{PAGE_LIMIT, drain_pages, send_json};
use crate::error::MigrateError;
use crate::model::{AgentRecord, AgentThread, CreateAgentRequest, ListPage};

const SERVICE: &str = "agent-service";

/// REST api-version for the Agent Service.
const API_VERSION: &str = "2024-12-01-preview";

/// Blocking client for the destination project.
pub struct AgentsClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl AgentsClient {
    pub fn new(base_url: &str, token: String) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.token)
            .query(&[("api-version", API_VERSION)])
    }

    /// List every agent in the destination project.
    pub fn list_agents(&self) -> Result<Vec<AgentRecord>, MigrateError> {
        let agents = drain_pages(|after| {
            trace!(?after, "fetching agents page");
            let mut request = self
                .request(reqwest::Method::GET, "/assistants")
                .query(&[("limit", PAGE_LIMIT), ("order", "desc")]);
            if let Some(cursor) = after {
                request = request.query(&[("after", cursor)]);
            }
            send_json::<ListPage<AgentRecord>>(SERVICE, request)
        })?;
        debug!(count = agents.len(), "listed destination agents");
        Ok(agents)
    }

    /// Create an agent.
    pub fn create_agent(
        &self,
        request: &CreateAgentRequest,
    ) -> Result<AgentRecord, MigrateError> {
        let agent: AgentRecord = send_json(
            SERVICE,
            self.request(reqwest::Method::POST, "/assistants")
                .json(request),
        )?;
        debug!(agent_id = agent.id, "created agent");
        Ok(agent)
    }

    /// Create an empty thread.
    pub fn create_thread(&self) -> Result<AgentThread, MigrateError> {
        let thread: AgentThread = send_json(
            SERVICE,
            self.request(reqwest::Method::POST, "/threads")
                .json(&serde_json::json!({})),
        )?;
        debug!(thread_id = thread.id, "created thread");
        Ok(thread)
    }

    /// Replace a thread's metadata.
    pub fn update_thread_metadata(
        &self,
        thread_id: &str,
        metadata: &Map<String, Value>,
    ) -> Result<(), MigrateError> {
        let _: Value = send_json(
            SERVICE,
            self.request(reqwest::Method::POST, &format!("/threads/{thread_id}"))
                .json(&serde_json::json!({ "metadata": metadata })),
        )?;
        debug!(thread_id, "updated thread metadata");
        Ok(())
    }

    /// Post a message to a thread.
    pub fn create_message(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
    ) -> Result<(), MigrateError> {
        let _: Value = send_json(
            SERVICE,
            self.request(
                reqwest::Method::POST,
                &format!("/threads/{thread_id}/messages"),
            )
            .json(&serde_json::json!({ "role": role, "content": content })),
        )?;
        debug!(thread_id, role, "created message");
        Ok(())
    }
}
