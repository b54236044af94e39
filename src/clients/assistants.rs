//! Source client: Azure OpenAI Assistants API.
//!
//! Auth is the `api-key` header; every URL carries the `api-version` query
//! parameter. Assistants-surface routes need the `OpenAI-Beta: assistants=v2`
//! header. The threads listing route is Azure-specific — there is no
//! official "list threads" operation, but the resource answers a raw
//! `GET /openai/threads` just like the other list endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clients::{PAGE_LIMIT, drain_pages, send_json};
use crate::config::SourceConfig;
use crate::error::MigrateError;
use crate::model::{Assistant, ListPage, ThreadMessage, ThreadRecord};

const SERVICE: &str = "assistants-api";

/// One message in a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for the source resource.
pub struct AssistantsClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl AssistantsClient {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/openai{path}", self.endpoint)
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(self.url(path))
            .header("api-key", &self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .query(&[("api-version", self.api_version.as_str())])
    }

    fn list_all<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, MigrateError> {
        drain_pages(|after| {
            trace!(path, ?after, "fetching page");
            let mut request = self
                .get(path)
                .query(&[("limit", PAGE_LIMIT), ("order", "desc")]);
            if let Some(cursor) = after {
                request = request.query(&[("after", cursor)]);
            }
            send_json::<ListPage<T>>(SERVICE, request)
        })
    }

    /// List every assistant on the resource.
    pub fn list_assistants(&self) -> Result<Vec<Assistant>, MigrateError> {
        let assistants = self.list_all("/assistants")?;
        debug!(count = assistants.len(), "listed assistants");
        Ok(assistants)
    }

    /// List every thread on the resource.
    pub fn list_threads(&self) -> Result<Vec<ThreadRecord>, MigrateError> {
        let threads = self.list_all("/threads")?;
        debug!(count = threads.len(), "listed threads");
        Ok(threads)
    }

    /// List every message in a thread, newest first (API order).
    pub fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, MigrateError> {
        let messages = self.list_all(&format!("/threads/{thread_id}/messages"))?;
        debug!(thread_id, count = messages.len(), "listed thread messages");
        Ok(messages)
    }

    /// One-shot chat completion against a model deployment.
    ///
    /// Returns the first choice's content; used for thread summarization.
    pub fn chat_completion(
        &self,
        deployment: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, MigrateError> {
        let request = self
            .http
            .post(self.url(&format!("/deployments/{deployment}/chat/completions")))
            .header("api-key", &self.api_key)
            .query(&[("api-version", self.api_version.as_str())])
            .json(&serde_json::json!({
                "messages": messages,
                "max_tokens": max_tokens,
                "temperature": temperature,
            }));

        let response: ChatCompletionResponse = send_json(SERVICE, request)?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(MigrateError::Decode {
                service: SERVICE,
                detail: "chat completion returned no choices".to_string(),
            })
    }
}
