//! Migration orchestrators.
//!
//! Ties listing, transformation, backup, and destination creates into the
//! two linear procedures the tool exists for. Fatal setup failures (the
//! initial list call) propagate; per-resource failures are recorded in the
//! [`MigrationReport`] and the run continues, matching the behavior of the
//! scripts this tool replaces.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup;
use crate::clients::agents::AgentsClient;
use crate::clients::assistants::{AssistantsClient, ChatMessage};
use crate::error::MigrateError;
use crate::model::{
    Assistant, CreateAgentRequest, ThreadMessage, ThreadRecord, Tool, render_content_parts,
};

/// System prompt for thread summarization.
const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes conversations.";
const SUMMARY_MAX_TOKENS: u32 = 1000;
const SUMMARY_TEMPERATURE: f32 = 0.0;

/// Tool types the Agent Service accepts as-is.
const SUPPORTED_TOOL_TYPES: [&str; 2] = ["function", "code_interpreter"];

/// Options passed through from CLI flags.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// List and transform, but create nothing.
    pub dry_run: bool,
    /// Migrate at most this many resources.
    pub limit: Option<usize>,
    /// Write local JSON backups before creating anything.
    pub backup: bool,
    /// Directory for backup files.
    pub backup_dir: PathBuf,
    /// Fixed delay between destination create calls (rate-limit pacing).
    pub pace: Duration,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            limit: None,
            backup: true,
            backup_dir: PathBuf::from("backup"),
            pace: Duration::from_secs(1),
        }
    }
}

/// Outcome of a migration run.
#[derive(Debug, Default, Serialize)]
pub struct MigrationReport {
    /// Successfully created resources (source id → destination id).
    pub migrated: Vec<MigratedItem>,
    /// Resources that would be created (`--dry-run` only).
    pub planned: Vec<String>,
    /// Resources deliberately not migrated, with the reason.
    pub skipped: Vec<SkippedItem>,
    /// Resources whose migration failed.
    pub failed: Vec<FailedItem>,
}

#[derive(Debug, Serialize)]
pub struct MigratedItem {
    pub source_id: String,
    pub dest_id: String,
}

#[derive(Debug, Serialize)]
pub struct SkippedItem {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FailedItem {
    pub id: String,
    pub error: String,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Transformation
// ---------------------------------------------------------------------------

/// Map an assistant onto an agent creation request.
///
/// `name` and `instructions` are copied verbatim; the model is replaced
/// with the destination deployment. Tools of unsupported types are dropped
/// and returned so the caller can surface them.
pub fn assistant_to_agent_request(
    assistant: &Assistant,
    deployment: &str,
) -> (CreateAgentRequest, Vec<String>) {
    let mut tools = Vec::new();
    let mut dropped = Vec::new();

    for tool in &assistant.tools {
        if SUPPORTED_TOOL_TYPES.contains(&tool.kind.as_str()) {
            tools.push(Tool {
                kind: tool.kind.clone(),
                function: tool.function.clone(),
                extra: serde_json::Map::new(),
            });
        } else {
            dropped.push(tool.kind.clone());
        }
    }

    let request = CreateAgentRequest {
        model: deployment.to_string(),
        name: assistant.name.clone(),
        instructions: assistant.instructions.clone(),
        tools,
    };
    (request, dropped)
}

/// Build the summarization prompt from a thread's messages.
///
/// The API lists messages newest-first; the prompt wants chronological
/// order, so iteration is reversed.
pub fn build_summary_prompt(messages: &[ThreadMessage]) -> String {
    let mut prompt = String::from("Summarize the following conversation threads:\n\n");
    for message in messages.iter().rev() {
        prompt.push_str(&format!(
            "Agent:{}, ",
            message.assistant_id.as_deref().unwrap_or("unknown")
        ));
        prompt.push_str(&render_content_parts(message));
    }
    prompt
}

fn summarize_thread(
    source: &AssistantsClient,
    deployment: &str,
    messages: &[ThreadMessage],
) -> Result<String, MigrateError> {
    let chat = [
        ChatMessage::new("system", SUMMARY_SYSTEM_PROMPT),
        ChatMessage::new("user", build_summary_prompt(messages)),
    ];
    source.chat_completion(deployment, &chat, SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE)
}

fn format_created_at(epoch_secs: i64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}

fn apply_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(max) = limit
        && items.len() > max
    {
        info!(total = items.len(), max, "limiting migration");
        items.truncate(max);
    }
}

fn pace(opts: &MigrateOptions) {
    if !opts.pace.is_zero() {
        std::thread::sleep(opts.pace);
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Copy every assistant on the source resource into the destination
/// project as an agent.
pub fn migrate_agents(
    source: &AssistantsClient,
    dest: &AgentsClient,
    deployment: &str,
    opts: &MigrateOptions,
) -> Result<MigrationReport, MigrateError> {
    let mut report = MigrationReport::default();

    let mut assistants = source.list_assistants()?;
    info!(count = assistants.len(), "retrieved assistants");
    if assistants.is_empty() {
        info!("no assistants found, nothing to migrate");
        return Ok(report);
    }
    apply_limit(&mut assistants, opts.limit);

    if opts.backup {
        match backup::write_json(&opts.backup_dir, "assistants_backup.json", &assistants) {
            Ok(path) => info!(path = %path.display(), "assistants backed up"),
            Err(e) => warn!(error = %e, "assistant backup failed, continuing"),
        }
    }

    for assistant in &assistants {
        let (request, dropped) = assistant_to_agent_request(assistant, deployment);
        for kind in &dropped {
            warn!(
                assistant_id = assistant.id,
                tool_type = kind,
                "unsupported tool type, skipping tool"
            );
        }
        debug!(
            assistant_id = assistant.id,
            name = request.name.as_deref().unwrap_or("(unnamed)"),
            created = format_created_at(assistant.created_at),
            tools = request.tools.len(),
            "transformed assistant"
        );

        if opts.dry_run {
            info!(assistant_id = assistant.id, "dry run, would create agent");
            report.planned.push(assistant.id.clone());
            continue;
        }

        match dest.create_agent(&request) {
            Ok(agent) => {
                info!(
                    assistant_id = assistant.id,
                    agent_id = agent.id,
                    "agent created"
                );
                report.migrated.push(MigratedItem {
                    source_id: assistant.id.clone(),
                    dest_id: agent.id,
                });
            }
            Err(e) => {
                warn!(assistant_id = assistant.id, error = %e, "agent creation failed");
                report.failed.push(FailedItem {
                    id: assistant.id.clone(),
                    error: e.to_string(),
                });
            }
        }
        pace(opts);
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

/// Copy every thread on the source resource into the destination project.
///
/// Each migrated thread carries the original metadata plus
/// `orig_thread_id`, and a single user message holding a model-generated
/// summary of the original conversation. The full message history is kept
/// in the local backup only.
pub fn migrate_threads(
    source: &AssistantsClient,
    dest: &AgentsClient,
    deployment: &str,
    opts: &MigrateOptions,
) -> Result<MigrationReport, MigrateError> {
    let mut report = MigrationReport::default();

    let mut threads = source.list_threads()?;
    info!(count = threads.len(), "retrieved threads");
    if threads.is_empty() {
        info!("no threads found, nothing to migrate");
        return Ok(report);
    }
    apply_limit(&mut threads, opts.limit);

    if !opts.dry_run {
        match dest.list_agents() {
            Ok(agents) if agents.is_empty() => {
                warn!("destination project has no agents, run 'a2am agents' first")
            }
            Ok(agents) => info!(agent_id = agents[0].id, "destination agents present"),
            Err(e) => warn!(error = %e, "could not list destination agents"),
        }
    }

    for thread in &threads {
        info!(thread_id = thread.id, "migrating thread");

        let messages = match source.list_messages(&thread.id) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(thread_id = thread.id, error = %e, "message retrieval failed");
                report.failed.push(FailedItem {
                    id: thread.id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        if messages.is_empty() {
            info!(thread_id = thread.id, "no messages, skipping");
            report.skipped.push(SkippedItem {
                id: thread.id.clone(),
                reason: "no messages".to_string(),
            });
            continue;
        }
        debug!(thread_id = thread.id, count = messages.len(), "retrieved messages");

        if opts.backup {
            let file_name = format!("{}.json", thread.id);
            match backup::write_json(&opts.backup_dir, &file_name, &messages) {
                Ok(path) => debug!(path = %path.display(), "thread messages backed up"),
                Err(e) => warn!(thread_id = thread.id, error = %e, "thread backup failed, continuing"),
            }
        }

        if opts.dry_run {
            info!(thread_id = thread.id, "dry run, would migrate thread");
            report.planned.push(thread.id.clone());
            continue;
        }

        let summary = match summarize_thread(source, deployment, &messages) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(thread_id = thread.id, error = %e, "summarization failed");
                report.failed.push(FailedItem {
                    id: thread.id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        debug!(thread_id = thread.id, summary_len = summary.len(), "summary generated");

        match copy_thread(dest, thread, &summary) {
            Ok(new_thread_id) => {
                info!(
                    thread_id = thread.id,
                    new_thread_id, "thread migrated"
                );
                report.migrated.push(MigratedItem {
                    source_id: thread.id.clone(),
                    dest_id: new_thread_id,
                });
            }
            Err(e) => {
                warn!(thread_id = thread.id, error = %e, "thread migration failed");
                report.failed.push(FailedItem {
                    id: thread.id.clone(),
                    error: e.to_string(),
                });
            }
        }
        pace(opts);
    }

    Ok(report)
}

/// Create the destination thread: empty thread, metadata update with the
/// original metadata plus `orig_thread_id`, then one user message with the
/// summary.
fn copy_thread(
    dest: &AgentsClient,
    thread: &ThreadRecord,
    summary: &str,
) -> Result<String, MigrateError> {
    let new_thread = dest.create_thread()?;

    let mut metadata = thread.metadata.clone();
    metadata.insert(
        "orig_thread_id".to_string(),
        serde_json::Value::String(thread.id.clone()),
    );
    dest.update_thread_metadata(&new_thread.id, &metadata)?;

    dest.create_message(&new_thread.id, "user", summary)?;
    Ok(new_thread.id)
}
