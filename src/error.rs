//! Actionable typed errors for a2am.
//!
//! Each error variant includes enough context for the user to understand
//! what went wrong and what to do next. Internal propagation uses `anyhow`;
//! the public API exposes these `thiserror` types.

use std::path::PathBuf;

/// Errors that a2am surfaces to the user.
///
/// Fatal setup problems (configuration, credentials, initial list calls)
/// map to these variants. Per-resource migration failures are captured in
/// the [`MigrationReport`](crate::migrate::MigrationReport) instead and do
/// not abort the run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Required environment variable is unset or empty.
    #[error(
        "Environment variable '{name}' is not set. Set it in the environment or in a .env file. Run 'a2am check' to see which variables are missing."
    )]
    MissingEnv { name: String },

    /// `PROJECT_CONNECTION_STRING` does not have the expected shape.
    #[error(
        "Invalid PROJECT_CONNECTION_STRING: {detail}. Expected '<host>;<subscription-id>;<resource-group>;<project-name>'."
    )]
    InvalidConnectionString { detail: String },

    /// Could not obtain a bearer token for the Agent Service.
    #[error(
        "Failed to acquire a destination credential: {detail}. Set AZURE_AI_TOKEN, or install the Azure CLI and run 'az login'."
    )]
    Credential { detail: String },

    /// The request never produced an HTTP response (DNS, TLS, connect, ...).
    #[error("{service}: request to {url} failed: {detail}")]
    Transport {
        service: &'static str,
        url: String,
        detail: String,
    },

    /// The API answered with a non-success status.
    #[error("{service}: HTTP {status}{}: {message}", code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body did not match the expected wire shape.
    #[error("{service}: failed to decode response: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },

    /// A local backup file could not be written.
    #[error("Failed to write backup to {}: {detail}", path.display())]
    Backup { path: PathBuf, detail: String },
}
