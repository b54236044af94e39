//! Environment-driven configuration.
//!
//! Everything a2am needs to talk to both APIs comes from environment
//! variables (a `.env` file is loaded by the binary before this module
//! reads them). The destination base URL is either taken verbatim from
//! `PROJECT_ENDPOINT` or derived from the classic
//! `PROJECT_CONNECTION_STRING` four-part format.

use crate::error::MigrateError;

/// Source-side (Azure OpenAI Assistants API) settings.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Resource endpoint, e.g. `https://myres.openai.azure.com`.
    pub endpoint: String,
    /// Value for the `api-key` header.
    pub api_key: String,
    /// Value for the `api-version` query parameter.
    pub api_version: String,
}

/// Destination project parsed from `PROJECT_CONNECTION_STRING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub host: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ProjectConfig {
    /// Parse the `<host>;<subscription-id>;<resource-group>;<project-name>`
    /// connection string format.
    pub fn parse(conn_str: &str) -> Result<Self, MigrateError> {
        let parts: Vec<&str> = conn_str.split(';').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(MigrateError::InvalidConnectionString {
                detail: format!("found {} segment(s), need 4", parts.len()),
            });
        }
        if let Some(pos) = parts.iter().position(|p| p.is_empty()) {
            return Err(MigrateError::InvalidConnectionString {
                detail: format!("segment {} is empty", pos + 1),
            });
        }
        Ok(Self {
            host: parts[0].to_string(),
            subscription_id: parts[1].to_string(),
            resource_group: parts[2].to_string(),
            project_name: parts[3].to_string(),
        })
    }

    /// Base URL of the project's Agent Service REST surface.
    pub fn agents_base_url(&self) -> String {
        format!(
            "https://{}/agents/v1.0/subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}",
            self.host, self.subscription_id, self.resource_group, self.project_name
        )
    }
}

/// Fully resolved configuration for a migration run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    /// Agent Service base URL (from `PROJECT_ENDPOINT` or derived from the
    /// connection string).
    pub agents_endpoint: String,
    /// Model deployment assigned to every created agent and used for
    /// thread summarization.
    pub model_deployment: String,
}

impl Config {
    /// Load the full configuration from the process environment.
    pub fn from_env() -> Result<Self, MigrateError> {
        let source = SourceConfig {
            endpoint: trim_trailing_slash(require_env("AZURE_OPENAI_ENDPOINT")?),
            api_key: require_env("AZURE_OPENAI_API_KEY")?,
            api_version: require_env("OPENAI_API_VERSION")?,
        };
        let agents_endpoint = match optional_env("PROJECT_ENDPOINT") {
            Some(endpoint) => trim_trailing_slash(endpoint),
            None => ProjectConfig::parse(&require_env("PROJECT_CONNECTION_STRING")?)?
                .agents_base_url(),
        };
        Ok(Self {
            source,
            agents_endpoint,
            model_deployment: require_env("MODEL_DEPLOYMENT_NAME")?,
        })
    }
}

/// Read a required environment variable, rejecting empty values.
pub fn require_env(name: &str) -> Result<String, MigrateError> {
    optional_env(name).ok_or_else(|| MigrateError::MissingEnv {
        name: name.to_string(),
    })
}

/// Read an environment variable, mapping unset and empty to `None`.
pub fn optional_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn trim_trailing_slash(mut value: String) -> String {
    while value.ends_with('/') {
        value.pop();
    }
    value
}
