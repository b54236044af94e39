//! Destination credential acquisition.
//!
//! The Agent Service wants an Azure AD bearer token. a2am takes it from
//! `AZURE_AI_TOKEN` when set, otherwise shells out to the Azure CLI the way
//! `DefaultAzureCredential`'s CLI credential does.

use std::process::Command;

use tracing::{debug, info};

use crate::config::optional_env;
use crate::error::MigrateError;

/// OAuth scope for the Agent Service REST surface.
pub const TOKEN_SCOPE: &str = "https://ml.azure.com/.default";

/// Where the destination bearer token would come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `AZURE_AI_TOKEN` is set.
    EnvToken,
    /// The `az` binary is on PATH.
    AzureCli,
    /// Nothing available.
    None,
}

/// Probe (without any network or subprocess call) which credential source
/// [`acquire_token`] would use. Used by `a2am check`.
pub fn detect_credential_source() -> CredentialSource {
    if optional_env("AZURE_AI_TOKEN").is_some() {
        CredentialSource::EnvToken
    } else if which::which("az").is_ok() {
        CredentialSource::AzureCli
    } else {
        CredentialSource::None
    }
}

/// Obtain a bearer token for the Agent Service.
pub fn acquire_token() -> Result<String, MigrateError> {
    if let Some(token) = optional_env("AZURE_AI_TOKEN") {
        debug!("using bearer token from AZURE_AI_TOKEN");
        return Ok(token.trim().to_string());
    }

    let az = which::which("az").map_err(|e| MigrateError::Credential {
        detail: format!("AZURE_AI_TOKEN is unset and the 'az' CLI was not found: {e}"),
    })?;
    debug!(az = %az.display(), scope = TOKEN_SCOPE, "requesting token via Azure CLI");

    let output = Command::new(&az)
        .args([
            "account",
            "get-access-token",
            "--scope",
            TOKEN_SCOPE,
            "--query",
            "accessToken",
            "--output",
            "tsv",
        ])
        .output()
        .map_err(|e| MigrateError::Credential {
            detail: format!("failed to run '{}': {e}", az.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MigrateError::Credential {
            detail: format!(
                "'az account get-access-token' exited with {}: {}",
                output.status,
                stderr.trim()
            ),
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(MigrateError::Credential {
            detail: "'az account get-access-token' returned an empty token".to_string(),
        });
    }

    info!("acquired destination token via Azure CLI");
    Ok(token)
}
