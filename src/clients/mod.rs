//! Blocking HTTP clients for the two APIs.
//!
//! No vendor SDK: both services speak small, stable REST surfaces, so each
//! client is a thin wrapper over `reqwest::blocking` with its own auth
//! header scheme. Shared plumbing here handles transport failures, the
//! standard `{"error":{...}}` envelope, and response decoding.

pub mod agents;
pub mod assistants;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::MigrateError;
use crate::model::ListPage;

/// Page size for every list call.
const PAGE_LIMIT: &str = "100";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Send a request and decode the JSON response body.
///
/// Non-success statuses are decoded from the error envelope when possible,
/// falling back to the raw (truncated) body text.
pub(crate) fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: reqwest::blocking::RequestBuilder,
) -> Result<T, MigrateError> {
    let response = request.send().map_err(|e| MigrateError::Transport {
        service,
        url: e.url().map(|u| u.to_string()).unwrap_or_default(),
        detail: e.to_string(),
    })?;

    let status = response.status();
    let body = response.text().map_err(|e| MigrateError::Transport {
        service,
        url: e.url().map(|u| u.to_string()).unwrap_or_default(),
        detail: format!("failed to read response body: {e}"),
    })?;

    if !status.is_success() {
        return Err(api_error(service, status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| MigrateError::Decode {
        service,
        detail: format!("{e} (body: {})", truncate(&body, 200)),
    })
}

fn api_error(service: &'static str, status: u16, body: &str) -> MigrateError {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    let (code, message) = match envelope.and_then(|e| e.error) {
        Some(err) => (
            err.code,
            err.message.unwrap_or_else(|| truncate(body, 200).to_string()),
        ),
        None => (None, truncate(body, 200).to_string()),
    };
    MigrateError::Api {
        service,
        status,
        code,
        message,
    }
}

fn truncate(text: &str, max_len: usize) -> &str {
    let mut end = text.len().min(max_len);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Drain a cursor-paginated list endpoint.
///
/// `fetch` issues one page request given the `after` cursor; pagination
/// continues while the API reports `has_more` and supplies a `last_id`.
pub(crate) fn drain_pages<T, F>(mut fetch: F) -> Result<Vec<T>, MigrateError>
where
    F: FnMut(Option<&str>) -> Result<ListPage<T>, MigrateError>,
{
    let mut items = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let page = fetch(after.as_deref())?;
        let more = page.has_more;
        let last_id = page.last_id.clone();
        items.extend(page.data);

        match (more, last_id) {
            // A cursor that doesn't advance would loop forever; stop.
            (true, Some(cursor)) if after.as_deref() != Some(cursor.as_str()) => {
                after = Some(cursor);
            }
            _ => break,
        }
    }

    Ok(items)
}
