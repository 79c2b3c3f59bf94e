use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Response;
use tracing::debug;

use crate::domain::{AppError, DownloadRequest, ResolvedDownload};
use crate::utils::{extract_filename, sanitize_filename};

/// Pick the name the payload is saved under.
///
/// Uses the `filename` parameter of the disposition header when present and
/// falls back to a name derived from the request otherwise.
pub fn resolve_filename(content_disposition: Option<&str>, request: &DownloadRequest) -> String {
    content_disposition
        .and_then(extract_filename)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| request.fallback_filename())
}

/// Turn a successful response into the bytes to save and their filename.
pub async fn resolve(response: Response, request: &DownloadRequest) -> Result<ResolvedDownload, AppError> {
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let filename = resolve_filename(disposition.as_deref(), request);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Resolution(e.to_string()))?;

    debug!(filename = %filename, size = bytes.len(), "Resolved download payload");

    Ok(ResolvedDownload { filename, bytes })
}
