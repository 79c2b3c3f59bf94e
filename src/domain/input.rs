use super::error::ValidationError;

/// Splits a comma separated list of sources into trimmed, non-empty identifiers.
///
/// Order is preserved and duplicates are kept. No URL validation happens here,
/// malformed identifiers are reported by the service itself.
pub fn normalize_sources(raw: &str) -> Result<Vec<String>, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingSource);
    }

    let sources: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if sources.is_empty() {
        return Err(ValidationError::NoValidSource);
    }

    Ok(sources)
}

pub fn validate_quality(quality: &str) -> Result<&str, ValidationError> {
    let quality = quality.trim();
    if quality.is_empty() {
        Err(ValidationError::MissingQuality)
    } else {
        Ok(quality)
    }
}
