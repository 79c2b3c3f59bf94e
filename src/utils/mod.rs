use regex::Regex;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
///
/// The value may be single or double quoted, or a bare token running up to the
/// next `;`. Quotes are stripped. Returns `None` when the parameter is missing
/// or empty.
pub fn extract_filename(content_disposition: &str) -> Option<String> {
    let re = Regex::new(r#"filename[^;=\n]*=("[^"\n]*"|'[^'\n]*'|[^;\n]*)"#).ok()?;
    let caps = re.captures(content_disposition)?;
    let name: String = caps[1].chars().filter(|c| *c != '"' && *c != '\'').collect();
    let name = name.trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
