//! Trimming and validation of candidate tokens.

/// Characters stripped from both ends of a candidate.
const WHITESPACE: &[char] = &[' ', '\t', '\x0c', '\n', '\x0b', '\r'];

/// Trims surrounding whitespace and rejects tokens that still contain CR or LF.
///
/// Returns an empty string for "no valid token". A value with an embedded
/// line break could smuggle extra header content downstream, so it is
/// rejected outright rather than truncated.
pub fn normalize(raw: &str) -> String {
    let token = raw.trim_matches(WHITESPACE);
    if token.contains(['\r', '\n']) {
        return String::new();
    }
    token.to_string()
}

/// Like [`normalize`] for raw file content; non-UTF-8 input is rejected.
pub fn normalize_bytes(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => normalize(s),
        Err(_) => String::new(),
    }
}
