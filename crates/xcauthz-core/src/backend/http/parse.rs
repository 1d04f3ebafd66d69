//! Parse HTTP response header lines into stat information.

use crate::client::StatInfo;

/// Metadata from a HEAD or GET response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseMeta {
    pub content_length: Option<u64>,
    pub accept_ranges: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl ResponseMeta {
    pub(crate) fn to_stat(&self, id: &str) -> StatInfo {
        StatInfo {
            id: id.to_string(),
            size: self.content_length.unwrap_or(0),
            is_dir: false,
            mod_time: None,
            etag: self.etag.clone(),
        }
    }
}

/// Parse collected header lines. Only the last response block counts, so
/// headers of redirect hops are ignored.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseMeta {
    let start = lines
        .iter()
        .rposition(|l| l.starts_with("HTTP/"))
        .unwrap_or(0);

    let mut meta = ResponseMeta::default();
    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    meta.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("accept-ranges") {
                meta.accept_ranges = value.eq_ignore_ascii_case("bytes");
            }
            if name.eq_ignore_ascii_case("etag") {
                meta.etag = Some(value.trim_matches('"').to_string());
            }
            if name.eq_ignore_ascii_case("last-modified") {
                meta.last_modified = Some(value.to_string());
            }
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_content_length_and_ranges() {
        let meta = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Length: 12345",
            "Accept-Ranges: bytes",
            "ETag: \"abc123\"",
            "Last-Modified: Wed, 21 Oct 2015 07:28:00 GMT",
        ]));
        assert_eq!(meta.content_length, Some(12345));
        assert!(meta.accept_ranges);
        assert_eq!(meta.etag.as_deref(), Some("abc123"));
        assert_eq!(
            meta.last_modified.as_deref(),
            Some("Wed, 21 Oct 2015 07:28:00 GMT")
        );
    }

    #[test]
    fn parse_headers_case_insensitive() {
        let meta = parse_headers(&lines(&["content-length: 7", "ACCEPT-RANGES: none"]));
        assert_eq!(meta.content_length, Some(7));
        assert!(!meta.accept_ranges);
    }

    #[test]
    fn only_final_response_counts() {
        let meta = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Content-Length: 0",
            "Location: http://other/f",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 99",
        ]));
        assert_eq!(meta.content_length, Some(99));
    }

    #[test]
    fn stat_from_meta() {
        let meta = ResponseMeta {
            content_length: Some(10),
            etag: Some("v1".to_string()),
            ..ResponseMeta::default()
        };
        let st = meta.to_stat("/f");
        assert_eq!(st.size, 10);
        assert_eq!(st.etag.as_deref(), Some("v1"));
        assert!(!st.is_dir);
    }
}
