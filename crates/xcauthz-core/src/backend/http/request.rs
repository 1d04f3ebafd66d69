//! Single HTTP request over libcurl.

use std::str;
use std::time::Duration;

use super::parse::{parse_headers, ResponseMeta};
use crate::client::{ClientResult, Timeout};
use crate::config::HttpSettings;
use crate::error::ClientError;
use crate::url_model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Head,
    Get,
    Delete,
    MkCol,
    Move,
}

impl Method {
    fn custom_verb(self) -> Option<&'static str> {
        match self {
            Method::Head | Method::Get => None,
            Method::Delete => Some("DELETE"),
            Method::MkCol => Some("MKCOL"),
            Method::Move => Some("MOVE"),
        }
    }
}

pub(crate) struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    /// Inclusive byte range for GET.
    pub range: Option<(u64, u64)>,
    pub headers: Vec<String>,
    pub timeout: Timeout,
}

impl<'a> Request<'a> {
    pub fn new(method: Method, url: &'a str, timeout: Timeout) -> Self {
        Self {
            method,
            url,
            range: None,
            headers: Vec::new(),
            timeout,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Response {
    pub status: u32,
    pub meta: ResponseMeta,
    pub body: Vec<u8>,
}

impl Response {
    /// Maps non-2xx statuses to errors; 404 becomes [`ClientError::NotFound`].
    pub fn success(self, url: &str, path: &str) -> ClientResult<Response> {
        match self.status {
            200..=299 => Ok(self),
            404 => Err(ClientError::NotFound {
                path: path.to_string(),
            }),
            status => Err(ClientError::Http {
                url: url_model::redact(url),
                status,
            }),
        }
    }
}

/// Runs `req` in the current thread and collects status, headers and body.
pub(crate) fn perform(settings: &HttpSettings, req: &Request<'_>) -> ClientResult<Response> {
    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(req.url)?;
    easy.follow_location(settings.follow_redirects)?;
    easy.connect_timeout(Duration::from_secs(settings.connect_timeout_secs))?;
    let timeout = match req.timeout {
        0 => settings.timeout_secs,
        t => u64::from(t),
    };
    easy.timeout(Duration::from_secs(timeout))?;

    match req.method {
        Method::Head => easy.nobody(true)?,
        Method::Get => easy.get(true)?,
        other => {
            if let Some(verb) = other.custom_verb() {
                easy.custom_request(verb)?;
            }
        }
    }
    if let Some((start, end)) = req.range {
        easy.range(&format!("{}-{}", start, end))?;
    }

    let mut list = curl::easy::List::new();
    for h in &req.headers {
        list.append(h)?;
    }
    if !req.headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                header_lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    tracing::trace!(
        method = ?req.method,
        url = %url_model::redact(req.url),
        status,
        "http request done"
    );

    Ok(Response {
        status,
        meta: parse_headers(&header_lines),
        body,
    })
}
