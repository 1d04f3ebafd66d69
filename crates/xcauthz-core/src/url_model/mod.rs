//! URL customization.
//!
//! Turns the URL a caller asked for into the effective URL actually used to
//! connect: the placeholder host is pointed at the configured caching proxy
//! and a discovered bearer token is attached as the `authz` query parameter.

mod params;
mod proxy;

pub use params::QueryParams;
pub use proxy::parse_port;

use url::Url;

use crate::config::AuthzConfig;
use crate::error::CustomizeError;
use crate::token;

/// Query parameter carrying the authorization credential.
pub const AUTHZ_PARAM: &str = "authz";

/// Prefix of the `authz` value: the scheme name and an encoded space.
pub const BEARER_PREFIX: &str = "Bearer%20";

/// Encoded `authz` value for `token`.
///
/// The separator is always `%20`; the token is form-urlencoded so characters
/// such as `+`, `/` or `&` cannot alter the query string. JWT and base64url
/// tokens come through unchanged.
pub fn bearer_value(token: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
    format!("{}{}", BEARER_PREFIX, encoded)
}

/// Produces the effective URL for `input`.
///
/// - host equal to the placeholder and a replacement configured: host (and
///   port, when valid) replaced
/// - token discovered and no `authz` parameter: `authz=Bearer%20<token>` appended
/// - an existing `authz` is never touched
///
/// Scheme and path pass through. The result is canonical, so customizing it
/// again with the same token sources returns it unchanged.
pub fn customize(input: &str, config: &AuthzConfig) -> Result<String, CustomizeError> {
    let mut url = Url::parse(input).map_err(|source| CustomizeError::InvalidUrl {
        url: input.to_string(),
        source,
    })?;

    proxy::substitute_placeholder(&mut url, config)?;

    let mut params = QueryParams::parse(url.query().unwrap_or(""));
    if let Some(found) = token::discover(config) {
        if !params.insert_if_absent(AUTHZ_PARAM, bearer_value(&found.token)) {
            tracing::debug!("authz already present, leaving caller value");
        }
    }

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&params.to_query_string()));
    }

    Ok(url.into())
}

/// Copy of `url` with the `authz` value replaced by `REDACTED`, for display.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(query) = parsed.query() else {
        return url.to_string();
    };
    let redacted: Vec<String> = query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((k, _)) if k == AUTHZ_PARAM => format!("{}=REDACTED", k),
            _ => segment.to_string(),
        })
        .collect();
    parsed.set_query(Some(&redacted.join("&")));
    parsed.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// No token sources at all: fallback dir points at an empty temp dir.
    fn no_token(dir: &Path) -> AuthzConfig {
        AuthzConfig {
            fallback_token_dir: dir.to_path_buf(),
            euid: None,
            ..AuthzConfig::default()
        }
    }

    fn with_token(dir: &Path, token: &str) -> AuthzConfig {
        AuthzConfig {
            bearer_token: Some(token.to_string()),
            ..no_token(dir)
        }
    }

    #[test]
    fn host_and_port_substitution_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AuthzConfig {
            replacement_host: Some("real.example.org".to_string()),
            replacement_port: Some("1095".to_string()),
            ..no_token(dir.path())
        };
        let out = customize("xcache://xcache:1094/path", &cfg).unwrap();
        assert_eq!(out, "xcache://real.example.org:1095/path");
    }

    #[test]
    fn non_placeholder_host_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AuthzConfig {
            replacement_host: Some("real.example.org".to_string()),
            replacement_port: Some("1095".to_string()),
            ..no_token(dir.path())
        };
        let out = customize("root://eos.cern.ch:1094//eos/file", &cfg).unwrap();
        assert_eq!(out, "root://eos.cern.ch:1094//eos/file");
    }

    #[test]
    fn injects_authz_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("root://host:1094//store/f", &with_token(dir.path(), "T1")).unwrap();
        assert_eq!(out, "root://host:1094//store/f?authz=Bearer%20T1");
    }

    #[test]
    fn appends_after_existing_params() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("root://host//f?oss.lfn=1", &with_token(dir.path(), "T1")).unwrap();
        assert_eq!(out, "root://host//f?oss.lfn=1&authz=Bearer%20T1");
    }

    #[test]
    fn existing_authz_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("root://host//f?authz=existing", &with_token(dir.path(), "T1")).unwrap();
        assert_eq!(out, "root://host//f?authz=existing");
    }

    #[test]
    fn no_token_no_param() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("root://host//f", &no_token(dir.path())).unwrap();
        assert_eq!(out, "root://host//f");
    }

    #[test]
    fn token_special_characters_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("https://host/f", &with_token(dir.path(), "a+b/c&d=e")).unwrap();
        assert_eq!(out, "https://host/f?authz=Bearer%20a%2Bb%2Fc%26d%3De");
    }

    #[test]
    fn jwt_token_unchanged_by_encoding() {
        assert_eq!(
            bearer_value("eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJ4In0.sig-_"),
            "Bearer%20eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiJ4In0.sig-_"
        );
    }

    #[test]
    fn idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AuthzConfig {
            replacement_host: Some("real.example.org".to_string()),
            replacement_port: Some("1095".to_string()),
            ..with_token(dir.path(), "T1")
        };
        for input in [
            "xcache://xcache:1094/path",
            "root://xcache//store/f?a=1&a=2",
            "https://xcache/f?authz=existing",
            "root://other.host:1094//f?",
            "http://host:80/f",
        ] {
            let once = customize(input, &cfg).unwrap();
            let twice = customize(&once, &cfg).unwrap();
            assert_eq!(once, twice, "input {}", input);
        }
    }

    #[test]
    fn duplicate_params_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let out = customize("root://host//f?a=1&b=2&a=3", &no_token(dir.path())).unwrap();
        assert_eq!(out, "root://host//f?a=3&b=2");
    }

    #[test]
    fn invalid_url_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = customize("not a url", &no_token(dir.path())).unwrap_err();
        assert!(matches!(err, CustomizeError::InvalidUrl { .. }));
    }

    #[test]
    fn token_from_file_is_injected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "  my-token\n").unwrap();
        let cfg = AuthzConfig {
            bearer_token_file: Some(file),
            ..no_token(dir.path())
        };
        let out = customize("root://host//f", &cfg).unwrap();
        assert_eq!(out, "root://host//f?authz=Bearer%20my-token");
    }

    #[test]
    fn redact_hides_authz_value() {
        assert_eq!(
            redact("root://host//f?x=1&authz=Bearer%20T1"),
            "root://host//f?x=1&authz=REDACTED"
        );
        assert_eq!(redact("root://host//f"), "root://host//f");
    }
}
