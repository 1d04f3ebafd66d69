//! Ordered search across token sources.

use std::fmt;
use std::path::PathBuf;

use super::file::read_token_file;
use super::fingerprint;
use super::normalize::normalize;
use crate::config::AuthzConfig;

/// Which source supplied a discovered token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// `BEARER_TOKEN`.
    Environment,
    /// `BEARER_TOKEN_FILE`.
    TokenFile(PathBuf),
    /// Well-known file under `XDG_RUNTIME_DIR`.
    RuntimeDir(PathBuf),
    /// Well-known file under the fallback directory.
    Fallback(PathBuf),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Environment => write!(f, "environment"),
            TokenSource::TokenFile(p) => write!(f, "token file {}", p.display()),
            TokenSource::RuntimeDir(p) => write!(f, "runtime dir {}", p.display()),
            TokenSource::Fallback(p) => write!(f, "fallback {}", p.display()),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DiscoveredToken {
    pub token: String,
    pub source: TokenSource,
}

// Keep the token itself out of Debug output.
impl fmt::Debug for DiscoveredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredToken")
            .field("fingerprint", &fingerprint(&self.token))
            .field("source", &self.source)
            .finish()
    }
}

/// Finds the first usable token.
///
/// Order: `BEARER_TOKEN`, `BEARER_TOKEN_FILE`, `<runtime dir>/<prefix><euid>`,
/// `<fallback dir>/<prefix><euid>`. A source that is unset, unreadable, too
/// large or empty after normalization is skipped.
pub fn discover(config: &AuthzConfig) -> Option<DiscoveredToken> {
    let found = search(config);
    match &found {
        Some(d) => tracing::debug!(
            source = %d.source,
            fingerprint = %fingerprint(&d.token),
            "discovered bearer token"
        ),
        None => tracing::debug!("no bearer token found"),
    }
    found
}

/// [`discover`] without the source.
pub fn discover_token(config: &AuthzConfig) -> Option<String> {
    discover(config).map(|d| d.token)
}

fn search(config: &AuthzConfig) -> Option<DiscoveredToken> {
    if let Some(raw) = config.bearer_token.as_deref() {
        let token = normalize(raw);
        if !token.is_empty() {
            return Some(DiscoveredToken {
                token,
                source: TokenSource::Environment,
            });
        }
    }

    if let Some(path) = &config.bearer_token_file {
        if let Some(token) = read_token_file(path) {
            return Some(DiscoveredToken {
                token,
                source: TokenSource::TokenFile(path.clone()),
            });
        }
    }

    let name = config.token_file_name()?;

    if let Some(dir) = &config.runtime_dir {
        let path = dir.join(&name);
        if let Some(token) = read_token_file(&path) {
            return Some(DiscoveredToken {
                token,
                source: TokenSource::RuntimeDir(path),
            });
        }
    }

    let path = config.fallback_token_dir.join(&name);
    read_token_file(&path).map(|token| DiscoveredToken {
        token,
        source: TokenSource::Fallback(path),
    })
}
