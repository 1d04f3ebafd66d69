//! Legacy `unix` security protocol stub.
//!
//! Used when no real credential exchange is configured. A server accepts any
//! client that sends no credentials (identity derived from the peer host) and
//! any client whose credential carries the `unix` protocol tag. The client
//! side never has credentials to offer.

use std::fmt;

use thiserror::Error;

/// Protocol tag carried in the first four bytes of a credential blob.
pub const PROTOCOL_ID: &[u8; 4] = b"unix";

/// Name given to peers that authenticate without credentials.
pub const ANONYMOUS_NAME: &str = "?";

#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential named a different protocol.
    #[error("{message}")]
    InvalidParameter { errno: i32, message: String },
}

impl AuthError {
    pub fn errno(&self) -> i32 {
        match self {
            AuthError::InvalidParameter { errno, .. } => *errno,
        }
    }
}

#[cfg(unix)]
const EINVAL: i32 = libc::EINVAL;
#[cfg(not(unix))]
const EINVAL: i32 = 22;

/// Identity established by a handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// `host` for credential-less peers, `unix` otherwise.
    pub protocol: String,
    pub name: String,
    pub host: String,
}

/// Server-side responder for one connection.
#[derive(Debug, Clone)]
pub struct UnixProtocol {
    host: String,
}

impl UnixProtocol {
    /// `host` is the peer's host name.
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Protocol initialisation; there are no parameters to advertise.
    pub fn init(_parms: Option<&str>) -> String {
        String::new()
    }

    /// Credentials a client would send. This protocol has none.
    pub fn get_credentials(&self) -> Option<Vec<u8>> {
        None
    }

    /// Checks a credential blob.
    ///
    /// Absent or shorter than four bytes: accepted with a host-derived
    /// identity. Otherwise the leading four bytes must be [`PROTOCOL_ID`].
    pub fn authenticate(&self, cred: Option<&[u8]>) -> Result<Entity, AuthError> {
        let tag = match cred {
            Some(blob) if blob.len() >= PROTOCOL_ID.len() => &blob[..PROTOCOL_ID.len()],
            _ => {
                tracing::debug!(host = %self.host, "no credentials, using host identity");
                return Ok(Entity {
                    protocol: "host".to_string(),
                    name: ANONYMOUS_NAME.to_string(),
                    host: self.host.clone(),
                });
            }
        };

        if tag != PROTOCOL_ID {
            let message = format!(
                "Secunix: Authentication protocol id mismatch (unix != {}).",
                Tag(tag)
            );
            tracing::warn!(host = %self.host, "{}", message);
            return Err(AuthError::InvalidParameter {
                errno: EINVAL,
                message,
            });
        }

        Ok(Entity {
            protocol: "unix".to_string(),
            name: ANONYMOUS_NAME.to_string(),
            host: self.host.clone(),
        })
    }
}

/// Displays a wire tag, escaping anything that is not printable ASCII.
struct Tag<'a>(&'a [u8]);

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}
