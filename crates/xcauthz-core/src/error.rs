//! Error types shared by URL customization and the client layer.

use thiserror::Error;

/// Failure to turn a caller URL into an effective URL.
#[derive(Debug, Error)]
pub enum CustomizeError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot substitute host {host:?} into {url:?}")]
    InvalidReplacementHost {
        host: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot set port {port} on {url:?}")]
    InvalidReplacementPort { port: u16, url: String },
}

/// Error returned by a client handle or by a backend while constructing one.
///
/// The wrappers in [`crate::plugin`] never translate these; whatever the
/// backend returns is what the caller sees.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Customize(#[from] CustomizeError),

    #[error("{operation} is not supported by this backend")]
    Unsupported { operation: &'static str },

    #[error("file is not open")]
    NotOpen,

    #[error("file is already open")]
    AlreadyOpen,

    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    #[error("unsupported URL scheme {scheme:?}")]
    UnsupportedScheme { scheme: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn unsupported(operation: &'static str) -> Self {
        ClientError::Unsupported { operation }
    }
}
