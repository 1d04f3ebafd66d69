//! Bearer token discovery.
//!
//! Candidates come from the environment or from token files and are all
//! treated as untrusted: each one goes through [`normalize`] before use, and
//! the first non-empty result wins. Nothing is cached; every call re-reads
//! its sources so a rotated token file takes effect on the next request.

mod discovery;
mod file;
mod normalize;

pub use discovery::{discover, discover_token, DiscoveredToken, TokenSource};
pub use file::{read_token_file, MAX_TOKEN_FILE_BYTES};
pub use normalize::{normalize, normalize_bytes};

use sha2::{Digest, Sha256};

/// Short, non-reversible identifier for a token, safe to log.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}
