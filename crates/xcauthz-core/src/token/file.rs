//! Bounded reads of token files.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::normalize::normalize_bytes;

/// Largest token file accepted; anything bigger yields no token.
pub const MAX_TOKEN_FILE_BYTES: usize = 16 * 1024;

/// Reads and normalizes a token file.
///
/// Returns `None` when the file cannot be opened or read, is larger than
/// [`MAX_TOKEN_FILE_BYTES`], or normalizes to nothing. Interrupted and
/// would-block reads are retried.
pub fn read_token_file(path: &Path) -> Option<String> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "token file not readable");
            return None;
        }
    };

    // One spare byte so an oversized file is detected rather than truncated.
    let mut buf = vec![0u8; MAX_TOKEN_FILE_BYTES + 1];
    let mut len = 0usize;
    loop {
        match file.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => {
                len += n;
                if len > MAX_TOKEN_FILE_BYTES {
                    tracing::debug!(
                        path = %path.display(),
                        limit = MAX_TOKEN_FILE_BYTES,
                        "token file too large, ignoring"
                    );
                    return None;
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                continue
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "token file read failed");
                return None;
            }
        }
    }

    let token = normalize_bytes(&buf[..len]);
    if token.is_empty() {
        tracing::debug!(path = %path.display(), "token file holds no usable token");
        return None;
    }
    Some(token)
}
