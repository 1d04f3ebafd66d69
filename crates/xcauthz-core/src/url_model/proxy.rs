//! Placeholder host substitution.

use url::Url;

use crate::config::AuthzConfig;
use crate::error::CustomizeError;

/// Parses a configured replacement port. Anything but a positive `u16` is rejected.
pub fn parse_port(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

/// Points `url` at the configured proxy when its host is the placeholder.
///
/// Returns whether the host was replaced. The port is only replaced when the
/// configured value passes [`parse_port`]; otherwise the original port stays.
pub(crate) fn substitute_placeholder(
    url: &mut Url,
    config: &AuthzConfig,
) -> Result<bool, CustomizeError> {
    let Some(replacement) = config.replacement_host.as_deref() else {
        return Ok(false);
    };
    if url.host_str() != Some(config.placeholder_host.as_str()) {
        return Ok(false);
    }

    url.set_host(Some(replacement))
        .map_err(|source| CustomizeError::InvalidReplacementHost {
            host: replacement.to_string(),
            url: url.to_string(),
            source,
        })?;

    if let Some(raw) = config.replacement_port.as_deref() {
        match parse_port(raw) {
            Some(port) => {
                url.set_port(Some(port))
                    .map_err(|()| CustomizeError::InvalidReplacementPort {
                        port,
                        url: url.to_string(),
                    })?;
            }
            None => tracing::debug!(port = raw, "ignoring invalid replacement port"),
        }
    }

    tracing::debug!(host = replacement, "substituted placeholder host");
    Ok(true)
}
