//! CLI command handlers, one per file.

mod cat;
mod completions;
mod customize;
mod handshake;
mod stat;
mod token;

pub use cat::run_cat;
pub use completions::run_completions;
pub use customize::run_customize;
pub use handshake::run_handshake;
pub use stat::run_stat;
pub use token::run_token;

use xcauthz_core::backend::HttpBackend;
use xcauthz_core::config::{ConfigSource, PluginSettings};
use xcauthz_core::ConnectionFactory;

/// Factory over the HTTP backend, reading token sources from the environment.
fn http_factory(settings: PluginSettings) -> ConnectionFactory<HttpBackend> {
    let backend = HttpBackend::new(settings.http());
    ConnectionFactory::new(backend, ConfigSource::Environment(settings))
}
