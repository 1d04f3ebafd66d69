//! CLI for inspecting token discovery, URL rewriting and authorized access.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use xcauthz_core::config;

use commands::{run_cat, run_completions, run_customize, run_handshake, run_stat, run_token};

/// Top-level CLI for xcauthz.
#[derive(Debug, Parser)]
#[command(name = "xcauthz")]
#[command(about = "xcauthz: bearer-token authorization for data-access URLs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the effective URL for a request URL.
    Customize {
        url: String,

        /// Print the bearer token instead of redacting it.
        #[arg(long)]
        show_token: bool,
    },

    /// Show which bearer token would be used and where it came from.
    Token {
        /// Print the token itself, not just its fingerprint.
        #[arg(long)]
        show_token: bool,
    },

    /// Open a remote file through the authorization layer and print its metadata.
    Stat {
        /// http, https, dav or davs URL.
        url: String,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a remote file to stdout.
    Cat {
        /// http, https, dav or davs URL.
        url: String,
    },

    /// Run the legacy `unix` handshake check against a credential tag.
    Handshake {
        /// Credential blob; omit to authenticate without credentials.
        tag: Option<String>,

        /// Peer host name recorded in the resulting identity.
        #[arg(long, default_value = "localhost")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        if let CliCommand::Completions { shell } = &cli.command {
            return run_completions(*shell);
        }

        let settings = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", settings);

        match cli.command {
            CliCommand::Customize { url, show_token } => run_customize(&settings, &url, show_token)?,
            CliCommand::Token { show_token } => run_token(&settings, show_token)?,
            CliCommand::Stat { url, json } => run_stat(settings, &url, json)?,
            CliCommand::Cat { url } => run_cat(settings, &url)?,
            CliCommand::Handshake { tag, host } => run_handshake(tag.as_deref(), &host)?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
