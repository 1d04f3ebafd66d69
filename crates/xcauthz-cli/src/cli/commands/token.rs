//! `xcauthz token` – report the discovered bearer token.

use anyhow::Result;
use xcauthz_core::config::{AuthzConfig, PluginSettings};
use xcauthz_core::token;

pub fn run_token(settings: &PluginSettings, show_token: bool) -> Result<()> {
    let cfg = AuthzConfig::from_env(settings);
    match token::discover(&cfg) {
        Some(found) => {
            println!("source:      {}", found.source);
            println!("fingerprint: {}", token::fingerprint(&found.token));
            if show_token {
                println!("token:       {}", found.token);
            }
        }
        None => println!("No bearer token found."),
    }
    Ok(())
}
