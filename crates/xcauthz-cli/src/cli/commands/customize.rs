//! `xcauthz customize <url>` – print the effective URL.

use anyhow::Result;
use xcauthz_core::config::{AuthzConfig, PluginSettings};
use xcauthz_core::url_model;

pub fn run_customize(settings: &PluginSettings, url: &str, show_token: bool) -> Result<()> {
    let cfg = AuthzConfig::from_env(settings);
    let effective = url_model::customize(url, &cfg)?;
    if show_token {
        println!("{}", effective);
    } else {
        println!("{}", url_model::redact(&effective));
    }
    Ok(())
}
