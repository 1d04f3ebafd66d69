//! `xcauthz stat <url>` – open a file and print its metadata.

use anyhow::{Context, Result};
use xcauthz_core::client::{Access, FileClient, OpenFlags};
use xcauthz_core::config::PluginSettings;
use xcauthz_core::url_model;

use super::http_factory;

pub fn run_stat(settings: PluginSettings, url: &str, json: bool) -> Result<()> {
    let factory = http_factory(settings);
    let mut file = factory.create_file(url)?;
    file.open(url, OpenFlags::READ, Access::NONE, 0)
        .with_context(|| format!("failed to open {}", url_model::redact(url)))?;
    let info = file.stat(false, 0)?;
    file.close(0)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("path: {}", info.id);
        println!("size: {}", info.size);
        println!("etag: {}", info.etag.as_deref().unwrap_or("-"));
    }
    Ok(())
}
