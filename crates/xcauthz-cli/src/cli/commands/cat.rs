//! `xcauthz cat <url>` – stream a remote file to stdout.

use anyhow::{Context, Result};
use std::io::{self, Write};
use xcauthz_core::client::{Access, FileClient, OpenFlags};
use xcauthz_core::config::PluginSettings;
use xcauthz_core::url_model;

use super::http_factory;

const CHUNK: usize = 1024 * 1024;

pub fn run_cat(settings: PluginSettings, url: &str) -> Result<()> {
    let factory = http_factory(settings);
    let mut file = factory.create_file(url)?;
    file.open(url, OpenFlags::READ, Access::NONE, 0)
        .with_context(|| format!("failed to open {}", url_model::redact(url)))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = vec![0u8; CHUNK];
    let mut offset = 0u64;
    loop {
        let n = file.read(offset, &mut buf, 0)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        offset += n as u64;
    }
    out.flush()?;
    file.close(0)?;
    tracing::debug!(bytes = offset, "cat finished");
    Ok(())
}
