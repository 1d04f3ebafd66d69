//! `xcauthz handshake [tag]` – check a credential against the `unix` protocol.

use anyhow::Result;
use xcauthz_core::sec_unix::UnixProtocol;

pub fn run_handshake(tag: Option<&str>, host: &str) -> Result<()> {
    let proto = UnixProtocol::new(host);
    match proto.authenticate(tag.map(str::as_bytes)) {
        Ok(entity) => {
            println!(
                "accepted: protocol={} name={} host={}",
                entity.protocol, entity.name, entity.host
            );
            Ok(())
        }
        Err(err) => anyhow::bail!("{} (errno {})", err, err.errno()),
    }
}
