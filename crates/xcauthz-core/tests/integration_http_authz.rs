//! End-to-end: handles from a `ConnectionFactory<HttpBackend>` talk to a
//! local HTTP server with the bearer token attached to every request.

mod common;

use std::path::Path;

use xcauthz_core::backend::HttpBackend;
use xcauthz_core::client::{Access, FileClient, FileSystemClient, MkDirFlags, OpenFlags};
use xcauthz_core::config::{AuthzConfig, ConfigSource};
use xcauthz_core::{ClientError, ConnectionFactory};

fn config(dir: &Path, token: Option<&str>) -> AuthzConfig {
    AuthzConfig {
        bearer_token: token.map(str::to_string),
        fallback_token_dir: dir.to_path_buf(),
        euid: None,
        ..AuthzConfig::default()
    }
}

#[test]
fn file_open_read_and_stat_carry_token() {
    let server = common::http_server::start();
    server.insert("/data/f", b"hello authz world");
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(config(dir.path(), Some("T1"))),
    );

    let url = format!("{}/data/f", server.base());
    let mut file = factory.create_file(&url).unwrap();
    file.open(&url, OpenFlags::READ, Access::NONE, 5).unwrap();

    assert_eq!(file.stat(false, 5).unwrap().size, 17);
    let mut buf = [0u8; 5];
    assert_eq!(file.read(6, &mut buf, 5).unwrap(), 5);
    assert_eq!(&buf, b"authz");
    assert_eq!(file.read(100, &mut buf, 5).unwrap(), 0);
    file.close(5).unwrap();

    let requests = server.requests();
    assert!(!requests.is_empty());
    for line in &requests {
        assert!(line.ends_with("/data/f?authz=Bearer%20T1"), "{line}");
    }
}

#[test]
fn token_from_file_is_trimmed() {
    let server = common::http_server::start();
    server.insert("/f", b"x");
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("tok");
    std::fs::write(&token_file, "  T2\n").unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(AuthzConfig {
            bearer_token_file: Some(token_file),
            ..config(dir.path(), None)
        }),
    );

    let url = format!("{}/f", server.base());
    let mut file = factory.create_file(&url).unwrap();
    file.open(&url, OpenFlags::READ, Access::NONE, 5).unwrap();
    assert_eq!(server.requests(), vec!["HEAD /f?authz=Bearer%20T2"]);
}

#[test]
fn placeholder_host_routed_to_proxy() {
    let server = common::http_server::start();
    server.insert("/f", b"proxied");
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(AuthzConfig {
            replacement_host: Some("127.0.0.1".to_string()),
            replacement_port: Some(server.port().to_string()),
            ..config(dir.path(), None)
        }),
    );

    let mut file = factory.create_file("http://xcache:1094/f").unwrap();
    file.open("http://xcache:1094/f", OpenFlags::READ, Access::NONE, 5)
        .unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(file.read(0, &mut buf, 5).unwrap(), 7);
    assert_eq!(&buf[..7], b"proxied");
    assert_eq!(server.requests(), vec!["HEAD /f", "GET /f"]);
}

#[test]
fn caller_authz_is_kept() {
    let server = common::http_server::start();
    server.insert("/f", b"x");
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(config(dir.path(), Some("T1"))),
    );

    let url = format!("{}/f?authz=mine", server.base());
    let mut file = factory.create_file(&url).unwrap();
    file.open(&url, OpenFlags::READ, Access::NONE, 5).unwrap();
    assert_eq!(server.requests(), vec!["HEAD /f?authz=mine"]);
}

#[test]
fn missing_file_is_not_found() {
    let server = common::http_server::start();
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(config(dir.path(), Some("T1"))),
    );

    let url = format!("{}/missing", server.base());
    let mut file = factory.create_file(&url).unwrap();
    let err = file
        .open(&url, OpenFlags::READ, Access::NONE, 5)
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert!(!file.is_open());
}

#[test]
fn filesystem_operations_carry_token() {
    let server = common::http_server::start();
    server.insert("/data/a", b"abc");
    let dir = tempfile::tempdir().unwrap();
    let factory = ConnectionFactory::new(
        HttpBackend::default(),
        ConfigSource::Fixed(config(dir.path(), Some("T1"))),
    );

    let fs = factory
        .create_filesystem(&format!("{}/", server.base()))
        .unwrap();
    assert_eq!(fs.stat("/data/a", 5).unwrap().size, 3);
    fs.mkdir("/new/sub", MkDirFlags::MAKE_PATH, Access::UR, 5)
        .unwrap();
    assert!(server.contains("/new/sub"));
    fs.mv("/data/a", "/data/b", 5).unwrap();
    assert!(server.contains("/data/b"));
    fs.rm("/data/b", 5).unwrap();
    assert!(!server.contains("/data/b"));
    assert!(matches!(
        fs.stat("/data/b", 5),
        Err(ClientError::NotFound { .. })
    ));

    for line in server.requests() {
        assert!(line.ends_with("?authz=Bearer%20T1"), "{line}");
    }
}
