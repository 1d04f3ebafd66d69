//! Tests for customize, token and handshake.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_customize() {
    match parse(&["xcauthz", "customize", "root://xcache:1094//store/f"]) {
        CliCommand::Customize { url, show_token } => {
            assert_eq!(url, "root://xcache:1094//store/f");
            assert!(!show_token);
        }
        _ => panic!("expected Customize"),
    }
}

#[test]
fn cli_parse_customize_show_token() {
    match parse(&["xcauthz", "customize", "https://h/f", "--show-token"]) {
        CliCommand::Customize { show_token, .. } => assert!(show_token),
        _ => panic!("expected Customize with --show-token"),
    }
}

#[test]
fn cli_parse_customize_requires_url() {
    assert!(Cli::try_parse_from(["xcauthz", "customize"]).is_err());
}

#[test]
fn cli_parse_token() {
    match parse(&["xcauthz", "token"]) {
        CliCommand::Token { show_token } => assert!(!show_token),
        _ => panic!("expected Token"),
    }
}

#[test]
fn cli_parse_handshake_defaults() {
    match parse(&["xcauthz", "handshake"]) {
        CliCommand::Handshake { tag, host } => {
            assert!(tag.is_none());
            assert_eq!(host, "localhost");
        }
        _ => panic!("expected Handshake"),
    }
}

#[test]
fn cli_parse_handshake_with_tag_and_host() {
    match parse(&["xcauthz", "handshake", "unix", "--host", "client.example.org"]) {
        CliCommand::Handshake { tag, host } => {
            assert_eq!(tag.as_deref(), Some("unix"));
            assert_eq!(host, "client.example.org");
        }
        _ => panic!("expected Handshake"),
    }
}

#[test]
fn handshake_rejects_wrong_tag() {
    let err = crate::cli::commands::run_handshake(Some("xxxx"), "h").unwrap_err();
    assert!(err.to_string().contains("protocol id mismatch"));
    assert!(crate::cli::commands::run_handshake(Some("unix"), "h").is_ok());
}
