mod common;

use clap::Parser;
use common::client;
use licensegate_server::Config;
use licensegate_server::config::{DEFAULT_ADMIN_SECRET, DEFAULT_SECRET};
use licensegate_store::EntitlementStore;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Parses flags with both remote settings pinned empty so the process
/// environment cannot select the remote backend behind a test's back.
fn parse_local(extra: &[&str]) -> Config {
    let mut args = vec!["licensegate", "--redis-url=", "--redis-token="];
    args.extend_from_slice(extra);
    Config::try_parse_from(args).unwrap()
}

#[test]
fn listen_addr_combines_bind_and_port() {
    let cfg = parse_local(&["--port", "4000", "--bind", "127.0.0.1"]);
    assert_eq!(
        cfg.listen_addr(),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000)
    );
}

#[test]
fn seed_clients_are_trimmed_deduped_and_sorted() {
    let cfg = parse_local(&["--enabled-clients", " zeta, acme ,, acme,  "]);
    assert_eq!(cfg.seed_clients(), vec![client("acme"), client("zeta")]);
}

#[test]
fn empty_seed_list() {
    let cfg = parse_local(&["--enabled-clients", ""]);
    assert!(cfg.seed_clients().is_empty());
}

#[test]
fn remote_needs_both_url_and_token() {
    assert!(parse_local(&[]).remote().is_none());

    let url_only = Config::try_parse_from([
        "licensegate",
        "--redis-url",
        "https://example.upstash.io",
        "--redis-token=",
    ])
    .unwrap();
    assert!(url_only.remote().is_none());

    let both = Config::try_parse_from([
        "licensegate",
        "--redis-url",
        " https://example.upstash.io ",
        "--redis-token",
        "t",
        "--remote-timeout-ms",
        "1500",
    ])
    .unwrap();
    let remote = both.remote().unwrap();
    assert_eq!(remote.url, "https://example.upstash.io");
    assert_eq!(remote.timeout, Duration::from_millis(1500));
}

#[test]
fn cache_ttl_in_milliseconds() {
    let cfg = parse_local(&["--cache-ttl-ms", "250"]);
    assert_eq!(cfg.cache_ttl(), Duration::from_millis(250));
}

#[test]
fn default_secrets_are_reported() {
    let cfg = parse_local(&[
        "--secret",
        DEFAULT_SECRET,
        "--admin-secret",
        DEFAULT_ADMIN_SECRET,
    ]);
    assert_eq!(cfg.default_secrets_in_use(), vec!["SECRET", "ADMIN_SECRET"]);

    let cfg = parse_local(&["--secret", "a", "--admin-secret", "b"]);
    assert!(cfg.default_secrets_in_use().is_empty());
}

#[test]
fn debug_redacts_secrets() {
    let cfg = Config::try_parse_from([
        "licensegate",
        "--secret",
        "signing-s3cret",
        "--admin-secret",
        "admin-s3cret",
        "--redis-url",
        "https://example.upstash.io",
        "--redis-token",
        "rest-s3cret",
    ])
    .unwrap();
    let debug = format!("{cfg:?}");
    assert!(debug.contains("example.upstash.io"));
    assert!(!debug.contains("signing-s3cret"));
    assert!(!debug.contains("admin-s3cret"));
    assert!(!debug.contains("rest-s3cret"));
}

#[test]
fn empty_signing_secret_is_rejected() {
    let cfg = parse_local(&["--secret="]);
    assert!(cfg.token_codec().is_err());
}

#[tokio::test]
async fn local_backend_prefers_snapshot_over_seed() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("enabled.json");
    std::fs::write(&data_file, r#"{"clients":["from-file"]}"#).unwrap();

    let cfg = parse_local(&[
        "--enabled-clients",
        "from-seed",
        "--data-file",
        data_file.to_str().unwrap(),
    ]);
    let store = cfg.build_store().await.unwrap();
    assert_eq!(store.backend_name(), "local");
    assert!(store.contains(&client("from-file")).await.unwrap());
    assert!(!store.contains(&client("from-seed")).await.unwrap());
}

#[tokio::test]
async fn local_backend_starts_from_seed_without_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("missing.json");

    let cfg = parse_local(&[
        "--enabled-clients",
        "acme",
        "--data-file",
        data_file.to_str().unwrap(),
    ]);
    let state = cfg.build_state().await.unwrap();
    assert!(state.service.check_license("acme").await.unwrap().is_licensed());
}

#[tokio::test]
async fn remote_backend_is_seeded_at_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer t"))
        .and(body_json(json!(["SADD", "enabled", "acme", "globex"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 2})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!(["SISMEMBER", "enabled", "acme"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let cfg = Config::try_parse_from([
        "licensegate",
        "--redis-url",
        uri.as_str(),
        "--redis-token",
        "t",
        "--enabled-clients",
        "globex,acme",
    ])
    .unwrap();
    let store = cfg.build_store().await.unwrap();
    assert_eq!(store.backend_name(), "upstash");

    // Second read is served by the cache.
    assert!(store.contains(&client("acme")).await.unwrap());
    assert!(store.contains(&client("acme")).await.unwrap());
}

#[tokio::test]
async fn remote_seed_failure_fails_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "WRONGPASS"})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let cfg = Config::try_parse_from([
        "licensegate",
        "--redis-url",
        uri.as_str(),
        "--redis-token",
        "t",
        "--enabled-clients",
        "acme",
    ])
    .unwrap();
    assert!(cfg.build_store().await.is_err());
}
