//! Connection parameter validation and query group defaulting.

use std::time::Duration;

use xnacos_core::{ConnectionConfig, DiscoveryError, QueryParams, DEFAULT_GROUP};

fn assert_rejected(config: &ConnectionConfig) {
    let err = config.validate().unwrap_err();
    assert!(matches!(err, DiscoveryError::Configuration(_)), "{config:?}: {err}");
}

#[test]
fn valid_config_passes() {
    let config = ConnectionConfig::new("127.0.0.1", 8848)
        .with_credentials("nacos", "nacos")
        .with_namespace("public");
    config.validate().unwrap();
    assert_eq!(config.authority(), "127.0.0.1:8848");
    assert_eq!(config.context_path, "/nacos");
    assert_eq!(config.timeout, Duration::from_millis(5000));

    ConnectionConfig::new("nacos.internal", 80).validate().unwrap();
    ConnectionConfig::new("[::1]", 8848).validate().unwrap();
}

#[test]
fn malformed_addresses_are_rejected() {
    for addr in ["", "http://127.0.0.1", "127.0.0.1/nacos", "bad host", "a..b", "-x.com", "[::zz]"] {
        assert_rejected(&ConnectionConfig::new(addr, 8848));
    }
}

#[test]
fn port_must_fit_u16() {
    assert_rejected(&ConnectionConfig::new("127.0.0.1", 0));
    assert_rejected(&ConnectionConfig::new("127.0.0.1", 65_536));
    ConnectionConfig::new("127.0.0.1", 65_535).validate().unwrap();
}

#[test]
fn zero_timeout_and_relative_context_path_are_rejected() {
    assert_rejected(&ConnectionConfig::new("127.0.0.1", 8848).with_timeout(Duration::ZERO));
    assert_rejected(&ConnectionConfig::new("127.0.0.1", 8848).with_context_path("nacos"));
    ConnectionConfig::new("127.0.0.1", 8848)
        .with_context_path("/")
        .validate()
        .unwrap();
}

#[test]
fn empty_query_group_means_default_group() {
    assert_eq!(QueryParams::new("svc", "").effective_group(), DEFAULT_GROUP);
    assert_eq!(QueryParams::new("svc", "pay").effective_group(), "pay");
}
