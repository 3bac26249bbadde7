//! Construction argument marshalling.

use std::time::Duration;

use serde_json::json;
use xnacos_rs::{HostError, NacosParams};

#[test]
fn parses_script_object() {
    let params = NacosParams::from_value(&json!({
        "ipAddr": "127.0.0.1",
        "port": 8848,
        "username": "nacos",
        "password": "nacos",
        "namespaceId": "public",
        "group": "pay"
    }))
    .unwrap();
    assert_eq!(params.ip_addr, "127.0.0.1");
    assert_eq!(params.namespace_id, "public");

    let config = params.into_config();
    assert_eq!(config.authority(), "127.0.0.1:8848");
    assert_eq!(config.username, "nacos");
    assert_eq!(config.group, "pay");
    assert_eq!(config.context_path, "/nacos");
}

#[test]
fn missing_fields_default() {
    let params = NacosParams::from_value(&json!({ "ipAddr": "10.1.1.1" })).unwrap();
    assert_eq!(
        params,
        NacosParams {
            ip_addr: "10.1.1.1".into(),
            ..NacosParams::default()
        }
    );
}

#[test]
fn timeout_and_context_path_are_optional_overrides() {
    let config = NacosParams::from_value(&json!({
        "ipAddr": "127.0.0.1",
        "port": 8848,
        "timeoutMs": 250,
        "contextPath": "/registry"
    }))
    .unwrap()
    .into_config();
    assert_eq!(config.timeout, Duration::from_millis(250));
    assert_eq!(config.context_path, "/registry");
}

#[test]
fn non_objects_are_rejected() {
    let err = NacosParams::from_value(&serde_json::Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument: not enough arguments");

    let err = NacosParams::from_value(&json!("127.0.0.1:8848")).unwrap_err();
    assert!(err.to_string().contains("got string"), "{err}");

    let err = NacosParams::from_value(&json!({ "port": "8848" })).unwrap_err();
    assert!(matches!(err, HostError::InvalidArgument(_)), "{err}");
}
