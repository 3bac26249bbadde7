//! Nacos naming client over the v1 open API: tokio + hyper HTTP/1.1.
//! Login token is cached per client; instance lists are fetched fresh on every query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::balancer::choose_weighted;
use crate::instance::InstanceList;
use crate::naming::{ClientFactory, NamingClient};
use crate::{ConnectionConfig, ConnectivityExt, DiscoveryError, Instance, QueryParams};

/// Builds `NacosNamingClient`s. Default factory of `ClientRegistry`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NacosClientFactory;

impl ClientFactory for NacosClientFactory {
    fn create(&self, config: &ConnectionConfig) -> Result<Arc<dyn NamingClient>, DiscoveryError> {
        Ok(Arc::new(NacosNamingClient::new(config.clone())?))
    }
}

/// Token lifetime Nacos servers issue by default (`nacos.core.auth.default.token.expire.seconds`).
const DEFAULT_TOKEN_TTL_SECS: u64 = 18_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    token_ttl: u64,
}

struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Session with one Nacos cluster. Construction only validates; the first query contacts the server.
pub struct NacosNamingClient {
    config: ConnectionConfig,
    token: Mutex<Option<AccessToken>>,
}

impl NacosNamingClient {
    pub fn new(config: ConnectionConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;
        Ok(Self {
            config,
            token: Mutex::new(None),
        })
    }

    fn api_path(&self, suffix: &str) -> String {
        format!("{}{}", self.config.context_path.trim_end_matches('/'), suffix)
    }

    /// One request on a fresh connection, bounded by the configured timeout.
    async fn send(&self, req: Request<Full<Bytes>>) -> Result<(StatusCode, Bytes), DiscoveryError> {
        let authority = self.config.authority();
        let exchange = async {
            let stream = TcpStream::connect(authority.as_str())
                .await
                .or_connectivity("connect to", &authority)?;
            let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
                .await
                .or_connectivity("handshake with", &authority)?;
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "nacos connection closed with error");
                }
            });
            let resp = sender
                .send_request(req)
                .await
                .or_connectivity("request to", &authority)?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .or_connectivity("read response from", &authority)?
                .to_bytes();
            Ok::<_, DiscoveryError>((status, body))
        };
        tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| {
                DiscoveryError::Connectivity(format!(
                    "request to {} timed out after {}ms",
                    authority,
                    self.config.timeout.as_millis()
                ))
            })?
    }

    fn request(&self, method: Method, uri: String, body: Bytes) -> Result<Request<Full<Bytes>>, DiscoveryError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(HOST, self.config.authority());
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        builder
            .body(Full::new(body))
            .map_err(|e| DiscoveryError::Configuration(e.to_string()))
    }

    async fn login(&self) -> Result<AccessToken, DiscoveryError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &self.config.username)
            .append_pair("password", &self.config.password)
            .finish();
        let req = self.request(Method::POST, self.api_path("/v1/auth/login"), Bytes::from(form))?;
        let (status, body) = self.send(req).await?;
        if !status.is_success() {
            return Err(DiscoveryError::Connectivity(format!(
                "login failed with status {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body)
            )));
        }
        let login: LoginResponse = serde_json::from_slice(&body)?;
        // Servers that omit the TTL (or send 0) get the Nacos default instead of a login per query.
        let ttl_secs = if login.token_ttl == 0 {
            DEFAULT_TOKEN_TTL_SECS
        } else {
            login.token_ttl
        };
        // Refresh once 90% of the TTL has passed.
        let refresh_after = Duration::from_millis(ttl_secs.saturating_mul(900));
        tracing::debug!(server = %self.config.authority(), ttl_secs, "nacos access token refreshed");
        Ok(AccessToken {
            value: login.access_token,
            refresh_at: Instant::now() + refresh_after,
        })
    }

    /// Cached token, logging in when missing or near expiry. `None` when no username is configured.
    async fn access_token(&self) -> Result<Option<String>, DiscoveryError> {
        if self.config.username.is_empty() {
            return Ok(None);
        }
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(Some(token.value.clone()));
            }
        }
        let fresh = self.login().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(Some(value))
    }

    async fn list_instances(&self, params: &QueryParams) -> Result<Vec<Instance>, DiscoveryError> {
        let token = self.access_token().await?;
        // The serializer is not Send; it must be gone before the next await.
        let uri = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query
                .append_pair("serviceName", &params.service_name)
                .append_pair("groupName", params.effective_group())
                .append_pair("namespaceId", &self.config.namespace_id)
                .append_pair("healthyOnly", "false");
            if let Some(token) = token.as_deref() {
                query.append_pair("accessToken", token);
            }
            format!("{}?{}", self.api_path("/v1/ns/instance/list"), query.finish())
        };
        let req = self.request(Method::GET, uri, Bytes::new())?;
        let (status, body) = self.send(req).await?;
        if !status.is_success() {
            return Err(DiscoveryError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        let list: InstanceList = serde_json::from_slice(&body)?;
        Ok(list.hosts)
    }
}

#[async_trait]
impl NamingClient for NacosNamingClient {
    async fn select_one_healthy_instance(&self, params: &QueryParams) -> Result<Instance, DiscoveryError> {
        let hosts = self.list_instances(params).await?;
        let selectable: Vec<Instance> = hosts.into_iter().filter(Instance::is_selectable).collect();
        let chosen = {
            let mut rng = rand::thread_rng();
            choose_weighted(&selectable, &mut rng).cloned()
        };
        chosen.ok_or_else(|| DiscoveryError::NoHealthyInstance(params.service_name.clone()))
    }

    async fn select_all_instances(&self, params: &QueryParams) -> Result<Vec<Instance>, DiscoveryError> {
        self.list_instances(params).await
    }
}
