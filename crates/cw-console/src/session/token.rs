//! Auth token acquisition
//!
//! When a window is opened without a pre-issued token, one is requested
//! from the gateway's token endpoint using static credentials or the
//! host application's SSO token.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use cw_core::config::TunnelConfig;
use cw_core::{ConnectionError, ConnectionUrl, Credentials};

/// Where a session's auth token comes from
#[derive(Debug, Clone)]
pub enum AuthSource {
    /// Token already issued by the gateway
    Token(String),
    /// Gateway username/password, posted as a form
    Credentials(Credentials),
    /// SSO identity token, sent as the `Authorization` header
    Bearer(String),
    /// No credentials; the gateway decides
    Anonymous,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    auth_token: String,
}

/// Client for the `/api/tokens` endpoint
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    scheme: String,
}

impl TokenClient {
    pub fn new(config: &TunnelConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to build token client with {:?} timeout, using defaults: {}",
                    config.connect_timeout,
                    e
                );
                reqwest::Client::new()
            });
        Self {
            http,
            scheme: config.token_scheme.clone(),
        }
    }

    /// Token to open the tunnel with, fetching one if needed
    pub async fn resolve(
        &self,
        url: &ConnectionUrl,
        auth: &AuthSource,
    ) -> Result<String, ConnectionError> {
        match auth {
            AuthSource::Token(token) => Ok(token.clone()),
            other => self.fetch(url, other).await,
        }
    }

    /// Request a fresh token from the gateway
    pub async fn fetch(
        &self,
        url: &ConnectionUrl,
        auth: &AuthSource,
    ) -> Result<String, ConnectionError> {
        let endpoint = url.token_url(&self.scheme);
        let request = self
            .http
            .post(&endpoint)
            .header(ACCEPT, "application/json, text/plain, */*");

        let request = match auth {
            AuthSource::Credentials(creds) => {
                tracing::debug!("Requesting token for {} with credentials", url);
                request.form(&[
                    ("username", creds.username.as_str()),
                    ("password", creds.password.as_str()),
                ])
            }
            AuthSource::Bearer(token) => {
                tracing::debug!("Requesting token for {} with SSO token", url);
                request.header(AUTHORIZATION, token.as_str())
            }
            AuthSource::Anonymous | AuthSource::Token(_) => {
                tracing::warn!("Requesting token for {} without credentials", url);
                request
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ConnectionError::Token(e.to_string()))?
            .error_for_status()
            .map_err(|e| ConnectionError::Token(e.to_string()))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ConnectionError::Token(format!("invalid token response: {}", e)))?;

        Ok(body.auth_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP request with `status` and `body`, returning the raw
    /// request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("https://{}/console/#/client/1", addr), handle)
    }

    fn client() -> TokenClient {
        let config = TunnelConfig {
            token_scheme: "http".to_string(),
            ..TunnelConfig::default()
        };
        TokenClient::new(&config)
    }

    #[tokio::test]
    async fn test_pre_issued_token_skips_request() {
        let url = ConnectionUrl::parse("https://127.0.0.1:1/console").unwrap();
        let token = client()
            .resolve(&url, &AuthSource::Token("given".to_string()))
            .await
            .unwrap();
        assert_eq!(token, "given");
    }

    #[tokio::test]
    async fn test_fetch_with_credentials() {
        let (url, server) = serve_once("200 OK", r#"{"authToken":"abc","username":"student"}"#).await;
        let url = ConnectionUrl::parse(&url).unwrap();

        let token = client()
            .resolve(
                &url,
                &AuthSource::Credentials(Credentials::new("student", "p&w")),
            )
            .await
            .unwrap();
        assert_eq!(token, "abc");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /console/api/tokens"));
        assert!(request.ends_with("username=student&password=p%26w"));
    }

    #[tokio::test]
    async fn test_fetch_with_sso_token() {
        let (url, server) = serve_once("200 OK", r#"{"authToken":"xyz"}"#).await;
        let url = ConnectionUrl::parse(&url).unwrap();

        let token = client()
            .resolve(&url, &AuthSource::Bearer("id-token".to_string()))
            .await
            .unwrap();
        assert_eq!(token, "xyz");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("authorization: id-token"));
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let (url, _server) = serve_once("403 Forbidden", r#"{"message":"denied"}"#).await;
        let url = ConnectionUrl::parse(&url).unwrap();

        let err = client()
            .resolve(&url, &AuthSource::Credentials(Credentials::new("a", "b")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Token(_)));
    }

    #[tokio::test]
    async fn test_silent_gateway_hits_configured_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(socket);
        });

        let config = TunnelConfig {
            token_scheme: "http".to_string(),
            connect_timeout: std::time::Duration::from_millis(200),
            ..TunnelConfig::default()
        };
        let url = ConnectionUrl::parse(&format!("https://{}/console", addr)).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            TokenClient::new(&config).resolve(&url, &AuthSource::Credentials(Credentials::new("a", "b"))),
        )
        .await
        .expect("token request ignored the configured timeout");
        assert!(matches!(result, Err(ConnectionError::Token(_))));
    }
}
