//! Minimal HTTP seam shared by the weather provider and the location lookup.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::error::FetchError;

/// Status and body of a completed GET, whatever the status was.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Issue one GET. Only transport-level failures are errors.
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawResponse, FetchError> {
        let res = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| {
                FetchError::Network(format!("failed to read response body: {}", e.without_url()))
            })?;

        Ok(RawResponse { status, body })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }

    #[tokio::test]
    async fn refused_connection_is_network_error_without_query_string() {
        let transport = ReqwestTransport::new();
        let params = [("appid", "HIDDEN_KEY_42".to_string())];

        let err = transport.get("http://127.0.0.1:1/weather", &params).await.unwrap_err();

        match err {
            FetchError::Network(msg) => assert!(!msg.contains("HIDDEN_KEY_42"), "{msg}"),
            other => panic!("expected a network error, got {other:?}"),
        }
    }

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse { status: 200, body: String::new() }.is_success());
        assert!(!RawResponse { status: 404, body: String::new() }.is_success());
    }
}
