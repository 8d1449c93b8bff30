use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::types::ApiConfig;
use crate::error::{DblError, Result};

/// Authorized JSON transport for the DBL API.
pub struct DblHttp {
    http: Client,
}

impl DblHttp {
    pub fn new(token: &str, config: &ApiConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(token).map_err(|_| DblError::InvalidParams {
            reason: "API token contains characters not allowed in a header".into(),
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        if !config.verify_tls {
            warn!("TLS certificate verification is disabled for DBL requests");
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { http })
    }

    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<serde_json::Value> {
        let mut url = Url::parse(url)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        debug!(url = %url, "DBL GET request");
        self.send(url.as_str(), self.http.get(url.as_str())).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        debug!(url, "DBL POST request");
        self.send(url, self.http.post(url).json(body)).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<serde_json::Value> {
        let response = request.send().await?;
        let response = check_status(url, response).await?;

        let body = response.text().await?;
        trace!(url, body = %body, "DBL raw response");
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| DblError::WeirdResponse {
            reason: format!("invalid JSON from {url}: {e}"),
        })
    }
}

async fn check_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(DblError::Unauthorized),
        StatusCode::NOT_FOUND => Err(DblError::NotFound {
            resource: url.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            warn!(url, ?retry_after_secs, "Rate limited by DBL (429)");
            Err(DblError::RateLimited { retry_after_secs })
        }
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(DblError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
