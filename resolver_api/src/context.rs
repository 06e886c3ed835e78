use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use sys_locale::get_locale;

use crate::{async_trait, RequestConfig, ResolveError, UpstreamApi};

#[derive(Clone)]
pub struct ResolveContext {
    pub http: reqwest::Client,
    pub locales: Vec<String>,
    pub config: Arc<RequestConfig>,
}

impl ResolveContext {
    pub fn new(config: RequestConfig) -> Result<ResolveContext, ResolveError> {
        let locale = get_locale()
            .filter(|l| l != "c" && l != "C")
            .unwrap_or_else(|| "en-US".to_string());

        let locales = if locale.len() > 2 {
            vec![locale.clone(), locale[0..2].to_string()]
        } else {
            vec![locale]
        };

        ResolveContext::new_with_locale(config, locales)
    }

    pub fn new_with_locale(
        config: RequestConfig,
        locales: Vec<String>,
    ) -> Result<ResolveContext, ResolveError> {
        Ok(ResolveContext {
            http: build_http(&locales, &config)?,
            locales,
            config: Arc::new(config),
        })
    }

    /// `<api_base><percent-encoded target>`, behind the proxy if it's switched on.
    pub fn endpoint_for(&self, target: &str) -> String {
        let endpoint = format!("{}{}", self.config.api_base, urlencoding::encode(target));
        self.proxied(&endpoint)
    }

    pub fn proxied(&self, url: &str) -> String {
        if self.config.use_cors_proxy {
            format!("{}{}", self.config.cors_proxy, url)
        } else {
            url.to_string()
        }
    }

    pub async fn send_request(
        &self,
        resource_name: &str,
        request: RequestBuilder,
    ) -> Result<Response, ResolveError> {
        let response = request.send().await?;
        tracing::debug!(
            resource = resource_name,
            status = response.status().as_u16(),
            "upstream responded"
        );
        Ok(response)
    }

    /// Fetches and parses the upstream payload for `target`.
    /// One request, no retry: the user re-triggers if it fails.
    pub async fn get_payload(&self, target: &str) -> Result<Value, ResolveError> {
        let endpoint = self.endpoint_for(target);
        tracing::debug!(%endpoint, "requesting payload");

        let mut request = self
            .http
            .get(&endpoint)
            .timeout(self.config.timeout())
            .header(header::ACCEPT, "application/json");
        if let Some(key) = self.config.api_key() {
            request = request.header(header::AUTHORIZATION, key);
        }

        let response = self.send_request("payload", request).await?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %raw, "upstream returned an error status");
            return Err(ResolveError::Http {
                status: status.as_u16(),
                raw,
            });
        }

        let declared_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json") || ct.contains("text/json"))
            .unwrap_or(false);
        let body = response.bytes().await?;
        parse_payload(&body, declared_json)
    }
}

#[async_trait]
impl UpstreamApi for ResolveContext {
    async fn fetch_payload(&self, target: &str) -> Result<Value, ResolveError> {
        self.get_payload(target).await
    }
}

/// Content type is only a hint: a JSON body served as `text/html` is still accepted.
pub(crate) fn parse_payload(body: &[u8], declared_json: bool) -> Result<Value, ResolveError> {
    if declared_json {
        match serde_json::from_slice(body) {
            Ok(v) => return Ok(v),
            Err(e) => tracing::debug!("declared JSON did not parse ({e}), retrying as text"),
        }
    }
    let text = String::from_utf8_lossy(body);
    serde_json::from_str(text.trim_start_matches('\u{feff}')).map_err(|_| {
        tracing::warn!(raw = %text, "upstream body is not JSON");
        ResolveError::Parse {
            raw: text.into_owned(),
        }
    })
}

pub fn build_http(
    locales: &[String],
    config: &RequestConfig,
) -> Result<reqwest::Client, ResolveError> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_str(
            &locales
                .iter()
                .enumerate()
                .map(|(i, l)| {
                    if i != 0 {
                        format!("{l};q={}", 1.0 - (i as f32 / 10.0))
                    } else {
                        l.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
        )
        .map_err(|e| ResolveError::Client(e.to_string()))?,
    );

    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| concat!("vidfetch/", env!("CARGO_PKG_VERSION")).to_string());

    reqwest::ClientBuilder::new()
        .default_headers(headers)
        .user_agent(user_agent)
        // the overall deadline is set per request in `get_payload`
        .connect_timeout(config.timeout())
        .build()
        .map_err(|e| ResolveError::Client(e.to_string()))
}
