//! Transport seam between the sync controller and the catalog server.
//!
//! # Invariants
//! - `send` fails only when no HTTP response was received; every status
//!   code, including 4xx/5xx, is a successful transport round trip.

use crate::error::TransportError;
use log::debug;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            body: None,
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: HttpMethod::Delete,
            url,
            body: None,
        }
    }

    pub fn with_json(method: HttpMethod, url: Url, body: Value) -> Self {
        Self {
            method,
            url,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

pub trait CatalogTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Blocking HTTP transport. Must not be driven from inside an async runtime.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { client })
    }
}

impl CatalogTransport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.clone();
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(classify_send_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(classify_send_error)?;
        debug!(
            "event=http_send module=client method={} url={} status={status}",
            request.method.as_str(),
            request.url
        );
        Ok(ApiResponse { status, body })
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Unreachable(err.to_string())
    }
}
