//! # REST Module
//!
//! Transport seam between the queue operations and the Lavalink node.
//!
//! The queue operations never talk to reqwest directly. They build a
//! [`NodeRequest`], hand it to a [`RestClient`] bound to one node, and get
//! back a fully buffered [`NodeResponse`]. Connection pooling, auth headers
//! and base URLs are the transport's business.
//!
//! ## Implementations
//!
//! - [`NodeRestClient`] - reqwest client for a real node
//! - `MockRestClient` - generated by mockall for unit tests
//!
//! ## Cancellation
//!
//! Every call runs under a [`RequestContext`]: a timeout plus a
//! [`CancellationToken`]. When either fires the request future is dropped,
//! which aborts the in-flight HTTP request.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::QueueError;

pub use http::NodeRestClient;

/// Prefijo de la API versionada del nodo
pub const API_PREFIX: &str = "/v4";

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Timeout por defecto de cada petición
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Petición HTTP contra el nodo, relativa a su URL base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub content_type: Option<&'static str>,
    pub body: Option<Bytes>,
}

impl NodeRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            content_type: None,
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serializa el cuerpo como JSON antes de emitir la petición
    pub fn with_json<T: serde::Serialize + ?Sized>(mut self, body: &T) -> Result<Self, QueueError> {
        let bytes = serde_json::to_vec(body).map_err(QueueError::Encode)?;
        self.content_type = Some(CONTENT_TYPE_JSON);
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }
}

/// Respuesta del nodo con el cuerpo ya leído
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl NodeResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT, Bytes::new())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 204 o cuerpo vacío
    pub fn is_empty(&self) -> bool {
        self.status == StatusCode::NO_CONTENT || self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Transporte HTTP ligado a un nodo
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Ejecuta la petición y devuelve la respuesta completa, sea cual sea el status
    async fn execute(&self, request: NodeRequest) -> anyhow::Result<NodeResponse>;
}

/// Contexto de ejecución: timeout y cancelación cooperativa
#[derive(Debug, Clone)]
pub struct RequestContext {
    timeout: Duration,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Ejecuta `fut` hasta que termine, expire el timeout o se cancele el token
    pub async fn run<F, T>(&self, fut: F) -> Result<T, QueueError>
    where
        F: Future<Output = Result<T, QueueError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(QueueError::Cancelled),
            result = tokio::time::timeout(self.timeout, fut) => match result {
                Ok(inner) => inner,
                Err(_) => Err(QueueError::Timeout(self.timeout)),
            },
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
