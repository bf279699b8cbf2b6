use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use super::{NodeRequest, NodeResponse, RestClient};
use crate::config::NodeConfig;

/// Cliente reqwest ligado a un nodo Lavalink
#[derive(Debug, Clone)]
pub struct NodeRestClient {
    client: reqwest::Client,
    base_url: Url,
    password: HeaderValue,
}

impl NodeRestClient {
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let mut password = HeaderValue::from_str(&config.password)
            .context("La contraseña de Lavalink no es un header válido")?;
        password.set_sensitive(true);

        let client = reqwest::Client::builder()
            .user_agent(concat!("lavaqueue/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Error al crear cliente HTTP")?;

        let base_url = config.base_url()?;
        info!("🎼 Cliente REST para nodo {}", base_url);

        Ok(Self {
            client,
            base_url,
            password,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Ruta inválida: {}", path))
    }

    /// Arma la petición reqwest con auth, query, content type y cuerpo
    fn build_request(&self, request: NodeRequest) -> Result<reqwest::Request> {
        let url = self.endpoint(&request.path)?;

        let mut builder = self
            .client
            .request(request.method, url)
            .header(AUTHORIZATION, self.password.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        builder.build().context("Error armando la petición al nodo")
    }

    /// Versión del nodo, usada como health check
    pub async fn version(&self) -> Result<String> {
        let request = self.build_request(NodeRequest::new(reqwest::Method::GET, "/version"))?;
        let response = self
            .client
            .execute(request)
            .await
            .context("Error en request a /version")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response.text().await.context("Error leyendo versión del nodo")
    }
}

#[async_trait]
impl RestClient for NodeRestClient {
    async fn execute(&self, request: NodeRequest) -> Result<NodeResponse> {
        let request = self.build_request(request)?;
        debug!("➡️ {} {}", request.method(), request.url());

        let response = self
            .client
            .execute(request)
            .await
            .context("Error en request al nodo")?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Error leyendo cuerpo de la respuesta")?;

        debug!("⬅️ {} ({} bytes)", status, body.len());
        Ok(NodeResponse { status, body })
    }
}
