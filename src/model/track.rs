use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Track tal como lo devuelve el nodo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Handle codificado, solo el nodo lo entiende
    pub encoded: String,
    pub info: TrackInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_info: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Box<RawValue>>,
}

/// Metadatos del track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub identifier: String,
    pub is_seekable: bool,
    pub author: String,
    /// Duración en milisegundos
    pub length: u64,
    pub is_stream: bool,
    /// Posición actual en milisegundos
    pub position: u64,
    pub title: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub isrc: Option<String>,
    pub source_name: String,
}

impl Track {
    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn author(&self) -> &str {
        &self.info.author
    }

    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.info.length)
    }
}
