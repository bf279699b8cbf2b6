use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

use super::track::Track;

/// Modo de repetición de la cola
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueMode {
    Normal,
    RepeatTrack,
    RepeatQueue,
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueMode::Normal => "normal",
            QueueMode::RepeatTrack => "repeat_track",
            QueueMode::RepeatQueue => "repeat_queue",
        };
        f.write_str(name)
    }
}

/// Snapshot de la cola de un guild en el momento de la petición
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    #[serde(rename = "type")]
    pub mode: QueueMode,
    pub tracks: Vec<Track>,
}

impl Queue {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Track a encolar: handle codificado más datos de usuario opacos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTrack {
    pub encoded: String,
    #[serde(rename = "user_data", default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Box<RawValue>>,
}

impl QueueTrack {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self {
            encoded: encoded.into(),
            user_data: None,
        }
    }

    pub fn with_user_data(mut self, user_data: Box<RawValue>) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

impl From<&Track> for QueueTrack {
    fn from(track: &Track) -> Self {
        Self {
            encoded: track.encoded.clone(),
            user_data: track.user_data.clone(),
        }
    }
}

/// Actualización parcial de la cola.
///
/// `None` deja el campo sin cambios en el nodo y se omite del JSON.
/// `Some(Vec::new())` reemplaza la cola por una vacía.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<QueueMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<QueueTrack>>,
}

impl QueueUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: QueueMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_tracks(mut self, tracks: Vec<QueueTrack>) -> Self {
        self.tracks = Some(tracks);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.tracks.is_none()
    }
}
