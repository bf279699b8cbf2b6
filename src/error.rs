use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Error reportado por el nodo con un status fuera de 2xx
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("el nodo respondió {status}: {message}")]
pub struct RemoteError {
    /// Status HTTP real de la respuesta
    pub status: u16,
    /// Status que el nodo declara en el cuerpo, si lo trae
    pub reported_status: Option<u16>,
    pub message: String,
    pub error: Option<String>,
    pub path: Option<String>,
    pub trace: Option<String>,
    pub timestamp: Option<i64>,
}

/// Cuerpo de error de Lavalink. Todo opcional: algunos proxies devuelven otra cosa.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    timestamp: Option<i64>,
    status: Option<u16>,
    error: Option<String>,
    message: Option<String>,
    path: Option<String>,
    trace: Option<String>,
}

impl RemoteError {
    /// Construye el error a partir de una respuesta no exitosa.
    ///
    /// Nunca falla: si el cuerpo no es el objeto de error del nodo, el
    /// mensaje cae al texto crudo o a la razón canónica del status.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let fallback_message = || {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                text
            }
        };

        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => Self {
                status: status.as_u16(),
                reported_status: parsed.status,
                message: parsed
                    .message
                    .filter(|message| !message.is_empty())
                    .or_else(|| parsed.error.clone())
                    .unwrap_or_else(fallback_message),
                error: parsed.error,
                path: parsed.path,
                trace: parsed.trace,
                timestamp: parsed.timestamp,
            },
            Err(_) => Self {
                status: status.as_u16(),
                reported_status: None,
                message: fallback_message(),
                error: status.canonical_reason().map(str::to_string),
                path: None,
                trace: None,
                timestamp: None,
            },
        }
    }

    /// Momento en que el nodo registró el error
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Errores de las operaciones de cola
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("error de transporte: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("la petición superó el tiempo límite de {0:?}")]
    Timeout(Duration),

    #[error("la petición fue cancelada")]
    Cancelled,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("respuesta exitosa con cuerpo inválido: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("respuesta {status} sin cuerpo donde se esperaba uno")]
    EmptyBody { status: u16 },

    #[error("no se pudo serializar el cuerpo de la petición: {0}")]
    Encode(#[source] serde_json::Error),
}

impl QueueError {
    /// Fallo de red, timeout o cancelación
    pub fn is_transport(&self) -> bool {
        matches!(self, QueueError::Transport(_) | QueueError::Timeout(_) | QueueError::Cancelled)
    }

    /// El nodo respondió con un status de error
    pub fn is_remote(&self) -> bool {
        matches!(self, QueueError::Remote(_))
    }

    /// Respuesta exitosa que no respeta el protocolo esperado
    pub fn is_protocol(&self) -> bool {
        matches!(self, QueueError::Decode(_) | QueueError::EmptyBody { .. })
    }

    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            QueueError::Remote(err) => Some(err),
            _ => None,
        }
    }
}
