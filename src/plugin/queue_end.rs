use std::sync::Arc;
use tracing::Dispatch;

use super::{EventEmitter, EventPlugin, EventPlugins, Plugin, PluginEvent};
use crate::model::{QueueEndEvent, EVENT_TYPE_QUEUE_END};

pub const PLUGIN_NAME: &str = "lavaqueue";
pub const PLUGIN_VERSION: &str = "1.0.0";

/// Plugin de cola: expone el decodificador de `QueueEndEvent`
pub struct LavaQueuePlugin {
    event_plugins: Vec<Arc<dyn EventPlugin>>,
}

impl LavaQueuePlugin {
    /// Registra los errores en el subscriber de tracing activo
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Registra los errores en `logger` en lugar del subscriber activo
    pub fn with_logger(logger: Dispatch) -> Self {
        Self::build(Some(logger))
    }

    fn build(logger: Option<Dispatch>) -> Self {
        Self {
            event_plugins: vec![Arc::new(QueueEndHandler { logger })],
        }
    }
}

impl Default for LavaQueuePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LavaQueuePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }
}

impl EventPlugins for LavaQueuePlugin {
    fn event_plugins(&self) -> Vec<Arc<dyn EventPlugin>> {
        self.event_plugins.clone()
    }
}

/// Decodifica frames `QueueEndEvent` y los reemite tipados
pub struct QueueEndHandler {
    logger: Option<Dispatch>,
}

impl QueueEndHandler {
    fn log_decode_failure(&self, err: &serde_json::Error, data: &[u8]) {
        let log = || {
            tracing::error!(
                error = %err,
                bytes = data.len(),
                "❌ No se pudo decodificar {}, evento descartado",
                EVENT_TYPE_QUEUE_END
            );
        };

        match &self.logger {
            Some(logger) => tracing::dispatcher::with_default(logger, log),
            None => log(),
        }
    }
}

impl EventPlugin for QueueEndHandler {
    fn event_type(&self) -> &str {
        EVENT_TYPE_QUEUE_END
    }

    fn on_event_invocation(&self, emitter: &dyn EventEmitter, data: &[u8]) {
        let event: QueueEndEvent = match serde_json::from_slice(data) {
            Ok(event) => event,
            Err(err) => {
                self.log_decode_failure(&err, data);
                return;
            }
        };

        emitter.emit_event(PluginEvent::QueueEnd(event));
    }
}
