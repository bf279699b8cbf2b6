use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::model::OP_EVENT;
use crate::plugin::{EventEmitter, EventPlugin, EventPlugins, Plugin, PluginEvent};

/// Listener de eventos tipados del nodo
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &PluginEvent);
}

impl<F> EventListener for F
where
    F: Fn(&PluginEvent) + Send + Sync,
{
    fn on_event(&self, event: &PluginEvent) {
        self(event)
    }
}

/// Resultado de enrutar un frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Entregado al decodificador registrado para su tag
    Routed,
    /// Evento sin decodificador registrado
    Unhandled(String),
    /// Frame con otro `op` (ready, stats, playerUpdate...)
    NotAnEvent,
    /// Cabecera ilegible
    Malformed,
}

#[derive(Debug, Deserialize)]
struct FrameHeader {
    op: String,
    #[serde(rename = "type", default)]
    event_type: Option<String>,
}

/// Router de eventos de un nodo: tag → decodificador, y fan-out a listeners
pub struct NodeEventRouter {
    installed: Vec<(String, String)>,
    decoders: HashMap<String, Arc<dyn EventPlugin>>,
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl NodeEventRouter {
    /// Construye el registro a partir de los plugins instalados.
    ///
    /// Si dos plugins reclaman el mismo tag gana el primero.
    pub fn new(plugins: &[Arc<dyn EventPlugins>]) -> Self {
        let mut installed = Vec::with_capacity(plugins.len());
        let mut decoders: HashMap<String, Arc<dyn EventPlugin>> = HashMap::new();

        for plugin in plugins {
            debug!("🧩 Plugin instalado: {} v{}", plugin.name(), plugin.version());
            installed.push((plugin.name().to_string(), plugin.version().to_string()));

            for decoder in plugin.event_plugins() {
                let tag = decoder.event_type().to_string();
                if decoders.contains_key(&tag) {
                    warn!("⚠️ Tag {} ya registrado, ignorando decodificador de {}", tag, plugin.name());
                    continue;
                }
                decoders.insert(tag, decoder);
            }
        }

        Self {
            installed,
            decoders,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Nombre y versión de cada plugin instalado, en orden de registro
    pub fn installed_plugins(&self) -> &[(String, String)] {
        &self.installed
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Enruta un frame crudo del websocket al decodificador de su tag
    pub fn dispatch(&self, frame: &[u8]) -> DispatchOutcome {
        let header: FrameHeader = match serde_json::from_slice(frame) {
            Ok(header) => header,
            Err(e) => {
                warn!("⚠️ Frame ilegible del nodo: {}", e);
                return DispatchOutcome::Malformed;
            }
        };

        if header.op != OP_EVENT {
            trace!("Frame op={} ignorado", header.op);
            return DispatchOutcome::NotAnEvent;
        }

        let Some(event_type) = header.event_type else {
            warn!("⚠️ Evento sin tag type");
            return DispatchOutcome::Malformed;
        };

        match self.decoders.get(&event_type) {
            Some(decoder) => {
                decoder.on_event_invocation(self, frame);
                DispatchOutcome::Routed
            }
            None => {
                debug!("Evento {} sin decodificador", event_type);
                DispatchOutcome::Unhandled(event_type)
            }
        }
    }
}

impl EventEmitter for NodeEventRouter {
    fn emit_event(&self, event: PluginEvent) {
        // copia para no retener el lock mientras corren los listeners
        let listeners = self.listeners.read().clone();
        debug!("📣 {} para guild {} → {} listeners", event.event_type(), event.guild_id(), listeners.len());

        for listener in listeners {
            listener.on_event(&event);
        }
    }
}
