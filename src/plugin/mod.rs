//! # Plugin Module
//!
//! Capability traits a Lavalink host uses to install extensions, plus the
//! queue plugin itself.
//!
//! A host keeps its event routing data-driven: instead of hardcoding every
//! event type, it asks each installed [`EventPlugins`] for its decoders and
//! routes frames by their `type` tag.
//!
//! ## Capabilities
//!
//! - [`Plugin`] - stable name and semantic version
//! - [`EventPlugin`] - owns one event tag; decodes and re-emits its payload
//! - [`EventEmitter`] - per-node callback the decoders publish typed events to
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lavaqueue::events::NodeEventRouter;
//! use lavaqueue::plugin::{EventPlugins, LavaQueuePlugin, PluginEvent};
//! use std::sync::Arc;
//!
//! let plugins: Vec<Arc<dyn EventPlugins>> = vec![Arc::new(LavaQueuePlugin::new())];
//! let router = NodeEventRouter::new(&plugins);
//!
//! router.add_listener(Arc::new(|event: &PluginEvent| {
//!     let PluginEvent::QueueEnd(end) = event;
//!     println!("Cola terminada en guild {}", end.guild_id);
//! }));
//! ```

pub mod queue_end;

use serenity::model::id::GuildId;
use std::sync::Arc;

use crate::model::QueueEndEvent;

pub use queue_end::{LavaQueuePlugin, QueueEndHandler};

/// Identidad de una extensión instalada en el host
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;
}

/// Decodificador de un tipo de evento empujado por el nodo
pub trait EventPlugin: Send + Sync {
    /// Tag `type` del frame que este decodificador maneja
    fn event_type(&self) -> &str;

    /// Decodifica `data` y publica el evento en `emitter`.
    ///
    /// Corre dentro del loop de eventos del host: no debe bloquear ni propagar errores.
    fn on_event_invocation(&self, emitter: &dyn EventEmitter, data: &[u8]);
}

/// Extensión que aporta decodificadores de eventos
pub trait EventPlugins: Plugin {
    fn event_plugins(&self) -> Vec<Arc<dyn EventPlugin>>;
}

/// Eventos tipados que publican los plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    QueueEnd(QueueEndEvent),
}

impl PluginEvent {
    pub fn guild_id(&self) -> GuildId {
        match self {
            PluginEvent::QueueEnd(event) => event.guild_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PluginEvent::QueueEnd(event) => event.event_type(),
        }
    }
}

/// Emisor de eventos de un nodo
pub trait EventEmitter: Send + Sync {
    fn emit_event(&self, event: PluginEvent);
}
