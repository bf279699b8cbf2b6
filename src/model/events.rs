use serde::{Deserialize, Serialize};
use serenity::model::id::GuildId;

/// Tag del evento que emite el nodo cuando se agota la cola
pub const EVENT_TYPE_QUEUE_END: &str = "QueueEndEvent";

/// Valor de `op` en los frames de evento
pub const OP_EVENT: &str = "event";

/// La cola de un guild se quedó sin tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEndEvent {
    pub guild_id: GuildId,
}

impl QueueEndEvent {
    pub fn event_type(&self) -> &'static str {
        EVENT_TYPE_QUEUE_END
    }
}
