//! # Model Module
//!
//! Wire types exchanged with the Lavalink node's queue plugin.
//!
//! Everything here is plain data with serde contracts; no type in this module
//! performs I/O or keeps state between requests.
//!
//! ## Types
//!
//! - [`Queue`] / [`QueueMode`] - snapshot of a guild queue
//! - [`QueueTrack`] - track handle sent when adding to the queue
//! - [`QueueUpdate`] - partial update, each field independently optional
//! - [`Track`] / [`TrackInfo`] - track object returned by the node
//! - [`QueueEndEvent`] - event pushed when a guild queue runs out
//!
//! ## Opaque blobs
//!
//! `encoded` handles and user data are never interpreted client-side. User
//! data travels as [`serde_json::value::RawValue`], so the exact JSON text the
//! caller supplied is what the node receives.

pub mod events;
pub mod queue;
pub mod track;

pub use events::{QueueEndEvent, EVENT_TYPE_QUEUE_END, OP_EVENT};
pub use queue::{Queue, QueueMode, QueueTrack, QueueUpdate};
pub use track::{Track, TrackInfo};
