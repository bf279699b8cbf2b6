//! # lavaqueue
//!
//! Queue control for Lavalink nodes running the queue plugin.
//!
//! The node owns the queue, the history and playback. This crate only speaks
//! its HTTP contract and decodes the one event the plugin pushes:
//!
//! - [`queue`] - one async function per queue endpoint
//! - [`rest`] - transport seam ([`rest::RestClient`]) and the reqwest client
//! - [`model`] - wire types ([`model::Queue`], [`model::QueueUpdate`], ...)
//! - [`plugin`] - `QueueEndEvent` decoder exposed through plugin capabilities
//! - [`events`] - host side router that feeds frames to installed plugins
//! - [`config`] - node connection settings from the environment

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod plugin;
pub mod queue;
pub mod rest;

pub use error::{QueueError, RemoteError};
pub use model::{Queue, QueueEndEvent, QueueMode, QueueTrack, QueueUpdate, Track, TrackInfo};
pub use plugin::LavaQueuePlugin;
pub use rest::{NodeRestClient, RequestContext, RestClient};
