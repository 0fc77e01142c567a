//! # Discord
//!
//! REST and gateway plumbing behind the `ChatPublisher` and webhook sink.

pub mod gateway;
pub mod model;
pub mod publisher;
pub mod rest;

pub use gateway::{DisconnectNotifier, Gateway, GatewayConfig, DEFAULT_GATEWAY_URL};
pub use publisher::{DiscordConfig, DiscordPublisher};
pub use rest::{DiscordRest, DEFAULT_API_BASE};
