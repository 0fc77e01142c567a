//! statusbot - relays a game server's status into a Discord channel
//!
//! Every cycle the bot fetches the server list entry, applies the maintenance
//! and admin-only marker files, edits one status message, updates its
//! presence and sends a webhook notice for each state transition.

pub mod cli;
pub mod config;
pub mod discord;
pub mod display;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod poller;
pub mod publisher;
pub mod status;
