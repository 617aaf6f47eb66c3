//! Event bus subscription client for Call Informer
//!
//! This crate owns the connection to the call-control event bus: the HTTP
//! auth handshake, the websocket subscription, frame parsing, and automatic
//! reconnection with exponential backoff.
//!
//! # Architecture
//!
//! ```text
//!   Auth endpoint (HTTP)
//!         |
//!         v
//!    AuthSession (token)
//!         |
//!         v
//!   Event stream (websocket)
//!         |
//!         v
//!     parse_frame
//!         |
//!         v
//!   ChannelUpdate (mpsc) ---> CallSessionTracker
//! ```
//!
//! The event channel is plaintext in the reference deployment — the bus does
//! not offer TLS on this interface. Known limitation, documented in the
//! connection config.

pub mod auth;
pub mod client;
pub mod event;

pub use auth::AuthSession;
pub use client::EventChannelClient;
