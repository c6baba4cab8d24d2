//! INSTEON PLM Message Dispatch
//!
//! This crate routes decoded [`insteon_message::Message`] values to device
//! state handlers. Routing is template based: each state registers one or
//! more [`MessageTemplate`] patterns (any field may be a wildcard) against
//! the shared [`CallbackRegistry`], and every handler whose template matches
//! an incoming message fires, in registration order.
//!
//! The model is single-threaded and callback-driven: the transport layer
//! delivers one decoded message at a time, and dispatch runs synchronously on
//! the delivering context. Outbound sends are fire-and-forget closures into
//! the transport; reply correlation uses one-shot registrations with a
//! deadline.
//!
//! [`AllLinkGroup`] is the representative device state built on these pieces.

mod error;
mod group;
mod registry;
mod template;

pub use error::*;
pub use group::*;
pub use registry::*;
pub use template::*;
