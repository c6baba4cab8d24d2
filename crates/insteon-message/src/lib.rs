//! INSTEON PLM Message Protocol
//!
//! This crate provides types and codecs for the binary messages exchanged
//! with an INSTEON PowerLine Modem (PLM). Messages are fixed-layout byte
//! sequences identified by a leading code byte:
//!
//! - **Sends** (host → modem): code `0x62` for standard and extended device
//!   messages, `0x65` for cancel all-linking. The modem echoes each send back
//!   with a trailing ACK (`0x06`) or NAK (`0x15`) byte.
//! - **Receives** (modem → host): code `0x50` for standard and `0x51` for
//!   extended messages arriving from the network.
//!
//! The single flags byte inside device messages packs the message type, the
//! extended-length bit, and the hop counters; see [`MessageFlags`]. The
//! extended bit is authoritative over the nominal layout: a `0x62` send with
//! the bit set decodes as an [`ExtendedSend`] carrying a 14-byte user-data
//! block.
//!
//! # Example
//!
//! ```rust,ignore
//! use insteon_message::{decode_message, encode_message, Message};
//!
//! let raw = encode_message(&message);
//! let parsed = decode_message(&received_bytes)?;
//! ```

mod address;
mod codec;
mod constants;
mod error;
mod flags;
mod message;
mod stream;

pub use address::*;
pub use codec::*;
pub use constants::*;
pub use error::*;
pub use flags::*;
pub use message::*;
pub use stream::*;
