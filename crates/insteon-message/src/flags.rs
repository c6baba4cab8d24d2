//! The message-flags byte.
//!
//! Every standard and extended message carries a single flags byte packing
//! four fields:
//!
//! ```text
//! +-----------+----------+-----------+----------+
//! | bits 7..5 | bit 4    | bits 3..2 | bits 1..0|
//! | type      | extended | hops left | max hops |
//! +-----------+----------+-----------+----------+
//! ```
//!
//! Flags built for matching may leave fields unset; an unset field encodes as
//! zero but acts as a wildcard when matched against concrete flags.

use log::warn;
use serde::{Deserialize, Serialize};

/// The 3-bit message type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    /// Direct message to a single device.
    Direct = 0,
    /// ACK of a direct message.
    DirectAck = 1,
    /// ALL-Link cleanup (unicast follow-up to a group broadcast).
    AllLinkCleanup = 2,
    /// ACK of an ALL-Link cleanup.
    AllLinkCleanupAck = 3,
    /// Broadcast message.
    Broadcast = 4,
    /// NAK of a direct message.
    DirectNak = 5,
    /// ALL-Link group broadcast.
    AllLinkBroadcast = 6,
    /// NAK of an ALL-Link cleanup.
    AllLinkCleanupNak = 7,
}

impl MessageType {
    /// Decode the 3-bit field. Only the low 3 bits are considered.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MessageType::Direct,
            1 => MessageType::DirectAck,
            2 => MessageType::AllLinkCleanup,
            3 => MessageType::AllLinkCleanupAck,
            4 => MessageType::Broadcast,
            5 => MessageType::DirectNak,
            6 => MessageType::AllLinkBroadcast,
            _ => MessageType::AllLinkCleanupNak,
        }
    }
}

/// The decoded flags byte.
///
/// Each field is optional so that the same type serves both concrete flags
/// (decoded from the wire, all fields set) and match templates (unset fields
/// are wildcards). Derived equality compares every field; [`MessageFlags::matches`]
/// implements the wildcard semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageFlags {
    message_type: Option<MessageType>,
    extended: Option<bool>,
    hops_left: Option<u8>,
    hops_max: Option<u8>,
}

impl MessageFlags {
    /// Flags with every field unset (matches anything).
    pub const fn unset() -> Self {
        MessageFlags {
            message_type: None,
            extended: None,
            hops_left: None,
            hops_max: None,
        }
    }

    /// Concrete flags for an outbound message. Hop counts are masked to the
    /// 2-bit range.
    pub fn new(message_type: MessageType, extended: bool, hops_left: u8, hops_max: u8) -> Self {
        MessageFlags {
            message_type: Some(message_type),
            extended: Some(extended),
            hops_left: Some(hops_left & 0x03),
            hops_max: Some(hops_max & 0x03),
        }
    }

    /// Match-only flags. Unsupplied fields stay wildcard; hop counts are
    /// never part of a template.
    pub fn template(message_type: Option<MessageType>, extended: Option<bool>) -> Self {
        MessageFlags {
            message_type,
            extended,
            hops_left: None,
            hops_max: None,
        }
    }

    /// Decode a raw flags byte. All four fields come back set.
    pub fn from_byte(byte: u8) -> Self {
        MessageFlags {
            message_type: Some(MessageType::from_bits((byte & 0xE0) >> 5)),
            extended: Some((byte & 0x10) != 0),
            hops_left: Some((byte & 0x0C) >> 2),
            hops_max: Some(byte & 0x03),
        }
    }

    /// Decode flags given as a hex string; only the first two characters are
    /// read. Unparseable input logs a warning and yields unset flags.
    pub fn from_hex(s: &str) -> Self {
        let prefix = s.get(0..2).unwrap_or(s);
        match hex::decode(prefix).as_deref() {
            Ok([byte]) => MessageFlags::from_byte(*byte),
            _ => {
                warn!("flags from unparseable hex input {s:?}, treating as unset");
                MessageFlags::unset()
            }
        }
    }

    /// Decode flags given as a raw buffer; anything but a single byte logs a
    /// warning and yields unset flags.
    pub fn from_slice(data: &[u8]) -> Self {
        match data {
            [byte] => MessageFlags::from_byte(*byte),
            _ => {
                warn!(
                    "flags from buffer of length {}, expected 1 byte, treating as unset",
                    data.len()
                );
                MessageFlags::unset()
            }
        }
    }

    /// Encode to a raw flags byte. Unset fields contribute zero.
    pub fn to_byte(&self) -> u8 {
        let message_type = self.message_type.map_or(0, |t| (t as u8) << 5);
        let extended = match self.extended {
            Some(true) => 0x10,
            _ => 0,
        };
        let hops_left = self.hops_left.map_or(0, |h| (h & 0x03) << 2);
        let hops_max = self.hops_max.map_or(0, |h| h & 0x03);
        message_type | extended | hops_left | hops_max
    }

    /// Wildcard match against another set of flags.
    ///
    /// Only the message type and extended fields take part; an unset field on
    /// either side matches anything. Hop counts are transient per-hop values
    /// and never gate a match.
    pub fn matches(&self, other: &MessageFlags) -> bool {
        fn field<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
            match (a, b) {
                (Some(x), Some(y)) => x == y,
                _ => true,
            }
        }
        field(self.message_type, other.message_type) && field(self.extended, other.extended)
    }

    /// True when no field is set.
    pub fn is_unset(&self) -> bool {
        *self == MessageFlags::unset()
    }

    /// The message type field.
    pub fn message_type(&self) -> Option<MessageType> {
        self.message_type
    }

    /// The extended field.
    pub fn extended(&self) -> Option<bool> {
        self.extended
    }

    /// Hops remaining.
    pub fn hops_left(&self) -> Option<u8> {
        self.hops_left
    }

    /// Maximum hops.
    pub fn hops_max(&self) -> Option<u8> {
        self.hops_max
    }

    /// True when the extended bit is set.
    pub fn is_extended(&self) -> bool {
        self.extended == Some(true)
    }

    /// True for broadcast messages.
    pub fn is_broadcast(&self) -> bool {
        self.message_type == Some(MessageType::Broadcast)
    }

    /// True for direct messages, including their ACKs and NAKs.
    pub fn is_direct(&self) -> bool {
        matches!(
            self.message_type,
            Some(MessageType::Direct) | Some(MessageType::DirectAck) | Some(MessageType::DirectNak)
        )
    }

    /// True for ACKs of direct messages.
    pub fn is_direct_ack(&self) -> bool {
        self.message_type == Some(MessageType::DirectAck)
    }

    /// True for NAKs of direct messages.
    pub fn is_direct_nak(&self) -> bool {
        self.message_type == Some(MessageType::DirectNak)
    }

    /// True for ALL-Link cleanup messages.
    pub fn is_all_link_cleanup(&self) -> bool {
        self.message_type == Some(MessageType::AllLinkCleanup)
    }

    /// True for ALL-Link group broadcasts.
    pub fn is_all_link_broadcast(&self) -> bool {
        self.message_type == Some(MessageType::AllLinkBroadcast)
    }
}

impl From<u8> for MessageFlags {
    fn from(byte: u8) -> Self {
        MessageFlags::from_byte(byte)
    }
}

impl std::fmt::Display for MessageFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}", self.to_byte())
    }
}
