//! Message types.
//!
//! Every wire message is one variant of [`Message`]. The variant is chosen by
//! the decoder from the leading code byte (and, for sends, the extended bit
//! in the flags byte); there is no intermediate partially-decoded form.

use crate::address::Address;
use crate::constants::*;
use crate::flags::MessageFlags;
use serde::{Deserialize, Serialize};

/// Standard-length message send (0x62).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardSend {
    /// Target device address.
    pub target: Address,
    /// Message flags.
    pub flags: MessageFlags,
    /// Command byte 1.
    pub cmd1: u8,
    /// Command byte 2.
    pub cmd2: u8,
    /// Trailing ack/nak byte, present on modem echoes.
    pub ack_nak: Option<u8>,
}

impl StandardSend {
    /// Build a standard send.
    pub fn new(target: Address, flags: MessageFlags, cmd1: u8, cmd2: u8) -> Self {
        StandardSend {
            target,
            flags,
            cmd1,
            cmd2,
            ack_nak: None,
        }
    }
}

/// Extended-length message send (0x62 with the extended flag bit set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedSend {
    /// Target device address.
    pub target: Address,
    /// Message flags. The extended bit is always set.
    pub flags: MessageFlags,
    /// Command byte 1.
    pub cmd1: u8,
    /// Command byte 2.
    pub cmd2: u8,
    /// 14-byte user-data block.
    pub user_data: [u8; USER_DATA_SIZE],
    /// Trailing ack/nak byte, present on modem echoes.
    pub ack_nak: Option<u8>,
}

impl ExtendedSend {
    /// Build an extended send. The extended bit is forced on in the flags so
    /// the encoded message always decodes back as extended.
    pub fn new(
        target: Address,
        flags: MessageFlags,
        cmd1: u8,
        cmd2: u8,
        user_data: [u8; USER_DATA_SIZE],
    ) -> Self {
        let flags = match flags.message_type() {
            Some(t) => MessageFlags::new(
                t,
                true,
                flags.hops_left().unwrap_or(0),
                flags.hops_max().unwrap_or(0),
            ),
            None => MessageFlags::template(None, Some(true)),
        };
        ExtendedSend {
            target,
            flags,
            cmd1,
            cmd2,
            user_data,
            ack_nak: None,
        }
    }
}

/// Standard-length message received (0x50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardReceived {
    /// Originating device address.
    pub address: Address,
    /// Message flags.
    pub flags: MessageFlags,
    /// Command byte 1.
    pub cmd1: u8,
    /// Command byte 2.
    pub cmd2: u8,
}

impl StandardReceived {
    /// Build a standard received message.
    pub fn new(address: Address, flags: MessageFlags, cmd1: u8, cmd2: u8) -> Self {
        StandardReceived {
            address,
            flags,
            cmd1,
            cmd2,
        }
    }
}

/// Extended-length message received (0x51).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedReceived {
    /// Originating device address.
    pub address: Address,
    /// Message flags.
    pub flags: MessageFlags,
    /// Command byte 1.
    pub cmd1: u8,
    /// Command byte 2.
    pub cmd2: u8,
    /// 14-byte user-data block.
    pub user_data: [u8; USER_DATA_SIZE],
}

/// Cancel ALL-Linking (0x65), a fixed control message carrying only its code
/// and, on echoes, an ack/nak byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelAllLinking {
    /// Trailing ack/nak byte, present on modem echoes.
    pub ack_nak: Option<u8>,
}

/// A decoded PLM message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Standard message send (0x62).
    StandardSend(StandardSend),
    /// Extended message send (0x62, extended bit set).
    ExtendedSend(ExtendedSend),
    /// Standard message received (0x50).
    StandardReceived(StandardReceived),
    /// Extended message received (0x51).
    ExtendedReceived(ExtendedReceived),
    /// Cancel ALL-Linking (0x65).
    CancelAllLinking(CancelAllLinking),
}

impl Message {
    /// The protocol code byte.
    pub fn code(&self) -> u8 {
        match self {
            Message::StandardSend(_) | Message::ExtendedSend(_) => MESSAGE_SEND_STANDARD,
            Message::StandardReceived(_) => MESSAGE_STANDARD_RECEIVED,
            Message::ExtendedReceived(_) => MESSAGE_EXTENDED_RECEIVED,
            Message::CancelAllLinking(_) => MESSAGE_CANCEL_ALL_LINKING,
        }
    }

    /// Human-readable description of the variant.
    pub fn description(&self) -> &'static str {
        match self {
            Message::StandardSend(_) => "INSTEON Standard Message Send",
            Message::ExtendedSend(_) => "INSTEON Extended Message Send",
            Message::StandardReceived(_) => "INSTEON Standard Message Received",
            Message::ExtendedReceived(_) => "INSTEON Extended Message Received",
            Message::CancelAllLinking(_) => "INSTEON Cancel All-Linking",
        }
    }

    /// Bytes emitted when this variant is sent (no trailing ack/nak).
    pub fn send_size(&self) -> usize {
        match self {
            Message::StandardSend(_) => STANDARD_SEND_SIZE,
            Message::ExtendedSend(_) => EXTENDED_SEND_SIZE,
            Message::StandardReceived(_) => STANDARD_RECEIVED_SIZE,
            Message::ExtendedReceived(_) => EXTENDED_RECEIVED_SIZE,
            Message::CancelAllLinking(_) => CANCEL_ALL_LINKING_SIZE,
        }
    }

    /// Bytes expected when this variant arrives from the modem.
    pub fn received_size(&self) -> usize {
        match self {
            Message::StandardSend(_) => STANDARD_SEND_RECEIVED_SIZE,
            Message::ExtendedSend(_) => EXTENDED_SEND_RECEIVED_SIZE,
            Message::StandardReceived(_) => STANDARD_RECEIVED_SIZE,
            Message::ExtendedReceived(_) => EXTENDED_RECEIVED_SIZE,
            Message::CancelAllLinking(_) => CANCEL_ALL_LINKING_RECEIVED_SIZE,
        }
    }

    /// The device address, for addressed variants.
    pub fn address(&self) -> Option<Address> {
        match self {
            Message::StandardSend(m) => Some(m.target),
            Message::ExtendedSend(m) => Some(m.target),
            Message::StandardReceived(m) => Some(m.address),
            Message::ExtendedReceived(m) => Some(m.address),
            Message::CancelAllLinking(_) => None,
        }
    }

    /// The message flags, for variants that carry them.
    pub fn flags(&self) -> Option<MessageFlags> {
        match self {
            Message::StandardSend(m) => Some(m.flags),
            Message::ExtendedSend(m) => Some(m.flags),
            Message::StandardReceived(m) => Some(m.flags),
            Message::ExtendedReceived(m) => Some(m.flags),
            Message::CancelAllLinking(_) => None,
        }
    }

    /// Command byte 1, for variants that carry it.
    pub fn cmd1(&self) -> Option<u8> {
        match self {
            Message::StandardSend(m) => Some(m.cmd1),
            Message::ExtendedSend(m) => Some(m.cmd1),
            Message::StandardReceived(m) => Some(m.cmd1),
            Message::ExtendedReceived(m) => Some(m.cmd1),
            Message::CancelAllLinking(_) => None,
        }
    }

    /// Command byte 2, for variants that carry it.
    pub fn cmd2(&self) -> Option<u8> {
        match self {
            Message::StandardSend(m) => Some(m.cmd2),
            Message::ExtendedSend(m) => Some(m.cmd2),
            Message::StandardReceived(m) => Some(m.cmd2),
            Message::ExtendedReceived(m) => Some(m.cmd2),
            Message::CancelAllLinking(_) => None,
        }
    }

    /// The extended user-data block, for extended variants.
    pub fn user_data(&self) -> Option<&[u8; USER_DATA_SIZE]> {
        match self {
            Message::ExtendedSend(m) => Some(&m.user_data),
            Message::ExtendedReceived(m) => Some(&m.user_data),
            _ => None,
        }
    }

    /// The trailing ack/nak byte, if present.
    pub fn ack_nak(&self) -> Option<u8> {
        match self {
            Message::StandardSend(m) => m.ack_nak,
            Message::ExtendedSend(m) => m.ack_nak,
            Message::CancelAllLinking(m) => m.ack_nak,
            Message::StandardReceived(_) | Message::ExtendedReceived(_) => None,
        }
    }

    /// True iff the trailing byte is the protocol ACK (0x06).
    pub fn is_ack(&self) -> bool {
        self.ack_nak() == Some(MESSAGE_ACK)
    }

    /// True iff the trailing byte is the protocol NAK (0x15).
    pub fn is_nak(&self) -> bool {
        self.ack_nak() == Some(MESSAGE_NAK)
    }

    /// True for extended-length variants.
    pub fn is_extended(&self) -> bool {
        matches!(self, Message::ExtendedSend(_) | Message::ExtendedReceived(_))
    }
}
