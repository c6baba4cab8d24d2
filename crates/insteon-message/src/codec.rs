//! Message encoding and decoding.
//!
//! This module converts between [`Message`] values and their raw byte
//! sequences.
//!
//! ## Wire Format
//!
//! | Field          | Size (bytes) | Notes                                   |
//! |----------------|--------------|-----------------------------------------|
//! | code           | 1            | message identifier                      |
//! | target address | 3            | addressed variants only                 |
//! | flags          | 1            | packed type/extended/hops byte          |
//! | cmd1, cmd2     | 1 each       |                                         |
//! | user data      | 14           | extended variants only                  |
//! | ack/nak        | 0 or 1       | modem echoes only                       |
//!
//! The flags byte is authoritative for message length: a 0x62 send whose
//! extended bit is set decodes as [`ExtendedSend`] even though the code byte
//! alone would suggest the standard layout.

use crate::address::Address;
use crate::constants::*;
use crate::error::MessageError;
use crate::flags::MessageFlags;
use crate::message::{
    CancelAllLinking, ExtendedReceived, ExtendedSend, Message, StandardReceived, StandardSend,
};

// Field offsets shared by the addressed variants.
const ADDRESS_OFFSET: usize = 1;
const FLAGS_OFFSET: usize = 4;
const CMD1_OFFSET: usize = 5;
const CMD2_OFFSET: usize = 6;
const USER_DATA_OFFSET: usize = 7;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a message to its wire bytes.
///
/// Produces exactly [`Message::send_size`] bytes when the ack/nak byte is
/// unset and [`Message::received_size`] bytes when it is set.
pub fn encode_message(msg: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(msg.received_size());
    buf.push(msg.code());

    match msg {
        Message::StandardSend(m) => {
            buf.extend_from_slice(m.target.as_ref());
            buf.push(m.flags.to_byte());
            buf.push(m.cmd1);
            buf.push(m.cmd2);
            if let Some(ack_nak) = m.ack_nak {
                buf.push(ack_nak);
            }
        }
        Message::ExtendedSend(m) => {
            buf.extend_from_slice(m.target.as_ref());
            buf.push(m.flags.to_byte());
            buf.push(m.cmd1);
            buf.push(m.cmd2);
            buf.extend_from_slice(&m.user_data);
            if let Some(ack_nak) = m.ack_nak {
                buf.push(ack_nak);
            }
        }
        Message::StandardReceived(m) => {
            buf.extend_from_slice(m.address.as_ref());
            buf.push(m.flags.to_byte());
            buf.push(m.cmd1);
            buf.push(m.cmd2);
        }
        Message::ExtendedReceived(m) => {
            buf.extend_from_slice(m.address.as_ref());
            buf.push(m.flags.to_byte());
            buf.push(m.cmd1);
            buf.push(m.cmd2);
            buf.extend_from_slice(&m.user_data);
        }
        Message::CancelAllLinking(m) => {
            if let Some(ack_nak) = m.ack_nak {
                buf.push(ack_nak);
            }
        }
    }

    buf
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a message from its wire bytes.
///
/// Dispatches on the leading code byte and slices the fixed-width fields
/// positionally. Truncated input, a length matching no legal layout, or an
/// unknown code all fail; no partial message is ever returned.
pub fn decode_message(data: &[u8]) -> Result<Message, MessageError> {
    let code = *data.first().ok_or(MessageError::Empty)?;

    match code {
        MESSAGE_SEND_STANDARD => decode_send(data),
        MESSAGE_STANDARD_RECEIVED => {
            check_exact(code, STANDARD_RECEIVED_SIZE, data.len())?;
            Ok(Message::StandardReceived(StandardReceived {
                address: address_at(data, ADDRESS_OFFSET),
                flags: MessageFlags::from_byte(data[FLAGS_OFFSET]),
                cmd1: data[CMD1_OFFSET],
                cmd2: data[CMD2_OFFSET],
            }))
        }
        MESSAGE_EXTENDED_RECEIVED => {
            check_exact(code, EXTENDED_RECEIVED_SIZE, data.len())?;
            Ok(Message::ExtendedReceived(ExtendedReceived {
                address: address_at(data, ADDRESS_OFFSET),
                flags: MessageFlags::from_byte(data[FLAGS_OFFSET]),
                cmd1: data[CMD1_OFFSET],
                cmd2: data[CMD2_OFFSET],
                user_data: user_data_at(data, USER_DATA_OFFSET),
            }))
        }
        MESSAGE_CANCEL_ALL_LINKING => match data.len() {
            CANCEL_ALL_LINKING_SIZE => {
                Ok(Message::CancelAllLinking(CancelAllLinking { ack_nak: None }))
            }
            CANCEL_ALL_LINKING_RECEIVED_SIZE => Ok(Message::CancelAllLinking(CancelAllLinking {
                ack_nak: Some(data[1]),
            })),
            actual => Err(MessageError::UnexpectedLength {
                code,
                expected: CANCEL_ALL_LINKING_SIZE,
                actual,
            }),
        },
        other => Err(MessageError::UnknownMessageCode(other)),
    }
}

/// Decode a 0x62 send, upgrading to the extended layout when the flags byte
/// says so.
fn decode_send(data: &[u8]) -> Result<Message, MessageError> {
    let code = MESSAGE_SEND_STANDARD;
    if data.len() <= FLAGS_OFFSET {
        return Err(MessageError::TooShort {
            code,
            expected: STANDARD_SEND_SIZE,
            actual: data.len(),
        });
    }

    let flags = MessageFlags::from_byte(data[FLAGS_OFFSET]);
    if flags.is_extended() {
        if data.len() < EXTENDED_SEND_SIZE {
            return Err(MessageError::TooShort {
                code,
                expected: EXTENDED_SEND_SIZE,
                actual: data.len(),
            });
        }
        let ack_nak = trailing_ack_nak(code, EXTENDED_SEND_SIZE, data)?;
        Ok(Message::ExtendedSend(ExtendedSend {
            target: address_at(data, ADDRESS_OFFSET),
            flags,
            cmd1: data[CMD1_OFFSET],
            cmd2: data[CMD2_OFFSET],
            user_data: user_data_at(data, USER_DATA_OFFSET),
            ack_nak,
        }))
    } else {
        if data.len() < STANDARD_SEND_SIZE {
            return Err(MessageError::TooShort {
                code,
                expected: STANDARD_SEND_SIZE,
                actual: data.len(),
            });
        }
        let ack_nak = trailing_ack_nak(code, STANDARD_SEND_SIZE, data)?;
        Ok(Message::StandardSend(StandardSend {
            target: address_at(data, ADDRESS_OFFSET),
            flags,
            cmd1: data[CMD1_OFFSET],
            cmd2: data[CMD2_OFFSET],
            ack_nak,
        }))
    }
}

/// Read the optional trailing ack/nak byte after `body_size` bytes; any
/// further trailing data is an error.
fn trailing_ack_nak(code: u8, body_size: usize, data: &[u8]) -> Result<Option<u8>, MessageError> {
    match data.len() - body_size {
        0 => Ok(None),
        1 => Ok(Some(data[body_size])),
        _ => Err(MessageError::UnexpectedLength {
            code,
            expected: body_size,
            actual: data.len(),
        }),
    }
}

fn check_exact(code: u8, expected: usize, actual: usize) -> Result<(), MessageError> {
    if actual == expected {
        Ok(())
    } else if actual < expected {
        Err(MessageError::TooShort {
            code,
            expected,
            actual,
        })
    } else {
        Err(MessageError::UnexpectedLength {
            code,
            expected,
            actual,
        })
    }
}

fn address_at(data: &[u8], offset: usize) -> Address {
    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&data[offset..offset + ADDRESS_SIZE]);
    Address(bytes)
}

fn user_data_at(data: &[u8], offset: usize) -> [u8; USER_DATA_SIZE] {
    let mut bytes = [0u8; USER_DATA_SIZE];
    bytes.copy_from_slice(&data[offset..offset + USER_DATA_SIZE]);
    bytes
}

// ============================================================================
// Tests
// ============================================================================
