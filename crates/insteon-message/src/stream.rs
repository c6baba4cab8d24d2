//! Incremental decoding of a PLM byte stream.
//!
//! The modem delivers messages back-to-back with no framing beyond the code
//! byte, and a read may end mid-message. [`MessageStream`] buffers incoming
//! bytes and yields one decoded [`Message`] at a time, resynchronizing past
//! any garbage between messages.

use crate::constants::*;
use crate::error::MessageError;
use crate::flags::MessageFlags;
use crate::message::Message;
use crate::codec::decode_message;
use bytes::{Buf, BytesMut};
use log::warn;

/// Offset of the flags byte inside a 0x62 send, used to pick the standard or
/// extended layout before the full message has arrived.
const SEND_FLAGS_OFFSET: usize = 4;

/// An incremental decoder for a stream of PLM messages.
#[derive(Debug, Default)]
pub struct MessageStream {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl MessageStream {
    /// Create a new stream decoder.
    pub fn new() -> Self {
        MessageStream {
            buffer: BytesMut::with_capacity(2 * EXTENDED_SEND_RECEIVED_SIZE),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next complete message from the buffer.
    ///
    /// Returns `Ok(Some(message))` when a full message is available,
    /// `Ok(None)` when more data is needed. Bytes that are not a known
    /// message code are skipped with a warning.
    pub fn try_decode(&mut self) -> Result<Option<Message>, MessageError> {
        self.resync();

        let expected = match self.expected_len() {
            Some(len) => len,
            None => return Ok(None),
        };
        if self.buffer.len() < expected {
            return Ok(None);
        }

        let raw = self.buffer.split_to(expected);
        decode_message(&raw).map(Some)
    }

    /// Discard leading bytes until the buffer starts with a known code.
    fn resync(&mut self) {
        let mut skipped = 0usize;
        while let Some(&byte) = self.buffer.first() {
            if is_message_code(byte) {
                break;
            }
            self.buffer.advance(1);
            skipped += 1;
        }
        if skipped > 0 {
            warn!("skipped {skipped} unrecognized byte(s) while resynchronizing");
        }
    }

    /// The on-wire length of the message at the head of the buffer, or `None`
    /// when not yet determinable.
    fn expected_len(&self) -> Option<usize> {
        let code = *self.buffer.first()?;
        match code {
            MESSAGE_STANDARD_RECEIVED => Some(STANDARD_RECEIVED_SIZE),
            MESSAGE_EXTENDED_RECEIVED => Some(EXTENDED_RECEIVED_SIZE),
            MESSAGE_CANCEL_ALL_LINKING => Some(CANCEL_ALL_LINKING_RECEIVED_SIZE),
            MESSAGE_SEND_STANDARD => {
                // The flags byte decides the layout; wait for it.
                let flags_byte = *self.buffer.get(SEND_FLAGS_OFFSET)?;
                if MessageFlags::from_byte(flags_byte).is_extended() {
                    Some(EXTENDED_SEND_RECEIVED_SIZE)
                } else {
                    Some(STANDARD_SEND_RECEIVED_SIZE)
                }
            }
            _ => None,
        }
    }

    /// The number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn is_message_code(byte: u8) -> bool {
    matches!(
        byte,
        MESSAGE_STANDARD_RECEIVED
            | MESSAGE_EXTENDED_RECEIVED
            | MESSAGE_SEND_STANDARD
            | MESSAGE_CANCEL_ALL_LINKING
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::codec::encode_message;
    use crate::flags::MessageType;
    use crate::message::{StandardReceived, StandardSend};

    fn received_message() -> Message {
        Message::StandardReceived(StandardReceived::new(
            Address([0x0A, 0x0B, 0x0C]),
            MessageFlags::new(MessageType::AllLinkCleanup, false, 3, 3),
            0x11,
            0x01,
        ))
    }

    #[test]
    fn test_decode_single_message() {
        let msg = received_message();
        let mut stream = MessageStream::new();
        stream.push(&encode_message(&msg));
        assert_eq!(stream.try_decode().unwrap(), Some(msg));
        assert_eq!(stream.try_decode().unwrap(), None);
        assert_eq!(stream.buffered_len(), 0);
    }

    #[test]
    fn test_decode_split_across_pushes() {
        let msg = received_message();
        let encoded = encode_message(&msg);
        let mut stream = MessageStream::new();

        stream.push(&encoded[..3]);
        assert_eq!(stream.try_decode().unwrap(), None);
        stream.push(&encoded[3..]);
        assert_eq!(stream.try_decode().unwrap(), Some(msg));
    }

    #[test]
    fn test_decode_back_to_back() {
        let first = received_message();
        let mut echoed = StandardSend::new(
            Address([0x0A, 0x0B, 0x0C]),
            MessageFlags::new(MessageType::Direct, false, 3, 3),
            0x19,
            0x00,
        );
        echoed.ack_nak = Some(MESSAGE_ACK);
        let second = Message::StandardSend(echoed);

        let mut stream = MessageStream::new();
        stream.push(&encode_message(&first));
        stream.push(&encode_message(&second));

        assert_eq!(stream.try_decode().unwrap(), Some(first));
        assert_eq!(stream.try_decode().unwrap(), Some(second));
        assert_eq!(stream.try_decode().unwrap(), None);
    }

    #[test]
    fn test_resync_past_garbage() {
        let msg = received_message();
        let mut stream = MessageStream::new();
        stream.push(&[0x00, 0xFF, 0x03]);
        stream.push(&encode_message(&msg));
        assert_eq!(stream.try_decode().unwrap(), Some(msg));
    }

    #[test]
    fn test_send_echo_waits_for_flags_byte() {
        // Extended echo: the first 4 bytes do not reveal the length yet.
        let mut raw = vec![0x62, 0xAA, 0xBB, 0xCC];
        let mut stream = MessageStream::new();
        stream.push(&raw);
        assert_eq!(stream.try_decode().unwrap(), None);

        raw.clear();
        raw.push(0x10); // flags: extended
        raw.extend_from_slice(&[0x2E, 0x00]);
        raw.extend_from_slice(&[0x00; USER_DATA_SIZE]);
        stream.push(&raw);
        // Still missing the trailing ack/nak byte.
        assert_eq!(stream.try_decode().unwrap(), None);

        stream.push(&[MESSAGE_ACK]);
        let decoded = stream.try_decode().unwrap().expect("complete message");
        assert!(decoded.is_extended());
        assert!(decoded.is_ack());
    }
}
