//! Message error types.

use thiserror::Error;

/// Errors that can occur when decoding or building messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// No bytes at all.
    #[error("empty message data")]
    Empty,

    /// Message is truncated for its declared code.
    #[error("message 0x{code:02X} too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Message code from the leading byte.
        code: u8,
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Message length matches no legal layout for its code.
    #[error("message 0x{code:02X} has unexpected length {actual}: expected {expected}")]
    UnexpectedLength {
        /// Message code from the leading byte.
        code: u8,
        /// Expected length (without the trailing ack/nak).
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Leading code byte is not a known message code.
    #[error("unknown message code: 0x{0:02X}")]
    UnknownMessageCode(u8),

    /// Invalid hex in a string field.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessageError::TooShort {
            code: 0x62,
            expected: 7,
            actual: 3,
        };
        assert!(err.to_string().contains("0x62"));
        assert!(err.to_string().contains("got 3"));

        let err = MessageError::UnknownMessageCode(0x99);
        assert!(err.to_string().contains("0x99"));
    }
}
