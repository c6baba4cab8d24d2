//! Device error types.

use thiserror::Error;

/// Errors surfaced by device states and message handlers.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// An ALL-Link cleanup arrived with a command the group does not know.
    #[error("unknown ALL-Link cleanup command 0x{cmd1:02X} for group 0x{group:02X}")]
    UnknownCleanupCommand {
        /// The unrecognized command byte.
        cmd1: u8,
        /// The group the message was routed to.
        group: u8,
    },

    /// A protocol-level failure inside a handler.
    #[error(transparent)]
    Message(#[from] insteon_message::MessageError),

    /// A handler-specific failure.
    #[error("handler error: {0}")]
    Handler(String),
}
