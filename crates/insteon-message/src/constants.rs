//! Protocol constants
//!
//! These constants define the message codes, field sizes, and command bytes
//! used on the INSTEON PLM wire. Sizes count from the leading code byte; the
//! serial framing byte the modem prepends belongs to the transport layer.

// ============================================================================
// Message Codes
// ============================================================================

/// Standard-length message received from the network.
pub const MESSAGE_STANDARD_RECEIVED: u8 = 0x50;
/// Extended-length message received from the network.
pub const MESSAGE_EXTENDED_RECEIVED: u8 = 0x51;
/// Send a standard (or, via the flags byte, extended) message.
pub const MESSAGE_SEND_STANDARD: u8 = 0x62;
/// Cancel an in-progress ALL-Link linking session.
pub const MESSAGE_CANCEL_ALL_LINKING: u8 = 0x65;

// ============================================================================
// ACK / NAK
// ============================================================================

/// Trailing byte the modem appends when it accepts a sent message.
pub const MESSAGE_ACK: u8 = 0x06;
/// Trailing byte the modem appends when it rejects a sent message.
pub const MESSAGE_NAK: u8 = 0x15;

// ============================================================================
// Field Sizes
// ============================================================================

/// Device address width in bytes.
pub const ADDRESS_SIZE: usize = 3;
/// Extended user-data block width in bytes.
pub const USER_DATA_SIZE: usize = 14;

// ============================================================================
// Message Sizes (bytes, from the code byte)
// ============================================================================

/// Standard send: code + address + flags + cmd1 + cmd2.
pub const STANDARD_SEND_SIZE: usize = 7;
/// Standard send as echoed back with a trailing ack/nak.
pub const STANDARD_SEND_RECEIVED_SIZE: usize = 8;
/// Extended send: standard send + 14 user-data bytes.
pub const EXTENDED_SEND_SIZE: usize = 21;
/// Extended send as echoed back with a trailing ack/nak.
pub const EXTENDED_SEND_RECEIVED_SIZE: usize = 22;
/// Standard received: code + address + flags + cmd1 + cmd2.
pub const STANDARD_RECEIVED_SIZE: usize = 7;
/// Extended received: standard received + 14 user-data bytes.
pub const EXTENDED_RECEIVED_SIZE: usize = 21;
/// Cancel all-linking: code only.
pub const CANCEL_ALL_LINKING_SIZE: usize = 1;
/// Cancel all-linking as echoed back with a trailing ack/nak.
pub const CANCEL_ALL_LINKING_RECEIVED_SIZE: usize = 2;

// ============================================================================
// Lighting Commands
// ============================================================================

/// A cmd1/cmd2 command pair.
///
/// `cmd2` is `None` when the second byte carries a parameter (a level, a
/// group number) rather than a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCommand {
    /// Command byte.
    pub cmd1: u8,
    /// Fixed second byte, or `None` when it is a parameter.
    pub cmd2: Option<u8>,
}

/// Light on; cmd2 carries the target level.
pub const COMMAND_LIGHT_ON: StandardCommand = StandardCommand {
    cmd1: 0x11,
    cmd2: None,
};
/// Light on at full brightness, skipping the ramp.
pub const COMMAND_LIGHT_ON_FAST: StandardCommand = StandardCommand {
    cmd1: 0x12,
    cmd2: None,
};
/// Light off.
pub const COMMAND_LIGHT_OFF: StandardCommand = StandardCommand {
    cmd1: 0x13,
    cmd2: Some(0x00),
};
/// Light off, skipping the ramp.
pub const COMMAND_LIGHT_OFF_FAST: StandardCommand = StandardCommand {
    cmd1: 0x14,
    cmd2: Some(0x00),
};
/// Brighten one step.
pub const COMMAND_LIGHT_BRIGHTEN_ONE_STEP: StandardCommand = StandardCommand {
    cmd1: 0x15,
    cmd2: Some(0x00),
};
/// Dim one step.
pub const COMMAND_LIGHT_DIM_ONE_STEP: StandardCommand = StandardCommand {
    cmd1: 0x16,
    cmd2: Some(0x00),
};
/// Start a manual ramp down.
pub const COMMAND_LIGHT_START_MANUAL_CHANGE_DOWN: StandardCommand = StandardCommand {
    cmd1: 0x17,
    cmd2: Some(0x00),
};
/// Start a manual ramp up.
pub const COMMAND_LIGHT_START_MANUAL_CHANGE_UP: StandardCommand = StandardCommand {
    cmd1: 0x17,
    cmd2: Some(0x01),
};
/// Stop a manual ramp.
pub const COMMAND_LIGHT_STOP_MANUAL_CHANGE: StandardCommand = StandardCommand {
    cmd1: 0x18,
    cmd2: Some(0x00),
};
/// Request the device's current level; the reply's cmd2 carries it.
pub const COMMAND_LIGHT_STATUS_REQUEST: StandardCommand = StandardCommand {
    cmd1: 0x19,
    cmd2: Some(0x00),
};
/// Jump to a level without ramping; cmd2 carries the level.
pub const COMMAND_LIGHT_INSTANT_CHANGE: StandardCommand = StandardCommand {
    cmd1: 0x21,
    cmd2: None,
};
