//! Message templates.
//!
//! A template is a partially-specified message pattern used to route incoming
//! traffic. Unset fields are wildcards; templates are never serialized.

use insteon_message::{Address, Message, MessageFlags};

/// A pattern matched against decoded messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Message code this template applies to.
    pub code: u8,
    /// Device address, or wildcard.
    pub address: Option<Address>,
    /// Flags pattern; unset fields are wildcards.
    pub flags: MessageFlags,
    /// Command byte 1, or wildcard.
    pub cmd1: Option<u8>,
    /// Command byte 2, or wildcard.
    pub cmd2: Option<u8>,
}

impl MessageTemplate {
    /// A template matching any message with the given code.
    pub fn for_code(code: u8) -> Self {
        MessageTemplate {
            code,
            address: None,
            flags: MessageFlags::unset(),
            cmd1: None,
            cmd2: None,
        }
    }

    /// Require an exact device address.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Require the given flags pattern.
    pub fn with_flags(mut self, flags: MessageFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Require an exact cmd1.
    pub fn with_cmd1(mut self, cmd1: u8) -> Self {
        self.cmd1 = Some(cmd1);
        self
    }

    /// Require an exact cmd2.
    pub fn with_cmd2(mut self, cmd2: u8) -> Self {
        self.cmd2 = Some(cmd2);
        self
    }

    /// Structural match against a decoded message.
    ///
    /// The code must be equal; every other set field must match the message
    /// exactly, with flags compared per [`MessageFlags::matches`]. A message
    /// without a flags field only matches a fully-wildcard flags pattern.
    pub fn matches(&self, msg: &Message) -> bool {
        if msg.code() != self.code {
            return false;
        }
        if let Some(address) = self.address {
            if msg.address() != Some(address) {
                return false;
            }
        }
        match msg.flags() {
            Some(flags) => {
                if !self.flags.matches(&flags) {
                    return false;
                }
            }
            None => {
                if !self.flags.is_unset() {
                    return false;
                }
            }
        }
        if let Some(cmd1) = self.cmd1 {
            if msg.cmd1() != Some(cmd1) {
                return false;
            }
        }
        if let Some(cmd2) = self.cmd2 {
            if msg.cmd2() != Some(cmd2) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insteon_message::{
        CancelAllLinking, MessageType, StandardReceived, MESSAGE_CANCEL_ALL_LINKING,
        MESSAGE_STANDARD_RECEIVED,
    };

    fn cleanup_message(address: Address, cmd1: u8, group: u8) -> Message {
        Message::StandardReceived(StandardReceived::new(
            address,
            MessageFlags::new(MessageType::AllLinkCleanup, false, 1, 3),
            cmd1,
            group,
        ))
    }

    #[test]
    fn test_code_only_template() {
        let template = MessageTemplate::for_code(MESSAGE_STANDARD_RECEIVED);
        let msg = cleanup_message(Address([1, 2, 3]), 0x11, 0x01);
        assert!(template.matches(&msg));

        let cancel = Message::CancelAllLinking(CancelAllLinking::default());
        assert!(!template.matches(&cancel));
    }

    #[test]
    fn test_full_template() {
        let address = Address([1, 2, 3]);
        let template = MessageTemplate::for_code(MESSAGE_STANDARD_RECEIVED)
            .with_address(address)
            .with_flags(MessageFlags::template(
                Some(MessageType::AllLinkCleanup),
                None,
            ))
            .with_cmd1(0x11)
            .with_cmd2(0x01);

        assert!(template.matches(&cleanup_message(address, 0x11, 0x01)));
        // Wrong group.
        assert!(!template.matches(&cleanup_message(address, 0x11, 0x02)));
        // Wrong command.
        assert!(!template.matches(&cleanup_message(address, 0x13, 0x01)));
        // Wrong address.
        assert!(!template.matches(&cleanup_message(Address([9, 9, 9]), 0x11, 0x01)));
    }

    #[test]
    fn test_flags_template_ignores_hops() {
        let template = MessageTemplate::for_code(MESSAGE_STANDARD_RECEIVED).with_flags(
            MessageFlags::template(Some(MessageType::AllLinkCleanup), None),
        );
        for hops in 0..4u8 {
            let msg = Message::StandardReceived(StandardReceived::new(
                Address([1, 2, 3]),
                MessageFlags::new(MessageType::AllLinkCleanup, false, hops, 3),
                0x11,
                0x01,
            ));
            assert!(template.matches(&msg));
        }
    }

    #[test]
    fn test_flagless_message_needs_wildcard_flags() {
        let cancel = Message::CancelAllLinking(CancelAllLinking::default());
        let plain = MessageTemplate::for_code(MESSAGE_CANCEL_ALL_LINKING);
        assert!(plain.matches(&cancel));

        let flagged = plain.with_flags(MessageFlags::template(
            Some(MessageType::AllLinkCleanup),
            None,
        ));
        assert!(!flagged.matches(&cancel));
    }
}
