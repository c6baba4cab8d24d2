//! ALL-Link group state.
//!
//! An ALL-Link group is a broadcast channel shared by the modem and a set of
//! responder devices. This state registers for the "cleanup" messages devices
//! send after reacting to a group broadcast, keeps its subscribers informed of
//! the resulting level, and issues the outbound group commands.

use crate::registry::CallbackRegistry;
use crate::template::MessageTemplate;
use insteon_message::{
    Address, Message, MessageFlags, MessageType, StandardCommand, StandardSend,
    COMMAND_LIGHT_BRIGHTEN_ONE_STEP, COMMAND_LIGHT_DIM_ONE_STEP, COMMAND_LIGHT_INSTANT_CHANGE,
    COMMAND_LIGHT_OFF, COMMAND_LIGHT_OFF_FAST, COMMAND_LIGHT_ON, COMMAND_LIGHT_ON_FAST,
    COMMAND_LIGHT_START_MANUAL_CHANGE_DOWN, COMMAND_LIGHT_START_MANUAL_CHANGE_UP,
    COMMAND_LIGHT_STATUS_REQUEST, COMMAND_LIGHT_STOP_MANUAL_CHANGE, MESSAGE_STANDARD_RECEIVED,
};
use log::{debug, error};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Hands a message to the transport.
pub type SendFn = Rc<dyn Fn(&Message)>;

/// Triggers an ALL-Link broadcast for a group with a command pair.
pub type CleanupFn = Rc<dyn Fn(u8, StandardCommand)>;

/// Receives level updates (0-255).
pub type LevelSubscriber = Rc<dyn Fn(u8)>;

/// How long a status-request response handler stays registered before it is
/// dropped.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Cleanup commands whose effect on the level is known without asking the
/// device; everything else triggers a status-request round trip.
const DIRECT_LEVEL_COMMANDS: [StandardCommand; 2] = [COMMAND_LIGHT_ON, COMMAND_LIGHT_ON_FAST];

const ROUND_TRIP_COMMANDS: [StandardCommand; 8] = [
    COMMAND_LIGHT_OFF,
    COMMAND_LIGHT_OFF_FAST,
    COMMAND_LIGHT_BRIGHTEN_ONE_STEP,
    COMMAND_LIGHT_DIM_ONE_STEP,
    COMMAND_LIGHT_START_MANUAL_CHANGE_DOWN,
    COMMAND_LIGHT_START_MANUAL_CHANGE_UP,
    COMMAND_LIGHT_STOP_MANUAL_CHANGE,
    COMMAND_LIGHT_INSTANT_CHANGE,
];

/// Device state for one ALL-Link group of a modem.
pub struct AllLinkGroup {
    address: Address,
    group: u8,
    send: SendFn,
    callbacks: CallbackRegistry,
    cleanup: CleanupFn,
    subscribers: RefCell<Vec<LevelSubscriber>>,
    response_timeout: Duration,
}

impl AllLinkGroup {
    /// Create the group state and register its cleanup templates. The
    /// registry holds only weak references back to the state, so dropping the
    /// returned `Rc` retires the handlers.
    pub fn new(
        address: Address,
        group: u8,
        send: SendFn,
        callbacks: CallbackRegistry,
        cleanup: CleanupFn,
    ) -> Rc<Self> {
        Self::with_response_timeout(
            address,
            group,
            send,
            callbacks,
            cleanup,
            DEFAULT_RESPONSE_TIMEOUT,
        )
    }

    /// Like [`AllLinkGroup::new`] with an explicit status-response timeout.
    pub fn with_response_timeout(
        address: Address,
        group: u8,
        send: SendFn,
        callbacks: CallbackRegistry,
        cleanup: CleanupFn,
        response_timeout: Duration,
    ) -> Rc<Self> {
        let state = Rc::new(AllLinkGroup {
            address,
            group,
            send,
            callbacks,
            cleanup,
            subscribers: RefCell::new(Vec::new()),
            response_timeout,
        });
        state.register_callbacks();
        state
    }

    /// The group's device address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The group number.
    pub fn group(&self) -> u8 {
        self.group
    }

    fn register_callbacks(self: &Rc<Self>) {
        debug!(
            "registering ALL-Link cleanup callbacks for {} group 0x{:02X}",
            self.address, self.group
        );

        for command in DIRECT_LEVEL_COMMANDS {
            let this = Rc::downgrade(self);
            self.callbacks.add(
                self.cleanup_template(command),
                Box::new(move |msg| {
                    if let Some(state) = this.upgrade() {
                        state.on_cleanup_received(msg);
                    }
                    Ok(())
                }),
            );
        }

        for command in ROUND_TRIP_COMMANDS {
            let this = Rc::downgrade(self);
            self.callbacks.add(
                self.cleanup_template(command),
                Box::new(move |_| {
                    if let Some(state) = this.upgrade() {
                        state.send_status_request(&this);
                    }
                    Ok(())
                }),
            );
        }
    }

    /// The cleanup template for one command: a standard received message from
    /// this address, ALL-Link-cleanup flags with any hop counts, cmd2 equal
    /// to the group number.
    fn cleanup_template(&self, command: StandardCommand) -> MessageTemplate {
        MessageTemplate::for_code(MESSAGE_STANDARD_RECEIVED)
            .with_address(self.address)
            .with_flags(MessageFlags::template(
                Some(MessageType::AllLinkCleanup),
                None,
            ))
            .with_cmd1(command.cmd1)
            .with_cmd2(self.group)
    }

    /// Broadcast ALL-Link recall (on) for this group and optimistically
    /// report full brightness before any device confirms.
    pub fn on(&self) {
        (self.cleanup)(self.group, COMMAND_LIGHT_ON);
        self.notify_subscribers(0xFF);
    }

    /// Broadcast ALL-Link off for this group and optimistically report zero.
    pub fn off(&self) {
        (self.cleanup)(self.group, COMMAND_LIGHT_OFF);
        self.notify_subscribers(0x00);
    }

    /// Broadcast ALL-Link brighten-one-step. The resulting level is unknown,
    /// so subscribers are not updated until a device reports back.
    pub fn brighten(&self) {
        (self.cleanup)(self.group, COMMAND_LIGHT_BRIGHTEN_ONE_STEP);
    }

    /// Broadcast ALL-Link dim-one-step. No pre-emptive subscriber update.
    pub fn dim(&self) {
        (self.cleanup)(self.group, COMMAND_LIGHT_DIM_ONE_STEP);
    }

    /// Translate a received cleanup command into a level and update
    /// subscribers: on recalls `recall_level`, on-fast is full, off variants
    /// are zero. An unknown command logs an error and updates nobody.
    pub fn handle_all_link_cleanup(&self, msg: &Message, recall_level: u8) {
        let cmd1 = msg.cmd1();
        let level = if cmd1 == Some(COMMAND_LIGHT_ON.cmd1) {
            recall_level
        } else if cmd1 == Some(COMMAND_LIGHT_ON_FAST.cmd1) {
            0xFF
        } else if cmd1 == Some(COMMAND_LIGHT_OFF.cmd1) || cmd1 == Some(COMMAND_LIGHT_OFF_FAST.cmd1)
        {
            0x00
        } else {
            error!(
                "ALL-Link cleanup for {} group 0x{:02X}: unknown command {:02X?}",
                self.address, self.group, cmd1
            );
            return;
        };

        debug!(
            "ALL-Link cleanup for {} group 0x{:02X}: level 0x{level:02X} from command {:02X?}",
            self.address, self.group, cmd1
        );
        self.notify_subscribers(level);
    }

    fn on_cleanup_received(&self, msg: &Message) {
        debug!(
            "ALL-Link cleanup on-command from {} group 0x{:02X} (cmd1 {:02X?})",
            self.address, self.group, msg.cmd1()
        );
        self.notify_subscribers(0xFF);
    }

    /// Ask the device for its absolute level and forward the reply's cmd2 to
    /// subscribers. The response handler is one-shot and expires after the
    /// configured timeout, so a lost reply cannot leak a registration.
    fn send_status_request(&self, this: &Weak<Self>) {
        let request = StandardSend::new(
            self.address,
            MessageFlags::new(MessageType::Direct, false, 3, 3),
            COMMAND_LIGHT_STATUS_REQUEST.cmd1,
            COMMAND_LIGHT_STATUS_REQUEST.cmd2.unwrap_or(0x00),
        );

        let reply_template = MessageTemplate::for_code(MESSAGE_STANDARD_RECEIVED)
            .with_address(self.address)
            .with_flags(MessageFlags::template(Some(MessageType::DirectAck), None));

        let this = this.clone();
        self.callbacks.add_one_shot(
            reply_template,
            Box::new(move |msg| {
                if let (Some(state), Some(level)) = (this.upgrade(), msg.cmd2()) {
                    debug!(
                        "status reply from {}: level 0x{level:02X}",
                        state.address
                    );
                    state.notify_subscribers(level);
                }
                Ok(())
            }),
            self.response_timeout,
        );

        (self.send)(&Message::StandardSend(request));
    }

    /// Register a subscriber for level updates.
    pub fn subscribe(&self, subscriber: LevelSubscriber) {
        self.subscribers.borrow_mut().push(subscriber);
    }

    /// Push a level to every subscriber.
    pub fn notify_subscribers(&self, level: u8) {
        for subscriber in self.subscribers.borrow().iter() {
            subscriber(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insteon_message::StandardReceived;

    struct Fixture {
        group: Rc<AllLinkGroup>,
        registry: CallbackRegistry,
        sent: Rc<RefCell<Vec<Message>>>,
        broadcasts: Rc<RefCell<Vec<(u8, StandardCommand)>>>,
        levels: Rc<RefCell<Vec<u8>>>,
    }

    fn fixture() -> Fixture {
        let registry = CallbackRegistry::new();
        let sent = Rc::new(RefCell::new(Vec::new()));
        let broadcasts = Rc::new(RefCell::new(Vec::new()));
        let levels = Rc::new(RefCell::new(Vec::new()));

        let sent_sink = Rc::clone(&sent);
        let broadcast_sink = Rc::clone(&broadcasts);
        let group = AllLinkGroup::new(
            Address([0x1A, 0x2B, 0x3C]),
            0x01,
            Rc::new(move |msg: &Message| sent_sink.borrow_mut().push(*msg)),
            registry.clone(),
            Rc::new(move |group, command| broadcast_sink.borrow_mut().push((group, command))),
        );

        let level_sink = Rc::clone(&levels);
        group.subscribe(Rc::new(move |level| level_sink.borrow_mut().push(level)));

        Fixture {
            group,
            registry,
            sent,
            broadcasts,
            levels,
        }
    }

    fn cleanup_from(address: Address, cmd1: u8, group: u8) -> Message {
        Message::StandardReceived(StandardReceived::new(
            address,
            MessageFlags::new(MessageType::AllLinkCleanup, false, 2, 3),
            cmd1,
            group,
        ))
    }

    #[test]
    fn test_registers_one_template_per_command() {
        let f = fixture();
        assert_eq!(f.registry.len(), 10);
    }

    #[test]
    fn test_on_is_optimistic() {
        let f = fixture();
        f.group.on();
        assert_eq!(*f.broadcasts.borrow(), vec![(0x01, COMMAND_LIGHT_ON)]);
        assert_eq!(*f.levels.borrow(), vec![0xFF]);
    }

    #[test]
    fn test_off_is_optimistic() {
        let f = fixture();
        f.group.off();
        assert_eq!(*f.broadcasts.borrow(), vec![(0x01, COMMAND_LIGHT_OFF)]);
        assert_eq!(*f.levels.borrow(), vec![0x00]);
    }

    #[test]
    fn test_brighten_and_dim_notify_nothing() {
        let f = fixture();
        f.group.brighten();
        f.group.dim();
        assert_eq!(f.broadcasts.borrow().len(), 2);
        assert!(f.levels.borrow().is_empty());
    }

    #[test]
    fn test_on_cleanup_notifies_full() {
        let f = fixture();
        let msg = cleanup_from(f.group.address(), COMMAND_LIGHT_ON.cmd1, 0x01);
        assert_eq!(f.registry.dispatch(&msg), 1);
        assert_eq!(*f.levels.borrow(), vec![0xFF]);
        assert!(f.sent.borrow().is_empty());
    }

    #[test]
    fn test_cleanup_for_other_group_ignored() {
        let f = fixture();
        let msg = cleanup_from(f.group.address(), COMMAND_LIGHT_ON.cmd1, 0x02);
        assert_eq!(f.registry.dispatch(&msg), 0);
        assert!(f.levels.borrow().is_empty());
    }

    #[test]
    fn test_handle_cleanup_levels() {
        let f = fixture();
        let address = f.group.address();

        let on = cleanup_from(address, COMMAND_LIGHT_ON.cmd1, 0x01);
        f.group.handle_all_link_cleanup(&on, 128);
        assert_eq!(*f.levels.borrow(), vec![128]);

        let off_fast = cleanup_from(address, COMMAND_LIGHT_OFF_FAST.cmd1, 0x01);
        f.group.handle_all_link_cleanup(&off_fast, 128);
        assert_eq!(*f.levels.borrow(), vec![128, 0]);

        let on_fast = cleanup_from(address, COMMAND_LIGHT_ON_FAST.cmd1, 0x01);
        f.group.handle_all_link_cleanup(&on_fast, 128);
        assert_eq!(*f.levels.borrow(), vec![128, 0, 255]);
    }

    #[test]
    fn test_handle_cleanup_unknown_command_updates_nobody() {
        let f = fixture();
        let msg = cleanup_from(f.group.address(), 0x99, 0x01);
        f.group.handle_all_link_cleanup(&msg, 128);
        assert!(f.levels.borrow().is_empty());
    }

    #[test]
    fn test_manual_change_triggers_status_round_trip() {
        let f = fixture();
        let address = f.group.address();

        let dim = cleanup_from(address, COMMAND_LIGHT_DIM_ONE_STEP.cmd1, 0x01);
        assert_eq!(f.registry.dispatch(&dim), 1);

        // A status request went out and a one-shot reply handler is pending.
        assert_eq!(f.sent.borrow().len(), 1);
        let sent = f.sent.borrow()[0];
        assert_eq!(sent.cmd1(), Some(COMMAND_LIGHT_STATUS_REQUEST.cmd1));
        assert_eq!(sent.address(), Some(address));
        assert_eq!(f.registry.len(), 11);
        assert!(f.levels.borrow().is_empty());

        // The device answers with a direct ACK whose cmd2 is the level.
        let reply = Message::StandardReceived(StandardReceived::new(
            address,
            MessageFlags::new(MessageType::DirectAck, false, 3, 3),
            0x19,
            0x42,
        ));
        assert_eq!(f.registry.dispatch(&reply), 1);
        assert_eq!(*f.levels.borrow(), vec![0x42]);

        // The reply handler was one-shot.
        assert_eq!(f.registry.len(), 10);
        let again = Message::StandardReceived(StandardReceived::new(
            address,
            MessageFlags::new(MessageType::DirectAck, false, 3, 3),
            0x19,
            0x43,
        ));
        assert_eq!(f.registry.dispatch(&again), 0);
        assert_eq!(*f.levels.borrow(), vec![0x42]);
    }

    #[test]
    fn test_dropping_group_retires_handlers() {
        let f = fixture();
        let address = f.group.address();
        let registry = f.registry.clone();
        let levels = Rc::clone(&f.levels);
        drop(f.group);

        // Entries remain but their weak back-references are dead.
        let msg = cleanup_from(address, COMMAND_LIGHT_ON.cmd1, 0x01);
        registry.dispatch(&msg);
        assert!(levels.borrow().is_empty());
    }

    #[test]
    fn test_expired_status_handler_is_dropped() {
        let registry = CallbackRegistry::new();
        let sent = Rc::new(RefCell::new(Vec::new()));
        let sent_sink = Rc::clone(&sent);
        let group = AllLinkGroup::with_response_timeout(
            Address([0x1A, 0x2B, 0x3C]),
            0x01,
            Rc::new(move |msg: &Message| sent_sink.borrow_mut().push(*msg)),
            registry.clone(),
            Rc::new(|_, _| {}),
            Duration::ZERO,
        );
        let levels = Rc::new(RefCell::new(Vec::new()));
        let level_sink = Rc::clone(&levels);
        group.subscribe(Rc::new(move |level| level_sink.borrow_mut().push(level)));

        let dim = cleanup_from(group.address(), COMMAND_LIGHT_DIM_ONE_STEP.cmd1, 0x01);
        registry.dispatch(&dim);
        assert_eq!(sent.borrow().len(), 1);

        // The reply arrives after the deadline: the handler is gone.
        let reply = Message::StandardReceived(StandardReceived::new(
            group.address(),
            MessageFlags::new(MessageType::DirectAck, false, 3, 3),
            0x19,
            0x42,
        ));
        assert_eq!(registry.dispatch(&reply), 0);
        assert!(levels.borrow().is_empty());
        assert_eq!(registry.len(), 10);
    }
}
