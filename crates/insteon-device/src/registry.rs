//! The callback registry.
//!
//! Incoming decoded messages are dispatched against an ordered list of
//! (template, handler) pairs. Dispatch is multicast: every handler whose
//! template matches fires, in registration order. One-shot registrations
//! carry a deadline and are removed after their first invocation or when the
//! deadline passes, whichever comes first.
//!
//! The registry is a cheap-to-clone handle over shared state; it is owned by
//! the device/connection context and handed to each state. The model is
//! single-threaded and callback-driven: dispatch runs on the context that
//! received the message, and handlers may re-enter `add`/`remove` (but not
//! `dispatch` itself).

use crate::error::DeviceError;
use crate::template::MessageTemplate;
use insteon_message::Message;
use log::{debug, error, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A message handler.
pub type Handler = Box<dyn FnMut(&Message) -> Result<(), DeviceError>>;

/// Identifies a registration for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Entry {
    id: HandlerId,
    template: MessageTemplate,
    // Shared so dispatch can invoke handlers without holding the registry
    // borrow, letting handlers re-register.
    handler: Rc<RefCell<Handler>>,
    one_shot: bool,
    deadline: Option<Instant>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    next_id: u64,
}

/// An ordered, multicast (template → handler) registry.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        CallbackRegistry::default()
    }

    /// Register a handler for every message matching `template`.
    ///
    /// Multiple handlers may share one template and one handler may be
    /// registered under several templates.
    pub fn add(&self, template: MessageTemplate, handler: Handler) -> HandlerId {
        self.insert(template, handler, false, None)
    }

    /// Register a handler that fires at most once and is dropped after `ttl`
    /// if no matching message arrives.
    pub fn add_one_shot(
        &self,
        template: MessageTemplate,
        handler: Handler,
        ttl: Duration,
    ) -> HandlerId {
        self.insert(template, handler, true, Some(Instant::now() + ttl))
    }

    fn insert(
        &self,
        template: MessageTemplate,
        handler: Handler,
        one_shot: bool,
        deadline: Option<Instant>,
    ) -> HandlerId {
        let mut inner = self.inner.borrow_mut();
        let id = HandlerId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            template,
            handler: Rc::new(RefCell::new(handler)),
            one_shot,
            deadline,
        });
        id
    }

    /// Remove a registration. Returns whether it was still present.
    pub fn remove(&self, id: HandlerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != id);
        inner.entries.len() != before
    }

    /// Drop registrations whose deadline has passed. Called automatically at
    /// the start of every dispatch; hosts with their own tick loop may also
    /// call it directly.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.inner.borrow_mut().entries.retain(|e| {
            let expired = e.deadline.is_some_and(|d| d <= now);
            if expired {
                warn!("registration {:?} timed out without a matching message", e.id);
            }
            !expired
        });
    }

    /// Dispatch a decoded message to every matching handler, in registration
    /// order. Returns the number of handlers invoked.
    ///
    /// A handler error is logged and does not stop dispatch to the remaining
    /// matches. One-shot handlers are removed after firing.
    pub fn dispatch(&self, msg: &Message) -> usize {
        self.purge_expired();

        // Snapshot matches, then release the borrow so handlers can register
        // follow-ups (the status-request round trip does).
        let matched: Vec<(HandlerId, bool, Rc<RefCell<Handler>>)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.template.matches(msg))
            .map(|e| (e.id, e.one_shot, Rc::clone(&e.handler)))
            .collect();

        if matched.is_empty() {
            debug!("no handler matched message 0x{:02X}", msg.code());
            return 0;
        }

        let mut fired_one_shots = Vec::new();
        for (id, one_shot, handler) in &matched {
            if let Err(err) = (handler.borrow_mut())(msg) {
                error!("handler {id:?} failed on message 0x{:02X}: {err}", msg.code());
            }
            if *one_shot {
                fired_one_shots.push(*id);
            }
        }

        if !fired_one_shots.is_empty() {
            self.inner
                .borrow_mut()
                .entries
                .retain(|e| !fired_one_shots.contains(&e.id));
        }

        matched.len()
    }

    /// The number of live registrations.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}
