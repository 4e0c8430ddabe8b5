//! # Runtime Events
//!
//! Typed notifications for host plugins. Delivery is synchronous, in
//! subscription order, on the thread that caused the event. A panicking
//! handler is contained and logged; the remaining handlers still run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use serde::Serialize;

use super::config::EngineConfig;
use crate::decision::Decision;
use crate::experience::Experience;
use crate::observability::{log_event_with_fields, LogEvent};

/// Event emitted by a runtime
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum RuntimeEvent {
    /// `init` completed
    Ready { config: EngineConfig },

    /// An experience was registered or replaced
    Registered { experience: Experience, replaced: bool },

    /// `evaluate` produced a decision; `experience` is the winner, if any
    Evaluated {
        decision: Decision,
        experience: Option<Experience>,
    },

    /// `destroy` completed
    Disabled,
}

impl RuntimeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RuntimeEvent::Ready { .. } => EventKind::Ready,
            RuntimeEvent::Registered { .. } => EventKind::Registered,
            RuntimeEvent::Evaluated { .. } => EventKind::Evaluated,
            RuntimeEvent::Disabled => EventKind::Disabled,
        }
    }
}

/// Event tag used to subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Ready,
    Registered,
    Evaluated,
    Disabled,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::Registered => "registered",
            EventKind::Evaluated => "evaluated",
            EventKind::Disabled => "disabled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscriber callback
pub type EventHandler = Arc<dyn Fn(&RuntimeEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    kind: EventKind,
    handler: EventHandler,
}

#[derive(Default)]
struct BusInner {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        match self.subscribers.write() {
            Ok(mut subscribers) => {
                let before = subscribers.len();
                subscribers.retain(|s| s.id != id);
                subscribers.len() != before
            }
            Err(_) => false,
        }
    }
}

/// Fan-out of runtime events to subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.inner.subscribers.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("EventBus").field("subscribers", &count).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler for one event kind
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&RuntimeEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut subscribers) = self.inner.subscribers.write() {
            subscribers.push(Subscriber {
                id,
                kind,
                handler: Arc::new(handler),
            });
        }

        Subscription {
            id,
            kind,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver an event to every handler of its kind. Returns the number of
    /// handlers that completed without panicking.
    ///
    /// Handlers are collected before dispatch so they may subscribe,
    /// unsubscribe or call back into the runtime.
    pub fn emit(&self, event: &RuntimeEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<(u64, EventHandler)> = match self.inner.subscribers.read() {
            Ok(subscribers) => subscribers
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| (s.id, Arc::clone(&s.handler)))
                .collect(),
            Err(_) => return 0,
        };

        let mut delivered = 0;
        for (id, handler) in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    log_event_with_fields(
                        LogEvent::SubscriberPanicked,
                        &[
                            ("event", kind.as_str()),
                            ("subscriber", id.to_string().as_str()),
                            ("panic", message.as_str()),
                        ],
                    );
                }
            }
        }
        delivered
    }

    /// Number of handlers registered for `kind`
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .subscribers
            .read()
            .map(|s| s.iter().filter(|s| s.kind == kind).count())
            .unwrap_or(0)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Handle returned by [`EventBus::subscribe`]. Dropping it keeps the
/// handler registered; call [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Remove the handler. Returns false if it was already gone or the
    /// bus no longer exists.
    pub fn unsubscribe(self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.remove(self.id),
            None => false,
        }
    }
}
