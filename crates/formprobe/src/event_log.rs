//! Structured event log for form interactions.
//!
//! Operations never print; they emit [`FormEvent`]s to a caller-supplied
//! [`FormObserver`]. [`TracingObserver`] forwards events to `tracing`,
//! [`EventLog`] keeps them for assertions and reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Instant, SystemTime};
use uuid::Uuid;

/// Category of form events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Navigation and page readiness
    Navigation,
    /// Removal, dismissal or hiding of obstructing elements
    Interference,
    /// Text field population and readback
    Fill,
    /// Radio, checkbox, dropdown and autocomplete choices
    Choice,
    /// Submission and confirmation surface lifecycle
    Submission,
    /// Reconciliation of record against confirmation
    Reconciliation,
    /// Recovery of an unexpectedly open confirmation surface
    Guard,
    /// Precondition validation
    Validation,
}

/// Level of form events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventLevel {
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

/// A point-in-time occurrence during a form interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormEvent {
    /// Event name, e.g. `fill.retry`
    pub name: String,
    /// Event category
    pub category: EventCategory,
    /// Event level
    pub level: EventLevel,
    /// Human readable message
    pub message: String,
    /// Structured attributes
    pub attributes: BTreeMap<String, String>,
}

impl FormEvent {
    /// Create a new info-level event
    #[must_use]
    pub fn new(name: &str, category: EventCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
            level: EventLevel::Info,
            message: String::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set level
    #[must_use]
    pub const fn with_level(mut self, level: EventLevel) -> Self {
        self.level = level;
        self
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        let _ = self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Attribute value
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Receiver of form events
pub trait FormObserver: Send + Sync {
    /// Called once per emitted event, in emission order
    fn on_event(&self, event: &FormEvent);
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FormObserver for TracingObserver {
    fn on_event(&self, event: &FormEvent) {
        let attrs = format!("{:?}", event.attributes);
        match event.level {
            EventLevel::Debug => {
                tracing::debug!(
                    event = %event.name,
                    category = ?event.category,
                    attrs = %attrs,
                    "{}",
                    event.message
                );
            }
            EventLevel::Info => {
                tracing::info!(
                    event = %event.name,
                    category = ?event.category,
                    attrs = %attrs,
                    "{}",
                    event.message
                );
            }
            EventLevel::Warn => {
                tracing::warn!(
                    event = %event.name,
                    category = ?event.category,
                    attrs = %attrs,
                    "{}",
                    event.message
                );
            }
            EventLevel::Error => {
                tracing::error!(
                    event = %event.name,
                    category = ?event.category,
                    attrs = %attrs,
                    "{}",
                    event.message
                );
            }
        }
    }
}

/// An event with its offset from the start of the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Milliseconds since the log was created
    pub timestamp_ms: u64,
    /// The event
    #[serde(flatten)]
    pub event: FormEvent,
}

/// Serialisable snapshot of an [`EventLog`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventArchive {
    /// Log identifier
    pub trace_id: String,
    /// Scenario or session name
    pub name: String,
    /// Wall-clock creation time
    pub started_at: SystemTime,
    /// Events in emission order
    pub events: Vec<LoggedEvent>,
}

/// Collecting observer
#[derive(Debug)]
pub struct EventLog {
    trace_id: String,
    name: String,
    started_at: SystemTime,
    start: Instant,
    forward_to_tracing: bool,
    events: Mutex<Vec<LoggedEvent>>,
}

impl EventLog {
    /// Create an empty log
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            started_at: SystemTime::now(),
            start: Instant::now(),
            forward_to_tracing: false,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Also forward every event to `tracing`
    #[must_use]
    pub const fn with_tracing(mut self, enabled: bool) -> Self {
        self.forward_to_tracing = enabled;
        self
    }

    /// Log identifier
    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Copy of the events collected so far
    #[must_use]
    pub fn events(&self) -> Vec<FormEvent> {
        self.lock().iter().map(|e| e.event.clone()).collect()
    }

    /// Names of the events collected so far
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.event.name.clone()).collect()
    }

    /// Events of one category
    #[must_use]
    pub fn by_category(&self, category: EventCategory) -> Vec<FormEvent> {
        self.lock()
            .iter()
            .filter(|e| e.event.category == category)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Whether an event with this name was emitted
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|e| e.event.name == name)
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// No events yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot for serialisation
    #[must_use]
    pub fn archive(&self) -> EventArchive {
        EventArchive {
            trace_id: self.trace_id.clone(),
            name: self.name.clone(),
            started_at: self.started_at,
            events: self.lock().clone(),
        }
    }

    /// Snapshot as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.archive())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LoggedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FormObserver for EventLog {
    fn on_event(&self, event: &FormEvent) {
        if self.forward_to_tracing {
            TracingObserver.on_event(event);
        }
        let timestamp_ms = self.start.elapsed().as_millis() as u64;
        self.lock().push(LoggedEvent {
            timestamp_ms,
            event: event.clone(),
        });
    }
}
