//! Event subscribers notified at the end of every resolution phase.

use thiserror::Error;
use tower_war_core::Event;

/// Failure reported by a subscriber.
///
/// The session logs the failure and keeps notifying the remaining subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("event sink failed: {reason}")]
pub struct SinkError {
    reason: String,
}

impl SinkError {
    /// Creates an error carrying a human readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Reason supplied by the subscriber.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Observer of session events, such as a view or an audio collaborator.
pub trait EventSink {
    /// Receives one event. Must not block the simulation.
    fn handle(&mut self, event: &Event) -> Result<(), SinkError>;
}

impl<F> EventSink for F
where
    F: FnMut(&Event) -> Result<(), SinkError>,
{
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        self(event)
    }
}

/// Handle identifying a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    pub(crate) const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the subscription.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}
