//! Typed call events and channel updates
//!
//! The event client parses raw bus frames into `CallEvent`s and hands them
//! to the tracker as `ChannelUpdate`s, together with connection-state
//! changes. Per call, events are delivered in the order received from the
//! transport; events for different calls have no required relative order.

use serde::{Deserialize, Serialize};

use super::contact::CallerDetails;

/// A parsed call lifecycle event from the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallEvent {
    /// A new channel was created (call started ringing)
    Create {
        call_id: String,
        caller_number: String,
        callee_number: Option<String>,
    },

    /// The channel was answered
    Answer { call_id: String },

    /// The channel was torn down
    Destroy {
        call_id: String,
        hangup_cause: Option<String>,
    },
}

impl CallEvent {
    /// The call this event refers to
    pub fn call_id(&self) -> &str {
        match self {
            CallEvent::Create { call_id, .. }
            | CallEvent::Answer { call_id }
            | CallEvent::Destroy { call_id, .. } => call_id,
        }
    }
}

/// What the event channel client reports to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelUpdate {
    /// A parsed call event
    Event(CallEvent),

    /// The transport dropped; active sessions are preserved
    Disconnected,

    /// The subscription was (re)established
    Reconnected,
}

/// Result of a caller info lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The service knows this number
    Found(CallerDetails),

    /// The service has nothing for this number (or answered malformed)
    NotFound,
}
