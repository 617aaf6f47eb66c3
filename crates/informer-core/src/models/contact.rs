//! Call/contact record model
//!
//! A `ContactInfo` describes one active call and its resolved caller
//! identity. The tracker owns these records; the UI layer holds non-owning
//! handles keyed by `call_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Call lifecycle state
///
/// `Destroyed` is terminal. A call may be destroyed without ever being
/// answered (rejected or abandoned while ringing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Ringing,
    Answered,
    Destroyed,
}

impl CallState {
    /// Whether moving to `next` is a legal lifecycle transition
    pub fn can_transition_to(&self, next: CallState) -> bool {
        matches!(
            (self, next),
            (CallState::Ringing, CallState::Answered)
                | (CallState::Ringing, CallState::Destroyed)
                | (CallState::Answered, CallState::Destroyed)
        )
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Destroyed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallState::Ringing => "ringing",
            CallState::Answered => "answered",
            CallState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display fields resolved by the caller info service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallerDetails {
    /// Resolved display name
    pub display_name: Option<String>,

    /// Company or account the number belongs to
    pub organization: Option<String>,

    /// Geographic hint (city, region)
    pub location: Option<String>,
}

impl CallerDetails {
    /// Whether the service returned nothing displayable
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.organization.is_none() && self.location.is_none()
    }
}

/// One active call and its resolved caller identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Opaque call identifier, stable for the call's lifetime
    pub call_id: String,

    /// Raw caller number from the event source
    pub caller_number: String,

    /// Dialed number, when the create event carries one
    pub callee_number: Option<String>,

    /// Resolved display fields; absent until a lookup succeeds
    pub details: Option<CallerDetails>,

    /// Current lifecycle state
    pub state: CallState,

    /// When the create event was processed
    pub created_at: DateTime<Utc>,

    /// When the answer event was processed (None if never answered)
    pub answered_at: Option<DateTime<Utc>>,
}

impl ContactInfo {
    /// Create a new record in the `Ringing` state
    pub fn new(call_id: String, caller_number: String, callee_number: Option<String>) -> Self {
        Self {
            call_id,
            caller_number,
            callee_number,
            details: None,
            state: CallState::Ringing,
            created_at: Utc::now(),
            answered_at: None,
        }
    }

    /// Best available display text: resolved name, or the raw number
    pub fn display_label(&self) -> &str {
        self.details
            .as_ref()
            .and_then(|d| d.display_name.as_deref())
            .unwrap_or(&self.caller_number)
    }

    /// Check if the call was answered
    #[inline]
    pub fn was_answered(&self) -> bool {
        self.answered_at.is_some()
    }
}
