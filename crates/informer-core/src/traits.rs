//! Common traits for the notification surface and caller lookups
//!
//! Defines the seams between the core, the UI layer, and the info service.

use crate::error::AppError;
use crate::models::{ContactInfo, LookupOutcome};
use async_trait::async_trait;

/// Notification surface consumed by the UI layer
///
/// Callbacks are invoked only from the tracker's serialized context, in the
/// order the underlying events were applied. Implementations hold non-owning
/// handles keyed by `call_id`; the tracker remains the owner of the records.
pub trait NotificationSink: Send + Sync {
    /// A new call started ringing
    fn on_created(&self, contact: &ContactInfo);

    /// The call was answered
    fn on_answered(&self, contact: &ContactInfo);

    /// The call was torn down by an explicit destroy event
    fn on_destroyed(&self, contact: &ContactInfo);

    /// The auto-dismiss timer elapsed for an answered call
    fn on_dismissed(&self, contact: &ContactInfo);

    /// A caller lookup completed while the call is still live
    fn on_caller_resolved(&self, contact: &ContactInfo);

    /// The event channel dropped; sessions are preserved
    fn on_disconnected(&self);

    /// The event channel subscription was (re)established
    fn on_reconnected(&self);

    /// Whether the UI for this call is currently shown
    ///
    /// Drives duplicate-create handling: a repeated create event re-notifies
    /// only when the popup is no longer visible.
    fn is_visible(&self, call_id: &str) -> bool;
}

/// Caller info resolution service
#[async_trait]
pub trait CallerLookup: Send + Sync {
    /// Resolve a caller number into display fields
    ///
    /// `Ok(NotFound)` means the service answered but knows nothing useful;
    /// `Err` means the service could not be reached. Callers treat both as
    /// "show the raw number".
    async fn resolve(&self, caller_number: &str) -> Result<LookupOutcome, AppError>;
}
