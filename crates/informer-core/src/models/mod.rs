//! Domain models for Call Informer

pub mod contact;
pub mod event;

pub use contact::{CallState, CallerDetails, ContactInfo};
pub use event::{CallEvent, ChannelUpdate, LookupOutcome};
