//! Call session tracking for Call Informer
//!
//! The tracker is the single owner of the session map: every mutation —
//! bus event, lookup completion, dismiss timer firing — funnels into one
//! task draining two channels. No locks are held across suspension points
//! because nothing outside that task ever touches the map.

pub mod tracker;

pub use tracker::CallSessionTracker;
