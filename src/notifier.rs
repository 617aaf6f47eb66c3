//! Tracing-backed notification sink
//!
//! Headless stand-in for the popup window: every notification is logged the
//! way the GUI would render it. A real UI implements the same
//! `NotificationSink` trait and keeps its dialog handles keyed by `call_id`.

use std::collections::HashSet;
use std::sync::Mutex;

use informer_core::config::PopupConfig;
use informer_core::models::ContactInfo;
use informer_core::traits::NotificationSink;
use tracing::{info, warn};

pub struct LogNotifier {
    close_on_hangup: bool,
    visible: Mutex<HashSet<String>>,
}

impl LogNotifier {
    pub fn new(popup: &PopupConfig) -> Self {
        Self {
            close_on_hangup: popup.close_on_hangup,
            visible: Mutex::new(HashSet::new()),
        }
    }
}

impl NotificationSink for LogNotifier {
    fn on_created(&self, contact: &ContactInfo) {
        self.visible
            .lock()
            .unwrap()
            .insert(contact.call_id.clone());
        info!(
            call_id = %contact.call_id,
            caller = %contact.caller_number,
            "popup: incoming call from {}",
            contact.display_label()
        );
    }

    fn on_answered(&self, contact: &ContactInfo) {
        info!(call_id = %contact.call_id, "popup: call answered");
    }

    fn on_destroyed(&self, contact: &ContactInfo) {
        self.visible.lock().unwrap().remove(&contact.call_id);
        if self.close_on_hangup {
            info!(call_id = %contact.call_id, "popup: call ended, closing");
        } else {
            info!(call_id = %contact.call_id, "popup: call ended, staying open");
        }
    }

    fn on_dismissed(&self, contact: &ContactInfo) {
        self.visible.lock().unwrap().remove(&contact.call_id);
        info!(call_id = %contact.call_id, "popup: auto-dismissed");
    }

    fn on_caller_resolved(&self, contact: &ContactInfo) {
        info!(
            call_id = %contact.call_id,
            "popup: caller identified as {}",
            contact.display_label()
        );
    }

    fn on_disconnected(&self) {
        warn!("event channel lost, keeping active popups");
    }

    fn on_reconnected(&self) {
        info!("event channel established");
    }

    fn is_visible(&self, call_id: &str) -> bool {
        self.visible.lock().unwrap().contains(call_id)
    }
}
