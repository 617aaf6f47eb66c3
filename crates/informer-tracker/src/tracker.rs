//! Call session tracker
//!
//! Maps active call identifiers to [`ContactInfo`] records, applies the
//! call-event state machine, dispatches caller lookups, and emits
//! notifications to the UI sink. A single-shot auto-dismiss timer is armed
//! per answered call; re-arming replaces the previous timer, and removal
//! (explicit destroy or timeout) happens exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use informer_core::config::PopupConfig;
use informer_core::models::{CallEvent, CallState, ChannelUpdate, ContactInfo, LookupOutcome};
use informer_core::traits::{CallerLookup, NotificationSink};
use informer_core::AppError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Completions posted back into the serialized context by spawned tasks
enum Completion {
    LookupResolved {
        call_id: String,
        outcome: Result<LookupOutcome, AppError>,
    },
    DismissElapsed {
        call_id: String,
        generation: u64,
    },
}

/// One live call: the owned record plus its scheduled-timer handle.
/// Both are invalidated together when the session is removed.
struct CallSession {
    contact: ContactInfo,
    dismiss_timer: Option<JoinHandle<()>>,
    timer_generation: u64,
}

pub struct CallSessionTracker {
    sessions: HashMap<String, CallSession>,
    sink: Arc<dyn NotificationSink>,
    lookup: Arc<dyn CallerLookup>,
    dismiss_after: Duration,
    completions_tx: mpsc::Sender<Completion>,
    completions_rx: mpsc::Receiver<Completion>,
}

impl CallSessionTracker {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        lookup: Arc<dyn CallerLookup>,
        popup: &PopupConfig,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel(64);

        Self {
            sessions: HashMap::new(),
            sink,
            lookup,
            dismiss_after: Duration::from_secs(popup.dismiss_after_secs),
            completions_tx,
            completions_rx,
        }
    }

    /// Number of live sessions
    pub fn active_calls(&self) -> usize {
        self.sessions.len()
    }

    /// Whether a call is currently tracked
    pub fn is_active(&self, call_id: &str) -> bool {
        self.sessions.contains_key(call_id)
    }

    /// Drain channel updates and internal completions until the update
    /// sender goes away, then cancel all pending timers
    pub async fn run(mut self, mut updates: mpsc::Receiver<ChannelUpdate>) {
        loop {
            tokio::select! {
                maybe_update = updates.recv() => match maybe_update {
                    Some(update) => self.apply_update(update),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.apply_completion(completion)
                }
            }
        }

        self.shutdown();
    }

    fn apply_update(&mut self, update: ChannelUpdate) {
        match update {
            ChannelUpdate::Event(event) => self.apply_event(event),
            ChannelUpdate::Disconnected => {
                // Sessions survive transport churn
                info!("event channel disconnected");
                self.sink.on_disconnected();
            }
            ChannelUpdate::Reconnected => {
                info!("event channel connected");
                self.sink.on_reconnected();
            }
        }
    }

    fn apply_event(&mut self, event: CallEvent) {
        match event {
            CallEvent::Create {
                call_id,
                caller_number,
                callee_number,
            } => self.handle_create(call_id, caller_number, callee_number),
            CallEvent::Answer { call_id } => self.handle_answer(call_id),
            CallEvent::Destroy {
                call_id,
                hangup_cause,
            } => self.handle_destroy(call_id, hangup_cause),
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::LookupResolved { call_id, outcome } => {
                self.apply_lookup(call_id, outcome)
            }
            Completion::DismissElapsed {
                call_id,
                generation,
            } => self.apply_dismiss(call_id, generation),
        }
    }

    fn handle_create(
        &mut self,
        call_id: String,
        caller_number: String,
        callee_number: Option<String>,
    ) {
        if let Some(session) = self.sessions.get(&call_id) {
            // Duplicate create frames are expected from the bus
            debug!(%call_id, "duplicate create event");
            if !self.sink.is_visible(&call_id) {
                self.sink.on_created(&session.contact);
            }
            return;
        }

        info!(%call_id, caller = %caller_number, "call created");

        // The lookup runs detached; its result is posted back as a
        // completion and must never delay the created notification
        self.spawn_lookup(call_id.clone(), caller_number.clone());

        let session = CallSession {
            contact: ContactInfo::new(call_id.clone(), caller_number, callee_number),
            dismiss_timer: None,
            timer_generation: 0,
        };
        self.sink.on_created(&session.contact);
        self.sessions.insert(call_id, session);
    }

    fn handle_answer(&mut self, call_id: String) {
        let Some(session) = self.sessions.get_mut(&call_id) else {
            debug!(%call_id, "answer for unknown call, dropped");
            return;
        };

        if session.contact.state == CallState::Ringing {
            session.contact.state = CallState::Answered;
            session.contact.answered_at = Some(Utc::now());
            info!(%call_id, "call answered");
            self.sink.on_answered(&session.contact);
        }

        // Re-arm replaces: abort the previous timer and bump the generation
        // so a firing that already queued its message is ignored
        session.timer_generation += 1;
        if let Some(previous) = session.dismiss_timer.take() {
            previous.abort();
        }

        let generation = session.timer_generation;
        let completions = self.completions_tx.clone();
        let delay = self.dismiss_after;
        let timer_call_id = call_id;
        session.dismiss_timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = completions
                .send(Completion::DismissElapsed {
                    call_id: timer_call_id,
                    generation,
                })
                .await;
        }));
    }

    fn handle_destroy(&mut self, call_id: String, hangup_cause: Option<String>) {
        let Some(mut session) = self.sessions.remove(&call_id) else {
            debug!(%call_id, "destroy for unknown call, dropped");
            return;
        };

        if let Some(timer) = session.dismiss_timer.take() {
            timer.abort();
        }

        session.contact.state = CallState::Destroyed;
        info!(
            %call_id,
            cause = hangup_cause.as_deref().unwrap_or("UNKNOWN"),
            "call destroyed"
        );
        self.sink.on_destroyed(&session.contact);
    }

    fn apply_lookup(&mut self, call_id: String, outcome: Result<LookupOutcome, AppError>) {
        // The call may be long gone by the time the lookup lands
        let Some(session) = self.sessions.get_mut(&call_id) else {
            debug!(%call_id, "lookup completed for a finished call, discarded");
            return;
        };

        match outcome {
            Ok(LookupOutcome::Found(details)) => {
                session.contact.details = Some(details);
                info!(%call_id, name = %session.contact.display_label(), "caller resolved");
                self.sink.on_caller_resolved(&session.contact);
            }
            Ok(LookupOutcome::NotFound) => {
                debug!(%call_id, "caller unknown to info service");
            }
            Err(e) => {
                warn!(%call_id, "caller lookup failed: {}", e);
            }
        }
    }

    fn apply_dismiss(&mut self, call_id: String, generation: u64) {
        let stale = match self.sessions.get(&call_id) {
            Some(session) => session.timer_generation != generation,
            // Already removed by an explicit destroy; the timer lost the race
            None => return,
        };
        if stale {
            debug!(%call_id, "stale dismiss timer ignored");
            return;
        }

        if let Some(session) = self.sessions.remove(&call_id) {
            info!(%call_id, "call auto-dismissed");
            self.sink.on_dismissed(&session.contact);
        }
    }

    fn spawn_lookup(&self, call_id: String, caller_number: String) {
        let lookup = self.lookup.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = lookup.resolve(&caller_number).await;
            // A closed receiver means shutdown; the result is discarded
            let _ = completions
                .send(Completion::LookupResolved { call_id, outcome })
                .await;
        });
    }

    fn shutdown(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            if let Some(timer) = session.dismiss_timer.take() {
                timer.abort();
            }
        }
    }
}
