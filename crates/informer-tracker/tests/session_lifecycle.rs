//! Session lifecycle tests
//!
//! Drives a spawned tracker through complete call lifecycles over the same
//! channel the event client uses, and observes only what the UI sink sees.
//! Time is virtual: the auto-dismiss deadline is crossed by advancing the
//! paused clock, not by waiting.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use informer_core::config::PopupConfig;
use informer_core::models::{CallEvent, CallerDetails, ChannelUpdate, ContactInfo, LookupOutcome};
use informer_core::traits::{CallerLookup, NotificationSink};
use informer_core::AppError;
use informer_tracker::CallSessionTracker;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Created(String),
    Answered(String),
    Destroyed(String),
    Dismissed(String),
    Resolved(String, String),
    Disconnected,
    Reconnected,
}

#[derive(Default)]
struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
    visible: Mutex<HashSet<String>>,
}

impl RecordingSink {
    fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    fn push(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn count_of(&self, wanted: &Notice) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| *n == wanted)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn on_created(&self, contact: &ContactInfo) {
        self.visible
            .lock()
            .unwrap()
            .insert(contact.call_id.clone());
        self.push(Notice::Created(contact.call_id.clone()));
    }

    fn on_answered(&self, contact: &ContactInfo) {
        self.push(Notice::Answered(contact.call_id.clone()));
    }

    fn on_destroyed(&self, contact: &ContactInfo) {
        self.visible.lock().unwrap().remove(&contact.call_id);
        self.push(Notice::Destroyed(contact.call_id.clone()));
    }

    fn on_dismissed(&self, contact: &ContactInfo) {
        self.visible.lock().unwrap().remove(&contact.call_id);
        self.push(Notice::Dismissed(contact.call_id.clone()));
    }

    fn on_caller_resolved(&self, contact: &ContactInfo) {
        self.push(Notice::Resolved(
            contact.call_id.clone(),
            contact.display_label().to_string(),
        ));
    }

    fn on_disconnected(&self) {
        self.push(Notice::Disconnected);
    }

    fn on_reconnected(&self) {
        self.push(Notice::Reconnected);
    }

    fn is_visible(&self, call_id: &str) -> bool {
        self.visible.lock().unwrap().contains(call_id)
    }
}

/// Resolves every number to the same display name
struct DirectoryLookup;

#[async_trait]
impl CallerLookup for DirectoryLookup {
    async fn resolve(&self, _caller_number: &str) -> Result<LookupOutcome, AppError> {
        Ok(LookupOutcome::Found(CallerDetails {
            display_name: Some("Directory Hit".to_string()),
            organization: None,
            location: None,
        }))
    }
}

/// Never resolves
struct NeverLookup;

#[async_trait]
impl CallerLookup for NeverLookup {
    async fn resolve(&self, _caller_number: &str) -> Result<LookupOutcome, AppError> {
        futures::future::pending().await
    }
}

fn spawn_tracker(
    lookup: Arc<dyn CallerLookup>,
) -> (
    Arc<RecordingSink>,
    mpsc::Sender<ChannelUpdate>,
    tokio::task::JoinHandle<()>,
) {
    let sink = Arc::new(RecordingSink::default());
    let tracker = CallSessionTracker::new(
        sink.clone(),
        lookup,
        &PopupConfig {
            close_on_hangup: true,
            dismiss_after_secs: 15,
        },
    );

    let (tx, rx) = mpsc::channel(16);
    let handle = tokio::spawn(tracker.run(rx));
    (sink, tx, handle)
}

fn create(call_id: &str, caller: &str) -> ChannelUpdate {
    ChannelUpdate::Event(CallEvent::Create {
        call_id: call_id.to_string(),
        caller_number: caller.to_string(),
        callee_number: None,
    })
}

fn answer(call_id: &str) -> ChannelUpdate {
    ChannelUpdate::Event(CallEvent::Answer {
        call_id: call_id.to_string(),
    })
}

fn destroy(call_id: &str) -> ChannelUpdate {
    ChannelUpdate::Event(CallEvent::Destroy {
        call_id: call_id.to_string(),
        hangup_cause: Some("NORMAL_CLEARING".to_string()),
    })
}

/// Let the tracker drain everything queued so far (virtual time)
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn full_lifecycle_with_resolution() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(DirectoryLookup));

    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(answer("c1")).await.unwrap();
    settle().await;
    tx.send(destroy("c1")).await.unwrap();
    settle().await;

    let notices = sink.notices();
    assert_eq!(notices[0], Notice::Created("c1".to_string()));
    assert!(notices.contains(&Notice::Resolved(
        "c1".to_string(),
        "Directory Hit".to_string()
    )));
    assert!(notices.contains(&Notice::Answered("c1".to_string())));
    assert_eq!(*notices.last().unwrap(), Notice::Destroyed("c1".to_string()));

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn answered_call_auto_dismisses_exactly_once() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(answer("c1")).await.unwrap();
    settle().await;

    // Just short of the deadline: still up
    sleep(Duration::from_secs(14)).await;
    assert_eq!(sink.count_of(&Notice::Dismissed("c1".to_string())), 0);

    // Cross it
    sleep(Duration::from_secs(6)).await;
    assert_eq!(sink.count_of(&Notice::Dismissed("c1".to_string())), 1);
    assert_eq!(sink.count_of(&Notice::Destroyed("c1".to_string())), 0);

    // A destroy arriving after the dismissal finds nothing
    tx.send(destroy("c1")).await.unwrap();
    settle().await;
    assert_eq!(sink.count_of(&Notice::Destroyed("c1".to_string())), 0);

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn destroy_beats_the_dismiss_timer() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(answer("c1")).await.unwrap();
    settle().await;

    sleep(Duration::from_secs(10)).await;
    tx.send(destroy("c1")).await.unwrap();
    settle().await;

    sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.count_of(&Notice::Destroyed("c1".to_string())), 1);
    assert_eq!(sink.count_of(&Notice::Dismissed("c1".to_string())), 0);

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rejected_call_never_arms_a_timer() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(create("c2", "+17775555")).await.unwrap();
    tx.send(destroy("c2")).await.unwrap();
    settle().await;

    assert_eq!(sink.count_of(&Notice::Destroyed("c2".to_string())), 1);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(sink.count_of(&Notice::Dismissed("c2".to_string())), 0);

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn duplicate_create_emits_once_while_visible() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(create("c1", "+15551234")).await.unwrap();
    settle().await;

    assert_eq!(sink.count_of(&Notice::Created("c1".to_string())), 1);

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn connection_state_changes_pass_through() {
    let (sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(ChannelUpdate::Reconnected).await.unwrap();
    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(ChannelUpdate::Disconnected).await.unwrap();
    tx.send(ChannelUpdate::Reconnected).await.unwrap();
    settle().await;

    // Sessions survive the drop: the call can still be answered after
    tx.send(answer("c1")).await.unwrap();
    settle().await;

    let notices = sink.notices();
    assert!(notices.contains(&Notice::Disconnected));
    assert_eq!(
        notices.iter().filter(|n| **n == Notice::Reconnected).count(),
        2
    );
    assert!(notices.contains(&Notice::Answered("c1".to_string())));

    drop(tx);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn tracker_stops_when_the_channel_closes() {
    let (_sink, tx, handle) = spawn_tracker(Arc::new(NeverLookup));

    tx.send(create("c1", "+15551234")).await.unwrap();
    tx.send(answer("c1")).await.unwrap();
    settle().await;

    drop(tx);
    handle.await.unwrap();
}
