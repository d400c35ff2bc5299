//! Off-thread delivery of engine notifications.
//!
//! Every subscription owns a worker thread fed by its own channel. Publishing
//! only clones the payload into those channels, so the thread driving the
//! engine never waits on a handler. Handler panics are caught and logged per
//! subscription.

use crate::mouse_gestures::geometry::Point;
use crate::mouse_gestures::gesture::Gesture;
use crate::mouse_gestures::session::RecordingSession;
use anyhow::Context;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type CleanupFn = Box<dyn FnOnce(&Gesture) + Send + 'static>;

struct Subscriber<T> {
    id: SubscriptionId,
    tx: Sender<T>,
}

/// Subscriber list for one notification kind.
struct Multicast<T> {
    kind: &'static str,
    subscribers: Mutex<Vec<Subscriber<T>>>,
}

impl<T: Send + Clone + 'static> Multicast<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn subscribe<F>(&self, id: SubscriptionId, handler: F) -> anyhow::Result<()>
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let kind = self.kind;
        thread::Builder::new()
            .name(format!("gesture-{kind}-{}", id.0))
            .spawn(move || run_subscriber(kind, id, rx, handler))
            .with_context(|| format!("failed to spawn {kind} subscriber thread"))?;

        match self.subscribers.lock() {
            Ok(mut guard) => guard.push(Subscriber { id, tx }),
            Err(err) => anyhow::bail!("{kind} subscriber list poisoned: {err}"),
        }
        tracing::debug!(kind, subscriber = id.0, "gesture subscriber registered");
        Ok(())
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.subscribers.lock() {
            Ok(mut guard) => {
                let before = guard.len();
                guard.retain(|sub| sub.id != id);
                guard.len() != before
            }
            Err(err) => {
                tracing::error!(?err, kind = self.kind, "failed to lock subscriber list");
                false
            }
        }
    }

    fn publish(&self, payload: T) {
        let mut guard = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(err) => {
                tracing::error!(?err, kind = self.kind, "failed to lock subscriber list");
                return;
            }
        };
        // A closed channel means the worker is gone; forget it.
        guard.retain(|sub| sub.tx.send(payload.clone()).is_ok());
    }

    fn len(&self) -> usize {
        self.subscribers.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

fn run_subscriber<T, F>(kind: &'static str, id: SubscriptionId, rx: Receiver<T>, handler: F)
where
    F: Fn(T),
{
    while let Ok(payload) = rx.recv() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            let panic_message = panic_message(payload.as_ref());
            tracing::error!(kind, subscriber = id.0, panic_message, "gesture subscriber panicked");
        }
    }
    tracing::trace!(kind, subscriber = id.0, "gesture subscriber stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Completion payload. Holding the session here keeps
/// [`Gesture::session`] resolvable until every handler has run.
#[derive(Clone)]
struct Completion {
    gesture: Gesture,
    _session: Arc<RecordingSession>,
}

struct Channels {
    next_id: AtomicU64,
    start: Multicast<Arc<RecordingSession>>,
    update: Multicast<Option<Arc<RecordingSession>>>,
    complete: Multicast<Completion>,
    click_through: Multicast<Point>,
}

/// Cloneable handle to the engine's subscriber lists.
#[derive(Clone)]
pub struct Notifier {
    channels: Arc<Channels>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Channels {
                next_id: AtomicU64::new(1),
                start: Multicast::new("start"),
                update: Multicast::new("update"),
                complete: Multicast::new("complete"),
                click_through: Multicast::new("click_through"),
            }),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.channels.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn on_start<F>(&self, handler: F) -> anyhow::Result<SubscriptionId>
    where
        F: Fn(Arc<RecordingSession>) + Send + 'static,
    {
        let id = self.next_id();
        self.channels.start.subscribe(id, handler)?;
        Ok(id)
    }

    /// `None` means the session was abandoned by a reset.
    pub fn on_update<F>(&self, handler: F) -> anyhow::Result<SubscriptionId>
    where
        F: Fn(Option<Arc<RecordingSession>>) + Send + 'static,
    {
        let id = self.next_id();
        self.channels.update.subscribe(id, handler)?;
        Ok(id)
    }

    pub fn on_complete<F>(&self, handler: F) -> anyhow::Result<SubscriptionId>
    where
        F: Fn(&Gesture) + Send + 'static,
    {
        let id = self.next_id();
        self.channels
            .complete
            .subscribe(id, move |completion: Completion| handler(&completion.gesture))?;
        Ok(id)
    }

    pub fn on_click_through<F>(&self, handler: F) -> anyhow::Result<SubscriptionId>
    where
        F: Fn(Point) + Send + 'static,
    {
        let id = self.next_id();
        self.channels.click_through.subscribe(id, handler)?;
        Ok(id)
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let channels = &self.channels;
        channels.start.unsubscribe(id)
            || channels.update.unsubscribe(id)
            || channels.complete.unsubscribe(id)
            || channels.click_through.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        let channels = &self.channels;
        channels.start.len()
            + channels.update.len()
            + channels.complete.len()
            + channels.click_through.len()
    }

    pub(crate) fn start(&self, session: Arc<RecordingSession>) {
        self.channels.start.publish(session);
    }

    pub(crate) fn update(&self, session: Option<Arc<RecordingSession>>) {
        self.channels.update.publish(session);
    }

    pub(crate) fn click_through(&self, position: Point) {
        self.channels.click_through.publish(position);
    }

    /// Run `cleanup` on a detached thread, then publish the completion.
    pub(crate) fn complete(
        &self,
        gesture: Gesture,
        session: Arc<RecordingSession>,
        cleanup: CleanupFn,
    ) {
        let channels = Arc::clone(&self.channels);
        let job = move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup(&gesture))) {
                let panic_message = panic_message(payload.as_ref());
                tracing::error!(panic_message, gesture = %gesture, "gesture cleanup panicked");
            }
            channels.complete.publish(Completion {
                gesture,
                _session: session,
            });
        };

        if let Err(err) = thread::Builder::new()
            .name("gesture-complete".to_string())
            .spawn(job)
        {
            // The closure is consumed by the failed spawn, so there is nothing
            // left to run; the completion is lost.
            tracing::error!(?err, "failed to spawn gesture completion thread");
        }
    }
}
