//! Publish/subscribe plumbing for client notifications.
//!
//! The presentation layer learns about state changes ("session changed",
//! "documents changed") by subscribing to a bus instead of observing mutable
//! properties. The bus makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels today, anything with fan-out tomorrow
//! - **Best-effort**: a notification is a hint to refresh, never the source of truth
//! - **No persistence**: the document store holds the state; the bus only announces it

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Receiving end of a bus. Sees every message published after it was
/// created; earlier messages are not replayed.
///
/// ## Example
///
/// ```ignore
/// let subscription = client.subscribe();
///
/// loop {
///     match subscription.recv_timeout(Duration::from_millis(250)) {
///         Ok(ClientNotification::DocumentsChanged { .. }) => view.refresh(),
///         Ok(_) => {}
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
///
/// Read a subscription from one thread, usually the UI thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next notification.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Next queued notification, if any.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Wait at most `timeout` for the next notification.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything queued right now, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Fan-out channel between the client and whatever renders it.
///
/// ```text
/// DesktopClient (operation succeeded) → EventBus (publish) → Subscribers
///                                                              ├─ document list view
///                                                              └─ status bar / menus
/// ```
///
/// `publish()` can fail (e.g. a poisoned lock). Callers log the failure and
/// carry on: the operation that triggered the notification has already
/// completed and is not rolled back.
///
/// The trait requires `Send + Sync`, so one bus can be shared between the
/// client and any background view models.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
