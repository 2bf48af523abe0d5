//! Routing of received notifications.
//!
//! The server only knows that a notification names a serial number in its
//! `sn` query parameter. What that serial maps to, and what happens to the
//! body, is decided by an [`EventRouter`].

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};

/// A received notification, unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    /// Value of the `sn` query parameter
    pub serial_number: String,
    /// Request path, e.g. `/MediaRenderer/AVTransport/Event`
    pub path: String,
    /// Raw request body
    pub body: Bytes,
}

impl NotificationPayload {
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Decides where notifications go.
///
/// `resolve` runs before the request body is read; returning `None` answers
/// 404 without touching the body.
#[async_trait]
pub trait EventRouter: Send + Sync + 'static {
    type Target: Send + 'static;

    async fn resolve(&self, serial_number: &str) -> Option<Self::Target>;

    async fn dispatch(&self, target: Self::Target, payload: NotificationPayload);
}

/// Router that forwards notifications for registered serial numbers to a
/// channel.
#[derive(Clone)]
pub struct ChannelRouter {
    serials: Arc<RwLock<HashSet<String>>>,
    event_sender: mpsc::UnboundedSender<NotificationPayload>,
}

impl ChannelRouter {
    /// Create a new router.
    ///
    /// ```
    /// use tokio::sync::mpsc;
    /// use callback_server::{ChannelRouter, NotificationPayload};
    ///
    /// let (tx, mut rx) = mpsc::unbounded_channel::<NotificationPayload>();
    /// let router = ChannelRouter::new(tx);
    /// ```
    pub fn new(event_sender: mpsc::UnboundedSender<NotificationPayload>) -> Self {
        Self {
            serials: Arc::new(RwLock::new(HashSet::new())),
            event_sender,
        }
    }

    /// Accept notifications for `serial_number`.
    pub async fn register(&self, serial_number: impl Into<String>) {
        self.serials.write().await.insert(serial_number.into());
    }

    pub async fn unregister(&self, serial_number: &str) {
        self.serials.write().await.remove(serial_number);
    }
}

#[async_trait]
impl EventRouter for ChannelRouter {
    type Target = ();

    async fn resolve(&self, serial_number: &str) -> Option<()> {
        self.serials
            .read()
            .await
            .contains(serial_number)
            .then_some(())
    }

    async fn dispatch(&self, _target: (), payload: NotificationPayload) {
        // Receiver gone means nobody is listening any more
        let _ = self.event_sender.send(payload);
    }
}
