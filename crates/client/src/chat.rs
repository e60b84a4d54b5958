//! Fixed-interval chat polling for one order's message feed.
//!
//! There is no socket transport; "live" updates come from polling the chat
//! endpoint every few seconds and merging the result through
//! [`ChatFeed`]. Merges are serialized by the feed lock and the merge
//! itself is idempotent, so a poll tick and a user-initiated send may
//! complete in either order without duplicating messages.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use domus_core::chat::{ChatFeed, ChatMessage, OutgoingMessage};
use domus_core::types::DbId;

use crate::config::ClientConfig;
use crate::gateway::{ApiError, RestGateway};
use crate::session::SessionIdentity;

/// Handle for the spawned poll task of one chat view.
struct PollTask {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

/// Polls one order's chat while its view is visible.
///
/// [`ChatPoller::start`] performs a full resync and spawns the interval
/// task; [`ChatPoller::stop`] cancels it when the view goes away. Starting
/// again resyncs from scratch to cover the gap.
pub struct ChatPoller {
    gateway: Arc<RestGateway>,
    identity: SessionIdentity,
    order_id: DbId,
    poll_interval: std::time::Duration,
    feed: Arc<Mutex<ChatFeed>>,
    task: Option<PollTask>,
}

impl ChatPoller {
    pub fn new(
        config: &ClientConfig,
        gateway: Arc<RestGateway>,
        identity: SessionIdentity,
        order_id: DbId,
    ) -> Self {
        Self {
            gateway,
            identity,
            order_id,
            poll_interval: config.poll_interval,
            feed: Arc::new(Mutex::new(ChatFeed::new())),
            task: None,
        }
    }

    /// Snapshot of the current feed, in arrival order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.feed.lock().await.messages().to_vec()
    }

    /// `true` while the interval task is running.
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Activate the view: full resync, then poll every interval.
    ///
    /// Any previous poll task is cancelled first, so at most one interval
    /// timer exists per poller. The initial fetch error propagates to the
    /// caller (the view shows it with a retry); no task is spawned in that
    /// case.
    pub async fn start(&mut self) -> Result<(), ApiError> {
        self.stop();

        let initial = self.gateway.chat_messages(self.order_id, None).await?;
        self.feed.lock().await.replace_all(initial);

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let gateway = Arc::clone(&self.gateway);
        let feed = Arc::clone(&self.feed);
        let order_id = self.order_id;
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of tokio's interval fires immediately; the
            // resync above already covered it.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!(order_id, "Chat polling stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = poll_once(&gateway, &feed, order_id).await {
                            // Transient failures must not stop the timer or
                            // surface to the user.
                            tracing::warn!(order_id, error = %e, "Chat poll tick failed");
                        }
                    }
                }
            }
        });

        self.task = Some(PollTask { cancel, handle });
        Ok(())
    }

    /// Deactivate the view: stop the interval timer. The feed is kept; the
    /// next [`start`](Self::start) replaces it wholesale.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            task.handle.abort();
        }
    }

    /// Out-of-band incremental fetch, without resetting the interval timer.
    ///
    /// Returns `true` if new messages arrived. Unlike a timer tick this is
    /// user-initiated, so the error propagates.
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        poll_once(&self.gateway, &self.feed, self.order_id).await
    }

    /// Send a message attributed to the session identity.
    ///
    /// The server-returned message is merged into the feed immediately so
    /// the sender sees it without waiting for the next tick. On failure the
    /// error propagates and the caller keeps the draft text.
    pub async fn send(&self, text: &str) -> Result<ChatMessage, ApiError> {
        let body = OutgoingMessage {
            message: text.to_string(),
            user_id: self.identity.user_id,
            user_name: self.identity.name.clone(),
            user_role: self.identity.role.clone(),
        };
        let stored = self.gateway.send_chat_message(self.order_id, &body).await?;
        self.feed.lock().await.push_sent(stored.clone());
        Ok(stored)
    }

    /// Presentation-only check: was this message sent by the current user?
    pub fn is_own(&self, message: &ChatMessage) -> bool {
        message.is_own(self.identity.user_id)
    }
}

impl Drop for ChatPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One incremental fetch-and-merge pass. Shared by the timer tick and the
/// manual refresh.
async fn poll_once(
    gateway: &RestGateway,
    feed: &Mutex<ChatFeed>,
    order_id: DbId,
) -> Result<bool, ApiError> {
    let since = feed.lock().await.last_seen_id();
    let batch = gateway.chat_messages(order_id, since).await?;
    if batch.is_empty() {
        return Ok(false);
    }
    Ok(feed.lock().await.merge(batch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poller() -> ChatPoller {
        let config = ClientConfig::new("http://localhost:0");
        let gateway = Arc::new(RestGateway::new(&config, "test-token").unwrap());
        let identity = SessionIdentity {
            user_id: 7,
            name: Some("Anna".to_string()),
            role: Some("manager".to_string()),
        };
        ChatPoller::new(&config, gateway, identity, 1)
    }

    #[tokio::test]
    async fn test_not_polling_before_start() {
        let p = poller();
        assert!(!p.is_polling());
        assert!(p.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_noop() {
        let mut p = poller();
        p.stop();
        assert!(!p.is_polling());
    }

    #[tokio::test]
    async fn test_own_message_uses_session_identity() {
        let p = poller();
        let m = ChatMessage {
            id: 1,
            message: "hello".to_string(),
            user_id: 7,
            user_name: None,
            user_role: None,
            created_at: None,
        };
        assert!(p.is_own(&m));
    }
}
