//! Chat message model and the poll-merge protocol.
//!
//! This module lives in `core` so the polling task, the view models, and the
//! tests all share one merge implementation. The merge must be idempotent:
//! a poll tick and a user-initiated send may complete in either order, and
//! whichever lands second must discard the ids the first already inserted.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// One chat message scoped to an order. Append-only; `id` is treated as a
/// monotonically increasing order key for incremental fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: DbId,
    pub message: String,
    pub user_id: DbId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl ChatMessage {
    /// `true` when the message was sent by the given session identity.
    /// Affects presentation only (alignment / coloring).
    pub fn is_own(&self, identity_id: DbId) -> bool {
        self.user_id == identity_id
    }
}

/// Body of `POST /api/orders/{id}/chatMessages`, attributed from the
/// current session identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub message: String,
    pub user_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
}

// ---------------------------------------------------------------------------
// Feed state
// ---------------------------------------------------------------------------

/// In-memory message feed for one order's chat view.
#[derive(Debug, Default)]
pub struct ChatFeed {
    messages: Vec<ChatMessage>,
    last_seen_id: Option<DbId>,
}

impl ChatFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in arrival order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Identifier to pass as `since` on the next incremental fetch.
    pub fn last_seen_id(&self) -> Option<DbId> {
        self.last_seen_id
    }

    /// Full resync: replace the feed wholesale and reset `last_seen_id`
    /// from the final element. Used on activation and reactivation.
    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.last_seen_id = messages.last().map(|m| m.id);
        self.messages = messages;
    }

    /// Merge an incremental batch into the feed.
    ///
    /// Messages whose id is already present are discarded; the remainder is
    /// appended preserving the batch's order. Returns `true` if anything was
    /// appended, so callers can skip UI work on a no-op tick. The feed is
    /// left untouched when nothing is new.
    pub fn merge(&mut self, batch: Vec<ChatMessage>) -> bool {
        let known: std::collections::HashSet<DbId> =
            self.messages.iter().map(|m| m.id).collect();
        let fresh: Vec<ChatMessage> = batch
            .into_iter()
            .filter(|m| !known.contains(&m.id))
            .collect();
        if fresh.is_empty() {
            return false;
        }
        self.last_seen_id = fresh.last().map(|m| m.id);
        self.messages.extend(fresh);
        true
    }

    /// Append the server-echoed copy of a message the user just sent, so it
    /// shows up immediately instead of on the next poll tick.
    pub fn push_sent(&mut self, message: ChatMessage) {
        self.merge(vec![message]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: DbId) -> ChatMessage {
        ChatMessage {
            id,
            message: format!("message {id}"),
            user_id: 7,
            user_name: Some("Anna".to_string()),
            user_role: Some("manager".to_string()),
            created_at: None,
        }
    }

    fn ids(feed: &ChatFeed) -> Vec<DbId> {
        feed.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_replace_all_sets_last_seen_id() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1), msg(2), msg(3)]);
        assert_eq!(feed.last_seen_id(), Some(3));
        assert_eq!(ids(&feed), vec![1, 2, 3]);
    }

    #[test]
    fn test_replace_all_empty_clears_last_seen_id() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1)]);
        feed.replace_all(vec![]);
        assert_eq!(feed.last_seen_id(), None);
        assert!(feed.messages().is_empty());
    }

    #[test]
    fn test_merge_discards_known_ids() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1), msg(2), msg(3)]);
        let changed = feed.merge(vec![msg(2), msg(3), msg(4)]);
        assert!(changed);
        assert_eq!(ids(&feed), vec![1, 2, 3, 4]);
        assert_eq!(feed.last_seen_id(), Some(4));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1), msg(2), msg(3)]);
        assert!(feed.merge(vec![msg(2), msg(3), msg(4)]));
        assert!(!feed.merge(vec![msg(2), msg(3), msg(4)]));
        assert_eq!(ids(&feed), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_noop_merge_reports_no_change() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1), msg(2)]);
        assert!(!feed.merge(vec![msg(1), msg(2)]));
        assert_eq!(feed.last_seen_id(), Some(2));
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1), msg(3)]);
        feed.merge(vec![msg(5), msg(2)]);
        // Batch order is preserved as-is; existing messages never move.
        assert_eq!(ids(&feed), vec![1, 3, 5, 2]);
    }

    #[test]
    fn test_push_sent_appears_immediately_and_survives_repoll() {
        let mut feed = ChatFeed::new();
        feed.replace_all(vec![msg(1)]);
        feed.push_sent(msg(2));
        assert_eq!(ids(&feed), vec![1, 2]);
        assert_eq!(feed.last_seen_id(), Some(2));
        // The next tick re-delivers the sent message; nothing duplicates.
        assert!(!feed.merge(vec![msg(2)]));
        assert_eq!(ids(&feed), vec![1, 2]);
    }

    #[test]
    fn test_own_message_classification() {
        let m = msg(1);
        assert!(m.is_own(7));
        assert!(!m.is_own(8));
    }
}
