//! Order lifecycle status: transition table, tab visibility, display colors.
//!
//! Every view that renders an order status goes through this module so the
//! status -> color / label / transition mappings cannot drift between views.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status enum
// ---------------------------------------------------------------------------

/// Lifecycle status of an order.
///
/// The forward path is new -> documentation -> construction -> completion ->
/// closed; a back-transition to the immediately prior status is also offered
/// (business rule enforced server-side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Documentation,
    Construction,
    Completion,
    Closed,
}

/// Statuses offered when the current status is unknown or missing: the full
/// forward set, so an operator is never stuck on a malformed order.
pub const FALLBACK_TRANSITIONS: &[OrderStatus] = &[
    OrderStatus::Documentation,
    OrderStatus::Construction,
    OrderStatus::Completion,
    OrderStatus::Closed,
];

impl OrderStatus {
    /// Parse a wire status string, case-insensitively.
    ///
    /// Returns `None` for unknown or empty input; callers fall back to
    /// [`available_transitions`] with `None` rather than failing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "documentation" => Some(Self::Documentation),
            "construction" => Some(Self::Construction),
            "completion" => Some(Self::Completion),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Wire value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Documentation => "documentation",
            Self::Construction => "construction",
            Self::Completion => "completion",
            Self::Closed => "closed",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Documentation => "Documentation",
            Self::Construction => "Construction",
            Self::Completion => "Completion",
            Self::Closed => "Closed",
        }
    }

    /// Display color (hex) for this status.
    pub fn color(self) -> &'static str {
        match self {
            Self::New => "#2196f3",
            Self::Documentation => "#ff9800",
            Self::Construction => "#9c27b0",
            Self::Completion => "#4caf50",
            Self::Closed => "#9e9e9e",
        }
    }

    /// Neutral color used when the status is unknown or missing.
    pub const NEUTRAL_COLOR: &'static str = "#9e9e9e";

    /// `true` once the order has reached its terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Display color for a possibly unknown status; unknown input gets the
/// neutral color rather than failing.
pub fn status_color(status: Option<OrderStatus>) -> &'static str {
    status.map_or(OrderStatus::NEUTRAL_COLOR, OrderStatus::color)
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Statuses an order may transition to from `current`.
///
/// Each status offers the next forward step plus the immediately prior
/// status; `Closed` is terminal and offers nothing. `None` (unknown or
/// missing status) yields [`FALLBACK_TRANSITIONS`].
pub fn available_transitions(current: Option<OrderStatus>) -> &'static [OrderStatus] {
    match current {
        Some(OrderStatus::New) => &[OrderStatus::Documentation, OrderStatus::Construction],
        Some(OrderStatus::Documentation) => &[OrderStatus::Construction, OrderStatus::New],
        Some(OrderStatus::Construction) => &[OrderStatus::Completion, OrderStatus::Documentation],
        Some(OrderStatus::Completion) => &[OrderStatus::Closed, OrderStatus::Construction],
        Some(OrderStatus::Closed) => &[],
        None => FALLBACK_TRANSITIONS,
    }
}

// ---------------------------------------------------------------------------
// Tab visibility
// ---------------------------------------------------------------------------

/// Feature tabs of the order detail view.
///
/// Visibility is a monotone function of the order status; `Info` and `Chat`
/// are always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTab {
    Info,
    Chat,
    Documents,
    Construction,
    Cameras,
    Completion,
    Closed,
    StatusChange,
}

/// Tabs visible for the given (possibly unknown) order status.
pub fn visible_tabs(current: Option<OrderStatus>) -> Vec<OrderTab> {
    let mut tabs = vec![OrderTab::Info, OrderTab::Chat];
    match current {
        Some(OrderStatus::Documentation) => tabs.push(OrderTab::Documents),
        Some(OrderStatus::Construction) => {
            tabs.push(OrderTab::Construction);
            tabs.push(OrderTab::Cameras);
        }
        Some(OrderStatus::Completion) => tabs.push(OrderTab::Completion),
        Some(OrderStatus::Closed) => tabs.push(OrderTab::Closed),
        Some(OrderStatus::New) | None => {}
    }
    if current != Some(OrderStatus::Closed) {
        tabs.push(OrderTab::StatusChange);
    }
    tabs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("CONSTRUCTION"), Some(OrderStatus::Construction));
        assert_eq!(OrderStatus::parse("  new "), Some(OrderStatus::New));
        assert_eq!(OrderStatus::parse("Documentation"), Some(OrderStatus::Documentation));
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(OrderStatus::parse(""), None);
        assert_eq!(OrderStatus::parse("archived"), None);
    }

    #[test]
    fn test_transition_table_is_exact() {
        assert_eq!(
            available_transitions(Some(OrderStatus::New)),
            &[OrderStatus::Documentation, OrderStatus::Construction]
        );
        assert_eq!(
            available_transitions(Some(OrderStatus::Documentation)),
            &[OrderStatus::Construction, OrderStatus::New]
        );
        assert_eq!(
            available_transitions(Some(OrderStatus::Construction)),
            &[OrderStatus::Completion, OrderStatus::Documentation]
        );
        assert_eq!(
            available_transitions(Some(OrderStatus::Completion)),
            &[OrderStatus::Closed, OrderStatus::Construction]
        );
    }

    #[test]
    fn test_closed_is_terminal() {
        assert!(available_transitions(Some(OrderStatus::Closed)).is_empty());
        assert!(OrderStatus::Closed.is_terminal());
    }

    #[test]
    fn test_unknown_status_offers_full_forward_set() {
        assert_eq!(available_transitions(None), FALLBACK_TRANSITIONS);
        assert_eq!(FALLBACK_TRANSITIONS.len(), 4);
    }

    #[test]
    fn test_unknown_status_gets_neutral_color() {
        assert_eq!(status_color(None), OrderStatus::NEUTRAL_COLOR);
        assert_eq!(status_color(Some(OrderStatus::New)), "#2196f3");
    }

    #[test]
    fn test_info_and_chat_always_visible() {
        for status in [
            None,
            Some(OrderStatus::New),
            Some(OrderStatus::Documentation),
            Some(OrderStatus::Construction),
            Some(OrderStatus::Completion),
            Some(OrderStatus::Closed),
        ] {
            let tabs = visible_tabs(status);
            assert!(tabs.contains(&OrderTab::Info));
            assert!(tabs.contains(&OrderTab::Chat));
        }
    }

    #[test]
    fn test_construction_shows_cameras() {
        let tabs = visible_tabs(Some(OrderStatus::Construction));
        assert!(tabs.contains(&OrderTab::Construction));
        assert!(tabs.contains(&OrderTab::Cameras));
        assert!(!tabs.contains(&OrderTab::Documents));
    }

    #[test]
    fn test_status_change_hidden_when_closed() {
        assert!(!visible_tabs(Some(OrderStatus::Closed)).contains(&OrderTab::StatusChange));
        assert!(visible_tabs(Some(OrderStatus::New)).contains(&OrderTab::StatusChange));
        assert!(visible_tabs(None).contains(&OrderTab::StatusChange));
    }
}
