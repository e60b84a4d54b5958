//! Order models and status-submission validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::order_status::OrderStatus;
use crate::stage::Stage;
use crate::types::{DbId, Timestamp};

/// Client party of an order, embedded in the order detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub contact: Option<String>,
}

/// Project the order was created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub total_area: Option<f64>,
    #[serde(default, rename = "areaM2")]
    pub area_m2: Option<f64>,
}

/// One entry of an order's append-only status history.
///
/// Entries are never mutated or deleted; the order's `current_status` always
/// reflects the latest appended entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub id: DbId,
    /// Raw wire value; parse with [`OrderStatus::parse`] for display logic.
    pub status_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl StatusEntry {
    /// The parsed status, `None` when the wire value is unknown.
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status_type)
    }
}

/// Full order detail as returned by `GET /api/orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: DbId,
    pub client_info: ClientInfo,
    pub project_info: ProjectInfo,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub current_status: Option<StatusEntry>,
    /// Latest stage snapshot; must belong to the order's stage collection.
    #[serde(default)]
    pub current_stage: Option<Stage>,
}

impl Order {
    /// The parsed current status, `None` when missing or unknown.
    pub fn status(&self) -> Option<OrderStatus> {
        self.current_status.as_ref().and_then(StatusEntry::status)
    }
}

/// Body of `POST /api/orders/{id}/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatus {
    pub status_type: String,
    pub comment: String,
}

impl NewStatus {
    /// Build a status submission, enforcing the non-empty preconditions:
    /// a status change always carries a justification comment.
    pub fn new(status: OrderStatus, comment: &str) -> Result<Self, CoreError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(CoreError::Validation(
                "Status change requires a justification comment".to_string(),
            ));
        }
        Ok(Self {
            status_type: status.as_str().to_string(),
            comment: comment.to_string(),
        })
    }
}
