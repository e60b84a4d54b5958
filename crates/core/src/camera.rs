//! Site web cameras attached to an order.

use serde::{Deserialize, Serialize};

use crate::order_status::OrderStatus;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// One camera streaming from the construction site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub stream_url: Option<String>,
}

/// Body of camera create/update requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
}

/// Cameras are an admin-only feature, shown only while the order is in
/// construction.
pub fn cameras_visible(role: &str, status: Option<OrderStatus>) -> bool {
    role == ROLE_ADMIN && status == Some(OrderStatus::Construction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_CLIENT, ROLE_MANAGER};

    #[test]
    fn test_visible_only_for_admin_during_construction() {
        assert!(cameras_visible(ROLE_ADMIN, Some(OrderStatus::Construction)));
        assert!(!cameras_visible(ROLE_MANAGER, Some(OrderStatus::Construction)));
        assert!(!cameras_visible(ROLE_CLIENT, Some(OrderStatus::Construction)));
        assert!(!cameras_visible(ROLE_ADMIN, Some(OrderStatus::Documentation)));
        assert!(!cameras_visible(ROLE_ADMIN, None));
    }
}
