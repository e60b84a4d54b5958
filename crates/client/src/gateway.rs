//! Typed REST gateway for the platform backend.
//!
//! One thin wrapper per endpoint group (applications, orders, stages,
//! documents, chat, cameras, users, templates), all sharing a single
//! [`reqwest::Client`], the bearer token, and uniform error normalization:
//! transport failures and non-2xx responses both collapse into [`ApiError`],
//! with the raw status and body preserved for display.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use domus_core::application::{Application, NewApplication};
use domus_core::camera::{Camera, CameraRequest};
use domus_core::chat::{ChatMessage, OutgoingMessage};
use domus_core::document::{Document, NewDocument};
use domus_core::order::{NewStatus, Order, StatusEntry};
use domus_core::stage::{NewStage, Stage, StageUpdate};
use domus_core::types::DbId;

use crate::config::ClientConfig;

/// Errors from the REST gateway.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body, surfaced to the user verbatim.
        body: String,
    },

    /// Failed to build the underlying HTTP client.
    #[error("Failed to construct HTTP client: {0}")]
    Construct(reqwest::Error),
}

/// A paged list response, shape `{items, total, pageSize}`.
///
/// All fields decode defensively: a backend that omits `items` yields an
/// empty page rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page_size: u32,
}

/// A platform user, as returned by the users endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// A house-project template clients can base an application on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub total_area: Option<f64>,
}

/// Authenticated REST client for the platform backend.
///
/// Cheap to clone behind an `Arc` by callers; holds the shared connection
/// pool and the caller's bearer token.
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestGateway {
    /// Build a gateway from the injected configuration and a bearer token.
    ///
    /// The request timeout from the configuration applies to every call
    /// issued through this gateway.
    pub fn new(config: &ClientConfig, token: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::Construct)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.token)
    }

    fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(&self.token)
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(&self.token)
    }

    // ---- applications ----

    /// `GET /api/applications?page&size` -- the manager triage list.
    pub async fn applications(&self, page: u32, size: u32) -> Result<Page<Application>, ApiError> {
        let response = self
            .get("/api/applications")
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/applications/user?page&size` -- the current user's own
    /// applications.
    pub async fn own_applications(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<Application>, ApiError> {
        let response = self
            .get("/api/applications/user")
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /api/applications`.
    pub async fn create_application(&self, body: &NewApplication) -> Result<(), ApiError> {
        let response = self.post("/api/applications").json(body).send().await?;
        Self::check_status(response).await
    }

    /// `PATCH /api/applications/{id}/take` -- claim the application for the
    /// calling manager.
    pub async fn take_application(&self, id: DbId) -> Result<(), ApiError> {
        let response = self.patch(&format!("/api/applications/{id}/take")).send().await?;
        Self::check_status(response).await
    }

    /// `PATCH /api/applications/{id}/reject`.
    pub async fn reject_application(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .patch(&format!("/api/applications/{id}/reject"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `PATCH /api/applications/{id}/accept` -- also creates the order
    /// server-side.
    pub async fn accept_application(&self, id: DbId) -> Result<(), ApiError> {
        let response = self
            .patch(&format!("/api/applications/{id}/accept"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- orders ----

    /// `GET /api/orders?page&pageSize`.
    pub async fn orders(&self, page: u32, page_size: u32) -> Result<Page<Order>, ApiError> {
        let response = self
            .get("/api/orders")
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/orders/manager?page&size` -- orders scoped to the calling
    /// manager.
    pub async fn manager_orders(&self, page: u32, size: u32) -> Result<Page<Order>, ApiError> {
        let response = self
            .get("/api/orders/manager")
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/orders/{id}` -- full detail including current status and
    /// stage snapshot.
    pub async fn order(&self, id: DbId) -> Result<Order, ApiError> {
        let response = self.get(&format!("/api/orders/{id}")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/orders/{id}/status` -- the append-only status history.
    pub async fn status_history(&self, id: DbId) -> Result<Vec<StatusEntry>, ApiError> {
        let response = self.get(&format!("/api/orders/{id}/status")).send().await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/status` -- append a status transition.
    pub async fn submit_status(&self, id: DbId, body: &NewStatus) -> Result<(), ApiError> {
        let response = self
            .post(&format!("/api/orders/{id}/status"))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `POST /api/orders/{id}/address`.
    pub async fn update_address(&self, id: DbId, address: &str) -> Result<(), ApiError> {
        let response = self
            .post(&format!("/api/orders/{id}/address"))
            .json(&serde_json::json!({ "address": address }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- stages ----

    /// `GET /api/orders/{id}/stages`.
    pub async fn stages(&self, order_id: DbId) -> Result<Vec<Stage>, ApiError> {
        let response = self.get(&format!("/api/orders/{order_id}/stages")).send().await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/stages`.
    pub async fn create_stage(&self, order_id: DbId, body: &NewStage) -> Result<Stage, ApiError> {
        let response = self
            .post(&format!("/api/orders/{order_id}/stages"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PATCH /api/orders/{id}/stages/{stageId}` -- partial update. Callers
    /// normalize the body via [`StageUpdate::normalized`] first.
    pub async fn update_stage(
        &self,
        order_id: DbId,
        stage_id: DbId,
        body: &StageUpdate,
    ) -> Result<(), ApiError> {
        let response = self
            .patch(&format!("/api/orders/{order_id}/stages/{stage_id}"))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `DELETE /api/orders/{id}/stages/{stageId}`.
    pub async fn delete_stage(&self, order_id: DbId, stage_id: DbId) -> Result<(), ApiError> {
        let response = self
            .delete(&format!("/api/orders/{order_id}/stages/{stage_id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- documents ----

    /// `GET /api/orders/{id}/documents` -- all revisions, not yet reduced.
    pub async fn documents(&self, order_id: DbId) -> Result<Vec<Document>, ApiError> {
        let response = self
            .get(&format!("/api/orders/{order_id}/documents"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/orders/{id}/documents/{docId}`.
    pub async fn document(&self, order_id: DbId, doc_id: DbId) -> Result<Document, ApiError> {
        let response = self
            .get(&format!("/api/orders/{order_id}/documents/{doc_id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/documents`.
    pub async fn create_document(
        &self,
        order_id: DbId,
        body: &NewDocument,
    ) -> Result<Document, ApiError> {
        let response = self
            .post(&format!("/api/orders/{order_id}/documents"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/documents/{docId}/sign` -- submit a signature,
    /// base64-encoded on the wire.
    pub async fn sign_document(
        &self,
        order_id: DbId,
        doc_id: DbId,
        signature: &[u8],
    ) -> Result<(), ApiError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(signature);
        let response = self
            .post(&format!("/api/orders/{order_id}/documents/{doc_id}/sign"))
            .json(&serde_json::json!({ "signature": encoded }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /api/orders/{id}/documents/{docId}/download` -- raw file bytes.
    pub async fn download_document(
        &self,
        order_id: DbId,
        doc_id: DbId,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .get(&format!("/api/orders/{order_id}/documents/{doc_id}/download"))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- chat ----

    /// `GET /api/orders/{id}/chatMessages[?since=<id>]`.
    ///
    /// With `since`, only messages after that identifier are returned,
    /// enabling the incremental poll fetch.
    pub async fn chat_messages(
        &self,
        order_id: DbId,
        since: Option<DbId>,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let mut request = self.get(&format!("/api/orders/{order_id}/chatMessages"));
        if let Some(since) = since {
            request = request.query(&[("since", since)]);
        }
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/chatMessages` -- returns the stored message,
    /// which callers merge into local state immediately.
    pub async fn send_chat_message(
        &self,
        order_id: DbId,
        body: &OutgoingMessage,
    ) -> Result<ChatMessage, ApiError> {
        let response = self
            .post(&format!("/api/orders/{order_id}/chatMessages"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- cameras ----

    /// `GET /api/orders/{id}/webCameras`.
    pub async fn cameras(&self, order_id: DbId) -> Result<Vec<Camera>, ApiError> {
        let response = self
            .get(&format!("/api/orders/{order_id}/webCameras"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /api/orders/{id}/webCameras`.
    pub async fn create_camera(
        &self,
        order_id: DbId,
        body: &CameraRequest,
    ) -> Result<Camera, ApiError> {
        let response = self
            .post(&format!("/api/orders/{order_id}/webCameras"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /api/orders/{id}/webCameras/{camId}`.
    pub async fn update_camera(
        &self,
        order_id: DbId,
        camera_id: DbId,
        body: &CameraRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .put(&format!("/api/orders/{order_id}/webCameras/{camera_id}"))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `DELETE /api/orders/{id}/webCameras/{camId}`.
    pub async fn delete_camera(&self, order_id: DbId, camera_id: DbId) -> Result<(), ApiError> {
        let response = self
            .delete(&format!("/api/orders/{order_id}/webCameras/{camera_id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- users & templates ----

    /// `GET /api/users/{id}`.
    pub async fn user(&self, id: DbId) -> Result<User, ApiError> {
        let response = self.get(&format!("/api/users/{id}")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/users?page&size`.
    pub async fn users(&self, page: u32, size: u32) -> Result<Page<User>, ApiError> {
        let response = self
            .get("/api/users")
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /api/users/{id}/orders`.
    pub async fn user_orders(&self, id: DbId) -> Result<Vec<Order>, ApiError> {
        let response = self.get(&format!("/api/users/{id}/orders")).send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/templates`.
    pub async fn templates(&self) -> Result<Vec<ProjectTemplate>, ApiError> {
        let response = self.get("/api/templates").send().await?;
        Self::parse_response(response).await
    }

    /// `GET /api/templates/{id}`.
    pub async fn template(&self, id: DbId) -> Result<ProjectTemplate, ApiError> {
        let response = self.get(&format!("/api/templates/{id}")).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or an [`ApiError::Api`] carrying the status and
    /// raw body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Check the status and discard the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await.map(|_| ())
    }

    /// Check the status and decode the JSON body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Encode file bytes for the inline `content` field of a document upload.
pub fn encode_document_content(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_decodes_defensively() {
        let page: Page<Application> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_page_decodes_full_shape() {
        let json = r#"{
            "items": [{ "id": 1, "statusName": "created" }],
            "total": 14,
            "pageSize": 10
        }"#;
        let page: Page<Application> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 14);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn test_api_error_display_carries_status_and_body() {
        let err = ApiError::Api {
            status: 422,
            body: "comment must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "API error (422): comment must not be empty");
    }

    #[test]
    fn test_document_content_encoding_is_base64() {
        assert_eq!(encode_document_content(b"hello"), "aGVsbG8=");
    }
}
