//! View models over the REST gateway: order detail and application triage.
//!
//! These hold the per-view state the browser frontend kept in component
//! state: the assembled order view (status, stages, documents, available
//! transitions) and the manager's application triage list with its
//! optimistic updates.

use std::sync::Arc;

use chrono::Utc;

use domus_core::application::{
    apply_decision, apply_take, bucketize, reconcile, Application,
};
use domus_core::document::{latest_revisions, Document};
use domus_core::error::CoreError;
use domus_core::order::{NewStatus, Order, StatusEntry};
use domus_core::order_status::{available_transitions, visible_tabs, OrderStatus, OrderTab};
use domus_core::stage::{Stage, StageUpdate};
use domus_core::types::DbId;

use crate::gateway::{ApiError, RestGateway};
use crate::session::SessionIdentity;

/// Errors from the view-model layer.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Order detail view
// ---------------------------------------------------------------------------

/// Everything the order detail view renders, assembled in one load pass.
#[derive(Debug)]
pub struct OrderView {
    pub order: Order,
    /// Append-only status history, as returned by the backend.
    pub history: Vec<StatusEntry>,
    pub stages: Vec<Stage>,
    /// Latest revision per logical document, newest first.
    pub documents: Vec<Document>,
    /// Statuses the order may transition to from its current one.
    pub available_statuses: Vec<OrderStatus>,
    pub tabs: Vec<OrderTab>,
}

/// Assemble the view state from already-fetched slices.
fn derive_view(
    order: Order,
    history: Vec<StatusEntry>,
    stages: Vec<Stage>,
    documents: Vec<Document>,
) -> OrderView {
    let status = order.status();
    let mut documents = latest_revisions(&documents);
    // The reducer's output order is unspecified; display newest first.
    documents.sort_by_key(|d| std::cmp::Reverse(d.created_at.map(|t| t.timestamp_millis())));
    OrderView {
        available_statuses: available_transitions(status).to_vec(),
        tabs: visible_tabs(status),
        order,
        history,
        stages,
        documents,
    }
}

/// Loads and mutates one order's detail view.
pub struct OrderViewModel {
    gateway: Arc<RestGateway>,
}

impl OrderViewModel {
    pub fn new(gateway: Arc<RestGateway>) -> Self {
        Self { gateway }
    }

    /// Load the full order view: detail, history, stages, documents, and
    /// the derived UI state.
    pub async fn load(&self, order_id: DbId) -> Result<OrderView, ApiError> {
        let order = self.gateway.order(order_id).await?;
        let history = self.gateway.status_history(order_id).await?;
        let stages = self.gateway.stages(order_id).await?;
        let documents = self.gateway.documents(order_id).await?;
        Ok(derive_view(order, history, stages, documents))
    }

    /// Submit a status transition and reload the whole view.
    ///
    /// A status change can alter which stages and documents are relevant,
    /// so the view is reloaded rather than patched incrementally. A
    /// rejected submission propagates the raw error and leaves no local
    /// state behind to roll back.
    pub async fn submit_status(
        &self,
        order_id: DbId,
        status: OrderStatus,
        comment: &str,
    ) -> Result<OrderView, ViewError> {
        let body = NewStatus::new(status, comment)?;
        self.gateway.submit_status(order_id, &body).await?;
        Ok(self.load(order_id).await?)
    }

    /// Apply a partial stage update (normalized so completed and 100%
    /// progress imply each other), then re-fetch the stage list.
    pub async fn update_stage(
        &self,
        order_id: DbId,
        stage_id: DbId,
        update: StageUpdate,
    ) -> Result<Vec<Stage>, ViewError> {
        let body = update.normalized()?;
        self.gateway.update_stage(order_id, stage_id, &body).await?;
        Ok(self.gateway.stages(order_id).await?)
    }

    /// Display progress for a stage right now. Advisory only; never posted
    /// back to the backend.
    pub fn stage_progress(stage: &Stage) -> u8 {
        stage.display_progress(Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Application triage
// ---------------------------------------------------------------------------

/// The manager's application triage list.
///
/// Transitions are applied optimistically for responsiveness, then the
/// authoritative list is re-fetched and reconciled; the reconcile is
/// idempotent, so a stale late response cannot resurrect a processed
/// application.
pub struct ApplicationTriage {
    gateway: Arc<RestGateway>,
    identity: SessionIdentity,
    applications: Vec<Application>,
    page: u32,
    size: u32,
}

impl ApplicationTriage {
    pub fn new(gateway: Arc<RestGateway>, identity: SessionIdentity) -> Self {
        Self {
            gateway,
            identity,
            applications: Vec::new(),
            page: 0,
            size: 20,
        }
    }

    /// Load one page of the triage list.
    pub async fn load(&mut self, page: u32, size: u32) -> Result<(), ApiError> {
        let fetched = self.gateway.applications(page, size).await?;
        self.applications = fetched.items;
        self.page = page;
        self.size = size;
        Ok(())
    }

    /// The current list split into (new, in-progress, processed) buckets.
    pub fn buckets(&self) -> (Vec<Application>, Vec<Application>, Vec<Application>) {
        bucketize(&self.applications)
    }

    /// Claim an application for the calling manager.
    pub async fn take(&mut self, id: DbId) -> Result<(), ApiError> {
        self.gateway.take_application(id).await?;
        apply_take(&mut self.applications, id, self.identity.user_id);
        self.reconcile_with_server().await;
        Ok(())
    }

    /// Accept an application; the backend creates the order as a side
    /// effect.
    pub async fn accept(&mut self, id: DbId) -> Result<(), ApiError> {
        self.gateway.accept_application(id).await?;
        apply_decision(&mut self.applications, id, true);
        self.reconcile_with_server().await;
        Ok(())
    }

    /// Reject an application.
    pub async fn reject(&mut self, id: DbId) -> Result<(), ApiError> {
        self.gateway.reject_application(id).await?;
        apply_decision(&mut self.applications, id, false);
        self.reconcile_with_server().await;
        Ok(())
    }

    /// Background reconciliation after an optimistic update. Best effort:
    /// a failed fetch keeps the optimistic list and is only logged, the
    /// mutation itself already succeeded.
    async fn reconcile_with_server(&mut self) {
        match self.gateway.applications(self.page, self.size).await {
            Ok(fetched) => {
                self.applications = reconcile(&self.applications, fetched.items);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Triage list reconciliation fetch failed");
            }
        }
    }
}
