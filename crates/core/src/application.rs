//! Project applications: model, triage buckets, and list reconciliation.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status enum
// ---------------------------------------------------------------------------

/// Lifecycle status of an application.
///
/// `Created` -> `Consideration` when a manager takes it, then either
/// `Accepted` (which creates an order server-side) or `Rejected`. Both are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Created,
    Consideration,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// Wire value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Consideration => "consideration",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// Triage bucket an application is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageBucket {
    /// Newly created, waiting for a manager to take it.
    New,
    /// Taken by a manager, decision pending.
    InProgress,
    /// Accepted or rejected.
    Processed,
}

impl ApplicationStatus {
    /// The triage bucket for this status. Buckets are disjoint: every
    /// application lands in exactly one.
    pub fn bucket(self) -> TriageBucket {
        match self {
            Self::Created => TriageBucket::New,
            Self::Consideration => TriageBucket::InProgress,
            Self::Accepted | Self::Rejected => TriageBucket::Processed,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A client's request for a construction project, pre-order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: DbId,
    #[serde(default)]
    pub creator_id: Option<DbId>,
    #[serde(default)]
    pub project_id: Option<DbId>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status_name: ApplicationStatus,
    #[serde(default)]
    pub manager_id: Option<DbId>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Body of `POST /api/applications`. Empty optional fields are omitted from
/// the request body entirely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub client_id: DbId,
    pub address: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Triage list transforms
// ---------------------------------------------------------------------------

/// Split a flat application list into its triage buckets, preserving the
/// incoming order within each bucket.
pub fn bucketize(
    applications: &[Application],
) -> (Vec<Application>, Vec<Application>, Vec<Application>) {
    let mut new = Vec::new();
    let mut in_progress = Vec::new();
    let mut processed = Vec::new();
    for app in applications {
        match app.status_name.bucket() {
            TriageBucket::New => new.push(app.clone()),
            TriageBucket::InProgress => in_progress.push(app.clone()),
            TriageBucket::Processed => processed.push(app.clone()),
        }
    }
    (new, in_progress, processed)
}

/// Apply a successful "take" locally: the application leaves the new bucket
/// and re-appears as `Consideration` attributed to the acting manager.
///
/// This is the optimistic half; callers follow up with an authoritative
/// re-fetch reconciled via [`reconcile`].
pub fn apply_take(applications: &mut [Application], id: DbId, manager_id: DbId) {
    if let Some(app) = applications.iter_mut().find(|a| a.id == id) {
        app.status_name = ApplicationStatus::Consideration;
        app.manager_id = Some(manager_id);
    }
}

/// Apply a successful accept/reject decision locally.
pub fn apply_decision(applications: &mut [Application], id: DbId, accepted: bool) {
    if let Some(app) = applications.iter_mut().find(|a| a.id == id) {
        app.status_name = if accepted {
            ApplicationStatus::Accepted
        } else {
            ApplicationStatus::Rejected
        };
    }
}

/// Reconcile the local list against an authoritative fetch.
///
/// The server copy wins for every application it still returns, except that
/// a stale snapshot cannot roll a locally advanced status back: local
/// `Consideration`/`Accepted`/`Rejected` beats a server `Created`, covering
/// the window where a just-applied transition has not landed in the list
/// endpoint yet. Applications missing from the server copy stay removed.
/// Reconciliation is idempotent.
pub fn reconcile(local: &[Application], authoritative: Vec<Application>) -> Vec<Application> {
    authoritative
        .into_iter()
        .map(|server| {
            match local.iter().find(|l| l.id == server.id) {
                Some(l)
                    if server.status_name == ApplicationStatus::Created
                        && l.status_name != ApplicationStatus::Created =>
                {
                    l.clone()
                }
                _ => server,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: DbId, status: ApplicationStatus) -> Application {
        Application {
            id,
            creator_id: Some(100),
            project_id: None,
            contact: None,
            phone: None,
            address: Some("12 Birch Lane".to_string()),
            description: None,
            status_name: status,
            manager_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_created_lands_only_in_new_bucket() {
        let apps = vec![
            app(1, ApplicationStatus::Created),
            app(2, ApplicationStatus::Consideration),
            app(3, ApplicationStatus::Accepted),
            app(4, ApplicationStatus::Rejected),
        ];
        let (new, in_progress, processed) = bucketize(&apps);
        assert_eq!(new.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(in_progress.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(processed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_take_moves_application_out_of_new() {
        let mut apps = vec![app(1, ApplicationStatus::Created)];
        apply_take(&mut apps, 1, 55);
        assert_eq!(apps[0].status_name, ApplicationStatus::Consideration);
        assert_eq!(apps[0].manager_id, Some(55));
        let (new, in_progress, _) = bucketize(&apps);
        assert!(new.is_empty());
        assert_eq!(in_progress.len(), 1);
    }

    #[test]
    fn test_take_unknown_id_is_a_noop() {
        let mut apps = vec![app(1, ApplicationStatus::Created)];
        apply_take(&mut apps, 99, 55);
        assert_eq!(apps[0].status_name, ApplicationStatus::Created);
    }

    #[test]
    fn test_decision_marks_terminal_status() {
        let mut apps = vec![
            app(1, ApplicationStatus::Consideration),
            app(2, ApplicationStatus::Consideration),
        ];
        apply_decision(&mut apps, 1, true);
        apply_decision(&mut apps, 2, false);
        assert_eq!(apps[0].status_name, ApplicationStatus::Accepted);
        assert_eq!(apps[1].status_name, ApplicationStatus::Rejected);
    }

    #[test]
    fn test_reconcile_prefers_server_copy() {
        let local = vec![app(1, ApplicationStatus::Created)];
        let mut server = app(1, ApplicationStatus::Consideration);
        server.manager_id = Some(55);
        let merged = reconcile(&local, vec![server]);
        assert_eq!(merged[0].status_name, ApplicationStatus::Consideration);
        assert_eq!(merged[0].manager_id, Some(55));
    }

    #[test]
    fn test_stale_server_row_cannot_resurrect_created() {
        let mut taken = app(1, ApplicationStatus::Consideration);
        taken.manager_id = Some(55);
        let local = vec![taken];
        // Stale list response that predates the take.
        let merged = reconcile(&local, vec![app(1, ApplicationStatus::Created)]);
        assert_eq!(merged[0].status_name, ApplicationStatus::Consideration);
        assert_eq!(merged[0].manager_id, Some(55));
    }

    #[test]
    fn test_reconcile_drops_rows_the_server_no_longer_returns() {
        let local = vec![app(1, ApplicationStatus::Created), app(2, ApplicationStatus::Created)];
        let merged = reconcile(&local, vec![app(2, ApplicationStatus::Created)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 2);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let local = vec![app(1, ApplicationStatus::Consideration)];
        let once = reconcile(&local, vec![app(1, ApplicationStatus::Created)]);
        let twice = reconcile(&once, vec![app(1, ApplicationStatus::Created)]);
        assert_eq!(once[0].status_name, twice[0].status_name);
    }
}
