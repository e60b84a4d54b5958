//! Order documents: model, signing guard, and the version reducer.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of document attached to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Specification,
    Permit,
    Report,
    Act,
    Invoice,
    Other,
}

impl DocumentType {
    /// Wire value for this type, used in the logical revision key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Specification => "specification",
            Self::Permit => "permit",
            Self::Report => "report",
            Self::Act => "act",
            Self::Invoice => "invoice",
            Self::Other => "other",
        }
    }
}

/// Signing status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    New,
    Pending,
    Signed,
    Rejected,
    Expired,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// One revision of a document attached to an order.
///
/// Several revisions may share a logical identity (type + title); only the
/// most recent revision is current -- see [`latest_revisions`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DbId,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Optional inline payload; large files are fetched via the download
    /// endpoint instead.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Document {
    /// Logical revision key: type + title, or type alone when the title is
    /// absent. Revisions sharing a key supersede one another.
    pub fn logical_key(&self) -> String {
        match &self.title {
            Some(title) => format!("{}:{}", self.doc_type.as_str(), title),
            None => self.doc_type.as_str().to_string(),
        }
    }

    /// Signing is a one-way pending -> signed transition.
    pub fn can_sign(&self) -> bool {
        self.status == DocumentStatus::Pending
    }

    /// Validate that this document may be signed.
    pub fn check_signable(&self) -> Result<(), CoreError> {
        if self.can_sign() {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition(format!(
                "Document {} is not pending signature",
                self.id
            )))
        }
    }
}

/// Body of `POST /api/orders/{id}/documents`. `content` carries the file
/// payload in a transportable encoding (base64); large uploads omit it and
/// go through the dedicated upload path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Version reducer
// ---------------------------------------------------------------------------

/// Collapse a flat list of revisions into the latest revision per logical
/// document.
///
/// Sorts descending by `created_at` (missing timestamps sort oldest; ties
/// break by original list order, the sort being stable) and keeps the first
/// revision seen for each logical key. The output order is not meaningful;
/// callers re-sort for display.
pub fn latest_revisions(documents: &[Document]) -> Vec<Document> {
    let mut sorted: Vec<&Document> = documents.iter().collect();
    sorted.sort_by(|a, b| {
        let a_ts = a.created_at.map(|t| t.timestamp_millis()).unwrap_or(0);
        let b_ts = b.created_at.map(|t| t.timestamp_millis()).unwrap_or(0);
        b_ts.cmp(&a_ts)
    });

    let mut seen = std::collections::HashSet::new();
    let mut latest = Vec::new();
    for doc in sorted {
        if seen.insert(doc.logical_key()) {
            latest.push(doc.clone());
        }
    }
    latest
}
