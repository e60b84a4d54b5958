//! Construction stage model and display-progress estimation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Display progress is capped below 100 for stages that are not explicitly
/// marked completed, so a time-based estimate never visually claims a
/// finished step.
pub const MAX_ESTIMATED_PROGRESS: u8 = 95;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Construction phase of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    Foundation,
    Walls,
    Roof,
    Windows,
    Utilities,
    Interior,
    Exterior,
    Landscaping,
    /// The backend may introduce new phases; decoding must not fail on them.
    #[serde(other)]
    Other,
}

/// Execution status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

impl StageStatus {
    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Delayed => "Delayed",
        }
    }

    /// Display color (hex) for this status.
    pub fn color(self) -> &'static str {
        match self {
            Self::NotStarted => "#9e9e9e",
            Self::InProgress => "#2196f3",
            Self::Completed => "#4caf50",
            Self::Delayed => "#f44336",
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A construction milestone within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: DbId,
    pub stage_type: StageType,
    pub stage_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: StageStatus,
    /// Explicit progress 0-100; when absent, display code falls back to
    /// [`estimate_progress`].
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub planned_end_date: Option<Timestamp>,
    #[serde(default)]
    pub actual_end_date: Option<Timestamp>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Stage {
    /// Progress to display for this stage at time `now`: the explicit value
    /// when present, otherwise the time-based estimate.
    pub fn display_progress(&self, now: Timestamp) -> u8 {
        match self.progress {
            Some(p) => p.min(100),
            None => estimate_progress(self.status, self.start_date, self.planned_end_date, now),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress estimation
// ---------------------------------------------------------------------------

/// Estimate display progress for a stage without an explicit `progress`.
///
/// Completed stages are 100. In-progress stages with both a start and a
/// planned end, evaluated past the start, get a linear time interpolation
/// capped at [`MAX_ESTIMATED_PROGRESS`]. Everything else is 0.
///
/// The estimate is advisory and display-only; it must never be written back
/// to the backend as an authoritative progress value.
pub fn estimate_progress(
    status: StageStatus,
    start: Option<Timestamp>,
    planned_end: Option<Timestamp>,
    now: Timestamp,
) -> u8 {
    match status {
        StageStatus::Completed => 100,
        StageStatus::InProgress => match (start, planned_end) {
            (Some(start), Some(end)) if now > start && end > start => {
                let elapsed = (now - start).num_seconds() as f64;
                let total = (end - start).num_seconds() as f64;
                let pct = (elapsed / total * 100.0).round() as i64;
                pct.clamp(0, MAX_ESTIMATED_PROGRESS as i64) as u8
            }
            _ => 0,
        },
        StageStatus::NotStarted | StageStatus::Delayed => 0,
    }
}

/// Body of `POST /api/orders/{id}/stages`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStage {
    pub stage_type: StageType,
    pub stage_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_end_date: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Body of `PATCH /api/orders/{id}/stages/{stageId}`; absent fields are
/// omitted from the request entirely.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<Timestamp>,
}

impl StageUpdate {
    /// Normalize the update so that `progress == 100` and
    /// `status == Completed` imply each other.
    ///
    /// The backend is expected to hold the same invariant but the client
    /// does not verify that it did.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        if let Some(p) = self.progress {
            if p > 100 {
                return Err(CoreError::Validation(format!(
                    "Stage progress must be 0-100, got {p}"
                )));
            }
        }
        if self.status == Some(StageStatus::Completed) {
            self.progress = Some(100);
        } else if self.progress == Some(100) {
            self.status = Some(StageStatus::Completed);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_completed_is_always_100() {
        assert_eq!(estimate_progress(StageStatus::Completed, None, None, t0()), 100);
    }

    #[test]
    fn test_halfway_estimate_is_50() {
        let start = t0();
        let end = start + Duration::days(10);
        let now = start + Duration::days(5);
        assert_eq!(
            estimate_progress(StageStatus::InProgress, Some(start), Some(end), now),
            50
        );
    }

    #[test]
    fn test_estimate_caps_at_95_past_planned_end() {
        let start = t0();
        let end = start + Duration::days(10);
        let now = start + Duration::days(100);
        assert_eq!(
            estimate_progress(StageStatus::InProgress, Some(start), Some(end), now),
            MAX_ESTIMATED_PROGRESS
        );
    }

    #[test]
    fn test_missing_dates_estimate_zero() {
        assert_eq!(
            estimate_progress(StageStatus::InProgress, Some(t0()), None, t0()),
            0
        );
        assert_eq!(estimate_progress(StageStatus::InProgress, None, None, t0()), 0);
    }

    #[test]
    fn test_not_started_and_delayed_estimate_zero() {
        let start = t0();
        let end = start + Duration::days(10);
        let now = start + Duration::days(5);
        assert_eq!(
            estimate_progress(StageStatus::NotStarted, Some(start), Some(end), now),
            0
        );
        assert_eq!(
            estimate_progress(StageStatus::Delayed, Some(start), Some(end), now),
            0
        );
    }

    #[test]
    fn test_explicit_progress_wins_over_estimate() {
        let stage = Stage {
            id: 1,
            stage_type: StageType::Foundation,
            stage_name: "Foundation".to_string(),
            description: None,
            status: StageStatus::InProgress,
            progress: Some(30),
            start_date: Some(t0()),
            planned_end_date: Some(t0() + Duration::days(10)),
            actual_end_date: None,
            created_by: None,
        };
        assert_eq!(stage.display_progress(t0() + Duration::days(9)), 30);
    }

    #[test]
    fn test_update_completed_forces_progress_100() {
        let update = StageUpdate {
            status: Some(StageStatus::Completed),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(update.progress, Some(100));
    }

    #[test]
    fn test_update_progress_100_forces_completed() {
        let update = StageUpdate {
            progress: Some(100),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(update.status, Some(StageStatus::Completed));
    }

    #[test]
    fn test_update_rejects_progress_over_100() {
        let err = StageUpdate {
            progress: Some(120),
            ..Default::default()
        }
        .normalized();
        assert!(err.is_err());
    }
}
