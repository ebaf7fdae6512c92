use crate::error::ApiError;
use crate::model::leave::{LeaveStatus, LeaveType, days_requested};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

/// Row type for `leave_requests`.
///
/// `manager_id` is the manager snapshotted from the requesting user at
/// submission time. A later manager change on the user record does not move
/// already-filed requests.
#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = 7)]
    pub manager_id: u64,
    #[schema(example = "")]
    pub manager_comment: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Inclusive day count over the stored window.
    pub fn days(&self) -> i64 {
        days_requested(self.start_date, self.end_date)
    }

    /// Owner gate for edit/delete.
    pub fn ensure_owned_by(&self, user_id: u64) -> Result<(), ApiError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Not allowed to modify another user's leave request".into(),
            ))
        }
    }

    /// Assigned-manager gate for approve/reject. Uses the snapshot taken at
    /// submission, not the owner's current manager.
    pub fn ensure_assigned_to(&self, manager_id: u64) -> Result<(), ApiError> {
        if self.manager_id == manager_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Not the assigned manager for this leave request".into(),
            ))
        }
    }

    /// Pending is the only state that accepts edits, deletes, or decisions.
    pub fn ensure_pending(&self) -> Result<(), ApiError> {
        if self.status == LeaveStatus::Pending {
            Ok(())
        } else {
            Err(ApiError::Conflict("Leave request already processed".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::LeaveBalance;

    const OWNER: u64 = 42;
    const MANAGER: u64 = 7;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn leave(leave_type: LeaveType, start: &str, end: &str) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            user_id: OWNER,
            leave_type,
            start_date: date(start),
            end_date: date(end),
            reason: "Family trip".into(),
            status: LeaveStatus::Pending,
            manager_id: MANAGER,
            manager_comment: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_gate() {
        let request = leave(LeaveType::Vacation, "2024-01-01", "2024-01-05");
        assert!(request.ensure_owned_by(OWNER).is_ok());
        assert!(matches!(
            request.ensure_owned_by(MANAGER),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_assigned_manager_gate() {
        let request = leave(LeaveType::Vacation, "2024-01-01", "2024-01-05");
        assert!(request.ensure_assigned_to(MANAGER).is_ok());
        assert!(matches!(
            request.ensure_assigned_to(99),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_pending_gate() {
        let mut request = leave(LeaveType::Sick, "2024-03-04", "2024-03-04");
        assert!(request.ensure_pending().is_ok());
        request.status = LeaveStatus::Rejected;
        assert!(matches!(
            request.ensure_pending(),
            Err(ApiError::Conflict(_))
        ));
    }

    // Walks the approve path the handler takes: 12 vacation days, a five-day
    // request, one debit. The second attempt dies on the pending gate and
    // never touches the balance.
    #[test]
    fn test_approval_debits_exactly_once() {
        let mut balance = LeaveBalance::default();
        let mut request = leave(LeaveType::Vacation, "2024-01-01", "2024-01-05");

        request.ensure_assigned_to(MANAGER).unwrap();
        request.ensure_pending().unwrap();
        let days = request.days();
        assert_eq!(days, 5);
        assert!(balance.has_sufficient(request.leave_type, days));
        balance.debit(request.leave_type, days);
        request.status = LeaveStatus::Approved;
        assert_eq!(balance.vacation, 7);

        assert!(request.ensure_pending().is_err());
        assert_eq!(balance.vacation, 7);
    }

    #[test]
    fn test_approval_blocked_by_insufficient_balance() {
        let balance = LeaveBalance {
            vacation: 12,
            sick: 2,
            other: 5,
        };
        let request = leave(LeaveType::Sick, "2024-06-03", "2024-06-05");
        assert_eq!(request.days(), 3);
        assert!(!balance.has_sufficient(request.leave_type, request.days()));
        assert_eq!(balance.sick, 2);
    }

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let request = leave(LeaveType::Other, "2024-05-01", "2024-05-02");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["leaveType"], "other");
        assert_eq!(value["startDate"], "2024-05-01");
        assert_eq!(value["managerComment"], "");
        assert_eq!(value["userId"], 42);
    }
}
