use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Vacation,
    Sick,
    Other,
}

impl LeaveType {
    /// Column of `users` holding the balance for this category. Only ever
    /// interpolated into SQL built here, never from caller input.
    pub fn balance_column(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "vacation_balance",
            LeaveType::Sick => "sick_balance",
            LeaveType::Other => "other_balance",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Inclusive day count of a leave window. `e == s` is one day of leave.
pub fn days_requested(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Remaining allotted days per category for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"vacation": 12, "sick": 8, "other": 5}))]
pub struct LeaveBalance {
    pub vacation: i64,
    pub sick: i64,
    pub other: i64,
}

impl Default for LeaveBalance {
    fn default() -> Self {
        Self {
            vacation: 12,
            sick: 8,
            other: 5,
        }
    }
}

impl LeaveBalance {
    pub fn remaining(&self, leave_type: LeaveType) -> i64 {
        match leave_type {
            LeaveType::Vacation => self.vacation,
            LeaveType::Sick => self.sick,
            LeaveType::Other => self.other,
        }
    }

    pub fn has_sufficient(&self, leave_type: LeaveType, days: i64) -> bool {
        self.remaining(leave_type) >= days
    }

    /// Subtracts `days` from the matching category. Callers check
    /// `has_sufficient` immediately before; there is no floor at zero here.
    pub fn debit(&mut self, leave_type: LeaveType, days: i64) {
        match leave_type {
            LeaveType::Vacation => self.vacation -= days,
            LeaveType::Sick => self.sick -= days,
            LeaveType::Other => self.other -= days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_days_requested_is_inclusive() {
        assert_eq!(days_requested(date("2024-01-01"), date("2024-01-01")), 1);
        assert_eq!(days_requested(date("2024-01-01"), date("2024-01-05")), 5);
        assert_eq!(days_requested(date("2024-02-27"), date("2024-03-01")), 4); // leap year
    }

    #[test]
    fn test_default_balance() {
        let balance = LeaveBalance::default();
        assert_eq!(balance.vacation, 12);
        assert_eq!(balance.sick, 8);
        assert_eq!(balance.other, 5);
    }

    #[test]
    fn test_sufficiency_boundary() {
        let balance = LeaveBalance::default();
        assert!(balance.has_sufficient(LeaveType::Sick, 8));
        assert!(!balance.has_sufficient(LeaveType::Sick, 9));
        assert!(balance.has_sufficient(LeaveType::Other, 0));
    }

    #[test]
    fn test_debit_subtracts_only_matching_category() {
        let mut balance = LeaveBalance::default();
        balance.debit(LeaveType::Vacation, 5);
        assert_eq!(balance.vacation, 7);
        assert_eq!(balance.sick, 8);
        assert_eq!(balance.other, 5);
    }

    #[test]
    fn test_wire_and_store_names_are_lowercase() {
        assert_eq!(LeaveType::Vacation.to_string(), "vacation");
        assert_eq!(LeaveStatus::Approved.to_string(), "approved");
        assert_eq!(
            serde_json::to_string(&LeaveType::Other).unwrap(),
            "\"other\""
        );
        assert_eq!(
            serde_json::from_str::<LeaveStatus>("\"rejected\"").unwrap(),
            LeaveStatus::Rejected
        );
    }
}
