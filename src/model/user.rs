use crate::model::leave::LeaveBalance;
use crate::model::role::Role;
use sqlx::prelude::FromRow;

/// Row type for `users`. Accounts are provisioned by the auth service; this
/// service reads identity/manager fields and maintains the balance columns.
/// The password hash belongs to the auth service and is never inspected here.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub manager_id: Option<u64>,
    pub vacation_balance: i64,
    pub sick_balance: i64,
    pub other_balance: i64,
}

impl User {
    pub fn leave_balance(&self) -> LeaveBalance {
        LeaveBalance {
            vacation: self.vacation_balance,
            sick: self.sick_balance,
            other: self.other_balance,
        }
    }
}
