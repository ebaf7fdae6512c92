use crate::api::leave_request::{
    CalendarEvent, CreateLeave, LeaveDecision, PendingLeave, Requester,
};
use crate::api::user::{ManagedEmployee, ManagerInfo, ResetBalance};
use crate::model::leave::{LeaveBalance, LeaveStatus, LeaveType};
use crate::model::leave_request::LeaveRequest;
use crate::model::role::Role;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management Service

Employees submit leave requests against per-category balances
(vacation/sick/other); managers approve or reject them and maintain the
balances.

### 🔹 Key Features
- **Leave Requests**
  - Submit, edit, and withdraw requests while they are pending
- **Approvals**
  - Managers review pending requests of their reports and decide them
- **Balances**
  - Per-category balances, debited on approval, reset by managers
- **Calendar**
  - Approved leave of a manager's team as an all-day event feed

### 🔐 Security
All endpoints require a **JWT Bearer token** issued by the company auth
service. Manager-only endpoints additionally require the manager role claim.
"#,
    ),
    paths(
        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leave_requests,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::leave_balance,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::approve_or_reject_leave,
        crate::api::leave_request::leave_calendar,

        crate::api::user::list_managers,
        crate::api::user::managed_employees,
        crate::api::user::reset_balance
    ),
    components(
        schemas(
            CreateLeave,
            LeaveDecision,
            LeaveRequest,
            PendingLeave,
            Requester,
            CalendarEvent,
            LeaveBalance,
            LeaveType,
            LeaveStatus,
            Role,
            ManagerInfo,
            ManagedEmployee,
            ResetBalance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request and balance APIs"),
        (name = "User", description = "Manager and roster APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
