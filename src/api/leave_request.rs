use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::{LeaveBalance, LeaveStatus, LeaveType, days_requested};
use crate::model::leave_request::LeaveRequest;
use crate::model::user::User;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = "vacation")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDecision {
    #[schema(example = "approved")]
    pub status: LeaveStatus,
    #[schema(example = "Enjoy your trip")]
    pub manager_comment: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct Requester {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com")]
    pub email: String,
}

/// Pending request as seen by the deciding manager, requester attached.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingLeave {
    pub id: u64,
    pub user: Requester,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub manager_comment: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PendingLeaveRow {
    id: u64,
    user_id: u64,
    name: String,
    email: String,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: LeaveStatus,
    manager_comment: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "title": "Jane Doe - vacation",
    "start": "2026-01-01",
    "end": "2026-01-05",
    "allDay": true
}))]
pub struct CalendarEvent {
    pub title: String,
    #[schema(format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end: NaiveDate,
    pub all_day: bool,
}

impl CalendarEvent {
    fn new(name: &str, leave_type: LeaveType, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            title: format!("{} - {}", name, leave_type),
            start,
            end,
            all_day: true,
        }
    }
}

#[derive(FromRow)]
struct CalendarRow {
    name: String,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

const LEAVE_COLUMNS: &str = "id, user_id, leave_type, start_date, end_date, reason, status, \
                             manager_id, manager_comment, created_at";

async fn fetch_user(pool: &MySqlPool, user_id: u64) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role, manager_id,
               vacation_balance, sick_balance, other_balance
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id, "Failed to fetch user");
        ApiError::Store
    })
}

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> Result<Option<LeaveRequest>, ApiError> {
    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
    sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            ApiError::Store
        })
}

/// Shared field validation for create and edit. Returns the inclusive day
/// count of the window.
fn validate_payload(payload: &CreateLeave) -> Result<i64, ApiError> {
    if payload.end_date < payload.start_date {
        return Err(ApiError::Validation(
            "endDate cannot be before startDate".into(),
        ));
    }
    if payload.reason.trim().is_empty() {
        return Err(ApiError::Validation("Reason must not be empty".into()));
    }
    Ok(days_requested(payload.start_date, payload.end_date))
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave/request",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Validation or balance failure"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let days = validate_payload(&payload)?;

    let employee = fetch_user(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let manager_id = employee
        .manager_id
        .ok_or_else(|| ApiError::Validation("Manager not assigned to employee".into()))?;

    if !employee
        .leave_balance()
        .has_sufficient(payload.leave_type, days)
    {
        return Err(ApiError::InsufficientBalance(payload.leave_type));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, leave_type, start_date, end_date, reason, manager_id, manager_comment)
        VALUES (?, ?, ?, ?, ?, ?, '')
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.leave_type)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.trim())
    .bind(manager_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        ApiError::Store
    })?;

    let leave = fetch_leave(pool.get_ref(), result.last_insert_id())
        .await?
        .ok_or(ApiError::Store)?;

    Ok(HttpResponse::Created().json(leave))
}

/* =========================
My leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/my-requests",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn my_leave_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let sql = format!(
        "SELECT {} FROM leave_requests WHERE user_id = ? ORDER BY created_at DESC",
        LEAVE_COLUMNS
    );
    let leaves = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch leave requests");
            ApiError::Store
        })?;

    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Edit a pending request (owner only)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/update-leave/{id}",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request updated"),
        (status = 400, description = "Validation or balance failure"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".into()))?;

    leave.ensure_owned_by(auth.user_id)?;
    leave.ensure_pending()?;

    let days = validate_payload(&payload)?;

    let employee = fetch_user(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if employee.manager_id.is_none() {
        return Err(ApiError::Validation("Manager not assigned to employee".into()));
    }

    // Balances are never reserved at submission, so the new window is checked
    // against the live balance only; the approve path re-checks anyway.
    if !employee
        .leave_balance()
        .has_sufficient(payload.leave_type, days)
    {
        return Err(ApiError::InsufficientBalance(payload.leave_type));
    }

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET leave_type = ?, start_date = ?, end_date = ?, reason = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.leave_type)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.reason.trim())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to update leave request");
        ApiError::Store
    })?;

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or(ApiError::Store)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request updated successfully",
        "leave": leave
    })))
}

/* =========================
Delete a pending request (owner only)
========================= */
#[utoipa::path(
    delete,
    path = "/api/leave/delete-leave/{id}",
    params(("id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".into()))?;

    leave.ensure_owned_by(auth.user_id)?;
    leave.ensure_pending()?;

    sqlx::query("DELETE FROM leave_requests WHERE id = ?")
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to delete leave request");
            ApiError::Store
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted successfully"
    })))
}

/* =========================
Caller's leave balance
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    responses(
        (status = 200, description = "Remaining balance per category", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let user = fetch_user(pool.get_ref(), auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user.leave_balance()))
}

/* =========================
Pending requests for the calling manager
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Pending requests assigned to the caller", body = [PendingLeave]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let rows = sqlx::query_as::<_, PendingLeaveRow>(
        r#"
        SELECT l.id, l.user_id, u.name, u.email,
               l.leave_type, l.start_date, l.end_date, l.reason,
               l.status, l.manager_comment, l.created_at
        FROM leave_requests l
        INNER JOIN users u ON u.id = l.user_id
        WHERE l.status = 'pending' AND l.manager_id = ?
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, manager_id = auth.user_id, "Failed to fetch pending leaves");
        ApiError::Store
    })?;

    let pending: Vec<PendingLeave> = rows
        .into_iter()
        .map(|row| PendingLeave {
            id: row.id,
            user: Requester {
                id: row.user_id,
                name: row.name,
                email: row.email,
            },
            leave_type: row.leave_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status: row.status,
            manager_comment: row.manager_comment,
            created_at: row.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(pending))
}

/* =========================
Approve or reject (assigned manager only)
========================= */
#[utoipa::path(
    patch,
    path = "/api/leave/{id}/approve",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = LeaveDecision,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 400, description = "Invalid status value or insufficient balance"),
        (status = 403, description = "Not the assigned manager"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(name = "leave_decision", skip_all, fields(manager_id = auth.user_id, leave_id = *path))]
pub async fn approve_or_reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDecision>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    if payload.status == LeaveStatus::Pending {
        return Err(ApiError::Validation("Invalid status value".into()));
    }

    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Leave request not found".into()))?;

    leave.ensure_assigned_to(auth.user_id)?;
    leave.ensure_pending()?;

    if payload.status == LeaveStatus::Approved {
        let owner = fetch_user(pool.get_ref(), leave.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        let days = leave.days();
        if !owner.leave_balance().has_sufficient(leave.leave_type, days) {
            return Err(ApiError::InsufficientBalance(leave.leave_type));
        }

        let debit_sql = format!(
            "UPDATE users SET {col} = {col} - ? WHERE id = ?",
            col = leave.leave_type.balance_column()
        );
        sqlx::query(&debit_sql)
            .bind(days)
            .bind(owner.id)
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, leave_id, user_id = owner.id, "Failed to debit balance");
                ApiError::Store
            })?;
    }

    sqlx::query("UPDATE leave_requests SET status = ?, manager_comment = ? WHERE id = ?")
        .bind(payload.status)
        .bind(payload.manager_comment.as_deref().unwrap_or(""))
        .bind(leave_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to record leave decision");
            ApiError::Store
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {} successfully", payload.status)
    })))
}

/* =========================
Calendar feed for the calling manager
========================= */
#[utoipa::path(
    get,
    path = "/api/leave/calendar",
    responses(
        (status = 200, description = "Approved leave of currently managed employees", body = [CalendarEvent]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_calendar(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    // Keyed on the owner's current manager, unlike the pending list which
    // follows the snapshot on the request itself.
    let rows = sqlx::query_as::<_, CalendarRow>(
        r#"
        SELECT u.name, l.leave_type, l.start_date, l.end_date
        FROM leave_requests l
        INNER JOIN users u ON u.id = l.user_id
        WHERE l.status = 'approved' AND u.manager_id = ?
        ORDER BY l.start_date ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, manager_id = auth.user_id, "Failed to load approved leaves");
        ApiError::Store
    })?;

    let events: Vec<CalendarEvent> = rows
        .into_iter()
        .map(|row| CalendarEvent::new(&row.name, row.leave_type, row.start_date, row.end_date))
        .collect();

    Ok(HttpResponse::Ok().json(events))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_validate_payload() {
        let mut payload = CreateLeave {
            leave_type: LeaveType::Vacation,
            start_date: date("2024-01-01"),
            end_date: date("2024-01-05"),
            reason: "Family trip".into(),
        };
        assert_eq!(validate_payload(&payload).unwrap(), 5);

        payload.end_date = date("2023-12-31");
        assert!(matches!(
            validate_payload(&payload),
            Err(ApiError::Validation(_))
        ));

        payload.end_date = date("2024-01-05");
        payload.reason = "   ".into();
        assert!(matches!(
            validate_payload(&payload),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_calendar_event_projection() {
        let event = CalendarEvent::new(
            "Jane Doe",
            LeaveType::Vacation,
            date("2026-01-01"),
            date("2026-01-05"),
        );
        assert_eq!(event.title, "Jane Doe - vacation");
        assert!(event.all_day);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["allDay"], true);
        assert_eq!(value["start"], "2026-01-01");
    }

    #[test]
    fn test_decision_payload_accepts_terminal_statuses() {
        let decision: LeaveDecision =
            serde_json::from_str(r#"{"status": "approved", "managerComment": "ok"}"#).unwrap();
        assert_eq!(decision.status, LeaveStatus::Approved);
        assert_eq!(decision.manager_comment.as_deref(), Some("ok"));

        let decision: LeaveDecision = serde_json::from_str(r#"{"status": "rejected"}"#).unwrap();
        assert_eq!(decision.status, LeaveStatus::Rejected);
        assert!(decision.manager_comment.is_none());

        assert!(serde_json::from_str::<LeaveDecision>(r#"{"status": "cancelled"}"#).is_err());
    }
}
