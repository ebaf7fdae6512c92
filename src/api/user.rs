use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave::LeaveBalance;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, FromRow, ToSchema)]
pub struct ManagerInfo {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Max Mills")]
    pub name: String,
}

/// Employee roster entry with the remaining balances, as shown to a manager.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedEmployee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub leave_balance: LeaveBalance,
}

#[derive(FromRow)]
struct ManagedEmployeeRow {
    id: u64,
    name: String,
    email: String,
    vacation_balance: i64,
    sick_balance: i64,
    other_balance: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetBalance {
    #[schema(example = 12)]
    pub vacation: Option<i64>,
    #[schema(example = 8)]
    pub sick: Option<i64>,
    #[schema(example = 5)]
    pub other: Option<i64>,
}

impl ResetBalance {
    /// Omitted categories fall back to the yearly allotment defaults.
    fn resolve(&self) -> Result<LeaveBalance, ApiError> {
        let defaults = LeaveBalance::default();
        let balance = LeaveBalance {
            vacation: self.vacation.unwrap_or(defaults.vacation),
            sick: self.sick.unwrap_or(defaults.sick),
            other: self.other.unwrap_or(defaults.other),
        };
        if balance.vacation < 0 || balance.sick < 0 || balance.other < 0 {
            return Err(ApiError::Validation(
                "Balance values must be non-negative".into(),
            ));
        }
        Ok(balance)
    }
}

/* =========================
Managers directory
========================= */
#[utoipa::path(
    get,
    path = "/api/user/managers",
    responses(
        (status = 200, description = "All managers", body = [ManagerInfo]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_managers(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let managers = sqlx::query_as::<_, ManagerInfo>(
        "SELECT id, name FROM users WHERE role = 'manager' ORDER BY name ASC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch managers");
        ApiError::Store
    })?;

    Ok(HttpResponse::Ok().json(managers))
}

/* =========================
Managed employees roster
========================= */
#[utoipa::path(
    get,
    path = "/api/user/managed-employees",
    responses(
        (status = 200, description = "Employees reporting to the caller", body = [ManagedEmployee]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn managed_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let rows = sqlx::query_as::<_, ManagedEmployeeRow>(
        r#"
        SELECT id, name, email, vacation_balance, sick_balance, other_balance
        FROM users
        WHERE manager_id = ?
        ORDER BY name ASC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, manager_id = auth.user_id, "Failed to fetch managed employees");
        ApiError::Store
    })?;

    let employees: Vec<ManagedEmployee> = rows
        .into_iter()
        .map(|row| ManagedEmployee {
            id: row.id,
            name: row.name,
            email: row.email,
            leave_balance: LeaveBalance {
                vacation: row.vacation_balance,
                sick: row.sick_balance,
                other: row.other_balance,
            },
        })
        .collect();

    Ok(HttpResponse::Ok().json(employees))
}

/* =========================
Reset an employee's balance
========================= */
#[utoipa::path(
    put,
    path = "/api/user/reset-balance/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body = ResetBalance,
    responses(
        (status = 200, description = "Balance reset"),
        (status = 400, description = "Negative balance value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager role required"),
        (status = 404, description = "Employee not managed by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn reset_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ResetBalance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager()?;

    let employee_id = path.into_inner();
    let balance = payload.resolve()?;

    // Wholesale overwrite; outstanding pending requests are deliberately not
    // reconciled against the new values.
    let result = sqlx::query(
        r#"
        UPDATE users
        SET vacation_balance = ?, sick_balance = ?, other_balance = ?
        WHERE id = ? AND manager_id = ?
        "#,
    )
    .bind(balance.vacation)
    .bind(balance.sick)
    .bind(balance.other)
    .bind(employee_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to reset leave balance");
        ApiError::Store
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee not found".into()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave balance updated successfully"
    })))
}
