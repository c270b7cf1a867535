//! Attendance read endpoints: the employee's own view and the admin log.

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::handlers::auth::{guard::authorize, types::MessageResponse, Role, TokenKeys};

use super::storage::{self, local_today, window_start, LogsFilter};
use super::types::{
    AttendanceLogRow, LogsQuery, MyAttendanceResponse, WorkStatus, RECENT_WINDOW_DAYS,
};

/// Today's record plus the last seven days, newest first.
#[utoipa::path(
    get,
    path = "/attendance/mine",
    responses(
        (status = 200, description = "Own attendance", body = MyAttendanceResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Employee access required", body = MessageResponse)
    ),
    tag = "attendance"
)]
pub async fn my_attendance(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    keys: Extension<Arc<TokenKeys>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authorize(&headers, &keys, &[Role::Employee])?;

    let today = local_today();
    let since = window_start(today, RECENT_WINDOW_DAYS);

    let today_record = storage::today(&pool, principal.id, today)
        .await
        .map_err(ApiError::from_store)?;
    let recent = storage::recent(&pool, principal.id, since)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(MyAttendanceResponse {
        today: today_record,
        recent,
    }))
}

/// Admin log joining attendance to its owning identity, day descending.
#[utoipa::path(
    get,
    path = "/attendance/logs",
    params(LogsQuery),
    responses(
        (status = 200, description = "Attendance logs", body = [AttendanceLogRow]),
        (status = 400, description = "Invalid filter", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Admin access required", body = MessageResponse)
    ),
    tag = "attendance"
)]
pub async fn logs(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    keys: Extension<Arc<TokenKeys>>,
    Query(query): Query<LogsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&headers, &keys, &[Role::Admin])?;

    let filter = parse_filter(&query)?;
    let rows = storage::logs(&pool, &filter)
        .await
        .map_err(ApiError::from_store)?;

    Ok(Json(rows))
}

/// Validate the query string into a typed filter. `all` means "no filter".
fn parse_filter(query: &LogsQuery) -> Result<LogsFilter, ApiError> {
    let employee = match query.employee.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::Validation("Invalid employee id".to_string()))?,
        ),
    };

    let day = match query.day.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::Validation("Invalid day, expected YYYY-MM-DD".to_string()))?,
        ),
    };

    let status = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(raw) => Some(
            WorkStatus::from_str(raw)
                .ok_or_else(|| ApiError::Validation("Invalid status filter".to_string()))?,
        ),
    };

    Ok(LogsFilter {
        employee,
        day,
        status,
    })
}
