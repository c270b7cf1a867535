//! Check-in/check-out endpoints.

use axum::{extract::Extension, http::HeaderMap, response::IntoResponse, Json};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::handlers::auth::{guard::authorize, types::MessageResponse, Role, TokenKeys};

use super::storage::{self, local_today, CheckInOutcome, CheckOutOutcome};
use super::types::{CheckInResponse, CheckOutResponse};

/// Stamp today's check-in, creating the day's record.
#[utoipa::path(
    post,
    path = "/attendance/check-in",
    responses(
        (status = 200, description = "Checked in", body = CheckInResponse),
        (status = 400, description = "Already checked in today", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Employee access required", body = MessageResponse)
    ),
    tag = "attendance"
)]
pub async fn check_in(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    keys: Extension<Arc<TokenKeys>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authorize(&headers, &keys, &[Role::Employee])?;

    let now = Utc::now();
    let day = local_today();

    match storage::check_in(&pool, principal.id, day, now)
        .await
        .map_err(ApiError::from_store)?
    {
        CheckInOutcome::CheckedIn { at } => Ok(Json(CheckInResponse {
            message: "Checked in successfully".to_string(),
            check_in_time: at,
        })),
        CheckInOutcome::AlreadyCheckedIn => Err(ApiError::Conflict(
            "Already checked in today".to_string(),
        )),
    }
}

/// Stamp today's check-out and derive hours worked and status.
#[utoipa::path(
    post,
    path = "/attendance/check-out",
    responses(
        (status = 200, description = "Checked out", body = CheckOutResponse),
        (status = 400, description = "Not checked in or already checked out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Employee access required", body = MessageResponse)
    ),
    tag = "attendance"
)]
pub async fn check_out(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    keys: Extension<Arc<TokenKeys>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = authorize(&headers, &keys, &[Role::Employee])?;

    let now = Utc::now();
    let day = local_today();

    match storage::check_out(&pool, principal.id, day, now)
        .await
        .map_err(ApiError::from_store)?
    {
        CheckOutOutcome::Completed {
            at, hours_worked, ..
        } => Ok(Json(CheckOutResponse {
            message: "Checked out successfully".to_string(),
            check_out_time: at,
            hours_worked,
        })),
        CheckOutOutcome::NotCheckedIn => {
            Err(ApiError::Conflict("Please check in first".to_string()))
        }
        CheckOutOutcome::AlreadyCheckedOut => Err(ApiError::Conflict(
            "Already checked out today".to_string(),
        )),
    }
}
