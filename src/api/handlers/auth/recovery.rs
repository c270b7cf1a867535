//! Credential recovery endpoints: request, verify, and consume an OTP.

use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::email::{otp_message, EmailSender};
use crate::api::error::ApiError;

use super::password::hash_password;
use super::storage::{consume_otp, insert_otp, lookup_identity, match_otp, ConsumeOutcome};
use super::types::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest, VerifyOtpRequest};
use super::utils::{generate_otp, normalize_email, valid_email};

/// Issue a recovery code and hand it to the delivery channel.
///
/// Earlier unexpired codes for the same email stay valid. The response does
/// distinguish unknown emails (404); a deliberate policy choice for an
/// internal tool.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 400, description = "Missing or invalid email", body = MessageResponse),
        (status = 404, description = "No identity owns that email", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    sender: Extension<Arc<dyn EmailSender>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".to_string()));
    }
    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }

    if lookup_identity(&pool, &email)
        .await
        .map_err(ApiError::from_store)?
        .is_none()
    {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let code = generate_otp();
    insert_otp(&pool, &email, &code)
        .await
        .map_err(ApiError::from_store)?;

    let message = otp_message(&email, &code);
    if let Err(err) = sender.deliver(&message) {
        error!("Failed to deliver OTP email: {err}");
        return Err(ApiError::Unavailable);
    }

    Ok(Json(MessageResponse {
        message: "OTP sent to your email".to_string(),
    }))
}

/// Check a code without consuming it. Idempotent and re-checkable.
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP is valid", body = MessageResponse),
        (status = 400, description = "Invalid or expired OTP", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);
    let otp = request.otp.trim();
    if email.is_empty() || otp.is_empty() {
        return Err(ApiError::Validation(
            "Email and OTP are required".to_string(),
        ));
    }

    if !match_otp(&pool, &email, otp)
        .await
        .map_err(ApiError::from_store)?
    {
        return Err(ApiError::Validation("Invalid or expired OTP".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "OTP verified successfully".to_string(),
    }))
}

/// Consume a code and replace the password digest in one transaction.
///
/// Not idempotent: a second call with the same code fails and leaves the
/// password from the first consume untouched.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired OTP", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    pool: Extension<PgPool>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);
    let otp = request.otp.trim();
    if email.is_empty() || otp.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::Validation(
            "Email, OTP, and new password are required".to_string(),
        ));
    }

    let digest = hash_password(&request.new_password)?;

    match consume_otp(&pool, &email, otp, &digest)
        .await
        .map_err(ApiError::from_store)?
    {
        ConsumeOutcome::Consumed => Ok(Json(MessageResponse {
            message: "Password reset successfully".to_string(),
        })),
        ConsumeOutcome::Invalid => Err(ApiError::Validation("Invalid or expired OTP".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogEmailSender;
    use anyhow::Result;
    use axum::http::StatusCode;
    use sqlx::postgres::PgPoolOptions;

    fn sender() -> Arc<dyn EmailSender> {
        Arc::new(LogEmailSender)
    }

    #[tokio::test]
    async fn test_forgot_password_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = forgot_password(Extension(pool), Extension(sender()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_forgot_password_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = forgot_password(
            Extension(pool),
            Extension(sender()),
            Some(Json(ForgotPasswordRequest {
                email: "not-an-email".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_verify_otp_missing_fields() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = verify_otp(
            Extension(pool),
            Some(Json(VerifyOtpRequest {
                email: "alice@example.com".to_string(),
                otp: " ".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_password_missing_fields() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = reset_password(
            Extension(pool),
            Some(Json(ResetPasswordRequest {
                email: "alice@example.com".to_string(),
                otp: "123456".to_string(),
                new_password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
