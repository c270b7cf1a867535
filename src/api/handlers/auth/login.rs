//! Login endpoint composing the credential codec with the token service.

use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::error::ApiError;

use super::password::verify_password;
use super::storage::lookup_identity;
use super::token::TokenKeys;
use super::types::{LoginRequest, LoginResponse, MessageResponse, Role, UserSummary};
use super::utils::normalize_email;

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    keys: Extension<Arc<TokenKeys>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // An unknown email and a wrong password are indistinguishable to the
    // caller.
    let Some(record) = lookup_identity(&pool, &email)
        .await
        .map_err(ApiError::from_store)?
    else {
        return Err(ApiError::Unauthenticated("Invalid credentials".to_string()));
    };

    if !verify_password(&request.password, &record.password_hash) {
        return Err(ApiError::Unauthenticated("Invalid credentials".to_string()));
    }

    let Some(role) = Role::from_str(&record.role) else {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "unknown role stored for identity {}: {}",
            record.id,
            record.role
        )));
    };

    let token = keys.issue(record.id, &record.email, role)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary {
            id: record.id,
            name: record.name,
            email: record.email,
            role,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::globals::Config;
    use anyhow::Result;
    use axum::http::StatusCode;
    use sqlx::postgres::PgPoolOptions;

    fn token_keys() -> Arc<TokenKeys> {
        Arc::new(TokenKeys::new(&Config::new(Some(
            "login-test-secret".to_string(),
        ))))
    }

    #[tokio::test]
    async fn test_login_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(Extension(pool), Extension(token_keys()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_login_empty_fields() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = login(
            Extension(pool),
            Extension(token_keys()),
            Some(Json(LoginRequest {
                email: " ".to_string(),
                password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
