//! Bearer-token admission and role gating.
//!
//! Every role-restricted handler resolves its caller through [`authorize`];
//! no route carries its own role check.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use crate::api::error::ApiError;

use super::token::TokenKeys;
use super::types::Role;

/// Authenticated identity resolved from a bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Resolve the bearer token and require one of `required_roles`.
///
/// Token verification failures collapse to "unauthenticated"; the cause is
/// never surfaced to the client.
pub(crate) fn authorize(
    headers: &HeaderMap,
    keys: &TokenKeys,
    required_roles: &[Role],
) -> Result<Principal, ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(ApiError::Unauthenticated(
            "Authorization token required".to_string(),
        ));
    };

    let Some(claims) = keys.verify(&token) else {
        return Err(ApiError::Unauthenticated(
            "Invalid or expired token".to_string(),
        ));
    };

    if !required_roles.contains(&claims.role) {
        return Err(ApiError::Forbidden(forbidden_message(required_roles)));
    }

    Ok(Principal {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

fn forbidden_message(required_roles: &[Role]) -> String {
    let names: Vec<&str> = required_roles.iter().map(|role| role.title()).collect();
    format!("{} access required", names.join(" or "))
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::globals::Config;
    use anyhow::Result;
    use axum::http::HeaderValue;

    fn keys() -> TokenKeys {
        TokenKeys::new(&Config::new(Some("guard-test-secret".to_string())))
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header"),
        );
        headers
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let result = authorize(&HeaderMap::new(), &keys(), &[Role::Employee]);
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[test]
    fn test_garbage_token_is_unauthenticated() {
        let headers = bearer_headers("garbage");
        let result = authorize(&headers, &keys(), &[Role::Employee]);
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[test]
    fn test_wrong_role_is_forbidden() -> Result<()> {
        let keys = keys();
        let token = keys.issue(Uuid::new_v4(), "bob@example.com", Role::Employee)?;
        let headers = bearer_headers(&token);
        let result = authorize(&headers, &keys, &[Role::Admin]);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        Ok(())
    }

    #[test]
    fn test_allowed_role_returns_principal() -> Result<()> {
        let keys = keys();
        let id = Uuid::new_v4();
        let token = keys.issue(id, "carol@example.com", Role::Admin)?;
        let headers = bearer_headers(&token);
        let principal = authorize(&headers, &keys, &[Role::Admin, Role::Hr])
            .map_err(|_| anyhow::anyhow!("expected principal"))?;
        assert_eq!(principal.id, id);
        assert_eq!(principal.email, "carol@example.com");
        assert_eq!(principal.role, Role::Admin);
        Ok(())
    }

    #[test]
    fn test_forbidden_message_wording() {
        assert_eq!(forbidden_message(&[Role::Employee]), "Employee access required");
        assert_eq!(
            forbidden_message(&[Role::Admin, Role::Hr]),
            "Admin or HR access required"
        );
    }

    #[test]
    fn test_extract_bearer_token_variants() {
        let headers = bearer_headers("abc");
        assert_eq!(extract_bearer_token(&headers), Some("abc".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(extract_bearer_token(&headers), Some("xyz".to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
