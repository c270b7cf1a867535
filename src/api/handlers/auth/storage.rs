//! Database helpers for identities and the OTP ledger.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::store::retry_once;

pub(super) const OTP_TTL_MINUTES: i64 = 5;

/// Identity row as the core sees it. The password hash never leaves this
/// module except through the credential codec.
pub(super) struct IdentityRecord {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) role: String,
    pub(super) password_hash: String,
}

/// Outcome of an OTP consumption attempt.
#[derive(Debug)]
pub(super) enum ConsumeOutcome {
    Consumed,
    Invalid,
}

/// Look up an identity by normalized email.
pub(super) async fn lookup_identity(pool: &PgPool, email: &str) -> Result<Option<IdentityRecord>> {
    let query = r"
        SELECT id, name, email, role, password_hash
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = retry_once(|| sqlx::query(query).bind(email).fetch_optional(pool))
        .instrument(span)
        .await
        .context("failed to lookup identity")?;

    Ok(row.map(|row| IdentityRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: row.get("role"),
        password_hash: row.get("password_hash"),
    }))
}

/// Persist a fresh recovery code with its five-minute expiry.
///
/// Earlier unconsumed codes for the same email stay valid; matching always
/// filters on expiry and the consumed flag.
pub(super) async fn insert_otp(pool: &PgPool, email: &str, code: &str) -> Result<()> {
    let query = r"
        INSERT INTO password_otps (email, code, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 minute'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(code)
        .bind(OTP_TTL_MINUTES)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert OTP")?;
    Ok(())
}

/// Check for an unconsumed, unexpired code. Read-only and re-checkable;
/// verification never consumes.
pub(super) async fn match_otp(pool: &PgPool, email: &str, code: &str) -> Result<bool> {
    let query = r"
        SELECT 1
        FROM password_otps
        WHERE email = $1
          AND code = $2
          AND consumed_at IS NULL
          AND expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = retry_once(|| {
        sqlx::query(query)
            .bind(email)
            .bind(code)
            .fetch_optional(pool)
    })
    .instrument(span)
    .await
    .context("failed to match OTP")?;

    Ok(row.is_some())
}

/// Atomically consume a code and replace the owning identity's digest.
///
/// The conditional update on the consumed flag decides the race: of two
/// concurrent calls for the same code, the second re-evaluates after the
/// first commits, matches nothing, and reports `Invalid`. The password update
/// only happens in the same transaction as a successful consume.
pub(super) async fn consume_otp(
    pool: &PgPool,
    email: &str,
    code: &str,
    new_password_hash: &str,
) -> Result<ConsumeOutcome> {
    let mut tx = pool.begin().await.context("begin consume transaction")?;

    let query = r"
        UPDATE password_otps
        SET consumed_at = NOW()
        WHERE email = $1
          AND code = $2
          AND consumed_at IS NULL
          AND expires_at > NOW()
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(email)
        .bind(code)
        .fetch_all(&mut *tx)
        .instrument(span)
        .await
        .context("failed to consume OTP")?;

    if rows.is_empty() {
        let _ = tx.rollback().await;
        return Ok(ConsumeOutcome::Invalid);
    }

    let query = r"
        UPDATE users
        SET password_hash = $2,
            updated_at = NOW()
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(email)
        .bind(new_password_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to update password hash")?;

    tx.commit().await.context("commit consume transaction")?;

    Ok(ConsumeOutcome::Consumed)
}
