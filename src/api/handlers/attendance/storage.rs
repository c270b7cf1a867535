//! Database helpers for the attendance ledger.
//!
//! Both stamp operations resolve races through the store, not in-process
//! locks: check-in anchors on the (employee, day) unique constraint, and
//! check-out holds a row lock while the conditional update runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::store::retry_once;

use super::types::{
    AttendanceLogRow, AttendanceRecord, OwnerSummary, WorkStatus, FULL_DAY_HOURS,
};

#[derive(Debug)]
pub(super) enum CheckInOutcome {
    CheckedIn { at: DateTime<Utc> },
    AlreadyCheckedIn,
}

#[derive(Debug)]
pub(super) enum CheckOutOutcome {
    Completed {
        at: DateTime<Utc>,
        hours_worked: f64,
        status: WorkStatus,
    },
    NotCheckedIn,
    AlreadyCheckedOut,
}

/// Admin log filters, parsed and validated by the handler.
#[derive(Debug, Default)]
pub(super) struct LogsFilter {
    pub(super) employee: Option<Uuid>,
    pub(super) day: Option<NaiveDate>,
    pub(super) status: Option<WorkStatus>,
}

/// The local calendar day; all day-scoped queries use this as the key for
/// the half-open [midnight, next-midnight) window.
pub(super) fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// First day of a backward-looking window that includes `today`.
pub(super) fn window_start(today: NaiveDate, window_days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(window_days)).unwrap_or(today)
}

/// Hours worked (two decimals) and the derived status for a completed day.
///
/// The status threshold applies to the unrounded duration, so 7.996 hours
/// stores as 8.0 but still counts as partial.
pub(super) fn derive_hours_status(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> (f64, WorkStatus) {
    let elapsed_ms = check_out.signed_duration_since(check_in).num_milliseconds();
    let hours = (elapsed_ms as f64 / 3_600_000.0).max(0.0);
    let status = if hours >= FULL_DAY_HOURS {
        WorkStatus::Present
    } else {
        WorkStatus::Partial
    };
    let rounded = (hours * 100.0).round() / 100.0;
    (rounded, status)
}

/// Create today's record, or claim one created with a null check-in.
///
/// The insert anchors on the (employee, day) unique constraint; the losing
/// side of a concurrent race lands on the conflict path and, finding the
/// record already stamped, observes `AlreadyCheckedIn`.
pub(super) async fn check_in(
    pool: &PgPool,
    employee_id: Uuid,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> Result<CheckInOutcome> {
    let query = r"
        INSERT INTO attendance (employee_id, day, check_in, status, hours_worked)
        VALUES ($1, $2, $3, 'present', 0)
        ON CONFLICT (employee_id, day) DO NOTHING
        RETURNING check_in
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(employee_id)
        .bind(day)
        .bind(now)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to insert attendance record")?;

    if row.is_some() {
        return Ok(CheckInOutcome::CheckedIn { at: now });
    }

    // A record for today already exists; stamp it only if check-in is still
    // unset.
    let query = r"
        UPDATE attendance
        SET check_in = $3,
            status = 'present',
            updated_at = NOW()
        WHERE employee_id = $1
          AND day = $2
          AND check_in IS NULL
        RETURNING check_in
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(employee_id)
        .bind(day)
        .bind(now)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to stamp existing attendance record")?;

    if row.is_some() {
        Ok(CheckInOutcome::CheckedIn { at: now })
    } else {
        Ok(CheckInOutcome::AlreadyCheckedIn)
    }
}

/// Complete today's record: set check-out and derive hours and status.
///
/// The row lock plus the `check_out IS NULL` condition make the transition
/// single-shot; a completed day is terminal.
pub(super) async fn check_out(
    pool: &PgPool,
    employee_id: Uuid,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> Result<CheckOutOutcome> {
    let mut tx = pool.begin().await.context("begin check-out transaction")?;

    let query = r"
        SELECT check_in, check_out
        FROM attendance
        WHERE employee_id = $1
          AND day = $2
        FOR UPDATE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(employee_id)
        .bind(day)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to load attendance record for check-out")?;

    let Some(row) = row else {
        let _ = tx.rollback().await;
        return Ok(CheckOutOutcome::NotCheckedIn);
    };

    let check_in: Option<DateTime<Utc>> = row.get("check_in");
    let existing_check_out: Option<DateTime<Utc>> = row.get("check_out");

    let Some(check_in) = check_in else {
        let _ = tx.rollback().await;
        return Ok(CheckOutOutcome::NotCheckedIn);
    };
    if existing_check_out.is_some() {
        let _ = tx.rollback().await;
        return Ok(CheckOutOutcome::AlreadyCheckedOut);
    }

    let (hours_worked, status) = derive_hours_status(check_in, now);

    let query = r"
        UPDATE attendance
        SET check_out = $3,
            hours_worked = $4,
            status = $5,
            updated_at = NOW()
        WHERE employee_id = $1
          AND day = $2
          AND check_out IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(employee_id)
        .bind(day)
        .bind(now)
        .bind(hours_worked)
        .bind(status.as_str())
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to complete attendance record")?;

    if result.rows_affected() == 0 {
        let _ = tx.rollback().await;
        return Ok(CheckOutOutcome::AlreadyCheckedOut);
    }

    tx.commit().await.context("commit check-out transaction")?;

    Ok(CheckOutOutcome::Completed {
        at: now,
        hours_worked,
        status,
    })
}

/// Today's record for one employee, if any.
pub(super) async fn today(
    pool: &PgPool,
    employee_id: Uuid,
    day: NaiveDate,
) -> Result<Option<AttendanceRecord>> {
    let query = r"
        SELECT day, check_in, check_out, status, hours_worked
        FROM attendance
        WHERE employee_id = $1
          AND day = $2
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
            .bind(employee_id)
            .bind(day)
            .fetch_optional(pool)
    })
    .instrument(span)
    .await
    .context("failed to load today's attendance")?;

    Ok(row.map(|row| record_from_row(&row)))
}

/// Records for one employee since `since`, newest first.
pub(super) async fn recent(
    pool: &PgPool,
    employee_id: Uuid,
    since: NaiveDate,
) -> Result<Vec<AttendanceRecord>> {
    let query = r"
        SELECT day, check_in, check_out, status, hours_worked
        FROM attendance
        WHERE employee_id = $1
          AND day >= $2
        ORDER BY day DESC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = retry_once(|| {
        sqlx::query(query)
            .bind(employee_id)
            .bind(since)
            .fetch_all(pool)
    })
    .instrument(span)
    .await
    .context("failed to load recent attendance")?;

    Ok(rows.iter().map(record_from_row).collect())
}

/// Admin view joining attendance to its owning identity, day descending.
///
/// The per-day uniqueness invariant guarantees the join yields at most one
/// row per (employee, day).
pub(super) async fn logs(pool: &PgPool, filter: &LogsFilter) -> Result<Vec<AttendanceLogRow>> {
    let query = r"
        SELECT attendance.day, attendance.check_in, attendance.check_out,
               attendance.status, attendance.hours_worked,
               users.id AS user_id, users.name, users.email, users.job_title
        FROM attendance
        JOIN users ON users.id = attendance.employee_id
        WHERE ($1::uuid IS NULL OR attendance.employee_id = $1)
          AND ($2::date IS NULL OR attendance.day = $2)
          AND ($3::text IS NULL OR attendance.status = $3)
        ORDER BY attendance.day DESC, users.email ASC
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let status = filter.status.map(WorkStatus::as_str);
    let rows = retry_once(|| {
        sqlx::query(query)
            .bind(filter.employee)
            .bind(filter.day)
            .bind(status)
            .fetch_all(pool)
    })
    .instrument(span)
    .await
    .context("failed to load attendance logs")?;

    Ok(rows
        .iter()
        .map(|row| AttendanceLogRow {
            day: row.get("day"),
            check_in: row.get("check_in"),
            check_out: row.get("check_out"),
            status: status_from_row(row),
            hours_worked: row.get("hours_worked"),
            user: OwnerSummary {
                id: row.get("user_id"),
                name: row.get("name"),
                email: row.get("email"),
                job_title: row.get("job_title"),
            },
        })
        .collect())
}

fn record_from_row(row: &PgRow) -> AttendanceRecord {
    AttendanceRecord {
        day: row.get("day"),
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        status: status_from_row(row),
        hours_worked: row.get("hours_worked"),
    }
}

fn status_from_row(row: &PgRow) -> WorkStatus {
    let status_text: String = row.get("status");
    WorkStatus::from_str(&status_text).unwrap_or(WorkStatus::Absent)
}
