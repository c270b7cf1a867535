//! Shared helpers for Postgres access.
//!
//! The pool carries a bounded `acquire_timeout` and re-checks connections
//! before handing them out; on top of that, reads retry exactly once when the
//! store reports a transient failure.

use std::future::Future;

/// True for failures worth a single retry after the pool reconnects.
pub(crate) fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}

/// Run a store operation, retrying once on a transient failure.
pub(crate) async fn retry_once<T, F, Fut>(op: F) -> Result<T, sqlx::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Err(err) if is_transient(&err) => op().await,
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    #[test]
    fn test_is_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(is_transient(&sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset"
        ))));
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_retry_once_recovers() {
        let calls = Cell::new(0u32);
        let result = retry_once(|| {
            let attempt = calls.get() + 1;
            calls.set(attempt);
            async move {
                if attempt == 1 {
                    Err(sqlx::Error::PoolTimedOut)
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_once_gives_up_after_second_failure() {
        let calls = Cell::new(0u32);
        let result: Result<(), sqlx::Error> = retry_once(|| {
            calls.set(calls.get() + 1);
            async { Err(sqlx::Error::PoolTimedOut) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_once_skips_non_transient() {
        let calls = Cell::new(0u32);
        let result: Result<(), sqlx::Error> = retry_once(|| {
            calls.set(calls.get() + 1);
            async { Err(sqlx::Error::RowNotFound) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
