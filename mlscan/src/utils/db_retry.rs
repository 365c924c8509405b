//! Retry for contended SQLite writes
//!
//! Album and track workers write through one pool, so a writer can still see
//! `SQLITE_BUSY` after the busy timeout. Those failures are retried with a
//! doubling pause until the wait budget is spent.

use mlscan_common::{Error, Result};
use std::future::Future;
use std::time::{Duration, Instant};

const FIRST_PAUSE: Duration = Duration::from_millis(10);
const LONGEST_PAUSE: Duration = Duration::from_secs(1);

/// Run `op`, repeating it while it fails with a lock error and `budget_ms` remains
///
/// Any other error is returned on first sight. Running out of budget turns the
/// last lock error into `Error::Internal` naming the operation.
pub async fn retry_on_lock<F, Fut, T>(label: &str, budget_ms: u64, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let deadline = Instant::now() + Duration::from_millis(budget_ms);
    let mut pause = FIRST_PAUSE;
    let mut tries = 0u32;

    loop {
        tries += 1;
        let err = match op().await {
            Ok(value) => {
                if tries > 1 {
                    tracing::debug!(op = label, tries, "Write went through after lock retries");
                }
                return Ok(value);
            }
            Err(err) if is_lock_error(&err) => err,
            Err(err) => return Err(err),
        };

        if Instant::now() >= deadline {
            tracing::error!(op = label, tries, budget_ms, error = %err, "Gave up waiting for database lock");
            return Err(Error::Internal(format!(
                "{}: database still locked after {} tries",
                label, tries
            )));
        }

        tracing::warn!(op = label, tries, pause_ms = pause.as_millis() as u64, "Database locked, retrying");
        tokio::time::sleep(pause).await;
        pause = (pause * 2).min(LONGEST_PAUSE);
    }
}

/// SQLITE_BUSY / SQLITE_LOCKED surfaced through sqlx
pub fn is_lock_error(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) => {
            matches!(db_err.code().as_deref(), Some("5") | Some("6"))
                || db_err.message().contains("database is locked")
        }
        Error::Database(other) => other.to_string().contains("database is locked"),
        _ => false,
    }
}
