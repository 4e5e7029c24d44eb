use super::migrations::{apply_migrations, ensure_created};
use super::{CollectionName, DbResult};
use log::{info, warn};
use rusqlite::Connection;
use std::fmt::Display;
use std::time::{Duration, Instant};

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// How a collection table is brought into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStrategy {
    /// Apply versioned migrations up to the latest version.
    Migrate,
    /// Create the table at its latest shape if missing; never alter it.
    EnsureCreated,
}

impl ProvisioningStrategy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Migrate => "migrate",
            Self::EnsureCreated => "ensure_created",
        }
    }
}

/// Provisions one collection table using `strategy`.
pub fn provision_collection(
    conn: &mut Connection,
    collection: &CollectionName,
    strategy: ProvisioningStrategy,
) -> DbResult<()> {
    let started_at = Instant::now();
    let outcome = match strategy {
        ProvisioningStrategy::Migrate => apply_migrations(conn, collection).map(|applied| {
            format!("migrations_applied={applied}")
        }),
        ProvisioningStrategy::EnsureCreated => {
            ensure_created(conn, collection).map(|created| format!("created={created}"))
        }
    };

    match outcome {
        Ok(detail) => {
            info!(
                "event=db_provision module=db status=ok strategy={} collection={} {} duration_ms={}",
                strategy.as_str(),
                collection,
                detail,
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            warn!(
                "event=db_provision module=db status=error strategy={} collection={} duration_ms={} error={}",
                strategy.as_str(),
                collection,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Fixed-backoff retry for startup-time store work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Runs `operation` until it succeeds or `policy.max_attempts` is reached.
///
/// The operation receives the 1-based attempt number. Returns the last error
/// when every attempt failed. A `max_attempts` of zero still runs once.
pub fn retry_with_policy<T, E: Display>(
    policy: RetryPolicy,
    mut operation: impl FnMut(u32) -> Result<T, E>,
) -> Result<T, E> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                warn!(
                    "event=startup_retry module=db status=error attempt={} max_attempts={} error={}",
                    attempt, max_attempts, err
                );
                return Err(err);
            }
            Err(err) => {
                warn!(
                    "event=startup_retry module=db status=retry attempt={} max_attempts={} delay_ms={} error={}",
                    attempt,
                    max_attempts,
                    policy.delay.as_millis(),
                    err
                );
                std::thread::sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}
