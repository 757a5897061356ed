//! Token cleanup service for periodic maintenance
//!
//! One cycle deletes refresh session rows past the retention window and
//! sweeps expired entries from the blacklist and the single-use marker store.
//! Cycles never overlap: a trigger that finds one running is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use sg_shared::config::SessionConfig;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::repositories::session::RefreshSessionStore;
use crate::services::revocation::RevocationRegistry;
use crate::services::special_token::SpecialTokenService;
use crate::services::store_call::bounded;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup
    pub interval: StdDuration,
    /// How long expired or revoked session rows are kept
    pub retention: Duration,
    /// Upper bound for the session delete
    pub store_timeout: StdDuration,
    /// Whether the background task runs at all
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(3600),
            retention: Duration::days(30),
            store_timeout: StdDuration::from_millis(2000),
            enabled: true,
        }
    }
}

impl From<&SessionConfig> for TokenCleanupConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interval: StdDuration::from_secs(config.cleanup_interval_seconds.max(1)),
            retention: Duration::try_days(config.retention_days.max(0))
                .unwrap_or_else(|| Self::default().retention),
            store_timeout: StdDuration::from_millis(config.store_timeout_ms),
            enabled: config.cleanup_enabled,
        }
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    /// Session rows deleted after the retention window
    pub sessions_deleted: u64,
    /// Expired blacklist entries removed
    pub revocations_swept: u64,
    /// Expired single-use markers removed
    pub markers_swept: u64,
    /// Another cycle was already running
    pub skipped: bool,
    /// Errors encountered by individual tasks
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> u64 {
        self.sessions_deleted + self.revocations_swept + self.markers_swept
    }
}

/// Clears the single-flight flag even if the cycle is dropped midway
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct TokenCleanupService<S: RefreshSessionStore + 'static> {
    sessions: Arc<S>,
    registry: Arc<RevocationRegistry>,
    special_tokens: Arc<SpecialTokenService>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
    running: AtomicBool,
}

impl<S: RefreshSessionStore + 'static> TokenCleanupService<S> {
    pub fn new(
        sessions: Arc<S>,
        registry: Arc<RevocationRegistry>,
        special_tokens: Arc<SpecialTokenService>,
        clock: Arc<dyn Clock>,
        config: TokenCleanupConfig,
    ) -> Self {
        Self {
            sessions,
            registry,
            special_tokens,
            clock,
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &TokenCleanupConfig {
        &self.config
    }

    /// Run a single cleanup cycle
    ///
    /// Task failures are logged and collected in the result; they never
    /// propagate.
    pub async fn run_cleanup(&self) -> CleanupResult {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Cleanup already running, skipping trigger");
            return CleanupResult {
                skipped: true,
                ..Default::default()
            };
        }
        let _guard = RunningGuard(&self.running);

        debug!("Starting token cleanup cycle");
        let mut result = CleanupResult::default();

        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(self.config.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        match bounded(
            "session.delete_stale",
            self.config.store_timeout,
            self.sessions.delete_stale(cutoff),
        )
        .await
        {
            Ok(count) => result.sessions_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to delete stale sessions");
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        match self.registry.sweep().await {
            Ok(count) => result.revocations_swept = count,
            Err(e) => {
                error!(error = %e, "Failed to sweep blacklist");
                result.errors.push(format!("Blacklist cleanup error: {}", e));
            }
        }

        match self.special_tokens.sweep().await {
            Ok(count) => result.markers_swept = count,
            Err(e) => {
                error!(error = %e, "Failed to sweep single-use markers");
                result.errors.push(format!("Marker cleanup error: {}", e));
            }
        }

        info!(
            sessions = result.sessions_deleted,
            revocations = result.revocations_swept,
            markers = result.markers_swept,
            errors = result.errors.len(),
            "Token cleanup completed"
        );

        result
    }

    /// Start the cleanup service as a background task
    ///
    /// The first cycle runs immediately; the task exits once `shutdown` is
    /// cancelled.
    pub fn start_background_task(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return tokio::spawn(async {});
        }

        tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval.as_secs(),
                "Token cleanup service started"
            );

            let mut timer = tokio::time::interval(self.config.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = timer.tick() => {
                        let result = self.run_cleanup().await;
                        if !result.is_success() {
                            warn!(errors = ?result.errors, "Cleanup completed with errors");
                        }
                    }
                }
            }

            info!("Token cleanup service stopped");
        })
    }
}
