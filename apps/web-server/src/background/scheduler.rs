//! Periodic housekeeping on tokio-cron-scheduler.

use std::sync::Arc;

use quill_core::SessionService;
use quill_core::ports::RateLimiter;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::config::parse_flag;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// When off, no job is scheduled at all.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

/// Expired-session purge and rate-limiter pruning, both on one cron
/// expression (six fields, seconds first: `"0 */15 * * * *"`).
pub struct Housekeeping {
    jobs: Option<JobScheduler>,
}

impl Housekeeping {
    /// Register both jobs and start ticking. A disabled config yields a
    /// handle that does nothing.
    pub async fn start(
        config: &SchedulerConfig,
        schedule: &str,
        sessions: SessionService,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, JobSchedulerError> {
        if !config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(Self { jobs: None });
        }

        let jobs = JobScheduler::new().await?;
        jobs.add(purge_sessions(schedule, sessions)?).await?;
        jobs.add(prune_limiter(schedule, limiter)?).await?;
        jobs.start().await?;

        tracing::info!(schedule = %schedule, "Housekeeping scheduled");
        Ok(Self { jobs: Some(jobs) })
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        if let Some(jobs) = self.jobs.as_mut() {
            jobs.shutdown().await?;
            tracing::info!("Scheduler stopped");
        }
        Ok(())
    }
}

fn purge_sessions(schedule: &str, sessions: SessionService) -> Result<Job, JobSchedulerError> {
    Job::new_async(schedule, move |_id, _lock| {
        let sessions = sessions.clone();
        Box::pin(async move {
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Expired sessions purged"),
                Err(e) => tracing::error!(error = %e, "Session purge failed"),
            }
        })
    })
}

fn prune_limiter(schedule: &str, limiter: Arc<dyn RateLimiter>) -> Result<Job, JobSchedulerError> {
    Job::new_async(schedule, move |_id, _lock| {
        let limiter = Arc::clone(&limiter);
        Box::pin(async move {
            limiter.prune().await;
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_cron_expression_is_rejected() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(quill_infra::InMemoryRateLimiter::new(
            quill_infra::RateLimitConfig::default(),
        ));
        assert!(prune_limiter("every fifteen minutes", limiter).is_err());
    }

    #[tokio::test]
    async fn disabled_scheduler_starts_nothing() {
        let db = quill_infra::InMemoryDatabase::new();
        let sessions = SessionService::new(Arc::new(db.sessions()), chrono::Duration::hours(1));
        let limiter: Arc<dyn RateLimiter> = Arc::new(quill_infra::InMemoryRateLimiter::new(
            quill_infra::RateLimitConfig::default(),
        ));

        let mut housekeeping = Housekeeping::start(
            &SchedulerConfig { enabled: false },
            "0 */15 * * * *",
            sessions,
            limiter,
        )
        .await
        .unwrap();

        assert!(housekeeping.jobs.is_none());
        housekeeping.shutdown().await.unwrap();
    }
}
