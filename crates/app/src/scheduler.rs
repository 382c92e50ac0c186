//! Scheduler — fixed-interval evaluation loop.
//!
//! Ticks never overlap: the next sleep starts only after the current
//! pass finished, so a slow pass stretches the cycle instead of stacking
//! concurrent passes. A failed pass backs off briefly before retrying.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use farmhub_domain::error::FarmHubError;

use crate::engine::CycleSummary;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_RECOVERY_SLEEP: Duration = Duration::from_secs(10);

/// Loop timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    /// Pause between the end of one pass and the start of the next.
    pub interval: Duration,
    /// Back-off after a failed pass, before retrying.
    pub recovery_sleep: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            recovery_sleep: DEFAULT_RECOVERY_SLEEP,
        }
    }
}

/// Run `tick` repeatedly until `stop` becomes `true`.
///
/// The stop signal is honored both between passes and during the sleeps,
/// so shutdown never waits out a full interval.
pub async fn run<T, F>(options: SchedulerOptions, mut stop: watch::Receiver<bool>, tick: T)
where
    T: Fn() -> F,
    F: Future<Output = Result<CycleSummary, FarmHubError>>,
{
    loop {
        if *stop.borrow() {
            break;
        }

        match tick().await {
            Ok(summary) => {
                tracing::info!(
                    evaluated = summary.evaluated,
                    triggered = summary.triggered,
                    "evaluation pass complete"
                );
            }
            Err(error) => {
                tracing::error!(%error, "evaluation pass failed");
                if wait(options.recovery_sleep, &mut stop).await {
                    break;
                }
                continue;
            }
        }

        if wait(options.interval, &mut stop).await {
            break;
        }
    }

    tracing::info!("scheduler stopped");
}

/// Sleep for `duration`, waking early on a stop signal. Returns whether
/// the loop should stop.
async fn wait(duration: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(duration) => *stop.borrow(),
        _ = stop.changed() => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn summary() -> CycleSummary {
        CycleSummary {
            evaluated: 0,
            triggered: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_tick_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);

        let tick_count = Arc::clone(&count);
        let tick = move || {
            let count = Arc::clone(&tick_count);
            let tx = Arc::clone(&tx);
            async move {
                if count.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                    tx.send(true).unwrap();
                }
                Ok::<CycleSummary, FarmHubError>(summary())
            }
        };

        run(SchedulerOptions::default(), rx, tick).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_running_after_failed_pass() {
        let count = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);

        let tick_count = Arc::clone(&count);
        let tick = move || {
            let count = Arc::clone(&tick_count);
            let tx = Arc::clone(&tx);
            async move {
                let n = count.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    return Err(FarmHubError::Storage("store offline".into()));
                }
                tx.send(true).unwrap();
                Ok(summary())
            }
        };

        run(SchedulerOptions::default(), rx, tick).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_not_tick_when_stopped_before_start() {
        let count = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let tick_count = Arc::clone(&count);
        let tick = move || {
            let count = Arc::clone(&tick_count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<CycleSummary, FarmHubError>(summary())
            }
        };

        run(SchedulerOptions::default(), rx, tick).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
