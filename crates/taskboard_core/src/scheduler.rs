//! Periodic urgency sweep.
//!
//! # Responsibility
//! - Re-run the due-date audit over the whole board on a fixed interval.
//! - Hand each report to the presentation layer.
//!
//! # Invariants
//! - Sweeps only read board snapshots; they never mutate or persist.
//! - The first sweep runs immediately after start.
//! - Cancelling or dropping the handle stops the timer; nothing keeps
//!   ticking after session teardown.

use crate::audit::due_date::{audit_board, AuditReport};
use crate::config::BoardConfig;
use crate::model::board::Board;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::board_service::BoardService;
use log::{debug, info, warn};
use mockable::Clock;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Shortest accepted sweep interval.
pub const MIN_AUDIT_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the board a sweep classifies.
pub trait BoardSnapshot: Send + Sync {
    fn snapshot(&self) -> Board;
}

impl<S, C> BoardSnapshot for Mutex<BoardService<S, C>>
where
    S: KeyValueStore + Send,
    C: Clock + Send,
{
    fn snapshot(&self) -> Board {
        match self.lock() {
            Ok(service) => service.board().clone(),
            Err(poisoned) => poisoned.into_inner().board().clone(),
        }
    }
}

/// Presentation hook receiving fresh urgency tags.
pub trait UrgencySink: Send + Sync {
    fn apply(&self, report: &AuditReport);
}

impl<F> UrgencySink for F
where
    F: Fn(&AuditReport) + Send + Sync,
{
    fn apply(&self, report: &AuditReport) {
        self(report)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// `start` was called outside a Tokio runtime.
    NoRuntime(String),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRuntime(message) => {
                write!(f, "audit scheduler needs a tokio runtime: {message}")
            }
        }
    }
}

impl Error for SchedulerError {}

/// Handle to a running sweep task. Dropping it cancels the sweep.
pub struct AuditScheduler {
    cancel: CancellationToken,
    handle: Option<JoinHandle<u64>>,
}

impl AuditScheduler {
    /// Spawns the sweep task on the current Tokio runtime.
    ///
    /// Intervals shorter than [`MIN_AUDIT_INTERVAL`] are raised to it.
    pub fn start<B, K, C>(
        board: Arc<B>,
        sink: Arc<K>,
        clock: Arc<C>,
        interval: Duration,
    ) -> Result<Self, SchedulerError>
    where
        B: BoardSnapshot + ?Sized + 'static,
        K: UrgencySink + ?Sized + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let runtime =
            Handle::try_current().map_err(|err| SchedulerError::NoRuntime(err.to_string()))?;
        let interval = interval.max(MIN_AUDIT_INTERVAL);
        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run_sweeps(board, sink, clock, interval, cancel.clone()));

        info!(
            "event=audit_scheduler module=scheduler status=started interval_secs={}",
            interval.as_secs()
        );
        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// Starts a sweep at the session's configured `audit_interval`.
    pub fn start_with_config<B, K, C>(
        config: &BoardConfig,
        board: Arc<B>,
        sink: Arc<K>,
        clock: Arc<C>,
    ) -> Result<Self, SchedulerError>
    where
        B: BoardSnapshot + ?Sized + 'static,
        K: UrgencySink + ?Sized + 'static,
        C: Clock + Send + Sync + 'static,
    {
        Self::start(board, sink, clock, config.audit_interval)
    }

    /// Requests the sweep to stop; returns immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the sweep and waits for it, returning how many sweeps ran.
    pub async fn shutdown(mut self) -> u64 {
        self.cancel.cancel();
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.await {
            Ok(sweeps) => sweeps,
            Err(err) => {
                warn!("event=audit_scheduler module=scheduler status=error error={err}");
                0
            }
        }
    }
}

impl Drop for AuditScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_sweeps<B, K, C>(
    board: Arc<B>,
    sink: Arc<K>,
    clock: Arc<C>,
    interval: Duration,
    cancel: CancellationToken,
) -> u64
where
    B: BoardSnapshot + ?Sized,
    K: UrgencySink + ?Sized,
    C: Clock + Send + Sync,
{
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sweeps: u64 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("event=audit_scheduler module=scheduler status=stopped sweeps={sweeps}");
                return sweeps;
            }
            _ = ticker.tick() => {
                let report = audit_board(&board.snapshot(), &clock.local());
                sink.apply(&report);
                sweeps += 1;
                debug!(
                    "event=audit_sweep module=scheduler status=ok tasks={} overdue={} warning={}",
                    report.entries.len(),
                    report.overdue_count(),
                    report.warning_count()
                );
            }
        }
    }
}
