//! Scheduled / triggered planning runner.

use std::sync::mpsc::TryRecvError;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use replenish_core::TenantId;
use replenish_planning::{PlanningConfig, TenantScope};

use crate::pipeline::{PipelineReport, ReportPipeline};
use crate::source::PlanningDataSource;

/// Sink for finished report runs.
pub trait PlanInsightSink: Send + Sync + 'static {
    fn emit(&self, tenant_id: TenantId, report: PipelineReport);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPlanInsightSink {
    inner: Mutex<Vec<(TenantId, PipelineReport)>>,
}

impl InMemoryPlanInsightSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(TenantId, PipelineReport)> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlanInsightSink for InMemoryPlanInsightSink {
    fn emit(&self, tenant_id: TenantId, report: PipelineReport) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((tenant_id, report));
    }
}

/// Config for the planning runner.
#[derive(Debug, Clone)]
pub struct PlanningRunner {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for PlanningRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
        }
    }
}

/// Handle for a running planner (shutdown + trigger hook).
///
/// Dropping the handle also stops the runner, without waiting for it.
#[derive(Debug)]
pub struct PlanningRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl PlanningRunnerHandle {
    /// Request a run as soon as possible (e.g. after new stock data lands).
    ///
    /// Triggers coalesce: while a run is pending, further triggers are no-ops.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner thread and wait for it.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

struct RunnerContext<S, K> {
    name: &'static str,
    tenant_id: TenantId,
    cfg: PlanningRunner,
    config: PlanningConfig,
    pipeline: ReportPipeline,
    source: Arc<S>,
    sink: Arc<K>,
}

impl PlanningRunner {
    /// Spawn a tenant-scoped runner thread.
    ///
    /// - Schedule: runs once on startup, then every `interval` (must be
    ///   non-zero)
    /// - Scope: `pipeline` is restricted to `tenant_id`
    /// - Trigger: `handle.trigger()` requests an extra run
    /// - Failures: data-source errors are logged and retried with bounded
    ///   exponential backoff; they never propagate. Analyzer failures are
    ///   part of the emitted report.
    pub fn spawn_for_tenant<S, K>(
        &self,
        name: &'static str,
        tenant_id: TenantId,
        config: PlanningConfig,
        pipeline: ReportPipeline,
        source: Arc<S>,
        sink: Arc<K>,
    ) -> std::io::Result<PlanningRunnerHandle>
    where
        S: PlanningDataSource,
        K: PlanInsightSink,
    {
        if self.interval.is_zero() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "planning runner interval must be non-zero",
            ));
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

        let ctx = RunnerContext {
            name,
            tenant_id,
            cfg: self.clone(),
            config,
            pipeline: pipeline.with_scope(TenantScope::Only(tenant_id)),
            source,
            sink,
        };
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || runner_loop(ctx, shutdown_rx, trigger_rx))?;

        Ok(PlanningRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            join: Some(join),
        })
    }
}

fn runner_loop<S, K>(
    ctx: RunnerContext<S, K>,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
) where
    S: PlanningDataSource,
    K: PlanInsightSink,
{
    let RunnerContext {
        name,
        tenant_id,
        cfg,
        config,
        pipeline,
        source,
        sink,
    } = ctx;

    info!(runner = name, tenant = %tenant_id, "planning runner started");

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = true; // run once on startup
    let mut failures: u32 = 0;
    let mut backoff_until: Option<Instant> = None;

    loop {
        match shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if let Some(until) = backoff_until {
            if Instant::now() < until {
                thread::sleep(Duration::from_millis(20));
                continue;
            }
            backoff_until = None;
        }

        if !pending {
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(50));
            thread::sleep(sleep_for);
            continue;
        }

        pending = false;

        let inputs = match source.load(tenant_id, &config) {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(runner = name, tenant = %tenant_id, error = %e, "failed to load planning inputs");
                failures += 1;
                if failures <= cfg.max_retries {
                    pending = true;
                    backoff_until = Some(Instant::now() + backoff(cfg.base_backoff, failures));
                } else {
                    failures = 0;
                }
                continue;
            }
        };

        failures = 0;
        sink.emit(tenant_id, pipeline.run(tenant_id, &config, &inputs));
    }

    info!(runner = name, tenant = %tenant_id, "planning runner stopped");
}

/// `base * 2^(attempt-1)`, capped at 10s.
fn backoff(base: Duration, attempt: u32) -> Duration {
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}
