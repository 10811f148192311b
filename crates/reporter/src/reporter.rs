//! Reporting engine.
//!
//! Flushes every registered metric to the sender, either on demand via
//! [`Reporter::report`] or from a background Tokio task ticking at the
//! configured interval. Both paths run the same pass under one lock, so a
//! manual report never races a scheduled one over delta baselines or
//! histogram windows.
//!
//! ```text
//!   Idle ──start()──▶ Running ──close()──▶ Stopped
//!     └──────────────close()───────────────▲
//! ```
//!
//! Failed emissions never stop a pass: each one bumps the error counter
//! and, with `log_errors`, is logged at warn level.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tally_config::{ApplicationConfig, ReporterConfig};
use tally_metrics::{MetricRegistry, RegisteredMetric, Tags};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::adapter::{self, DeltaBaselines, Emission};
use crate::error::{ReporterError, SenderError};
use crate::naming::Naming;
use crate::sender::Sender;

/// Source reported when none is configured and the host name is unavailable
const UNKNOWN_SOURCE: &str = "unknown";

/// Builder for constructing a Reporter
pub struct ReporterBuilder {
    sender: Arc<dyn Sender>,
    application: ApplicationConfig,
    registry: Option<Arc<MetricRegistry>>,
    config: ReporterConfig,
}

impl ReporterBuilder {
    /// Create a new builder
    pub fn new(sender: Arc<dyn Sender>, application: ApplicationConfig) -> Self {
        Self {
            sender,
            application,
            registry: None,
            config: ReporterConfig::default(),
        }
    }

    /// Report metrics from `registry` (defaults to a fresh one)
    pub fn registry(mut self, registry: Arc<MetricRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace every option with `config`
    pub fn config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Flush interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Prefix prepended to every emitted name
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Append type suffixes (`.count`, `.value`)
    pub fn add_suffix(mut self, add_suffix: bool) -> Self {
        self.config.add_suffix = add_suffix;
        self
    }

    /// Start ticking as part of `build()`
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.config.auto_start = auto_start;
        self
    }

    /// Do not start ticking as part of `build()`
    pub fn disable_auto_start(self) -> Self {
        self.auto_start(false)
    }

    /// Log failed emissions at warn level
    pub fn log_errors(mut self, log_errors: bool) -> Self {
        self.config.log_errors = log_errors;
        self
    }

    /// Source reported with every emission
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.config.source = Some(source.into());
        self
    }

    /// Build the Reporter
    ///
    /// Fails on invalid configuration, or when auto-start is enabled and
    /// no Tokio runtime is available.
    pub fn build(self) -> Result<Reporter, ReporterError> {
        self.config.validate()?;

        let source = self.config.source.clone().unwrap_or_else(default_source);
        let inner = Inner {
            sender: self.sender,
            registry: self.registry.unwrap_or_default(),
            naming: Naming::new(self.config.prefix.clone(), self.config.add_suffix),
            interval: self.config.interval,
            log_errors: self.config.log_errors,
            source,
            point_tags: self.application.point_tags(),
            errors: AtomicU64::new(0),
            flush: Mutex::new(DeltaBaselines::new()),
            state: Mutex::new(State::Idle),
        };

        let reporter = Reporter {
            inner: Arc::new(inner),
        };

        if self.config.auto_start {
            reporter.start()?;
        }

        Ok(reporter)
    }
}

enum State {
    Idle,
    Running(CancellationToken),
    Stopped,
}

struct Inner {
    sender: Arc<dyn Sender>,
    registry: Arc<MetricRegistry>,
    naming: Naming,
    interval: Duration,
    log_errors: bool,
    source: String,
    point_tags: Tags,
    errors: AtomicU64,
    flush: Mutex<DeltaBaselines>,
    state: Mutex<State>,
}

impl Inner {
    /// Scheduled pass; skipped if the reporter was closed while waiting for the lock
    fn report_scheduled(&self, cancel: &CancellationToken) {
        let mut baselines = self.flush.lock();
        if cancel.is_cancelled() {
            return;
        }
        self.report_pass(&mut baselines);
    }

    fn report_pass(&self, baselines: &mut DeltaBaselines) {
        let timestamp = Utc::now().timestamp();
        let names = self.registry.names();
        baselines.retain_names(&names);

        let mut failed = 0u64;
        for name in &names {
            let Some(entry) = self.registry.entry(name) else {
                trace!(metric = %name, "metric removed during report, skipping");
                continue;
            };

            let tags = self.tags_for(&entry);
            for emission in adapter::emissions(name, &entry, &self.naming, baselines) {
                if let Err(error) = self.dispatch(&emission, timestamp, &tags) {
                    failed += 1;
                    self.record_failure(&emission, &error);
                }
            }
        }

        if failed > 0 {
            debug!(
                failed,
                metrics = names.len(),
                "report pass finished with failed emissions"
            );
        }
    }

    /// Application tags overlaid with the metric's own tags
    fn tags_for(&self, entry: &RegisteredMetric) -> Tags {
        let mut tags = self.point_tags.clone();
        tags.extend(
            entry
                .tags
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        tags
    }

    fn dispatch(&self, emission: &Emission, timestamp: i64, tags: &Tags) -> Result<(), SenderError> {
        match emission {
            Emission::Point { name, value } => {
                self.sender
                    .send_metric(name, *value, timestamp, &self.source, tags)
            }
            Emission::Delta { name, value } => {
                self.sender
                    .send_delta_counter(name, *value, &self.source, tags)
            }
            Emission::Distribution { name, distribution } => self.sender.send_distribution(
                name,
                &distribution.centroids,
                &BTreeSet::from([distribution.granularity]),
                distribution.timestamp.timestamp(),
                &self.source,
                tags,
            ),
        }
    }

    fn record_failure(&self, emission: &Emission, error: &SenderError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        if self.log_errors {
            warn!(
                metric = emission.name(),
                kind = emission.kind(),
                error = %error,
                "failed to send metric"
            );
        } else {
            debug!(metric = emission.name(), error = %error, "failed to send metric");
        }
    }
}

/// Periodic metrics reporter
///
/// Dropping a running reporter cancels its ticker; call [`close`](Self::close)
/// to also wait for an in-flight pass and close the sender.
pub struct Reporter {
    inner: Arc<Inner>,
}

impl Reporter {
    /// Create a new builder
    pub fn builder(sender: Arc<dyn Sender>, application: ApplicationConfig) -> ReporterBuilder {
        ReporterBuilder::new(sender, application)
    }

    /// Start the background ticker
    ///
    /// A no-op when already running. The first pass runs one interval after
    /// start; missed ticks are skipped rather than bunched up.
    pub fn start(&self) -> Result<(), ReporterError> {
        let mut state = self.inner.state.lock();
        match *state {
            State::Running(_) => return Ok(()),
            State::Stopped => return Err(ReporterError::Closed),
            State::Idle => {}
        }

        let runtime = Handle::try_current().map_err(|_| ReporterError::NoRuntime)?;
        let cancel = CancellationToken::new();

        self.inner.sender.start();
        runtime.spawn(run(Arc::clone(&self.inner), cancel.clone()));
        *state = State::Running(cancel);

        info!(
            interval_ms = self.inner.interval.as_millis() as u64,
            source = %self.inner.source,
            "metrics reporter started"
        );
        Ok(())
    }

    /// Flush every registered metric once
    ///
    /// Failures are counted, never returned. Blocks while a scheduled pass
    /// is in flight. Does nothing once the reporter is closed; a final drain
    /// must run before [`close`](Self::close).
    pub fn report(&self) {
        let mut baselines = self.inner.flush.lock();
        if matches!(*self.inner.state.lock(), State::Stopped) {
            trace!("report after close ignored");
            return;
        }
        self.inner.report_pass(&mut baselines);
    }

    /// Stop ticking and close the sender
    ///
    /// Waits for an in-flight pass to finish, so no scheduled emission
    /// happens after this returns. Calling it again does nothing.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.inner.state.lock(), State::Stopped);
        match previous {
            State::Stopped => return,
            State::Running(cancel) => cancel.cancel(),
            State::Idle => {}
        }

        drop(self.inner.flush.lock());
        self.inner.sender.close();
        info!(errors = self.errors_count(), "metrics reporter closed");
    }

    /// Failed emissions since construction
    pub fn errors_count(&self) -> u64 {
        self.inner.errors.load(Ordering::Relaxed)
    }

    /// Whether the background ticker is running
    pub fn is_running(&self) -> bool {
        matches!(*self.inner.state.lock(), State::Running(_))
    }

    /// The registry this reporter reads from
    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.inner.registry
    }

    /// Source reported with every emission
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// Flush interval
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let State::Running(cancel) = &*self.inner.state.lock() {
            cancel.cancel();
        }
    }
}

/// Tick until cancelled, running each pass on the blocking pool
async fn run(inner: Arc<Inner>, cancel: CancellationToken) {
    let mut ticker = interval_at(Instant::now() + inner.interval, inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("metrics reporter shutting down");
                break;
            }
            _ = ticker.tick() => {
                let pass = Arc::clone(&inner);
                let token = cancel.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || pass.report_scheduled(&token)).await {
                    warn!(error = %e, "scheduled report pass panicked");
                }
            }
        }
    }
}

fn default_source() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}
