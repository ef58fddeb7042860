// ── Monitor ──
//
// Drives the resolver from a periodic timer and manual refresh requests.
// Timer ticks and refreshes are handled by one loop, and every resolve
// additionally holds `tick_lock`, so two probes never run at once. Each
// DisplayState replaces the previous one in a single `watch` send.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::CoreError;
use crate::probe::ProbeSource;
use crate::resolver::{DisplayState, StatusResolver};

/// Pending manual refreshes beyond this are dropped.
const REFRESH_QUEUE_SIZE: usize = 1;

/// Periodic status monitor.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Clones share one loop, one
/// published state and one cancellation token.
pub struct Monitor<S> {
    inner: Arc<MonitorInner<S>>,
}

impl<S> Clone for Monitor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MonitorInner<S> {
    resolver: StatusResolver,
    source: S,
    interval: Duration,
    state: watch::Sender<Option<DisplayState>>,
    refresh_tx: mpsc::Sender<()>,
    refresh_rx: Mutex<Option<mpsc::Receiver<()>>>,
    tick_lock: Mutex<()>,
    cancel: CancellationToken,
}

impl<S: ProbeSource> Monitor<S> {
    /// Create a monitor ticking at the configured update interval.
    /// Does NOT start polling -- call [`run()`](Self::run).
    pub fn new(resolver: StatusResolver, source: S) -> Self {
        let interval = resolver.config().update_interval;
        Self::with_interval(resolver, source, interval)
    }

    pub fn with_interval(resolver: StatusResolver, source: S, interval: Duration) -> Self {
        let (state, _) = watch::channel(None);
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_QUEUE_SIZE);

        Self {
            inner: Arc::new(MonitorInner {
                resolver,
                source,
                interval,
                state,
                refresh_tx,
                refresh_rx: Mutex::new(Some(refresh_rx)),
                tick_lock: Mutex::new(()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn resolver(&self) -> &StatusResolver {
        &self.inner.resolver
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Subscribe to published display states (`None` until the first tick).
    pub fn subscribe(&self) -> watch::Receiver<Option<DisplayState>> {
        self.inner.state.subscribe()
    }

    /// Latest published state.
    pub fn current(&self) -> Option<DisplayState> {
        self.inner.state.borrow().clone()
    }

    /// Request an out-of-band tick.
    ///
    /// Returns `false` if a refresh is already queued; the request is
    /// coalesced into that one.
    pub fn refresh(&self) -> bool {
        self.inner.refresh_tx.try_send(()).is_ok()
    }

    /// Stop the loop. An in-flight probe is abandoned.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Resolve once and publish the result.
    ///
    /// Waits for any tick already in flight.
    pub async fn resolve_once(&self) -> Result<DisplayState, CoreError> {
        let _guard = self.inner.tick_lock.lock().await;
        let state = self.inner.resolver.tick(&self.inner.source).await?;
        self.publish(state.clone());
        Ok(state)
    }

    /// Run the polling loop until [`shutdown()`](Self::shutdown).
    ///
    /// The first tick fires immediately. A classification failure ends the
    /// loop with an error: it means the band table has no floor for a level
    /// the device reported.
    pub async fn run(&self) -> Result<(), CoreError> {
        let mut refresh_rx = self
            .inner
            .refresh_rx
            .lock()
            .await
            .take()
            .ok_or(CoreError::AlreadyRunning)?;

        let cancel = self.inner.cancel.clone();
        let mut interval = tokio::time::interval(self.inner.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            source = %self.inner.source.describe(),
            interval_secs = self.inner.interval.as_secs(),
            "monitor started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
                Some(()) = refresh_rx.recv() => debug!("manual refresh"),
            }

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                outcome = self.resolve_once() => outcome,
            };

            if let Err(e) = outcome {
                error!(error = %e, "tick failed; stopping monitor");
                cancel.cancel();
                return Err(e);
            }
        }

        info!("monitor stopped");
        Ok(())
    }

    fn publish(&self, state: DisplayState) {
        let previous = self.inner.state.send_replace(Some(state));
        let current = self.inner.state.borrow();
        let Some(current) = current.as_ref() else {
            return;
        };

        let changed = previous.as_ref().is_none_or(|p| p.band != current.band);
        if changed {
            info!(
                band = %current.band,
                tooltip = %current.tooltip,
                sound = ?current.presentation.sound,
                "band changed"
            );
        } else {
            debug!(band = %current.band, tooltip = %current.tooltip, "status resolved");
        }
    }
}
