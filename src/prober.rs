//! Probe orchestration: resolve → fan out attempts → aggregate → notify.
//!
//! [`Prober::start`] spawns one driver task per probe. That task owns the
//! lookup future, every in-flight attempt and the [Stats] accumulator, so
//! outcomes are folded in one at a time without locks. The completion
//! notification is sent from the end of the driver, after the last
//! outcome, which makes it fire exactly once. Dropping the returned
//! [ProbeHandle] aborts the driver: pending lookups and sockets are dropped
//! with it and no notification is sent. [`ProbeHandle::detach`] gives the
//! probe up to run unattended instead.

use crate::{
    probe::{Connector, TcpConnector},
    request::{ProbeId, ProbeRequest},
    resolve::{self, ResolvedAddress, Resolver, SystemResolver},
    sockopt::CONNECT_TIMEOUT,
    stats::{AttemptOutcome, AttemptReport, ProbeResult, Stats},
};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::AbortHandle,
    time::Instant,
};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProbeState {
    Created,
    Resolving,
    Probing,
    Completed,
}

/// Receives the results of started probes.
pub trait ProbeListener: Send + Sync + 'static {
    /// One attempt has landed. Called before the completion notification.
    fn on_attempt(&self, _id: ProbeId, _report: &AttemptReport) {}

    /// Called exactly once per probe that runs to completion.
    fn on_probe_completed(&self, id: ProbeId, result: ProbeResult);
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProbeEvent {
    Attempt(ProbeId, AttemptReport),
    Completed(ProbeId, ProbeResult),
}

impl ProbeListener for mpsc::UnboundedSender<ProbeEvent> {
    fn on_attempt(&self, id: ProbeId, report: &AttemptReport) {
        let _ = self.send(ProbeEvent::Attempt(id, report.clone()));
    }

    fn on_probe_completed(&self, id: ProbeId, result: ProbeResult) {
        let _ = self.send(ProbeEvent::Completed(id, result));
    }
}

#[derive(Debug, Clone)]
pub struct ProberConfig {
    pub connect_timeout: Duration,
}

impl ProberConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// Factory for probes sharing one resolver and connector.
#[derive(Debug)]
pub struct Prober<R = SystemResolver, C = TcpConnector> {
    resolver: Arc<R>,
    connector: Arc<C>,
}

impl Prober {
    pub fn new(config: ProberConfig) -> Self {
        Self::with_parts(SystemResolver, TcpConnector::new(config.connect_timeout))
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(ProberConfig::default())
    }
}

impl<R: Resolver, C: Connector> Prober<R, C> {
    pub fn with_parts(resolver: R, connector: C) -> Self {
        Self {
            resolver: Arc::new(resolver),
            connector: Arc::new(connector),
        }
    }

    /// Begin probing `request`; returns immediately.
    ///
    /// Literal hosts are resolved before this returns, so the handle
    /// already reports [`ProbeState::Probing`]. Must be called from within
    /// a tokio runtime.
    pub fn start<L: ProbeListener>(&self, request: ProbeRequest, listener: L) -> ProbeHandle {
        let (state, state_rx) = watch::channel(ProbeState::Created);
        let id = request.id;

        state.send_replace(ProbeState::Resolving);
        let literal = resolve::parse_literal(&request.host, request.port).ok();
        if let Some(target) = literal {
            debug!("probe {id}: {} is literal, skipping lookup", target.addr);
            state.send_replace(ProbeState::Probing);
        }

        let driver = Driver {
            request,
            resolver: Arc::clone(&self.resolver),
            connector: Arc::clone(&self.connector),
            listener,
            state,
        };
        let task = tokio::spawn(driver.run(literal)).abort_handle();

        ProbeHandle {
            id,
            state: state_rx,
            task: Some(task),
        }
    }
}

/// Caller's side of a running probe. Dropping it abandons the probe; use
/// [`ProbeHandle::detach`] to let it run to completion unattended.
#[derive(Debug)]
#[must_use = "dropping the handle abandons the probe"]
pub struct ProbeHandle {
    id: ProbeId,
    state: watch::Receiver<ProbeState>,
    task: Option<AbortHandle>,
}

impl ProbeHandle {
    pub fn id(&self) -> ProbeId {
        self.id
    }

    pub fn state(&self) -> ProbeState {
        *self.state.borrow()
    }

    /// Wait until the probe reaches [`ProbeState::Completed`].
    ///
    /// Returns `false` if the driver went away without completing.
    pub async fn completed(&mut self) -> bool {
        self.state
            .wait_for(|s| *s == ProbeState::Completed)
            .await
            .is_ok()
    }

    /// Let the probe run on its own; the listener is still notified once.
    pub fn detach(mut self) {
        self.task = None;
    }
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take().filter(|t| !t.is_finished()) {
            debug!("probe {} abandoned before completion", self.id);
            task.abort();
        }
    }
}

struct Driver<R, C, L> {
    request: ProbeRequest,
    resolver: Arc<R>,
    connector: Arc<C>,
    listener: L,
    state: watch::Sender<ProbeState>,
}

impl<R: Resolver, C: Connector, L: ProbeListener> Driver<R, C, L> {
    async fn run(self, literal: Option<ResolvedAddress>) {
        let ProbeRequest { id, host, port, count } = &self.request;
        let mut stats = Stats::new(*count);

        let target = match literal {
            Some(target) => Ok((target, Duration::ZERO)),
            None => {
                let t0 = Instant::now();
                resolve::resolve(&*self.resolver, host, *port)
                    .await
                    .map(|target| (target, t0.elapsed()))
            }
        };

        match target {
            Ok((target, resolve_time)) => {
                self.state.send_replace(ProbeState::Probing);
                stats = stats.with_target(target.addr, resolve_time);
                self.probe(target, &mut stats).await;
            }
            Err(err) => {
                warn!("probe {id}: {err}");
                stats.fail_all(err.to_string());
            }
        }

        let result = stats.finish();
        debug!(
            "probe {id}: {}/{} attempts succeeded",
            result.success_count, result.total_count
        );
        self.state.send_replace(ProbeState::Completed);
        self.listener.on_probe_completed(*id, result);
    }

    async fn probe(&self, target: ResolvedAddress, stats: &mut Stats) {
        let ProbeRequest { id, host, port, count } = &self.request;
        let addr = target.addr;
        let connector = &*self.connector;

        let mut attempts: FuturesUnordered<_> = (0..*count)
            .map(|seq| {
                stats.issue();
                async move { (seq, connector.connect(addr).await) }
            })
            .collect();

        while let Some((seq, res)) = attempts.next().await {
            let outcome = match res {
                Ok(rtt) => AttemptOutcome::Connected(rtt),
                Err(err) => {
                    warn!("error connecting to host: {host}:{port} {err}");
                    AttemptOutcome::Failed(err.to_string())
                }
            };
            self.listener
                .on_attempt(*id, &AttemptReport::new(seq, addr, &outcome));
            if stats.record(&outcome) {
                break;
            }
        }
    }
}
