//! timbrado 状态轮询
//!
//! Follows an invoice through PAC stamping until a terminal status shows up.
//!
//! One poll at a time: [`StatusPoller::start`] cancels whatever was running.
//! Dropping the poller cancels the task, so no timer outlives its owner.
//! Failed checks are ignored and retried on the next tick.

use shared::TimbradoStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ClientConfig;
use crate::config::MIN_POLL_INTERVAL;
use crate::api::StampStatusSource;

/// Snapshot published to observers after every check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Incremented on every `start`; stale tasks never publish
    pub generation: u64,
    pub uuid: Option<String>,
    /// Text shown to the user, e.g. "4 - EN PROCESO"
    pub display: Option<String>,
    pub status: Option<TimbradoStatus>,
    pub attempts: u32,
    pub finished: bool,
}

/// How a poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Terminal(TimbradoStatus),
    /// Attempt bound reached without a terminal status
    Exhausted { attempts: u32 },
    Cancelled,
}

struct ActivePoll {
    uuid: String,
    cancel: CancellationToken,
    handle: JoinHandle<PollOutcome>,
}

/// Supervised stamping status poller
pub struct StatusPoller {
    source: Arc<dyn StampStatusSource>,
    interval: Duration,
    max_attempts: Option<u32>,
    state_tx: watch::Sender<PollState>,
    active: Option<ActivePoll>,
}

impl StatusPoller {
    pub fn new(
        source: Arc<dyn StampStatusSource>,
        interval: Duration,
        max_attempts: Option<u32>,
    ) -> Self {
        let (state_tx, _) = watch::channel(PollState::default());
        Self {
            source,
            // tokio intervals panic on a zero period
            interval: interval.max(MIN_POLL_INTERVAL),
            max_attempts,
            state_tx,
            active: None,
        }
    }

    pub fn from_config(source: Arc<dyn StampStatusSource>, config: &ClientConfig) -> Self {
        Self::new(source, config.poll_interval, config.poll_max_attempts)
    }

    /// Receive every published [`PollState`]
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> PollState {
        self.state_tx.borrow().clone()
    }

    /// Display text of the last observed status
    pub fn display(&self) -> Option<String> {
        self.state_tx.borrow().display.clone()
    }

    /// UUID being polled, if a poll is still running
    pub fn current_uuid(&self) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|a| !a.handle.is_finished())
            .map(|a| a.uuid.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.current_uuid().is_some()
    }

    /// Start polling `uuid`, cancelling any poll in progress
    pub fn start(&mut self, uuid: impl Into<String>) {
        self.stop();

        let uuid = uuid.into();
        let generation = self.state_tx.borrow().generation + 1;
        self.state_tx.send_replace(PollState {
            generation,
            uuid: Some(uuid.clone()),
            ..Default::default()
        });

        let cancel = CancellationToken::new();
        let task = PollTask {
            source: self.source.clone(),
            uuid: uuid.clone(),
            generation,
            interval: self.interval,
            max_attempts: self.max_attempts,
            cancel: cancel.clone(),
            state_tx: self.state_tx.clone(),
        };
        let handle = tokio::spawn(task.run());

        tracing::debug!(uuid = %uuid, generation, "Stamp status polling started");
        self.active = Some(ActivePoll {
            uuid,
            cancel,
            handle,
        });
    }

    /// Cancel the running poll, if any
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            tracing::debug!(uuid = %active.uuid, "Stamp status polling stopped");
        }
    }

    /// Wait for the running poll to end
    ///
    /// Returns `None` when nothing was started (or it was stopped).
    pub async fn wait(&mut self) -> Option<PollOutcome> {
        let active = self.active.take()?;
        match active.handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(uuid = %active.uuid, error = %e, "Stamp status task failed");
                Some(PollOutcome::Cancelled)
            }
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

struct PollTask {
    source: Arc<dyn StampStatusSource>,
    uuid: String,
    generation: u64,
    interval: Duration,
    max_attempts: Option<u32>,
    cancel: CancellationToken,
    state_tx: watch::Sender<PollState>,
}

impl PollTask {
    /// Publish only while this task is still the current generation
    fn publish(&self, update: impl FnOnce(&mut PollState)) {
        self.state_tx.send_if_modified(|state| {
            if state.generation != self.generation || self.cancel.is_cancelled() {
                return false;
            }
            update(state);
            true
        });
    }

    async fn run(self) -> PollOutcome {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return PollOutcome::Cancelled,
                r = self.source.stamp_status(&self.uuid) => r,
            };

            match result {
                Ok(resp) => match resp.timbrado() {
                    Some(status) => {
                        let shown = status.display_with(resp.descripcion.as_deref());
                        let terminal = status.is_terminal();
                        tracing::debug!(uuid = %self.uuid, status = %shown, attempts, "Stamp status");
                        self.publish(|s| {
                            s.display = Some(shown);
                            s.status = Some(status.clone());
                            s.attempts = attempts;
                            s.finished = terminal;
                        });
                        if terminal {
                            tracing::info!(uuid = %self.uuid, status = %status, attempts, "Stamping reached a final status");
                            return PollOutcome::Terminal(status);
                        }
                    }
                    None => {
                        tracing::debug!(uuid = %self.uuid, attempts, "Stamp status response without code");
                        self.publish(|s| s.attempts = attempts);
                    }
                },
                Err(e) => {
                    tracing::debug!(uuid = %self.uuid, error = %e, attempts, "Stamp status check failed, retrying on next tick");
                    self.publish(|s| s.attempts = attempts);
                }
            }

            if self.max_attempts.is_some_and(|max| attempts >= max) {
                tracing::warn!(uuid = %self.uuid, attempts, "Stamp status polling gave up without a final status");
                self.publish(|s| s.finished = true);
                return PollOutcome::Exhausted { attempts };
            }
        }
    }
}
