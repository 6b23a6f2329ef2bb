//! Built-in scheduler for the long-running hosting model.
//!
//! # Responsibilities
//! - Fire one invocation per target every [`PING_INTERVAL`]
//! - Keep targets independent: one ticker task per target, one spawned task
//!   per invocation
//! - Route failed invocations to the dead-letter queue
//! - Stop firing on shutdown, let in-flight invocations finish

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

use crate::invocation::{Handler, InvocationError, InvocationReport};
use crate::lifecycle::dead_letter::{DeadLetter, DeadLetterQueue};
use crate::lifecycle::shutdown::Shutdown;
use crate::probe::TargetDescriptor;

/// Cadence for every target.
pub const PING_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct Scheduler {
    handler: Handler,
    targets: Vec<TargetDescriptor>,
    interval: Duration,
    dead_letters: Arc<DeadLetterQueue>,
}

impl Scheduler {
    pub fn new(handler: Handler, targets: Vec<TargetDescriptor>, dead_letters: Arc<DeadLetterQueue>) -> Self {
        Self {
            handler,
            targets,
            interval: PING_INTERVAL,
            dead_letters,
        }
    }

    /// Override the cadence. Intended for tests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn targets(&self) -> &[TargetDescriptor] {
        &self.targets
    }

    /// Fire every target once, concurrently, and wait for all of them.
    pub async fn run_once(&self) -> Vec<Result<InvocationReport, InvocationError>> {
        let invocations = self.targets.iter().map(|target| {
            let handler = &self.handler;
            let dead_letters = &self.dead_letters;
            async move {
                let outcome = handler.handle(target).await;
                if let Err(e) = &outcome {
                    dead_letters.push(DeadLetter::new(target.clone(), e));
                }
                outcome
            }
        });
        join_all(invocations).await
    }

    /// Run until `shutdown` is triggered.
    ///
    /// Every ticker subscribes before this returns, so a trigger fired before
    /// the future is first polled still stops it.
    pub fn run(self, shutdown: &Shutdown) -> impl Future<Output = ()> + Send + 'static {
        let receivers: Vec<_> = self.targets.iter().map(|_| shutdown.subscribe()).collect();

        async move {
            tracing::info!(
                targets = self.targets.len(),
                interval_secs = self.interval.as_secs(),
                "Scheduler starting"
            );

            let mut tickers = JoinSet::new();
            for (target, receiver) in self.targets.into_iter().zip(receivers) {
                tickers.spawn(run_target(
                    self.handler.clone(),
                    target,
                    self.interval,
                    self.dead_letters.clone(),
                    receiver,
                ));
            }

            while let Some(joined) = tickers.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Target ticker task failed");
                }
            }

            tracing::info!("Scheduler stopped");
        }
    }
}

async fn run_target(
    handler: Handler,
    target: TargetDescriptor,
    interval: Duration,
    dead_letters: Arc<DeadLetterQueue>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.recv() => {
                tracing::info!(target_name = %target.name(), "Ticker received shutdown signal, exiting loop");
                break;
            }
            _ = ticker.tick() => {
                let handler = handler.clone();
                let target = target.clone();
                let dead_letters = dead_letters.clone();
                in_flight.spawn(async move {
                    if let Err(e) = handler.handle(&target).await {
                        dead_letters.push(DeadLetter::new(target, &e));
                    }
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(target_name = %target.name(), error = %e, "Invocation task panicked");
                }
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!(target_name = %target.name(), error = %e, "Invocation task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{MemoryBackend, MemorySink};

    #[test]
    fn test_default_interval_is_five_minutes() {
        let handler = Handler::new(Arc::new(MemoryBackend::new()), Arc::new(MemorySink::new()));
        let scheduler = Scheduler::new(handler, Vec::new(), Arc::new(DeadLetterQueue::new(1)));
        assert_eq!(scheduler.interval, Duration::from_secs(300));
        assert!(scheduler.targets().is_empty());
    }

    #[tokio::test]
    async fn test_trigger_before_first_poll_stops_scheduler() {
        let backend = MemoryBackend::new();
        let sink = MemorySink::new();
        let handler = Handler::new(Arc::new(backend.clone()), Arc::new(sink.clone()));
        let target = TargetDescriptor::new("kraken", "http://127.0.0.1:9/0/public/Time", "devo").unwrap();
        let scheduler = Scheduler::new(handler, vec![target], Arc::new(DeadLetterQueue::new(1)))
            .with_interval(Duration::from_millis(10));

        let shutdown = Shutdown::new();
        let running = scheduler.run(&shutdown);
        assert_eq!(shutdown.receiver_count(), 1);
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("scheduler ignored an early shutdown");
        assert!(sink.lines().is_empty());
        assert!(backend.is_empty());
    }
}
