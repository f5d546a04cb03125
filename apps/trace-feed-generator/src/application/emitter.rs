//! The generation loop: pacing, pairing, and record fan-out.
//!
//! [`TradeEmitter`] owns one side of the system: it asks the schedule for
//! the current cycle, generates records (optionally paired), serializes
//! each one once, and fans the line out to every configured sink. Records
//! bound for the TCP feed are additionally cloned into the shared
//! delivery queue, where the server drains them on its own clock.
//!
//! Sink failures stop the loop; queue delivery is best-effort and never
//! does. Shutdown is observed at cycle boundaries and inside every sleep,
//! so no record is ever left half-emitted.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::pairing::PairPolicy;
use crate::application::ports::{RecordSink, SinkError};
use crate::application::queue::FeedQueue;
use crate::application::scheduler::{Cycle, EmitSchedule, pair_delay};
use crate::domain::trade::{TradeOverrides, TradeRecord};

/// Tunables for the generation loop.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Steady-state records per second.
    pub rate: f64,
    /// Uniform jitter applied to the steady interval, as a fraction of it.
    pub rate_jitter: f64,
    /// Whether opposite-side pair legs are generated.
    pub pairs: bool,
    /// Chance of a pair leg per primary record, when pairs are enabled.
    pub pair_probability: f64,
    /// Records per burst; zero disables bursting.
    pub burst_size: u32,
    /// Time between bursts.
    pub burst_interval: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            rate_jitter: 0.0,
            pairs: false,
            pair_probability: 0.3,
            burst_size: 0,
            burst_interval: Duration::from_secs(60),
        }
    }
}

/// Errors that stop the generation loop.
#[derive(Debug, Error)]
pub enum EmitError {
    /// A record failed to serialize.
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A sink append failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// The generation loop.
pub struct TradeEmitter {
    schedule: EmitSchedule,
    pairing: Option<PairPolicy>,
    sinks: Vec<Box<dyn RecordSink>>,
    queue: Option<Arc<FeedQueue>>,
    shutdown: CancellationToken,
    rng: StdRng,
}

impl TradeEmitter {
    /// Assembles the loop from its collaborators. The queue is present
    /// only when TCP delivery is enabled.
    #[must_use]
    pub fn new(
        config: &EmitterConfig,
        sinks: Vec<Box<dyn RecordSink>>,
        queue: Option<Arc<FeedQueue>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            schedule: EmitSchedule::new(
                config.rate,
                config.rate_jitter,
                config.burst_size,
                config.burst_interval,
            ),
            pairing: config.pairs.then(|| PairPolicy::new(config.pair_probability)),
            sinks,
            queue,
            shutdown,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Runs until shutdown is signaled or a sink fails.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError`] when serialization or a sink append fails;
    /// generation stops rather than drop records silently.
    pub async fn run(mut self) -> Result<(), EmitError> {
        loop {
            if self.shutdown.is_cancelled() {
                info!("Feed generation stopped");
                return Ok(());
            }

            match self.schedule.next_cycle(Instant::now()) {
                Cycle::Burst(count) => self.emit_burst(count)?,
                Cycle::Steady => self.emit_steady().await?,
            }
        }
    }

    /// Emits a burst back-to-back: no pair delays, no trailing sleep.
    fn emit_burst(&mut self, count: u32) -> Result<(), EmitError> {
        info!(count, "Emitting burst");
        for _ in 0..count {
            let record = TradeRecord::generate(TradeOverrides::default(), &mut self.rng);
            let pair = self.maybe_pair(&record);
            self.emit(&record)?;
            if let Some(pair) = pair {
                self.emit(&pair)?;
            }
        }
        Ok(())
    }

    /// Emits one record, then its pair leg after a short delay, then
    /// sleeps the jittered steady interval.
    async fn emit_steady(&mut self) -> Result<(), EmitError> {
        let record = TradeRecord::generate(TradeOverrides::default(), &mut self.rng);
        self.emit(&record)?;

        if let Some(pair) = self.maybe_pair(&record) {
            // Pair legs trail their primary by a beat, like two dealers
            // filing the same execution. A shutdown during the delay
            // drops the un-emitted leg whole.
            let delay = pair_delay(&mut self.rng);
            tokio::select! {
                () = self.shutdown.cancelled() => return Ok(()),
                () = tokio::time::sleep(delay) => {}
            }
            self.emit(&pair)?;
        }

        let sleep = self.schedule.steady_sleep(&mut self.rng);
        tokio::select! {
            () = self.shutdown.cancelled() => {}
            () = tokio::time::sleep(sleep) => {}
        }
        Ok(())
    }

    fn maybe_pair(&mut self, first: &TradeRecord) -> Option<TradeRecord> {
        let policy = self.pairing?;
        policy.maybe_pair(first, &mut self.rng)
    }

    /// Serializes once, fans the line out to every sink, and clones the
    /// record into the delivery queue when one is attached.
    fn emit(&mut self, record: &TradeRecord) -> Result<(), EmitError> {
        let line = serde_json::to_string(record)?;
        for sink in &mut self.sinks {
            sink.append(&line)?;
        }
        if let Some(queue) = &self.queue {
            queue.enqueue(record.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sink::MemorySink;

    fn emitter_with(
        config: &EmitterConfig,
        queue: Option<Arc<FeedQueue>>,
        shutdown: CancellationToken,
    ) -> (TradeEmitter, MemorySink) {
        let sink = MemorySink::default();
        let view = sink.clone();
        let emitter = TradeEmitter::new(config, vec![Box::new(sink)], queue, shutdown);
        (emitter, view)
    }

    #[tokio::test]
    async fn run_exits_immediately_when_already_cancelled() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let (emitter, view) = emitter_with(&EmitterConfig::default(), None, shutdown);

        emitter.run().await.unwrap();
        assert!(view.lines().is_empty());
    }

    #[tokio::test]
    async fn run_emits_valid_json_until_cancelled() {
        let shutdown = CancellationToken::new();
        let config = EmitterConfig {
            rate: 100.0,
            ..EmitterConfig::default()
        };
        let (emitter, view) = emitter_with(&config, None, shutdown.clone());

        let handle = tokio::spawn(emitter.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap().unwrap();

        let lines = view.lines();
        assert!(!lines.is_empty());
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value["control_id"].is_string());
        }
    }

    #[tokio::test]
    async fn emitted_records_reach_sinks_and_queue() {
        let shutdown = CancellationToken::new();
        let queue = Arc::new(FeedQueue::new());
        let config = EmitterConfig {
            rate: 200.0,
            ..EmitterConfig::default()
        };
        let (emitter, view) = emitter_with(&config, Some(Arc::clone(&queue)), shutdown.clone());

        let handle = tokio::spawn(emitter.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap().unwrap();

        let lines = view.lines();
        assert!(!lines.is_empty());
        assert_eq!(queue.len(), lines.len());

        // Queue order matches sink order.
        for line in &lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            let queued = queue.dequeue().unwrap();
            assert_eq!(value["control_id"].as_str().unwrap(), queued.control_id);
        }
    }

    #[tokio::test]
    async fn pairs_disabled_emits_unique_control_ids() {
        let shutdown = CancellationToken::new();
        let config = EmitterConfig {
            rate: 200.0,
            pairs: false,
            ..EmitterConfig::default()
        };
        let (emitter, view) = emitter_with(&config, None, shutdown.clone());

        let handle = tokio::spawn(emitter.run());
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap().unwrap();

        let lines = view.lines();
        let ids: std::collections::HashSet<String> = lines
            .iter()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["control_id"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(ids.len(), lines.len());
    }
}
