//! The single-writer scheduler actor.
//!
//! One task owns the [`Engine`] and is the only thing that ever mutates the
//! mind. It wakes for four reasons: the cycle timer, a patch from a
//! background aside, the one-shot dream revert, or a command from the
//! handle. Every wake ends with a fresh snapshot on the watch channel.

use crate::engine::Engine;
use crate::mind::MindSnapshot;
use anyhow::{anyhow, Context, Result};
use reverie_core::KvStore;
use reverie_limbic::TickConfig;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

/// Late result of an aside, applied by the actor when it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    Intuition(String),
    OtherVoice(String),
}

#[derive(Debug)]
enum Command {
    SetRealFeed(bool),
    Shutdown,
}

pub struct Scheduler {
    engine: Engine,
    config: TickConfig,
    store: Option<Arc<dyn KvStore>>,
    max_cycles: Option<u64>,
}

impl Scheduler {
    pub fn new(engine: Engine, config: TickConfig) -> Self {
        Self {
            engine,
            config,
            store: None,
            max_cycles: None,
        }
    }

    /// Save the mind after every cycle and on exit.
    pub fn with_store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Stop on its own after `n` cycles.
    pub fn with_max_cycles(mut self, n: u64) -> Self {
        self.max_cycles = Some(n);
        self
    }

    pub fn spawn(self) -> SchedulerHandle {
        let (command_tx, command_rx) = mpsc::channel(8);
        let (snapshot_tx, snapshot_rx) = watch::channel(self.engine.snapshot());
        let task = tokio::spawn(self.run(command_rx, snapshot_tx));
        SchedulerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        snapshots: watch::Sender<MindSnapshot>,
    ) -> Engine {
        let (patch_tx, mut patch_rx) = mpsc::channel::<Patch>(32);
        let period = self.config.interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut revert_at: Option<Instant> = None;

        tracing::info!("Scheduler started: one cycle every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.engine.tick().await;
                    if report.dream_started {
                        revert_at = Some(Instant::now() + self.config.dream_revert);
                    }
                    for aside in report.asides {
                        let generator = self.engine.generator();
                        let tx = patch_tx.clone();
                        tokio::spawn(async move {
                            let patch = aside.resolve(generator.as_ref()).await;
                            // The actor may be gone by now; the patch is simply dropped.
                            let _ = tx.send(patch).await;
                        });
                    }
                    self.persist().await;
                    let _ = snapshots.send(self.engine.snapshot());

                    if self.max_cycles.is_some_and(|n| self.engine.cycles() >= n) {
                        tracing::info!("Cycle limit reached");
                        break;
                    }
                }

                Some(patch) = patch_rx.recv() => {
                    self.engine.apply_patch(patch);
                    let _ = snapshots.send(self.engine.snapshot());
                }

                _ = sleep_until(revert_at.unwrap_or_else(Instant::now)), if revert_at.is_some() => {
                    revert_at = None;
                    self.engine.revert_dream();
                    let _ = snapshots.send(self.engine.snapshot());
                }

                command = commands.recv() => match command {
                    Some(Command::SetRealFeed(on)) => {
                        self.engine.set_real_feed(on);
                        let _ = snapshots.send(self.engine.snapshot());
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        if revert_at.is_some() {
            tracing::debug!("Pending dream revert dropped");
        }
        self.persist().await;
        tracing::info!("Scheduler stopped after {} cycles", self.engine.cycles());
        self.engine
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = self.engine.mind().save(store.as_ref()).await {
            tracing::warn!("Failed to save mind: {:#}", e);
        }
    }
}

/// Control surface of a running scheduler.
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<MindSnapshot>,
    task: JoinHandle<Engine>,
}

impl SchedulerHandle {
    pub fn subscribe(&self) -> watch::Receiver<MindSnapshot> {
        self.snapshots.clone()
    }

    pub async fn set_real_feed(&self, on: bool) -> Result<()> {
        self.commands
            .send(Command::SetRealFeed(on))
            .await
            .map_err(|_| anyhow!("Scheduler has stopped"))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the timers and wait for the actor to hand back the engine.
    pub async fn shutdown(self) -> Result<Engine> {
        // Already stopped on its own if this fails.
        let _ = self.commands.send(Command::Shutdown).await;
        self.join().await
    }

    /// Wait for the actor to exit on its own.
    pub async fn join(self) -> Result<Engine> {
        self.task.await.context("Scheduler task panicked")
    }
}
