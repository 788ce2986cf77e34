use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::instrument;

use crate::domain::models::CallId;

use super::{SearchPoller, TickOutcome};

#[derive(Debug, Clone)]
pub enum PollerMessage {
    Stop,
}

struct PollerHandle {
    generation: u64,
    sender: mpsc::Sender<PollerMessage>,
}

/// Owns the periodic polling tasks, at most one per call id.
///
/// Starting a poller for a call id that already has one stops the old task first.
#[derive(Clone)]
pub struct PollingScheduler {
    interval: Duration,
    pollers: Arc<Mutex<HashMap<CallId, PollerHandle>>>,
    generations: Arc<AtomicU64>,
}

impl PollingScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pollers: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Spawns the polling task. The first poll happens one interval from now.
    #[instrument(name = "PollingScheduler::start", skip(self, poller), fields(call_id = %poller.call_id()))]
    pub async fn start(&self, poller: SearchPoller) -> JoinHandle<TickOutcome> {
        let call_id = poller.call_id().clone();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(1);

        {
            let mut pollers = self.pollers.lock().await;
            if let Some(previous) = pollers.insert(call_id.clone(), PollerHandle { generation, sender }) {
                tracing::debug!("Replacing active poller for {}", call_id);
                let _ = previous.sender.try_send(PollerMessage::Stop);
            }
        }

        let scheduler = self.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let outcome = run(poller, receiver, interval).await;
            scheduler.release(&call_id, generation).await;
            outcome
        })
    }

    /// Stops the poller for `call_id`. Returns `false` if none was running.
    pub async fn cancel(&self, call_id: &CallId) -> bool {
        match self.pollers.lock().await.remove(call_id) {
            Some(handle) => {
                tracing::debug!("Cancelling poller for {}", call_id);
                let _ = handle.sender.try_send(PollerMessage::Stop);
                true
            }
            None => false,
        }
    }

    pub async fn is_active(&self, call_id: &CallId) -> bool {
        self.pollers.lock().await.contains_key(call_id)
    }

    pub async fn active_count(&self) -> usize {
        self.pollers.lock().await.len()
    }

    /// Drops the registration, unless a newer poller has taken over the call id.
    async fn release(&self, call_id: &CallId, generation: u64) {
        let mut pollers = self.pollers.lock().await;
        if pollers
            .get(call_id)
            .is_some_and(|handle| handle.generation == generation)
        {
            pollers.remove(call_id);
        }
    }
}

#[instrument(name = "SearchPoller::run", skip_all, fields(call_id = %poller.call_id()))]
async fn run(
    mut poller: SearchPoller,
    mut receiver: mpsc::Receiver<PollerMessage>,
    period: Duration,
) -> TickOutcome {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            message = receiver.recv() => {
                // A closed channel means the registration was dropped.
                if matches!(message, Some(PollerMessage::Stop) | None) {
                    tracing::debug!("Stopping poller");
                    return TickOutcome::Detached;
                }
            }
            _ = ticker.tick() => {
                let outcome = poller.tick().await;
                if outcome.is_final() {
                    tracing::debug!("Poller finished: {:?}", outcome);
                    return outcome;
                }
            }
        }
    }
}
