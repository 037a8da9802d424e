//! Fixed-cadence refresh timers.
//!
//! The scheduler owns two timers, a fetch timer and a one-unit countdown
//! timer. Both are armed together for a fetch descriptor and torn down
//! together by [`PollingScheduler::reconfigure`] or
//! [`PollingScheduler::cancel`]. Timer events are tagged with the arming
//! generation so anything emitted by a torn-down pair is ignored.

use crate::api::FetchRequest;
use crate::config::PollingConfig;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Timer output delivered to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// The fetch interval elapsed.
    FetchDue { generation: u64 },
    /// One countdown unit elapsed.
    CountdownTick { generation: u64 },
}

impl SchedulerEvent {
    fn generation(self) -> u64 {
        match self {
            Self::FetchDue { generation } | Self::CountdownTick { generation } => generation,
        }
    }
}

struct TimerPair {
    fetch: JoinHandle<()>,
    countdown: JoinHandle<()>,
}

impl TimerPair {
    fn abort(self) {
        self.fetch.abort();
        self.countdown.abort();
    }
}

/// Drives periodic fetches and the visible countdown.
pub struct PollingScheduler {
    fetch_interval: Duration,
    countdown_tick: Duration,
    countdown_start: u64,
    event_tx: mpsc::UnboundedSender<SchedulerEvent>,
    timers: Option<TimerPair>,
    armed_for: Option<FetchRequest>,
    generation: u64,
    countdown: u64,
}

impl PollingScheduler {
    /// Create an unarmed scheduler sending events to `event_tx`.
    pub fn new(config: &PollingConfig, event_tx: mpsc::UnboundedSender<SchedulerEvent>) -> Self {
        let fetch_interval = config.refresh_interval().max(Duration::from_millis(1));
        let countdown_tick = config.countdown_tick().max(Duration::from_millis(1));
        let countdown_start =
            (fetch_interval.as_millis() / countdown_tick.as_millis()).max(1) as u64;

        Self {
            fetch_interval,
            countdown_tick,
            countdown_start,
            event_tx,
            timers: None,
            armed_for: None,
            generation: 0,
            countdown: countdown_start,
        }
    }

    /// Cancel both timers and re-arm them at full value for `request`.
    pub fn reconfigure(&mut self, request: FetchRequest) {
        self.cancel();

        self.generation += 1;
        self.countdown = self.countdown_start;
        debug!(
            generation = self.generation,
            category = %request.category,
            page = request.page,
            "Arming refresh timers"
        );
        self.armed_for = Some(request);
        self.timers = Some(self.arm());
    }

    /// Cancel both timers without re-arming.
    pub fn cancel(&mut self) {
        if let Some(timers) = self.timers.take() {
            timers.abort();
        }
        self.armed_for = None;
    }

    /// Apply a timer event. Returns the descriptor to fetch when the fetch
    /// timer fired for the current arming.
    pub fn handle(&mut self, event: SchedulerEvent) -> Option<FetchRequest> {
        if event.generation() != self.generation || self.timers.is_none() {
            debug!(
                event_generation = event.generation(),
                generation = self.generation,
                "Ignoring event from cancelled timers"
            );
            return None;
        }

        match event {
            SchedulerEvent::CountdownTick { .. } => {
                self.countdown = self.countdown.saturating_sub(1);
                None
            }
            SchedulerEvent::FetchDue { .. } => {
                self.countdown = self.countdown_start;
                self.armed_for.clone()
            }
        }
    }

    /// Units remaining until the next scheduled fetch.
    pub fn countdown(&self) -> u64 {
        self.countdown
    }

    /// Full countdown value.
    pub fn countdown_start(&self) -> u64 {
        self.countdown_start
    }

    /// Current arming generation (0 before the first arming).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Descriptor the timers are armed for.
    pub fn armed_for(&self) -> Option<&FetchRequest> {
        self.armed_for.as_ref()
    }

    /// Whether timers are running.
    pub fn is_armed(&self) -> bool {
        self.timers.is_some()
    }

    fn arm(&self) -> TimerPair {
        let generation = self.generation;
        TimerPair {
            fetch: spawn_timer(
                self.fetch_interval,
                self.event_tx.clone(),
                SchedulerEvent::FetchDue { generation },
            ),
            countdown: spawn_timer(
                self.countdown_tick,
                self.event_tx.clone(),
                SchedulerEvent::CountdownTick { generation },
            ),
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Emit `event` every `period`, first one period from now, until the
/// receiver is gone or the task is aborted.
fn spawn_timer(
    period: Duration,
    tx: mpsc::UnboundedSender<SchedulerEvent>,
    event: SchedulerEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if tx.send(event).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Category, build_request};

    fn scheduler() -> (PollingScheduler, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PollingScheduler::new(&PollingConfig::default(), tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SchedulerEvent>) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_fire_at_cadence() {
        let (mut scheduler, mut rx) = scheduler();
        let request = build_request(Category::All, 1);
        scheduler.reconfigure(request.clone());
        assert_eq!(scheduler.countdown(), 15);

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        for event in drain(&mut rx) {
            assert_eq!(scheduler.handle(event), None);
        }
        assert_eq!(scheduler.countdown(), 10);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        let events = drain(&mut rx);
        let due = events
            .iter()
            .filter(|e| matches!(e, SchedulerEvent::FetchDue { .. }))
            .count();
        let ticks = events.len() - due;
        assert_eq!(due, 1);
        assert_eq!(ticks, 10);

        let fetches: Vec<_> = events
            .into_iter()
            .filter_map(|e| scheduler.handle(e))
            .collect();
        assert_eq!(fetches, vec![request]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_floors_at_zero() {
        let (mut scheduler, _rx) = scheduler();
        scheduler.reconfigure(build_request(Category::All, 1));
        let generation = scheduler.generation();

        for _ in 0..20 {
            scheduler.handle(SchedulerEvent::CountdownTick { generation });
        }
        assert_eq!(scheduler.countdown(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_resets_and_ignores_old_timers() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.reconfigure(build_request(Category::All, 1));

        tokio::time::sleep(Duration::from_millis(14_500)).await;
        let stale = drain(&mut rx);
        assert!(!stale.is_empty());

        let gainers = build_request(Category::Gainers, 1);
        scheduler.reconfigure(gainers.clone());
        assert_eq!(scheduler.countdown(), 15);
        assert_eq!(scheduler.armed_for(), Some(&gainers));

        for event in stale {
            assert_eq!(scheduler.handle(event), None);
        }
        assert_eq!(scheduler.countdown(), 15);

        // The old fetch timer would have fired at 15s; only the new pair runs.
        tokio::time::sleep(Duration::from_millis(15_500)).await;
        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.generation() == scheduler.generation()));
        let fetches: Vec<_> = events
            .into_iter()
            .filter_map(|e| scheduler.handle(e))
            .collect();
        assert_eq!(fetches, vec![gainers]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_events() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.reconfigure(build_request(Category::All, 1));
        scheduler.cancel();
        assert!(!scheduler.is_armed());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(drain(&mut rx).is_empty());
    }
}
