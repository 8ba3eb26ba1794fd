//! Turn timer bookkeeping and the schedulers that fire it.
//!
//! The state machine never sleeps. It arms a [`TimeoutToken`] whenever a
//! player's turn starts and disarms it when the turn ends. A
//! [`TimeoutScheduler`] is responsible for delivering the token back after
//! the turn limit; whoever owns the scheduler makes sure only the currently
//! armed token is ever scheduled.

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::sleep,
};

use super::entities::{Phase, PlayerId};

/// Identifies one armed turn timer.
///
/// Tokens are never reused: every restart bumps the generation, so a token
/// that fires late no longer matches the armed one.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TimeoutToken {
    pub generation: u64,
    pub phase: Phase,
    pub player: PlayerId,
}

/// Countdown state for the current turn.
#[derive(Clone, Debug)]
pub struct TurnTimer {
    limit: Duration,
    generation: u64,
    armed: Option<TimeoutToken>,
    time_remaining: u32,
}

impl TurnTimer {
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            generation: 0,
            armed: None,
            time_remaining: whole_seconds(limit),
        }
    }

    /// A disarmed timer for the next game in the same session. Generations
    /// keep counting so no token from this game can match one from the next.
    #[must_use]
    pub fn for_next_game(&self) -> Self {
        Self {
            generation: self.generation,
            ..Self::new(self.limit)
        }
    }

    /// Arm a fresh timer for `player` in `phase`, replacing any armed one.
    pub fn restart(&mut self, phase: Phase, player: PlayerId) -> TimeoutToken {
        self.generation += 1;
        let token = TimeoutToken {
            generation: self.generation,
            phase,
            player,
        };
        self.armed = Some(token);
        self.time_remaining = whole_seconds(self.limit);
        token
    }

    /// Disarm without resetting the displayed countdown.
    pub fn stop(&mut self) {
        self.armed = None;
    }

    /// Count one second down. Expiry itself is the scheduler's job.
    pub fn tick(&mut self) {
        if self.armed.is_some() {
            self.time_remaining = self.time_remaining.saturating_sub(1);
        }
    }

    #[must_use]
    pub fn armed(&self) -> Option<TimeoutToken> {
        self.armed
    }

    #[must_use]
    pub fn is_current(&self, token: &TimeoutToken) -> bool {
        self.armed.as_ref() == Some(token)
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }
}

fn whole_seconds(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs()).unwrap_or(u32::MAX)
}

/// Handle to a scheduled timeout, used to cancel it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerHandle(u64);

/// Something that can deliver a token back after a delay.
pub trait TimeoutScheduler {
    fn schedule(&mut self, after: Duration, token: TimeoutToken) -> TimerHandle;

    /// Cancel a scheduled timeout. Cancelling one that already fired is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Deterministic scheduler driven by an explicit clock. Used by tests and
/// by drivers that step time themselves.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerHandle, (Duration, TimeoutToken)>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and return every token that came due, in
    /// deadline order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimeoutToken> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<_> = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(handle, (deadline, token))| (*deadline, *handle, *token))
            .collect();
        due.sort_by_key(|(deadline, handle, _)| (*deadline, *handle));
        for (_, handle, _) in &due {
            self.pending.remove(handle);
        }
        due.into_iter().map(|(_, _, token)| token).collect()
    }

    /// Number of timeouts scheduled and not yet fired or cancelled.
    #[must_use]
    pub fn active(&self) -> usize {
        self.pending.len()
    }

    /// Time elapsed on this scheduler's clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }
}

impl TimeoutScheduler for ManualScheduler {
    fn schedule(&mut self, after: Duration, token: TimeoutToken) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle, (self.now + after, token));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.remove(&handle);
    }
}

/// Scheduler backed by tokio timers. Fired tokens arrive on the receiver
/// returned from [`TokioScheduler::new`].
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    sender: mpsc::Sender<TimeoutToken>,
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<TimeoutToken>) {
        let (sender, receiver) = mpsc::channel(8);
        let scheduler = Self {
            sender,
            next_id: 0,
            tasks: HashMap::new(),
        };
        (scheduler, receiver)
    }

    /// Number of timer tasks that are still waiting to fire.
    #[must_use]
    pub fn active(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl TimeoutScheduler for TokioScheduler {
    fn schedule(&mut self, after: Duration, token: TimeoutToken) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            sleep(after).await;
            if sender.send(token).await.is_err() {
                log::debug!("Timeout {token:?} fired after its session closed");
            }
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
