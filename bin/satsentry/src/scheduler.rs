//! Timing of the monitoring passes.
//!
//! The [`Scheduler`] is a plain state machine driven with explicit instants; [`run`] owns one and
//! drives it from a command channel and a timer.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerState {
    Idle,
    Running,

    /// Holds the time that was left until the next pass when paused.
    Paused { remaining: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerCommand {
    Pause,
    Resume,
    CheckNow,
    Stop,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    state: SchedulerState,
    interval: Duration,
    checking: bool,
    last_check: Option<DateTime<Utc>>,
    next_check: Option<Instant>,
}

impl Scheduler {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval,
            checking: false,
            last_check: None,
            next_check: None,
        }
    }

    pub(crate) fn state(&self) -> SchedulerState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn is_checking(&self) -> bool {
        self.checking
    }

    pub(crate) fn last_check(&self) -> Option<DateTime<Utc>> {
        self.last_check
    }

    /// Starts the schedule with the first pass due immediately.
    pub(crate) fn start(&mut self, now: Instant) -> bool {
        if self.state != SchedulerState::Idle {
            return false;
        }
        self.state = SchedulerState::Running;
        self.next_check = Some(now);
        true
    }

    pub(crate) fn pause(&mut self, now: Instant) -> bool {
        if self.state != SchedulerState::Running {
            return false;
        }
        let remaining = self
            .next_check
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or_default();
        self.state = SchedulerState::Paused { remaining };
        self.next_check = None;
        true
    }

    /// Continues the schedule with the time that was left when it was paused.
    pub(crate) fn resume(&mut self, now: Instant) -> bool {
        let SchedulerState::Paused { remaining } = self.state else {
            return false;
        };
        self.state = SchedulerState::Running;
        self.next_check = Some(now + remaining);
        true
    }

    /// Makes the next pass due immediately. Ignored unless running.
    pub(crate) fn check_now(&mut self, now: Instant) -> bool {
        if self.state != SchedulerState::Running {
            return false;
        }
        self.next_check = Some(now);
        true
    }

    pub(crate) fn stop(&mut self) {
        self.state = SchedulerState::Idle;
        self.next_check = None;
    }

    /// When the next pass is due, or `None` while not running.
    pub(crate) fn next_check(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Running => self.next_check,
            _ => None,
        }
    }

    pub(crate) fn is_due(&self, now: Instant) -> bool {
        !self.checking && self.next_check().is_some_and(|next| next <= now)
    }

    pub(crate) fn begin_check(&mut self, at: DateTime<Utc>) {
        self.checking = true;
        self.last_check = Some(at);
    }

    /// Schedules the following pass a full interval after this one completed.
    pub(crate) fn finish_check(&mut self, now: Instant) {
        self.checking = false;
        if self.state == SchedulerState::Running {
            self.next_check = Some(now + self.interval);
        }
    }

    /// Applies `command` and returns whether the loop should keep going.
    pub(crate) fn apply(&mut self, command: SchedulerCommand, now: Instant) -> bool {
        let changed = match command {
            SchedulerCommand::Pause => self.pause(now),
            SchedulerCommand::Resume => self.resume(now),
            SchedulerCommand::CheckNow => self.check_now(now),
            SchedulerCommand::Stop => {
                self.stop();
                return false;
            }
        };

        if changed {
            info!(?command, state = ?self.state, "scheduler command applied");
        } else {
            warn!(?command, state = ?self.state, "scheduler command ignored");
        }
        true
    }
}

/// Drives `scheduler` until [`SchedulerCommand::Stop`] arrives or every sender is dropped.
///
/// Commands are only read between passes; a pass in progress always runs to completion.
pub(crate) async fn run<F, Fut>(
    mut scheduler: Scheduler,
    mut commands: mpsc::Receiver<SchedulerCommand>,
    mut pass: F,
) -> Scheduler
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    scheduler.start(Instant::now());

    loop {
        tokio::select! {
            command = commands.recv() => {
                let command = command.unwrap_or(SchedulerCommand::Stop);
                if !scheduler.apply(command, Instant::now()) {
                    break;
                }
            }
            _ = wait_for(scheduler.next_check()) => {
                if !scheduler.is_due(Instant::now()) {
                    continue;
                }
                scheduler.begin_check(Utc::now());
                debug!("monitoring pass started");
                pass().await;
                scheduler.finish_check(Instant::now());
                debug!(interval = ?scheduler.interval, "monitoring pass finished");
            }
        }
    }

    info!("scheduler stopped");
    scheduler
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(300);

    #[test]
    fn start_makes_the_first_pass_due() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        assert_eq!(scheduler.next_check(), None);

        assert!(scheduler.start(now));
        assert!(!scheduler.start(now));
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert!(scheduler.is_due(now));
    }

    #[test]
    fn pause_keeps_the_remaining_time() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(now);
        scheduler.begin_check(Utc::now());
        scheduler.finish_check(now);

        let later = now + Duration::from_secs(100);
        assert!(scheduler.pause(later));
        assert_eq!(
            scheduler.state(),
            SchedulerState::Paused {
                remaining: Duration::from_secs(200)
            }
        );
        assert_eq!(scheduler.next_check(), None);
        assert!(!scheduler.is_due(later + INTERVAL));
        assert!(!scheduler.pause(later));
        assert!(!scheduler.check_now(later));

        let resumed = later + Duration::from_secs(1000);
        assert!(scheduler.resume(resumed));
        assert_eq!(
            scheduler.next_check(),
            Some(resumed + Duration::from_secs(200))
        );
        assert!(!scheduler.resume(resumed));
    }

    #[test]
    fn next_pass_is_a_full_interval_after_completion() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(now);

        scheduler.begin_check(Utc::now());
        assert!(scheduler.is_checking());
        assert!(!scheduler.is_due(now));
        assert!(scheduler.last_check().is_some());

        let done = now + Duration::from_secs(40);
        scheduler.finish_check(done);
        assert!(!scheduler.is_checking());
        assert_eq!(scheduler.next_check(), Some(done + INTERVAL));

        assert!(scheduler.check_now(done));
        assert!(scheduler.is_due(done));
    }

    #[test]
    fn stop_returns_to_idle() {
        let now = Instant::now();
        let mut scheduler = Scheduler::new(INTERVAL);
        scheduler.start(now);
        scheduler.pause(now);

        assert!(!scheduler.apply(SchedulerCommand::Stop, now));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.start(now));
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_follows_commands() {
        let passes = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel(4);

        let counter = passes.clone();
        let handle = tokio::spawn(run(Scheduler::new(INTERVAL), rx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        // first pass runs right away
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(passes.load(Ordering::SeqCst), 1);

        tx.send(SchedulerCommand::CheckNow).await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(passes.load(Ordering::SeqCst), 2);

        tx.send(SchedulerCommand::Pause).await.unwrap();
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(passes.load(Ordering::SeqCst), 2);

        tx.send(SchedulerCommand::Resume).await.unwrap();
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(passes.load(Ordering::SeqCst), 3);

        tx.send(SchedulerCommand::Stop).await.unwrap();
        let scheduler = handle.await.unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
