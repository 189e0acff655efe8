//! Timers that drive polling.
use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

/// Something that can arm a recurring timer and cancel it again.
///
/// The polling machine holds at most one handle at a time and always cancels it before
/// arming a new one.
pub trait Scheduler {
    /// Identifies an armed timer.
    type Handle;

    /// Start firing every `every`, beginning one interval from now.
    fn arm(&mut self, every: Duration) -> Self::Handle;

    /// Stop the timer. It must not fire after this returns.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Delivered by [`TokioScheduler`] each time its timer fires.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Tick;

/// Handle to a timer task spawned by [`TokioScheduler`]. Dropping it stops the timer.
#[derive(Debug)]
pub struct TimerHandle(JoinHandle<()>);

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Scheduler backed by tokio tasks. Ticks arrive on the channel returned by
/// [`TokioScheduler::new`]; the owner of the receiver runs one poll per tick.
///
/// A tick sent just before a cancel can still be sitting in the channel. The receiver
/// must be prepared for one late tick after a cancel.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    ticks: mpsc::UnboundedSender<Tick>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its ticks are delivered to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        (Self { ticks }, rx)
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TimerHandle;

    /// Must be called from within a tokio runtime.
    fn arm(&mut self, every: Duration) -> TimerHandle {
        let ticks = self.ticks.clone();
        TimerHandle(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + every, every);
            loop {
                interval.tick().await;
                if ticks.send(Tick).is_err() {
                    break;
                }
            }
        }))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        drop(handle);
    }
}

/// Events recorded by a [`ManualScheduler`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimerEvent {
    /// A timer with the given id was armed at the given interval.
    Armed(u64, Duration),
    /// The timer with the given id was cancelled.
    Cancelled(u64),
}

/// Scheduler that only records what it is asked to do. Useful for hosts that keep time
/// themselves and for checking the timer discipline of the polling machine.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    live: Vec<(u64, Duration)>,
    history: Vec<TimerEvent>,
}

impl ManualScheduler {
    /// Create a scheduler with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers that are armed and not cancelled.
    pub fn live(&self) -> &[(u64, Duration)] {
        &self.live
    }

    /// Every arm and cancel, in order.
    pub fn history(&self) -> &[TimerEvent] {
        &self.history
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn arm(&mut self, every: Duration) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.push((id, every));
        self.history.push(TimerEvent::Armed(id, every));
        id
    }

    fn cancel(&mut self, handle: u64) {
        self.live.retain(|(id, _)| *id != handle);
        self.history.push(TimerEvent::Cancelled(handle));
    }
}
