//! Tick scheduling for minigame sessions.
//!
//! All state mutation happens on ticks. The scheduler turns elapsed time from a
//! [`Clock`] into an ordered stream of frame ticks (simulation steps) and
//! countdown ticks (timer seconds). Tests drive a [`VirtualClock`] by hand
//! instead of waiting on the wall clock.

mod input;

pub use input::*;

use minigame_rules::{RulesError, SchedulerConfig};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of elapsed time since a session started.
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Manually advanced time. Clones share the same timeline, so a test keeps one
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for VirtualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

/// A unit of scheduled work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// One simulation step lasting `dt` seconds.
    Frame { dt: f64 },
    /// One countdown interval elapsed.
    Countdown,
}

/// Fixed-rate frame ticks plus an independent countdown tick.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    frame_interval: Duration,
    countdown_interval: Duration,
    next_frame: Duration,
    next_countdown: Duration,
    stopped: bool,
}

impl TickScheduler {
    /// Build a scheduler. Rates that give an empty interval are rejected.
    pub fn new(config: SchedulerConfig) -> Result<Self, RulesError> {
        config.validate()?;
        let (Some(frame_interval), Some(countdown_interval)) =
            (config.frame_interval(), config.countdown_interval())
        else {
            return Err(RulesError::invalid_config("scheduler intervals must be positive"));
        };

        Ok(Self {
            frame_interval,
            countdown_interval,
            next_frame: frame_interval,
            next_countdown: countdown_interval,
            stopped: false,
        })
    }

    /// Length of one frame in seconds.
    pub fn frame_dt(&self) -> f64 {
        self.frame_interval.as_secs_f64()
    }

    /// Pop the earliest tick due at or before `now`.
    ///
    /// When a frame and a countdown fall on the same instant the frame comes
    /// first. A stopped scheduler yields nothing.
    pub fn next_due(&mut self, now: Duration) -> Option<Tick> {
        if self.stopped {
            return None;
        }

        if self.next_frame <= self.next_countdown {
            if self.next_frame > now {
                return None;
            }
            self.next_frame += self.frame_interval;
            Some(Tick::Frame {
                dt: self.frame_dt(),
            })
        } else {
            if self.next_countdown > now {
                return None;
            }
            self.next_countdown += self.countdown_interval;
            Some(Tick::Countdown)
        }
    }

    /// Stop emitting ticks. Irreversible.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
