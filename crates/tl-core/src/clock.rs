//! Clock abstraction for phase and sub-scan delays.
//!
//! Every suspension point in the controller and the scanners goes through a
//! [`Clock`].  Production runs use [`RealClock`], which blocks the calling
//! thread (optionally compressed by a scale factor).  Tests use
//! [`VirtualClock`], which returns immediately and only advances a counter,
//! so a run is independent of wall-clock time.
//!
//! A sleep can end early ([`Sleep::Interrupted`]).  Callers treat an
//! interrupted sleep as elapsed: the phase or sub-scan simply ends sooner.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How a [`Clock::sleep`] call ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Sleep {
    /// The full duration passed.
    Elapsed,
    /// The sleep was woken before the duration passed.
    Interrupted,
}

/// Source of simulated delays.
///
/// Implementations must be `Send + Sync`: one clock is shared by the
/// controller thread and every scanner task.
pub trait Clock: Send + Sync {
    /// Suspend the calling thread for `duration` of simulated time.
    fn sleep(&self, duration: Duration) -> Sleep;

    /// Simulated time elapsed since the clock was created.
    fn elapsed(&self) -> Duration;

    /// Wall-clock time that `simulated` takes on this clock.  Used to size
    /// the scan drain deadline.
    fn wall_time(&self, simulated: Duration) -> Duration {
        simulated
    }
}

// ── RealClock ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Interrupt {
    generation: Mutex<u64>,
    wake:       Condvar,
}

/// Clock backed by the OS scheduler.
///
/// `scale` maps simulated seconds to wall seconds: `1.0` is real time,
/// `0.01` runs a 6 s green phase in 60 ms.  Clones share one interrupt
/// handle, so [`interrupt`][Self::interrupt] on any clone wakes sleepers on
/// all of them.
#[derive(Clone, Debug)]
pub struct RealClock {
    scale:     f64,
    started:   Instant,
    interrupt: Arc<Interrupt>,
}

impl RealClock {
    /// Real-time clock (one simulated second per wall second).
    pub fn new() -> Self {
        Self::scaled(1.0)
    }

    /// Clock compressing simulated time by `scale`.  Negative or non-finite
    /// factors are treated as `0.0` (no waiting at all).
    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        Self {
            scale,
            started:   Instant::now(),
            interrupt: Arc::new(Interrupt::default()),
        }
    }

    /// Wake every thread currently sleeping on this clock (or a clone of it).
    pub fn interrupt(&self) {
        let mut generation = self
            .interrupt
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation = generation.wrapping_add(1);
        self.interrupt.wake.notify_all();
    }
}

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RealClock {
    fn sleep(&self, duration: Duration) -> Sleep {
        let wall = self.wall_time(duration);
        if wall.is_zero() {
            return Sleep::Elapsed;
        }

        // `None` when the deadline is past what `Instant` can represent;
        // such a sleep only ends through an interrupt.
        let deadline = Instant::now().checked_add(wall);
        let mut generation = self
            .interrupt
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let entered = *generation;

        loop {
            generation = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Sleep::Elapsed;
                    }
                    self.interrupt
                        .wake
                        .wait_timeout(generation, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .interrupt
                    .wake
                    .wait(generation)
                    .unwrap_or_else(PoisonError::into_inner),
            };
            if *generation != entered {
                return Sleep::Interrupted;
            }
        }
    }

    fn elapsed(&self) -> Duration {
        let wall = self.started.elapsed();
        if self.scale > 0.0 {
            wall.div_f64(self.scale)
        } else {
            Duration::ZERO
        }
    }

    fn wall_time(&self, simulated: Duration) -> Duration {
        Duration::try_from_secs_f64(simulated.as_secs_f64() * self.scale).unwrap_or(Duration::MAX)
    }
}

// ── VirtualClock ──────────────────────────────────────────────────────────────

/// Instant clock for deterministic tests.
///
/// `sleep` returns immediately and advances an internal counter by the
/// requested duration.  [`interrupt_next`][Self::interrupt_next] makes the
/// next `n` sleeps report [`Sleep::Interrupted`] without advancing time.
#[derive(Debug, Default)]
pub struct VirtualClock {
    elapsed_ms:         AtomicU64,
    sleeps:             AtomicU64,
    pending_interrupts: AtomicUsize,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `sleep` end as interrupted.
    pub fn interrupt_next(&self, n: usize) {
        self.pending_interrupts.fetch_add(n, Ordering::SeqCst);
    }

    /// Number of `sleep` calls observed so far (interrupted ones included).
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for VirtualClock {
    fn sleep(&self, duration: Duration) -> Sleep {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        let interrupted = self
            .pending_interrupts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if interrupted {
            return Sleep::Interrupted;
        }
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(ms, Ordering::SeqCst);
        Sleep::Elapsed
    }

    fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }

    /// Virtual sleeps cost no wall time.
    fn wall_time(&self, _simulated: Duration) -> Duration {
        Duration::ZERO
    }
}
