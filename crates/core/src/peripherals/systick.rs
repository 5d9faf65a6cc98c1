use crate::TickSource;
use std::thread;
use std::time::{Duration, Instant};

const CSR_ENABLE: u32 = 1 << 0;
const CSR_COUNTFLAG: u32 = 1 << 16;
const RVR_MASK: u32 = 0x00FF_FFFF;

/// Simulated SysTick timer. One tick stands for one millisecond, so waiting
/// on it costs no wall-clock time; used wherever the run must be
/// deterministic.
#[derive(Debug)]
pub struct Systick {
    csr: u32,
    rvr: u32,
    cvr: u32,
    elapsed: u64,
}

impl Default for Systick {
    fn default() -> Self {
        Self::new()
    }
}

impl Systick {
    pub fn new() -> Self {
        Self {
            csr: CSR_ENABLE,
            rvr: 0,
            cvr: 0,
            elapsed: 0,
        }
    }

    pub fn with_period(period: Duration) -> Self {
        let mut systick = Self::new();
        systick.set_period(period);
        systick
    }

    /// Advance the timer by one tick. Returns true when the counter wrapped.
    pub fn tick(&mut self) -> bool {
        if (self.csr & CSR_ENABLE) == 0 {
            return false;
        }

        self.elapsed += 1;
        if self.cvr == 0 {
            self.cvr = self.rvr;
            self.csr |= CSR_COUNTFLAG;
            true
        } else {
            self.cvr -= 1;
            false
        }
    }

    pub fn reload(&self) -> u32 {
        self.rvr
    }

    /// Simulated milliseconds since creation.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed
    }
}

impl TickSource for Systick {
    fn wait_expired(&mut self) {
        self.csr &= !CSR_COUNTFLAG;
        while (self.csr & CSR_COUNTFLAG) == 0 {
            self.tick();
        }
        self.csr &= !CSR_COUNTFLAG;
    }

    fn set_period(&mut self, period: Duration) {
        // A period of N ticks reloads with N - 1.
        let ticks = period.as_millis().min(RVR_MASK as u128 + 1) as u32;
        self.rvr = ticks.saturating_sub(1);
        self.cvr = self.rvr;
        self.csr &= !CSR_COUNTFLAG;
    }
}

/// Wall-clock periodic timer for runs on the host.
#[derive(Debug)]
pub struct IntervalTimer {
    period: Duration,
    deadline: Instant,
    expirations: u64,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
            expirations: 0,
        }
    }

    pub fn expirations(&self) -> u64 {
        self.expirations
    }
}

impl TickSource for IntervalTimer {
    fn wait_expired(&mut self) {
        let now = Instant::now();
        if now < self.deadline {
            thread::sleep(self.deadline - now);
        }

        let now = Instant::now();
        self.deadline += self.period;
        if self.deadline < now {
            // Fell behind; skip the missed periods.
            self.deadline = now + self.period;
        }
        self.expirations += 1;
    }

    fn set_period(&mut self, period: Duration) {
        self.period = period;
        self.deadline = Instant::now() + period;
    }
}
