//! Evaluation countdown with start jitter and failure backoff

use rand::Rng;

/// Countdown to the next evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationSchedule {
    countdown: u32,
    scan_delay: u32,
    failure_delay: u32,
}

impl EvaluationSchedule {
    /// Schedule whose first pass runs on the next `advance`
    pub fn new(scan_delay: u32, failure_delay: u32) -> Self {
        Self {
            countdown: 0,
            scan_delay,
            failure_delay,
        }
    }

    /// Schedule with the countdown drawn uniformly from `[0, scan_delay)`
    pub fn jittered<R: Rng + ?Sized>(scan_delay: u32, failure_delay: u32, rng: &mut R) -> Self {
        let countdown = if scan_delay > 0 {
            rng.gen_range(0..scan_delay)
        } else {
            0
        };
        Self {
            countdown,
            scan_delay,
            failure_delay,
        }
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Count down one tick. Returns true when a pass is due, in which case
    /// the countdown restarts at the scan delay.
    pub fn advance(&mut self) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return false;
        }
        self.countdown = self.scan_delay;
        true
    }

    /// Push the next pass out by the failure delay
    pub fn back_off(&mut self) {
        self.countdown = self.failure_delay;
    }
}
