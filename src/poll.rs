use crate::config::MAX_POLL_ATTEMPTS;
use crate::hid::{FrameSource, HidError};
use crate::protocol::{Reading, RawFrame, decrypt_frame, extract, frame::inspect};

/// Readings collected during one poll cycle. Either field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PollResult {
    pub temperature: Option<f64>,
    pub carbon_dioxide: Option<u16>,
}

impl PollResult {
    pub fn record(&mut self, reading: Reading) {
        match reading {
            Reading::Temperature { celsius } => self.temperature = Some(celsius),
            Reading::CarbonDioxide { ppm } => self.carbon_dioxide = Some(ppm),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.temperature.is_some() && self.carbon_dioxide.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.carbon_dioxide.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep reading.
    Continue,
    /// Both readings collected.
    Complete,
    /// Attempt budget spent.
    Exhausted,
}

/// Bounded retry state for one poll cycle.
#[derive(Debug)]
pub struct PollCycle {
    attempts: usize,
    max_attempts: usize,
    result: PollResult,
}

impl Default for PollCycle {
    fn default() -> Self {
        Self::new(MAX_POLL_ATTEMPTS)
    }
}

impl PollCycle {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            result: PollResult::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn state(&self) -> Step {
        if self.result.is_complete() {
            Step::Complete
        } else if self.attempts >= self.max_attempts {
            Step::Exhausted
        } else {
            Step::Continue
        }
    }

    /// Consume one raw frame. Bad frames and unknown op-codes still count
    /// against the budget.
    pub fn feed(&mut self, raw: &RawFrame) -> Step {
        self.attempts += 1;
        let frame = decrypt_frame(raw);
        match inspect(&frame) {
            Err(defect) => {
                tracing::debug!(attempt = self.attempts, "Dropped frame: {defect}");
            }
            Ok(()) => match extract(&frame) {
                Some(reading) => {
                    tracing::trace!(attempt = self.attempts, ?reading, "Reading");
                    self.result.record(reading);
                }
                None => tracing::trace!(
                    attempt = self.attempts,
                    op = format!("{:#04x}", frame[0]),
                    "Ignoring op-code"
                ),
            },
        }
        self.state()
    }

    pub fn finish(self) -> PollResult {
        self.result
    }
}

/// Run one poll cycle against `source`: at most [`MAX_POLL_ATTEMPTS`] reads,
/// stopping early once both readings are in. A transport error aborts the
/// cycle immediately.
pub fn poll<S: FrameSource + ?Sized>(source: &mut S) -> Result<PollResult, HidError> {
    poll_with_budget(source, MAX_POLL_ATTEMPTS)
}

pub fn poll_with_budget<S: FrameSource + ?Sized>(
    source: &mut S,
    max_attempts: usize,
) -> Result<PollResult, HidError> {
    let mut cycle = PollCycle::new(max_attempts);
    while cycle.state() == Step::Continue {
        let raw = source.read_frame()?;
        cycle.feed(&raw);
    }
    let attempts = cycle.attempts();
    let result = cycle.finish();
    tracing::debug!(
        attempts,
        temperature = ?result.temperature,
        co2 = ?result.carbon_dioxide,
        "Poll cycle finished"
    );
    Ok(result)
}
