use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::errors::{QuoteError, Result};

/// In-flight flag guarding a draft against overlapping submissions.
#[derive(Debug, Default)]
pub struct SubmitGate {
    in_flight: AtomicBool,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate until the returned ticket is dropped.
    pub fn try_acquire(&self) -> Result<SubmitTicket<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("submission rejected: another submission is in flight");
            return Err(QuoteError::SubmissionInFlight);
        }
        Ok(SubmitTicket { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop, whether the submission succeeded or not.
#[derive(Debug)]
pub struct SubmitTicket<'a> {
    gate: &'a SubmitGate,
}

impl Drop for SubmitTicket<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
