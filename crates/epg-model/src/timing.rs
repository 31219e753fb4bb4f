use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Operation kinds with their own timing counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// RF pulse.
    Pulse,
    /// Relaxation and exchange.
    Relaxation,
    /// Diffusion attenuation.
    Diffusion,
    /// Gradient reordering.
    Shift,
    /// Off-resonance precession.
    OffResonance,
    /// Bulk-motion phase.
    BulkMotion,
    /// State pruning.
    Prune,
}

/// Number of calls and accumulated wall time of one operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTiming {
    /// Completed calls.
    pub calls: u64,
    /// Total wall time spent in those calls.
    pub total: Duration,
}

impl OperationTiming {
    /// Mean wall time per call, zero before the first call.
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) => Duration::ZERO,
            Ok(calls) => self.total / calls,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.calls as f64),
        }
    }
}

/// Per-operation timing counters of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Pulse counter.
    pub pulse: OperationTiming,
    /// Relaxation counter.
    pub relaxation: OperationTiming,
    /// Diffusion counter.
    pub diffusion: OperationTiming,
    /// Shift counter.
    pub shift: OperationTiming,
    /// Off-resonance counter.
    pub off_resonance: OperationTiming,
    /// Bulk-motion counter.
    pub bulk_motion: OperationTiming,
    /// Pruning counter.
    pub prune: OperationTiming,
}

impl Timings {
    fn counter_mut(&mut self, operation: Operation) -> &mut OperationTiming {
        match operation {
            Operation::Pulse => &mut self.pulse,
            Operation::Relaxation => &mut self.relaxation,
            Operation::Diffusion => &mut self.diffusion,
            Operation::Shift => &mut self.shift,
            Operation::OffResonance => &mut self.off_resonance,
            Operation::BulkMotion => &mut self.bulk_motion,
            Operation::Prune => &mut self.prune,
        }
    }

    /// Counter of `operation`.
    pub fn get(&self, operation: Operation) -> OperationTiming {
        match operation {
            Operation::Pulse => self.pulse,
            Operation::Relaxation => self.relaxation,
            Operation::Diffusion => self.diffusion,
            Operation::Shift => self.shift,
            Operation::OffResonance => self.off_resonance,
            Operation::BulkMotion => self.bulk_motion,
            Operation::Prune => self.prune,
        }
    }

    /// Adds one call started at `start` to the counter of `operation`.
    pub fn record(&mut self, operation: Operation, start: Instant) {
        let counter = self.counter_mut(operation);
        counter.calls += 1;
        counter.total += start.elapsed();
    }

    /// Wall time summed over every operation.
    pub fn total(&self) -> Duration {
        [
            self.pulse,
            self.relaxation,
            self.diffusion,
            self.shift,
            self.off_resonance,
            self.bulk_motion,
            self.prune,
        ]
        .iter()
        .map(|counter| counter.total)
        .sum()
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Timings::default();
    }
}
