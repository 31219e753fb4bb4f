//! State and operators shared by every configuration store.

use std::f64::consts::PI;
use std::time::Instant;

use nalgebra::Vector3;
use num_complex::Complex64;

use epg_core::errors::{require_non_negative, EpgError, ErrorInfo};
use epg_core::species::Species;
use epg_core::units::{Dimensions, Quantity};
use epg_ops::{Attenuation, MotionPhase, PoolModel, PulseRequest, MAX_POOLS};

use crate::config::ModelOptions;
use crate::kernel::for_each_order;
use crate::state::{StateArrays, Triple};
use crate::timing::{Operation, Timings};

/// Pools, states and accumulators of a model, independent of how orders are
/// keyed.
///
/// Order 0 is always stored at index 0.
#[derive(Debug, Clone)]
pub struct ModelCore {
    pools: PoolModel,
    pub(crate) arrays: StateArrays,
    threshold: f64,
    parallel_threshold: usize,
    delta_omega: f64,
    velocity: Vector3<f64>,
    elapsed: f64,
    generation: u64,
    pub(crate) timings: Timings,
}

pub(crate) fn duration_of(duration: Quantity) -> Result<f64, EpgError> {
    require_non_negative("duration", duration.require(Dimensions::time(), "duration")?)
}

fn angle_of(angle: Quantity, name: &str) -> Result<f64, EpgError> {
    let value = angle.require(Dimensions::dimensionless(), name)?;
    if !value.is_finite() {
        return Err(EpgError::Parameter(
            ErrorInfo::new("non-finite-angle", "pulse angles must be finite")
                .with_context("parameter", name),
        ));
    }
    Ok(value)
}

impl ModelCore {
    /// Core holding the initial state of `pools` at order 0.
    pub fn new(pools: PoolModel, options: &ModelOptions, capacity: usize) -> Result<Self, EpgError> {
        options.validate()?;
        let arrays = StateArrays::with_order_zero(pools.initial_state(), capacity);
        Ok(Self {
            pools,
            arrays,
            threshold: options.threshold,
            parallel_threshold: options.parallel_threshold,
            delta_omega: 0.0,
            velocity: Vector3::zeros(),
            elapsed: 0.0,
            generation: 0,
            timings: Timings::default(),
        })
    }

    /// Pool configuration.
    pub fn pools(&self) -> &PoolModel {
        &self.pools
    }

    /// Replaces the pool parameters, keeping the states. The kind cannot change.
    pub fn set_pools(&mut self, pools: PoolModel) -> Result<(), EpgError> {
        if pools.kind() != self.pools.kind() {
            return Err(EpgError::Pool(
                ErrorInfo::new("pool-kind", "a model cannot change its pool kind")
                    .with_context("expected", format!("{:?}", self.pools.kind()))
                    .with_context("found", format!("{:?}", pools.kind())),
            ));
        }
        self.pools = pools;
        Ok(())
    }

    /// Active state arrays.
    pub fn arrays(&self) -> &StateArrays {
        &self.arrays
    }

    /// Pruning threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sets the pruning threshold.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), EpgError> {
        self.threshold = require_non_negative("threshold", threshold)?;
        Ok(())
    }

    /// Minimum active length for parallel kernels.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Sets the minimum active length for parallel kernels.
    pub fn set_parallel_threshold(&mut self, parallel_threshold: usize) {
        self.parallel_threshold = parallel_threshold;
    }

    /// Global frequency offset (Hz).
    pub fn delta_omega(&self) -> f64 {
        self.delta_omega
    }

    /// Sets the global frequency offset.
    pub fn set_delta_omega(&mut self, delta_omega: Quantity) -> Result<(), EpgError> {
        self.delta_omega = delta_omega.require(Dimensions::frequency(), "delta_omega")?;
        Ok(())
    }

    /// Bulk velocity (m/s).
    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub(crate) fn set_velocity(&mut self, velocity: [Quantity; 3]) -> Result<(), EpgError> {
        let mut value = Vector3::zeros();
        for (axis, component) in velocity.iter().enumerate() {
            value[axis] = component.require(Dimensions::velocity(), "velocity")?;
        }
        self.velocity = value;
        Ok(())
    }

    /// Simulated time (s).
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub(crate) fn advance(&mut self, duration: f64) {
        self.elapsed += duration;
    }

    /// Counter bumped whenever the stored order set changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn reordered(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn replace_arrays(&mut self, arrays: StateArrays) {
        self.arrays = arrays;
        self.reordered();
    }

    /// Timing counters.
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Clears the timing counters.
    pub fn reset_timings(&mut self) {
        self.timings.reset();
    }

    /// Number of stored orders.
    pub fn size(&self) -> usize {
        self.arrays.len()
    }

    /// Fails unless `index` names a stored order.
    pub fn check_index(&self, index: usize) -> Result<(), EpgError> {
        if index >= self.arrays.len() {
            return Err(EpgError::State(
                ErrorInfo::new("state-index", "no configuration state at this index")
                    .with_context("index", index)
                    .with_context("size", self.arrays.len()),
            ));
        }
        Ok(())
    }

    /// State of `pool` at `index`.
    pub fn pool_state(&self, pool: usize, index: usize) -> Result<Triple, EpgError> {
        self.pools.check_pool(pool)?;
        self.check_index(index)?;
        Ok(self.arrays.triple(index, pool))
    }

    /// States of `pool` at every stored order.
    pub fn pool_states(&self, pool: usize) -> Result<Vec<Triple>, EpgError> {
        self.pools.check_pool(pool)?;
        Ok((0..self.arrays.len())
            .map(|index| self.arrays.triple(index, pool))
            .collect())
    }

    /// Order-0 `F` of `pool`.
    pub fn pool_echo(&self, pool: usize) -> Result<Complex64, EpgError> {
        self.pools.check_pool(pool)?;
        Ok(self.arrays.f[0][pool])
    }

    /// Applies a pulse after resolving it against the pool kind.
    pub fn pulse(&mut self, request: &PulseRequest) -> Result<(), EpgError> {
        let operator = self.pools.pulse_operator(request)?;
        let start = Instant::now();
        for_each_order(&mut self.arrays, self.parallel_threshold, |_, f, f_star, z| {
            operator.apply(f, f_star, z)
        });
        self.timings.record(Operation::Pulse, start);
        Ok(())
    }

    pub(crate) fn uniform_pulse(angle: Quantity, phase: Quantity) -> Result<PulseRequest, EpgError> {
        Ok(PulseRequest::Uniform {
            angle: angle_of(angle, "angle")?,
            phase: angle_of(phase, "phase")?,
        })
    }

    pub(crate) fn per_pool_pulse(
        angles: [Quantity; 2],
        phases: [Quantity; 2],
    ) -> Result<PulseRequest, EpgError> {
        Ok(PulseRequest::PerPool {
            angles: [angle_of(angles[0], "angle_a")?, angle_of(angles[1], "angle_b")?],
            phases: [angle_of(phases[0], "phase_a")?, angle_of(phases[1], "phase_b")?],
        })
    }

    pub(crate) fn saturating_pulse(
        angle: Quantity,
        phase: Quantity,
        saturation: f64,
    ) -> Result<PulseRequest, EpgError> {
        Ok(PulseRequest::Saturating {
            angle: angle_of(angle, "angle")?,
            phase: angle_of(phase, "phase")?,
            saturation,
        })
    }

    /// Relaxation and exchange over `duration` seconds.
    pub fn relax(&mut self, duration: f64) {
        let operator = self.pools.relaxation_operator(duration);
        let start = Instant::now();
        for_each_order(&mut self.arrays, self.parallel_threshold, |index, f, f_star, z| {
            operator.apply(f, f_star, z, index == 0)
        });
        self.timings.record(Operation::Relaxation, start);
    }

    /// Precession at the global plus per-pool frequency offsets.
    pub fn off_resonance(&mut self, duration: f64) {
        let offsets = self.pools.frequency_offsets();
        if duration == 0.0 || (self.delta_omega == 0.0 && offsets.iter().all(|w| *w == 0.0)) {
            return;
        }
        let start = Instant::now();
        let factors: [Complex64; MAX_POOLS] = offsets.map(|offset| {
            Complex64::from_polar(1.0, 2.0 * PI * duration * (self.delta_omega + offset))
        });
        let pool_count = self.pools.pool_count();
        for_each_order(&mut self.arrays, self.parallel_threshold, |_, f, f_star, _| {
            for pool in 0..pool_count {
                f[pool] *= factors[pool];
                f_star[pool] *= factors[pool].conj();
            }
        });
        self.timings.record(Operation::OffResonance, start);
    }

    /// Diffusion attenuation; `attenuation(index, species)` gives the factors
    /// of one order for one pool's species. Pools without diffusion are
    /// skipped.
    pub(crate) fn attenuate<A>(&mut self, attenuation: A)
    where
        A: Fn(usize, &Species) -> Attenuation + Sync + Send,
    {
        let species = self.pools.diffusing_species();
        if species.iter().all(Option::is_none) {
            return;
        }
        let start = Instant::now();
        for_each_order(&mut self.arrays, self.parallel_threshold, |index, f, f_star, z| {
            for (pool, species) in species.iter().enumerate() {
                if let Some(species) = species {
                    let factors = attenuation(index, species);
                    f[pool] *= factors.transverse_plus;
                    f_star[pool] *= factors.transverse_minus;
                    z[pool] *= factors.longitudinal;
                }
            }
        });
        self.timings.record(Operation::Diffusion, start);
    }

    /// Bulk-motion phases; `phase(index)` gives the factors of one order.
    pub(crate) fn move_bulk<P>(&mut self, phase: P)
    where
        P: Fn(usize) -> MotionPhase + Sync + Send,
    {
        let start = Instant::now();
        let pool_count = self.pools.pool_count();
        for_each_order(&mut self.arrays, self.parallel_threshold, |index, f, f_star, z| {
            let factors = phase(index);
            for pool in 0..pool_count {
                f[pool] *= factors.f;
                f_star[pool] *= factors.f_star;
                z[pool] *= factors.z;
            }
        });
        self.timings.record(Operation::BulkMotion, start);
    }
}
