use num_complex::Complex64;

use epg_core::errors::EpgError;
use epg_core::units::Quantity;
use epg_core::TimeInterval;
use epg_ops::PoolModel;

use crate::engine::{duration_of, ModelCore};
use crate::snapshot::{Snapshot, SNAPSHOT_SCHEMA_VERSION};
use crate::state::Triple;
use crate::timing::Timings;

/// Operations common to the configuration stores.
///
/// A store provides its order keying, gradient handling and pruning; pulses,
/// relaxation, off-resonance and every accessor are shared through
/// [`ModelCore`].
pub trait ConfigurationModel {
    /// Wavenumber of one order as seen by callers.
    type Order: Copy;

    /// Shared state.
    fn core(&self) -> &ModelCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut ModelCore;

    /// Wavenumbers of the stored orders, aligned with the state indices.
    fn orders(&self) -> Vec<Self::Order>;

    /// Index of the stored order matching `order` and whether `order` is the
    /// mirror of the stored one.
    fn locate(&self, order: Self::Order) -> Option<(usize, bool)>;

    /// Wavenumber vectors of the stored orders (rad/m).
    fn order_vectors(&self) -> Vec<[f64; 3]>;

    /// Relaxation, diffusion, gradient shift, off-resonance, bulk motion and
    /// pruning over one interval, in that order. Nothing is mutated when the
    /// gradient is rejected.
    fn apply_time_interval(&mut self, interval: &TimeInterval) -> Result<(), EpgError>;

    /// Removes negligible orders according to the threshold.
    fn prune(&mut self);

    /// Pulse with one angle and phase for every transverse-active pool.
    fn pulse(&mut self, angle: Quantity, phase: Quantity) -> Result<(), EpgError> {
        let request = ModelCore::uniform_pulse(angle, phase)?;
        self.core_mut().pulse(&request)
    }

    /// Pulse with separate angles and phases for the two exchanging pools.
    fn exchange_pulse(
        &mut self,
        angles: [Quantity; 2],
        phases: [Quantity; 2],
    ) -> Result<(), EpgError> {
        let request = ModelCore::per_pool_pulse(angles, phases)?;
        self.core_mut().pulse(&request)
    }

    /// Pulse rotating the free pool and leaving `saturation` of the bound
    /// pool's longitudinal magnetization.
    fn saturation_pulse(
        &mut self,
        angle: Quantity,
        phase: Quantity,
        saturation: f64,
    ) -> Result<(), EpgError> {
        let request = ModelCore::saturating_pulse(angle, phase, saturation)?;
        self.core_mut().pulse(&request)
    }

    /// Relaxation and exchange alone.
    fn relax(&mut self, duration: Quantity) -> Result<(), EpgError> {
        let duration = duration_of(duration)?;
        self.core_mut().relax(duration);
        Ok(())
    }

    /// Off-resonance precession alone.
    fn precess(&mut self, duration: Quantity) -> Result<(), EpgError> {
        let duration = duration_of(duration)?;
        self.core_mut().off_resonance(duration);
        Ok(())
    }

    /// Echo signal: order-0 `F` of pool a.
    fn echo(&self) -> Complex64 {
        self.core().arrays().f()[0][0]
    }

    /// Order-0 `F` of `pool`.
    fn pool_echo(&self, pool: usize) -> Result<Complex64, EpgError> {
        self.core().pool_echo(pool)
    }

    /// State of pool a at `index`.
    fn state(&self, index: usize) -> Result<Triple, EpgError> {
        self.core().pool_state(0, index)
    }

    /// State of `pool` at `index`.
    fn pool_state(&self, pool: usize, index: usize) -> Result<Triple, EpgError> {
        self.core().pool_state(pool, index)
    }

    /// State of pool a at `order`.
    fn state_at(&self, order: Self::Order) -> Result<Triple, EpgError> {
        self.pool_state_at(0, order)
    }

    /// State of `pool` at `order`; a mirrored order yields the conjugate
    /// partner of the stored state.
    fn pool_state_at(&self, pool: usize, order: Self::Order) -> Result<Triple, EpgError> {
        self.core().pools().check_pool(pool)?;
        let (index, mirrored) = self
            .locate(order)
            .ok_or_else(|| {
                EpgError::state("state-order", "no configuration state at this order")
            })?;
        let triple = self.core().pool_state(pool, index)?;
        Ok(if mirrored { triple.mirrored() } else { triple })
    }

    /// States of pool a at every stored order.
    fn states(&self) -> Vec<Triple> {
        let arrays = self.core().arrays();
        (0..arrays.len()).map(|index| arrays.triple(index, 0)).collect()
    }

    /// States of `pool` at every stored order.
    fn pool_states(&self, pool: usize) -> Result<Vec<Triple>, EpgError> {
        self.core().pool_states(pool)
    }

    /// Number of stored orders.
    fn size(&self) -> usize {
        self.core().size()
    }

    /// Simulated time advanced by time intervals (s).
    fn elapsed(&self) -> f64 {
        self.core().elapsed()
    }

    /// Per-operation timing counters.
    fn timings(&self) -> &Timings {
        self.core().timings()
    }

    /// Clears the timing counters.
    fn reset_timings(&mut self) {
        self.core_mut().reset_timings();
    }

    /// Pool configuration.
    fn pool_model(&self) -> &PoolModel {
        self.core().pools()
    }

    /// Replaces the pool parameters; the pool kind cannot change.
    fn set_pool_model(&mut self, pools: PoolModel) -> Result<(), EpgError> {
        self.core_mut().set_pools(pools)
    }

    /// Sets the pruning threshold.
    fn set_threshold(&mut self, threshold: f64) -> Result<(), EpgError> {
        self.core_mut().set_threshold(threshold)
    }

    /// Sets the global frequency offset.
    fn set_delta_omega(&mut self, delta_omega: Quantity) -> Result<(), EpgError> {
        self.core_mut().set_delta_omega(delta_omega)
    }

    /// Serializable view of the current states.
    fn snapshot(&self) -> Snapshot {
        let core = self.core();
        let pools: Vec<Vec<Triple>> = (0..core.pools().pool_count())
            .map(|pool| {
                let arrays = core.arrays();
                (0..arrays.len()).map(|index| arrays.triple(index, pool)).collect()
            })
            .collect();
        Snapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            pool_kind: core.pools().kind(),
            pool_count: core.pools().pool_count(),
            elapsed: core.elapsed(),
            orders: self.order_vectors(),
            pools,
        }
    }
}
