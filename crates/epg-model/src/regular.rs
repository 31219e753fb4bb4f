//! Uniform-step store: orders are the contiguous indices `0..len`, each a
//! multiple of a unit dephasing fixed at construction.

use std::time::Instant;

use epg_core::errors::{EpgError, ErrorInfo};
use epg_core::units::{Dimensions, Quantity};
use epg_core::{dephasing_from, moment_from, TimeInterval};
use epg_ops::{attenuation, bulk_motion, PoolModel};

use crate::cache::Cached;
use crate::config::ModelOptions;
use crate::discrete::bins_of;
use crate::engine::{duration_of, ModelCore};
use crate::model::ConfigurationModel;
use crate::prune;
use crate::timing::Operation;

/// Configuration store restricted to integer multiples of a unit step.
#[derive(Debug, Clone)]
pub struct RegularModel {
    core: ModelCore,
    unit: f64,
    growth_step: usize,
    tolerance: f64,
    wavenumbers: Cached<Vec<f64>>,
}

impl RegularModel {
    /// Model whose unit step is a gradient area or dephasing.
    pub fn new(pools: PoolModel, unit_step: Quantity, options: &ModelOptions) -> Result<Self, EpgError> {
        let unit = moment_from(unit_step)?;
        if !unit.is_finite() || unit <= 0.0 {
            return Err(EpgError::Parameter(
                ErrorInfo::new("unit-step", "unit step must be finite and positive")
                    .with_context("unit_step", unit),
            ));
        }
        let core = ModelCore::new(pools, options, options.regular.initial_capacity)?;
        Ok(Self {
            core,
            unit,
            growth_step: options.regular.growth_step,
            tolerance: options.regular.gradient_tolerance,
            wavenumbers: Cached::new(),
        })
    }

    /// Unit dephasing (rad/m).
    pub fn unit_step(&self) -> f64 {
        self.unit
    }

    /// Allocated orders.
    pub fn capacity(&self) -> usize {
        self.core.arrays.capacity()
    }

    /// Number of unit steps in `moment` (rad/m).
    pub fn units_of(&self, moment: f64) -> Result<i64, EpgError> {
        let ratio = moment / self.unit;
        if ratio.is_finite() && (ratio - ratio.round()).abs() > self.tolerance {
            return Err(EpgError::Gradient(
                ErrorInfo::new(
                    "non-commensurate",
                    "gradient moment is not a multiple of the unit step",
                )
                .with_context("moment", moment)
                .with_context("unit_step", self.unit)
                .with_context("ratio", ratio),
            ));
        }
        bins_of(moment, self.unit)
    }

    /// Sets the bulk velocity along the gradient axis.
    pub fn set_velocity(&mut self, velocity: Quantity) -> Result<(), EpgError> {
        let zero = Quantity::new(0.0, Dimensions::velocity());
        self.core.set_velocity([velocity, zero, zero])
    }

    /// Shifts by a gradient area or dephasing.
    pub fn shift(&mut self, gradient: Quantity) -> Result<(), EpgError> {
        let units = self.units_of(moment_from(gradient)?)?;
        self.shift_units(units);
        Ok(())
    }

    /// Shifts by `units` unit steps, then trims an exactly zero tail.
    pub fn shift_units(&mut self, units: i64) {
        if units == 0 {
            return;
        }
        let start = Instant::now();
        for _ in 0..units.unsigned_abs() {
            self.unit_shift(units > 0);
        }
        prune::trim_tail(&mut self.core.arrays, 0.0);
        self.core.reordered();
        self.core.timings.record(Operation::Shift, start);
    }

    fn unit_shift(&mut self, up: bool) {
        if self.core.arrays.len() + 1 > self.core.arrays.capacity() {
            self.core.arrays.grow(self.growth_step);
        }
        let arrays = &mut self.core.arrays;
        let len = arrays.len;
        if up {
            arrays.f.copy_within(0..len, 1);
            arrays.f_star.copy_within(1..=len, 0);
            arrays.f[0] = arrays.f_star[0].map(|value| value.conj());
        } else {
            arrays.f.copy_within(1..=len, 0);
            arrays.f_star.copy_within(0..len, 1);
            arrays.f_star[0] = arrays.f[0].map(|value| value.conj());
        }
        arrays.len = len + 1;
    }

    /// Diffusion alone over `duration`, with the gradient given as an
    /// amplitude, area or dephasing.
    pub fn diffuse(&mut self, duration: Quantity, gradient: Quantity) -> Result<(), EpgError> {
        let duration = duration_of(duration)?;
        let delta_k = dephasing_from(duration, gradient)?;
        self.diffuse_moment(duration, delta_k);
        Ok(())
    }

    /// One interval built from a duration and a gradient amplitude, area or
    /// dephasing.
    pub fn apply_interval(&mut self, duration: Quantity, gradient: Quantity) -> Result<(), EpgError> {
        let interval = TimeInterval::new(duration, gradient)?;
        self.apply_time_interval(&interval)
    }

    fn diffuse_moment(&mut self, duration: f64, delta_k: f64) {
        let len = self.core.arrays.len();
        let unit = self.unit;
        let k = self
            .wavenumbers
            .get_or_update(len as u64, |k| fill_wavenumbers(k, len, unit));
        self.core.attenuate(|index, species| {
            attenuation(duration, k[index], delta_k, species.mean_diffusivity())
        });
    }

    fn move_bulk(&mut self, duration: f64, delta_k: f64) {
        let velocity = self.core.velocity()[0];
        if velocity == 0.0 || duration == 0.0 {
            return;
        }
        let len = self.core.arrays.len();
        let unit = self.unit;
        let k = self
            .wavenumbers
            .get_or_update(len as u64, |k| fill_wavenumbers(k, len, unit));
        self.core
            .move_bulk(|index| bulk_motion(duration, velocity, k[index], delta_k));
    }
}

fn fill_wavenumbers(k: &mut Vec<f64>, len: usize, unit: f64) {
    k.clear();
    k.extend((0..len).map(|index| index as f64 * unit));
}

impl ConfigurationModel for RegularModel {
    type Order = f64;

    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn orders(&self) -> Vec<f64> {
        (0..self.core.size())
            .map(|index| index as f64 * self.unit)
            .collect()
    }

    fn locate(&self, order: f64) -> Option<(usize, bool)> {
        let units = self.units_of(order).ok()?;
        let index = usize::try_from(units.unsigned_abs()).ok()?;
        (index < self.core.size()).then_some((index, units < 0))
    }

    fn order_vectors(&self) -> Vec<[f64; 3]> {
        self.orders().into_iter().map(|k| [k, 0.0, 0.0]).collect()
    }

    fn apply_time_interval(&mut self, interval: &TimeInterval) -> Result<(), EpgError> {
        let duration = interval.duration();
        let units = self.units_of(interval.axial_moment()?)?;
        let delta_k = units as f64 * self.unit;
        self.core.relax(duration);
        self.diffuse_moment(duration, delta_k);
        self.shift_units(units);
        self.core.off_resonance(duration);
        self.move_bulk(duration, delta_k);
        self.prune();
        self.core.advance(duration);
        Ok(())
    }

    fn prune(&mut self) {
        let start = Instant::now();
        let threshold = self.core.threshold();
        let removed = prune::trim_tail(&mut self.core.arrays, threshold);
        if removed > 0 {
            self.core.reordered();
        }
        self.core.timings.record(Operation::Prune, start);
    }
}
