//! Arbitrary-step store over a sorted set of signed bin keys.

use std::time::Instant;

use epg_core::errors::{EpgError, ErrorInfo};
use epg_core::units::{Dimensions, Quantity};
use epg_core::{dephasing_from, moment_from, TimeInterval};
use epg_ops::{attenuation, bulk_motion, PoolModel};

use crate::cache::Cached;
use crate::config::ModelOptions;
use crate::engine::{duration_of, ModelCore};
use crate::fold::{check_shift, shift_folded};
use crate::model::ConfigurationModel;
use crate::prune;
use crate::timing::Operation;

pub(crate) fn bins_of(moment: f64, bin_width: f64) -> Result<i64, EpgError> {
    let bins = (moment / bin_width).round();
    if !bins.is_finite() || bins.abs() >= i64::MAX as f64 / 4.0 {
        return Err(EpgError::Gradient(
            ErrorInfo::new("unrepresentable-moment", "gradient moment has no bin count")
                .with_context("moment", moment)
                .with_context("bin_width", bin_width),
        ));
    }
    Ok(bins as i64)
}

/// One-dimensional configuration store accepting any gradient moment.
///
/// Moments are quantized to `bin_width`; keys are the non-negative bin
/// counts in ascending order, so order 0 stays at index 0.
#[derive(Debug, Clone)]
pub struct DiscreteModel {
    core: ModelCore,
    keys: Vec<i64>,
    bin_width: f64,
    wavenumbers: Cached<Vec<f64>>,
}

impl DiscreteModel {
    /// Model holding only order 0.
    pub fn new(pools: PoolModel, options: &ModelOptions) -> Result<Self, EpgError> {
        let core = ModelCore::new(pools, options, 1)?;
        Ok(Self {
            core,
            keys: vec![0],
            bin_width: options.discrete.bin_width,
            wavenumbers: Cached::new(),
        })
    }

    /// Bin width (rad/m).
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Stored bin keys.
    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    /// Sets the bulk velocity along the gradient axis.
    pub fn set_velocity(&mut self, velocity: Quantity) -> Result<(), EpgError> {
        let zero = Quantity::new(0.0, Dimensions::velocity());
        self.core.set_velocity([velocity, zero, zero])
    }

    /// Shifts by a gradient area or dephasing.
    pub fn shift(&mut self, gradient: Quantity) -> Result<(), EpgError> {
        let bins = bins_of(moment_from(gradient)?, self.bin_width)?;
        self.shift_bins(bins)
    }

    /// Shifts by `bins` bins. Fails without mutation when a shifted order
    /// would leave the representable range.
    pub fn shift_bins(&mut self, bins: i64) -> Result<(), EpgError> {
        if bins == 0 {
            return Ok(());
        }
        let start = Instant::now();
        let folded = shift_folded(&self.keys, &self.core.arrays, bins)?;
        self.keys = folded.keys;
        self.core.replace_arrays(folded.arrays);
        self.core.timings.record(Operation::Shift, start);
        Ok(())
    }

    /// Diffusion alone over `duration`, with the gradient given as an
    /// amplitude, area or dephasing.
    pub fn diffuse(&mut self, duration: Quantity, gradient: Quantity) -> Result<(), EpgError> {
        let duration = duration_of(duration)?;
        let bins = bins_of(dephasing_from(duration, gradient)?, self.bin_width)?;
        self.diffuse_bins(duration, bins);
        Ok(())
    }

    /// One interval built from a duration and a gradient amplitude, area or
    /// dephasing.
    pub fn apply_interval(&mut self, duration: Quantity, gradient: Quantity) -> Result<(), EpgError> {
        let interval = TimeInterval::new(duration, gradient)?;
        self.apply_time_interval(&interval)
    }

    fn diffuse_bins(&mut self, duration: f64, bins: i64) {
        let delta_k = bins as f64 * self.bin_width;
        let (keys, bin_width) = (&self.keys, self.bin_width);
        let k = self
            .wavenumbers
            .get_or_update(self.core.generation(), |k| fill_wavenumbers(k, keys, bin_width));
        self.core.attenuate(|index, species| {
            attenuation(duration, k[index], delta_k, species.mean_diffusivity())
        });
    }

    fn move_bins(&mut self, duration: f64, bins: i64) {
        let velocity = self.core.velocity()[0];
        if velocity == 0.0 || duration == 0.0 {
            return;
        }
        let delta_k = bins as f64 * self.bin_width;
        let (keys, bin_width) = (&self.keys, self.bin_width);
        let k = self
            .wavenumbers
            .get_or_update(self.core.generation(), |k| fill_wavenumbers(k, keys, bin_width));
        self.core
            .move_bulk(|index| bulk_motion(duration, velocity, k[index], delta_k));
    }
}

fn fill_wavenumbers(k: &mut Vec<f64>, keys: &[i64], bin_width: f64) {
    k.clear();
    k.extend(keys.iter().map(|key| *key as f64 * bin_width));
}

impl ConfigurationModel for DiscreteModel {
    type Order = f64;

    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn orders(&self) -> Vec<f64> {
        self.keys
            .iter()
            .map(|key| *key as f64 * self.bin_width)
            .collect()
    }

    fn locate(&self, order: f64) -> Option<(usize, bool)> {
        let bins = bins_of(order, self.bin_width).ok()?;
        self.keys
            .binary_search(&bins.abs())
            .ok()
            .map(|index| (index, bins < 0))
    }

    fn order_vectors(&self) -> Vec<[f64; 3]> {
        self.orders().into_iter().map(|k| [k, 0.0, 0.0]).collect()
    }

    fn apply_time_interval(&mut self, interval: &TimeInterval) -> Result<(), EpgError> {
        let duration = interval.duration();
        let bins = bins_of(interval.axial_moment()?, self.bin_width)?;
        check_shift(self.keys.iter().copied(), bins)?;
        self.core.relax(duration);
        self.diffuse_bins(duration, bins);
        self.shift_bins(bins)?;
        self.core.off_resonance(duration);
        self.move_bins(duration, bins);
        self.prune();
        self.core.advance(duration);
        Ok(())
    }

    fn prune(&mut self) {
        let threshold = self.core.threshold();
        if threshold <= 0.0 {
            return;
        }
        let start = Instant::now();
        let keep = prune::significant(&self.core.arrays, threshold);
        if keep.iter().any(|kept| !kept) {
            prune::compact(&mut self.core.arrays, &keep);
            let mut flags = keep.iter();
            self.keys.retain(|_| flags.next().copied().unwrap_or(false));
            self.core.reordered();
        }
        self.core.timings.record(Operation::Prune, start);
    }
}
