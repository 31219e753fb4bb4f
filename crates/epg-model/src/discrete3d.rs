//! Arbitrary-step store over three-dimensional bin keys.

use std::time::Instant;

use indexmap::IndexSet;
use nalgebra::Vector3;

use epg_core::errors::EpgError;
use epg_core::units::Quantity;
use epg_core::{dephasing_from, moment_from, TimeInterval};
use epg_ops::{attenuation_3d, bulk_motion_3d, PoolModel};

use crate::cache::Cached;
use crate::config::ModelOptions;
use crate::engine::{duration_of, ModelCore};
use crate::discrete::bins_of;
use crate::fold::{check_shift, shift_folded, OrderKey};
use crate::model::ConfigurationModel;
use crate::prune;
use crate::timing::Operation;

/// Three-dimensional configuration store accepting any gradient moment.
///
/// Of each pair `±k` only the key whose first non-zero component is positive
/// is stored. Keys are kept in ascending order in an index set, so order 0
/// stays at index 0 and lookups by order are constant time.
#[derive(Debug, Clone)]
pub struct Discrete3DModel {
    core: ModelCore,
    keys: IndexSet<[i64; 3]>,
    bin_width: f64,
    wavenumbers: Cached<Vec<Vector3<f64>>>,
}

fn bins_of_3d(moment: &Vector3<f64>, bin_width: f64) -> Result<[i64; 3], EpgError> {
    Ok([
        bins_of(moment[0], bin_width)?,
        bins_of(moment[1], bin_width)?,
        bins_of(moment[2], bin_width)?,
    ])
}

fn fill_wavenumbers(k: &mut Vec<Vector3<f64>>, keys: &IndexSet<[i64; 3]>, bin_width: f64) {
    k.clear();
    k.extend(
        keys.iter()
            .map(|key| Vector3::new(key[0] as f64, key[1] as f64, key[2] as f64) * bin_width),
    );
}

impl Discrete3DModel {
    /// Model holding only order 0.
    pub fn new(pools: PoolModel, options: &ModelOptions) -> Result<Self, EpgError> {
        let core = ModelCore::new(pools, options, 1)?;
        let mut keys = IndexSet::new();
        keys.insert(<[i64; 3]>::ORIGIN);
        Ok(Self {
            core,
            keys,
            bin_width: options.discrete.bin_width,
            wavenumbers: Cached::new(),
        })
    }

    /// Bin width (rad/m).
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Stored bin keys.
    pub fn keys(&self) -> &IndexSet<[i64; 3]> {
        &self.keys
    }

    /// Sets the bulk velocity vector.
    pub fn set_velocity(&mut self, velocity: [Quantity; 3]) -> Result<(), EpgError> {
        self.core.set_velocity(velocity)
    }

    /// Shifts by a gradient area or dephasing along each axis.
    pub fn shift(&mut self, gradient: [Quantity; 3]) -> Result<(), EpgError> {
        let moment = Vector3::new(
            moment_from(gradient[0])?,
            moment_from(gradient[1])?,
            moment_from(gradient[2])?,
        );
        let bins = bins_of_3d(&moment, self.bin_width)?;
        self.shift_bins(bins)
    }

    /// Shifts by `bins` bins along each axis. Fails without mutation when a
    /// shifted order would leave the representable range.
    pub fn shift_bins(&mut self, bins: [i64; 3]) -> Result<(), EpgError> {
        if bins == <[i64; 3]>::ORIGIN {
            return Ok(());
        }
        let start = Instant::now();
        let keys: Vec<[i64; 3]> = self.keys.iter().copied().collect();
        let folded = shift_folded(&keys, &self.core.arrays, bins)?;
        self.keys = folded.keys.into_iter().collect();
        self.core.replace_arrays(folded.arrays);
        self.core.timings.record(Operation::Shift, start);
        Ok(())
    }

    /// Diffusion alone over `duration`, with each gradient component given as
    /// an amplitude, area or dephasing.
    pub fn diffuse(&mut self, duration: Quantity, gradient: [Quantity; 3]) -> Result<(), EpgError> {
        let duration = duration_of(duration)?;
        let moment = Vector3::new(
            dephasing_from(duration, gradient[0])?,
            dephasing_from(duration, gradient[1])?,
            dephasing_from(duration, gradient[2])?,
        );
        let bins = bins_of_3d(&moment, self.bin_width)?;
        self.diffuse_bins(duration, bins);
        Ok(())
    }

    /// One interval built from a duration and a gradient per axis.
    pub fn apply_interval(
        &mut self,
        duration: Quantity,
        gradient: [Quantity; 3],
    ) -> Result<(), EpgError> {
        let interval = TimeInterval::new_3d(duration, gradient)?;
        self.apply_time_interval(&interval)
    }

    fn moment_of(&self, bins: [i64; 3]) -> Vector3<f64> {
        Vector3::new(bins[0] as f64, bins[1] as f64, bins[2] as f64) * self.bin_width
    }

    fn diffuse_bins(&mut self, duration: f64, bins: [i64; 3]) {
        let delta_k = self.moment_of(bins);
        let (keys, bin_width) = (&self.keys, self.bin_width);
        let k = self
            .wavenumbers
            .get_or_update(self.core.generation(), |k| fill_wavenumbers(k, keys, bin_width));
        self.core.attenuate(|index, species| {
            attenuation_3d(duration, &k[index], &delta_k, species.diffusion_tensor())
        });
    }

    fn move_bins(&mut self, duration: f64, bins: [i64; 3]) {
        let velocity = self.core.velocity();
        if velocity == Vector3::zeros() || duration == 0.0 {
            return;
        }
        let delta_k = self.moment_of(bins);
        let (keys, bin_width) = (&self.keys, self.bin_width);
        let k = self
            .wavenumbers
            .get_or_update(self.core.generation(), |k| fill_wavenumbers(k, keys, bin_width));
        self.core
            .move_bulk(|index| bulk_motion_3d(duration, &velocity, &k[index], &delta_k));
    }
}

impl ConfigurationModel for Discrete3DModel {
    type Order = Vector3<f64>;

    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn orders(&self) -> Vec<Vector3<f64>> {
        self.keys.iter().map(|key| self.moment_of(*key)).collect()
    }

    fn locate(&self, order: Vector3<f64>) -> Option<(usize, bool)> {
        let bins = bins_of_3d(&order, self.bin_width).ok()?;
        let canonical = bins.canonical();
        self.keys
            .get_index_of(&canonical)
            .map(|index| (index, canonical != bins))
    }

    fn order_vectors(&self) -> Vec<[f64; 3]> {
        self.orders().into_iter().map(|k| [k[0], k[1], k[2]]).collect()
    }

    fn apply_time_interval(&mut self, interval: &TimeInterval) -> Result<(), EpgError> {
        let duration = interval.duration();
        let bins = bins_of_3d(&interval.gradient_moment(), self.bin_width)?;
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
