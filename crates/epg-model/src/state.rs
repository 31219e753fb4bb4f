//! Per-order state storage shared by the configuration stores.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use epg_ops::{PoolValues, ZERO_POOLS};

/// Configuration state of one pool at one order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    /// Transverse state on the positive-order branch.
    pub f: Complex64,
    /// Conjugate transverse state on the negative-order branch.
    pub f_star: Complex64,
    /// Longitudinal state.
    pub z: Complex64,
}

impl Triple {
    /// State of the mirrored order `−k`, given the state stored at `k`.
    pub fn mirrored(self) -> Triple {
        Triple {
            f: self.f_star.conj(),
            f_star: self.f.conj(),
            z: self.z.conj(),
        }
    }
}

/// Dense `F`, `F*` and `Z` arrays with an active length that may be
/// shorter than the allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct StateArrays {
    pub(crate) f: Vec<PoolValues>,
    pub(crate) f_star: Vec<PoolValues>,
    pub(crate) z: Vec<PoolValues>,
    pub(crate) len: usize,
}

impl StateArrays {
    /// Arrays holding a single order with the given values.
    pub fn with_order_zero(
        values: (PoolValues, PoolValues, PoolValues),
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        let mut arrays = Self {
            f: vec![ZERO_POOLS; capacity],
            f_star: vec![ZERO_POOLS; capacity],
            z: vec![ZERO_POOLS; capacity],
            len: 1,
        };
        arrays.f[0] = values.0;
        arrays.f_star[0] = values.1;
        arrays.z[0] = values.2;
        arrays
    }

    /// Arrays built from exactly `len` orders.
    pub fn from_parts(f: Vec<PoolValues>, f_star: Vec<PoolValues>, z: Vec<PoolValues>) -> Self {
        let len = f.len();
        Self { f, f_star, z, len }
    }

    /// Number of active orders.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no order is active.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated orders.
    pub fn capacity(&self) -> usize {
        self.f.len()
    }

    /// Grows the allocation by `step` zeroed orders.
    pub fn grow(&mut self, step: usize) {
        let capacity = self.capacity() + step;
        self.f.resize(capacity, ZERO_POOLS);
        self.f_star.resize(capacity, ZERO_POOLS);
        self.z.resize(capacity, ZERO_POOLS);
    }

    /// Zeroes every order at or beyond `len` and makes `len` the active length.
    pub fn truncate(&mut self, len: usize) {
        for index in len..self.len {
            self.f[index] = ZERO_POOLS;
            self.f_star[index] = ZERO_POOLS;
            self.z[index] = ZERO_POOLS;
        }
        self.len = len.min(self.len);
    }

    /// State of `pool` at `index`, without bounds checks against `len`.
    pub fn triple(&self, index: usize, pool: usize) -> Triple {
        Triple {
            f: self.f[index][pool],
            f_star: self.f_star[index][pool],
            z: self.z[index][pool],
        }
    }

    /// Summed squared magnitude of every branch and pool at `index`.
    pub fn magnitude_sqr(&self, index: usize) -> f64 {
        let sum = |values: &PoolValues| values.iter().map(|v| v.norm_sqr()).sum::<f64>();
        sum(&self.f[index]) + sum(&self.f_star[index]) + sum(&self.z[index])
    }

    /// Active `F` values.
    pub fn f(&self) -> &[PoolValues] {
        &self.f[..self.len]
    }

    /// Active `F*` values.
    pub fn f_star(&self) -> &[PoolValues] {
        &self.f_star[..self.len]
    }

    /// Active `Z` values.
    pub fn z(&self) -> &[PoolValues] {
        &self.z[..self.len]
    }
}
