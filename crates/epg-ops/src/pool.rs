//! Magnetization pools and the pool-kind dispatch of pulses and relaxation.

use nalgebra::Vector3;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use epg_core::errors::{require_non_negative, EpgError, ErrorInfo};
use epg_core::species::rate_from;
use epg_core::units::{Dimensions, Quantity};
use epg_core::Species;

use crate::pulse::{self, PulseOperator};
use crate::relaxation::{self, ExchangeRates, RelaxationOperator};

/// Largest number of pools held by any model.
pub const MAX_POOLS: usize = 2;

/// Per-pool values of one branch (`F`, `F*` or `Z`) at one order.
pub type PoolValues = [Complex64; MAX_POOLS];

/// Pool values with every entry zero.
pub const ZERO_POOLS: PoolValues = [Complex64::new(0.0, 0.0); MAX_POOLS];

/// Tag of a pool model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolKind {
    /// One independent pool.
    SinglePool,
    /// Two pools exchanging transverse and longitudinal magnetization.
    Exchange,
    /// A free pool and a transverse-silent bound pool.
    MagnetizationTransfer,
}

impl PoolKind {
    /// Number of pools carried by this kind.
    pub fn pool_count(self) -> usize {
        match self {
            PoolKind::SinglePool => 1,
            PoolKind::Exchange | PoolKind::MagnetizationTransfer => 2,
        }
    }
}

/// Species record and initial magnetization of one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Relaxation, diffusion and frequency parameters.
    pub species: Species,
    /// Initial magnetization `(x, y, z)`; its norm is the equilibrium population.
    pub magnetization: Vector3<f64>,
}

impl Pool {
    /// Equilibrium longitudinal population.
    pub fn equilibrium(&self) -> f64 {
        self.magnetization.norm()
    }
}

/// Pulse requested by a caller, before dispatch on the pool kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseRequest {
    /// Same angle and phase for every transverse-active pool.
    Uniform {
        /// Flip angle (rad).
        angle: f64,
        /// Phase (rad).
        phase: f64,
    },
    /// Independent angles and phases for the two exchanging pools.
    PerPool {
        /// Flip angles of pools a and b (rad).
        angles: [f64; 2],
        /// Phases of pools a and b (rad).
        phases: [f64; 2],
    },
    /// Rotation of the free pool and saturation of the bound pool.
    Saturating {
        /// Flip angle (rad).
        angle: f64,
        /// Phase (rad).
        phase: f64,
        /// Surviving fraction of the bound pool longitudinal magnetization.
        saturation: f64,
    },
}

/// Pool configuration of a model: kind and per-kind parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PoolModel {
    /// One independent pool.
    SinglePool {
        /// The pool.
        pool: Pool,
    },
    /// Two exchanging pools.
    Exchange {
        /// Pool a.
        a: Pool,
        /// Pool b.
        b: Pool,
        /// Exchange rate from a to b (s⁻¹).
        k_a: f64,
        /// Exchange rate from b to a (s⁻¹), `k_a·M0_a/M0_b`.
        k_b: f64,
        /// Frequency offset of pool b relative to pool a (Hz).
        delta_b: f64,
    },
    /// Free pool with a bound, transverse-silent pool.
    MagnetizationTransfer {
        /// Free pool.
        a: Pool,
        /// Longitudinal relaxation rate of the bound pool (s⁻¹).
        r1_b: f64,
        /// Initial longitudinal magnetization of the bound pool.
        z_b: f64,
        /// Exchange rate from a to b (s⁻¹).
        k_a: f64,
        /// Exchange rate from b to a (s⁻¹).
        k_b: f64,
    },
}

fn pool_kind_error(expected: &str, found: PoolKind) -> EpgError {
    EpgError::Pool(
        ErrorInfo::new("pool-kind", "operation is invalid for this pool kind")
            .with_context("expected", expected)
            .with_context("found", format!("{found:?}")),
    )
}

fn derived_rate(k_a: f64, m0_a: f64, m0_b: f64) -> Result<f64, EpgError> {
    if k_a == 0.0 {
        return Ok(0.0);
    }
    if m0_b == 0.0 {
        return Err(EpgError::Parameter(
            ErrorInfo::new("empty-pool", "pool b must be populated to exchange")
                .with_context("k_a", k_a),
        ));
    }
    Ok(k_a * m0_a / m0_b)
}

fn check_magnetization(name: &str, magnetization: &Vector3<f64>) -> Result<(), EpgError> {
    if magnetization.iter().any(|value| !value.is_finite()) {
        return Err(EpgError::parameter(
            "non-finite-magnetization",
            format!("magnetization of {name} must be finite"),
        ));
    }
    Ok(())
}

impl PoolModel {
    /// Single pool starting from `magnetization`.
    pub fn single(species: Species, magnetization: Vector3<f64>) -> Result<Self, EpgError> {
        check_magnetization("pool", &magnetization)?;
        Ok(PoolModel::SinglePool {
            pool: Pool {
                species,
                magnetization,
            },
        })
    }

    /// Single pool at equilibrium `(0, 0, 1)`.
    pub fn at_equilibrium(species: Species) -> Self {
        PoolModel::SinglePool {
            pool: Pool {
                species,
                magnetization: Vector3::new(0.0, 0.0, 1.0),
            },
        }
    }

    /// Two exchanging pools; `k_a` is a rate and `delta_b` a frequency.
    pub fn exchange(
        species_a: Species,
        species_b: Species,
        magnetization_a: Vector3<f64>,
        magnetization_b: Vector3<f64>,
        k_a: Quantity,
        delta_b: Quantity,
    ) -> Result<Self, EpgError> {
        check_magnetization("pool a", &magnetization_a)?;
        check_magnetization("pool b", &magnetization_b)?;
        let k_a = require_non_negative("k_a", k_a.require(Dimensions::frequency(), "k_a")?)?;
        let delta_b = delta_b.require(Dimensions::frequency(), "delta_b")?;
        let a = Pool {
            species: species_a,
            magnetization: magnetization_a,
        };
        let b = Pool {
            species: species_b,
            magnetization: magnetization_b,
        };
        let k_b = derived_rate(k_a, a.equilibrium(), b.equilibrium())?;
        Ok(PoolModel::Exchange {
            a,
            b,
            k_a,
            k_b,
            delta_b,
        })
    }

    /// Free pool and bound pool; `r1_b` is a rate or a time, `k_a` a rate.
    /// The bound pool must be purely longitudinal.
    pub fn magnetization_transfer(
        species_a: Species,
        r1_b: Quantity,
        magnetization_a: Vector3<f64>,
        magnetization_b: Vector3<f64>,
        k_a: Quantity,
    ) -> Result<Self, EpgError> {
        check_magnetization("pool a", &magnetization_a)?;
        check_magnetization("pool b", &magnetization_b)?;
        if magnetization_b[0] != 0.0 || magnetization_b[1] != 0.0 {
            return Err(EpgError::Parameter(
                ErrorInfo::new(
                    "transverse-bound-pool",
                    "bound pool has no transverse magnetization",
                )
                .with_context("x", magnetization_b[0])
                .with_context("y", magnetization_b[1]),
            ));
        }
        let r1_b = rate_from(r1_b, "R1_b")?;
        let k_a = require_non_negative("k_a", k_a.require(Dimensions::frequency(), "k_a")?)?;
        let a = Pool {
            species: species_a,
            magnetization: magnetization_a,
        };
        let z_b = magnetization_b[2];
        let k_b = derived_rate(k_a, a.equilibrium(), z_b.abs())?;
        Ok(PoolModel::MagnetizationTransfer {
            a,
            r1_b,
            z_b,
            k_a,
            k_b,
        })
    }

    /// Tag of this model.
    pub fn kind(&self) -> PoolKind {
        match self {
            PoolModel::SinglePool { .. } => PoolKind::SinglePool,
            PoolModel::Exchange { .. } => PoolKind::Exchange,
            PoolModel::MagnetizationTransfer { .. } => PoolKind::MagnetizationTransfer,
        }
    }

    /// Number of pools.
    pub fn pool_count(&self) -> usize {
        self.kind().pool_count()
    }

    /// Fails unless `pool` indexes one of the pools.
    pub fn check_pool(&self, pool: usize) -> Result<(), EpgError> {
        if pool >= self.pool_count() {
            return Err(EpgError::Pool(
                ErrorInfo::new("pool-index", "pool index out of range")
                    .with_context("pool", pool)
                    .with_context("pool_count", self.pool_count()),
            ));
        }
        Ok(())
    }

    /// Species of `pool`; the bound pool of a transfer model has none.
    pub fn species(&self, pool: usize) -> Result<&Species, EpgError> {
        self.check_pool(pool)?;
        match (self, pool) {
            (PoolModel::SinglePool { pool }, _) => Ok(&pool.species),
            (PoolModel::Exchange { a, .. }, 0) | (PoolModel::MagnetizationTransfer { a, .. }, 0) => {
                Ok(&a.species)
            }
            (PoolModel::Exchange { b, .. }, _) => Ok(&b.species),
            (PoolModel::MagnetizationTransfer { .. }, _) => Err(EpgError::pool(
                "bound-pool-species",
                "the bound pool only carries a longitudinal rate",
            )),
        }
    }

    /// Replaces the species of `pool`.
    pub fn set_species(&mut self, pool: usize, species: Species) -> Result<(), EpgError> {
        self.species(pool)?;
        match (self, pool) {
            (PoolModel::SinglePool { pool }, _) => pool.species = species,
            (PoolModel::Exchange { a, .. }, 0) | (PoolModel::MagnetizationTransfer { a, .. }, 0) => {
                a.species = species
            }
            (PoolModel::Exchange { b, .. }, _) => b.species = species,
            (PoolModel::MagnetizationTransfer { .. }, _) => {}
        }
        Ok(())
    }

    /// Equilibrium longitudinal population of `pool`.
    pub fn equilibrium(&self, pool: usize) -> Result<f64, EpgError> {
        self.check_pool(pool)?;
        Ok(match (self, pool) {
            (PoolModel::SinglePool { pool }, _) => pool.equilibrium(),
            (PoolModel::Exchange { a, .. }, 0) | (PoolModel::MagnetizationTransfer { a, .. }, 0) => {
                a.equilibrium()
            }
            (PoolModel::Exchange { b, .. }, _) => b.equilibrium(),
            (PoolModel::MagnetizationTransfer { z_b, .. }, _) => z_b.abs(),
        })
    }

    /// Initial `(F, F*, Z)` of each pool at order 0.
    pub fn initial_state(&self) -> (PoolValues, PoolValues, PoolValues) {
        let mut f = ZERO_POOLS;
        let mut f_star = ZERO_POOLS;
        let mut z = ZERO_POOLS;
        let mut set = |index: usize, m: &Vector3<f64>| {
            f[index] = Complex64::new(m[0], m[1]);
            f_star[index] = f[index].conj();
            z[index] = Complex64::from(m[2]);
        };
        match self {
            PoolModel::SinglePool { pool } => set(0, &pool.magnetization),
            PoolModel::Exchange { a, b, .. } => {
                set(0, &a.magnetization);
                set(1, &b.magnetization);
            }
            PoolModel::MagnetizationTransfer { a, z_b, .. } => {
                set(0, &a.magnetization);
                set(1, &Vector3::new(0.0, 0.0, *z_b));
            }
        }
        (f, f_star, z)
    }

    /// Exchange rates `(k_a, k_b)`; fails on a single pool.
    pub fn exchange_rates(&self) -> Result<(f64, f64), EpgError> {
        match self {
            PoolModel::Exchange { k_a, k_b, .. }
            | PoolModel::MagnetizationTransfer { k_a, k_b, .. } => Ok((*k_a, *k_b)),
            PoolModel::SinglePool { .. } => Err(pool_kind_error("two pools", self.kind())),
        }
    }

    /// Exchange rate from pool a to pool b (s⁻¹).
    pub fn k_a(&self) -> Result<f64, EpgError> {
        self.exchange_rates().map(|(k_a, _)| k_a)
    }

    /// Exchange rate from pool b to pool a (s⁻¹).
    pub fn k_b(&self) -> Result<f64, EpgError> {
        self.exchange_rates().map(|(_, k_b)| k_b)
    }

    /// Sets `k_a` and re-derives `k_b` from the equilibrium populations.
    pub fn set_exchange_rate(&mut self, k_a: Quantity) -> Result<(), EpgError> {
        let value = require_non_negative("k_a", k_a.require(Dimensions::frequency(), "k_a")?)?;
        let kind = self.kind();
        let (m0_a, m0_b) = match self {
            PoolModel::SinglePool { .. } => return Err(pool_kind_error("two pools", kind)),
            PoolModel::Exchange { a, b, .. } => (a.equilibrium(), b.equilibrium()),
            PoolModel::MagnetizationTransfer { a, z_b, .. } => (a.equilibrium(), z_b.abs()),
        };
        let derived = derived_rate(value, m0_a, m0_b)?;
        match self {
            PoolModel::Exchange { k_a, k_b, .. }
            | PoolModel::MagnetizationTransfer { k_a, k_b, .. } => {
                *k_a = value;
                *k_b = derived;
            }
            PoolModel::SinglePool { .. } => {}
        }
        Ok(())
    }

    /// Frequency offset of pool b relative to pool a; exchange models only.
    pub fn delta_b(&self) -> Result<f64, EpgError> {
        match self {
            PoolModel::Exchange { delta_b, .. } => Ok(*delta_b),
            _ => Err(pool_kind_error("exchange", self.kind())),
        }
    }

    /// Sets the frequency offset of pool b; exchange models only.
    pub fn set_delta_b(&mut self, value: Quantity) -> Result<(), EpgError> {
        let value = value.require(Dimensions::frequency(), "delta_b")?;
        let kind = self.kind();
        match self {
            PoolModel::Exchange { delta_b, .. } => {
                *delta_b = value;
                Ok(())
            }
            _ => Err(pool_kind_error("exchange", kind)),
        }
    }

    /// Species of each pool with a non-zero diffusion tensor. The bound pool
    /// of a magnetization-transfer model never diffuses.
    pub fn diffusing_species(&self) -> [Option<&Species>; MAX_POOLS] {
        let species = match self {
            PoolModel::SinglePool { pool } => [Some(&pool.species), None],
            PoolModel::Exchange { a, b, .. } => [Some(&a.species), Some(&b.species)],
            PoolModel::MagnetizationTransfer { a, .. } => [Some(&a.species), None],
        };
        species.map(|species| {
            species.filter(|species| species.diffusion_tensor().iter().any(|d| *d != 0.0))
        })
    }

    /// Species frequency offset of each pool (Hz).
    pub fn frequency_offsets(&self) -> [f64; MAX_POOLS] {
        match self {
            PoolModel::SinglePool { pool } => [pool.species.delta_omega(), 0.0],
            PoolModel::Exchange { a, b, .. } => [a.species.delta_omega(), b.species.delta_omega()],
            PoolModel::MagnetizationTransfer { a, .. } => [a.species.delta_omega(), 0.0],
        }
    }

    /// Resolves a pulse request into the operator matching this pool kind.
    pub fn pulse_operator(&self, request: &PulseRequest) -> Result<PulseOperator, EpgError> {
        match (self, request) {
            (PoolModel::SinglePool { .. }, PulseRequest::Uniform { angle, phase }) => {
                Ok(PulseOperator::Single(pulse::single_pool(*angle, *phase)))
            }
            (PoolModel::Exchange { .. }, PulseRequest::Uniform { angle, phase }) => {
                let matrix = pulse::single_pool(*angle, *phase);
                Ok(PulseOperator::Exchange([matrix, matrix]))
            }
            (PoolModel::Exchange { .. }, PulseRequest::PerPool { angles, phases }) => {
                Ok(PulseOperator::Exchange([
                    pulse::single_pool(angles[0], phases[0]),
                    pulse::single_pool(angles[1], phases[1]),
                ]))
            }
            (
                PoolModel::MagnetizationTransfer { .. },
                PulseRequest::Saturating {
                    angle,
                    phase,
                    saturation,
                },
            ) => {
                if !(0.0..=1.0).contains(saturation) {
                    return Err(EpgError::Parameter(
                        ErrorInfo::new("saturation-range", "saturation must lie in [0, 1]")
                            .with_context("saturation", saturation),
                    ));
                }
                Ok(PulseOperator::MagnetizationTransfer {
                    rotation: pulse::single_pool(*angle, *phase),
                    saturation: *saturation,
                })
            }
            (PoolModel::MagnetizationTransfer { .. }, _) => Err(EpgError::Pool(
                ErrorInfo::new("pool-kind", "operation is invalid for this pool kind")
                    .with_context("found", "MagnetizationTransfer")
                    .with_hint("magnetization transfer pulses need a saturation"),
            )),
            (_, PulseRequest::PerPool { .. }) => Err(pool_kind_error("exchange", self.kind())),
            (_, PulseRequest::Saturating { .. }) => {
                Err(pool_kind_error("magnetization-transfer", self.kind()))
            }
        }
    }

    /// Relaxation operator over `duration` seconds for this pool kind.
    pub fn relaxation_operator(&self, duration: f64) -> RelaxationOperator {
        match self {
            PoolModel::SinglePool { pool } => {
                let (e1, e2) =
                    relaxation::single_pool(pool.species.r1(), pool.species.r2(), duration);
                RelaxationOperator::Single {
                    e1,
                    e2,
                    recovery: pool.equilibrium() * (1.0 - e1),
                }
            }
            PoolModel::Exchange {
                a,
                b,
                k_a,
                k_b,
                delta_b,
            } => relaxation::exchange(
                &ExchangeRates {
                    r1: [a.species.r1(), b.species.r1()],
                    r2: [a.species.r2(), b.species.r2()],
                    k_a: *k_a,
                    k_b: *k_b,
                    delta_b: *delta_b,
                    m0: [a.equilibrium(), b.equilibrium()],
                },
                duration,
            ),
            PoolModel::MagnetizationTransfer {
                a,
                r1_b,
                z_b,
                k_a,
                k_b,
            } => relaxation::magnetization_transfer(
                &ExchangeRates {
                    r1: [a.species.r1(), *r1_b],
                    r2: [a.species.r2(), 0.0],
                    k_a: *k_a,
                    k_b: *k_b,
                    delta_b: 0.0,
                    m0: [a.equilibrium(), z_b.abs()],
                },
                duration,
            ),
        }
    }
}
