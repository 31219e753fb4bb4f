//! Relaxation and exchange over a duration, solved in closed form.
//!
//! The single pool decays independently in the transverse and longitudinal
//! directions. Two coupled pools follow the Bloch-McConnell system: a 2×2
//! linear system for the longitudinal pair and one for the transverse pair,
//! whose exponentials are evaluated with the Cayley-Hamilton form
//! `exp(A·t) = e^{μt}·(cosh(δt)·I + sinh(δt)/δ·(A − μI))`, `μ = tr(A)/2`,
//! `δ² = ((a₀₀ − a₁₁)/2)² + a₀₁·a₁₀`.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;

use crate::pool::PoolValues;

/// Exponential `exp(a·t)` of a 2×2 complex matrix.
pub fn expm2(a: &Matrix2<Complex64>, t: f64) -> Matrix2<Complex64> {
    let mu = (a[(0, 0)] + a[(1, 1)]) * 0.5;
    let half_diff = (a[(0, 0)] - a[(1, 1)]) * 0.5;
    let delta = (half_diff * half_diff + a[(0, 1)] * a[(1, 0)]).sqrt();
    let x = delta * t;
    let sinh_ratio = if x.norm() < 1e-6 {
        Complex64::from(t) * (Complex64::from(1.0) + x * x / 6.0)
    } else {
        x.sinh() / delta
    };
    let shifted = a - Matrix2::from_diagonal_element(mu);
    (Matrix2::identity() * x.cosh() + shifted * sinh_ratio) * (mu * t).exp()
}

/// Longitudinal and transverse decay factors of a single pool.
pub fn single_pool(r1: f64, r2: f64, duration: f64) -> (f64, f64) {
    ((-r1 * duration).exp(), (-r2 * duration).exp())
}

/// Relaxation operator matched to a pool kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RelaxationOperator {
    /// Independent decay of one pool with recovery towards equilibrium.
    Single {
        /// Longitudinal decay factor.
        e1: f64,
        /// Transverse decay factor.
        e2: f64,
        /// Longitudinal recovery added to order 0.
        recovery: f64,
    },
    /// Coupled decay of two pools.
    Coupled {
        /// Propagator of the `F` pair; the `F*` pair uses its conjugate.
        transverse: Matrix2<Complex64>,
        /// Propagator of the `Z` pair.
        longitudinal: Matrix2<f64>,
        /// Longitudinal recovery added to order 0.
        recovery: Vector2<f64>,
    },
}

/// Parameters of a two-pool exchange system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRates {
    /// Longitudinal relaxation rates of pools a and b (s⁻¹).
    pub r1: [f64; 2],
    /// Transverse relaxation rates of pools a and b (s⁻¹).
    pub r2: [f64; 2],
    /// Exchange rate from a to b (s⁻¹).
    pub k_a: f64,
    /// Exchange rate from b to a (s⁻¹).
    pub k_b: f64,
    /// Frequency offset of pool b relative to pool a (Hz).
    pub delta_b: f64,
    /// Equilibrium populations.
    pub m0: [f64; 2],
}

fn longitudinal_propagator(rates: &ExchangeRates, duration: f64) -> (Matrix2<f64>, Vector2<f64>) {
    let system = Matrix2::new(
        -rates.r1[0] - rates.k_a,
        rates.k_b,
        rates.k_a,
        -rates.r1[1] - rates.k_b,
    )
    .map(Complex64::from);
    let propagator = expm2(&system, duration).map(|value| value.re);
    let recovery = (Matrix2::identity() - propagator) * Vector2::new(rates.m0[0], rates.m0[1]);
    (propagator, recovery)
}

/// Bloch-McConnell propagators of two exchanging pools.
pub fn exchange(rates: &ExchangeRates, duration: f64) -> RelaxationOperator {
    let (longitudinal, recovery) = longitudinal_propagator(rates, duration);
    let transverse_system = Matrix2::new(
        Complex64::from(-rates.r2[0] - rates.k_a),
        Complex64::from(rates.k_b),
        Complex64::from(rates.k_a),
        Complex64::new(-rates.r2[1] - rates.k_b, 2.0 * PI * rates.delta_b),
    );
    RelaxationOperator::Coupled {
        transverse: expm2(&transverse_system, duration),
        longitudinal,
        recovery,
    }
}

/// Propagators of a free pool exchanging longitudinal magnetization with a
/// transverse-silent bound pool. Only `r2[0]` is used.
pub fn magnetization_transfer(rates: &ExchangeRates, duration: f64) -> RelaxationOperator {
    let (longitudinal, recovery) = longitudinal_propagator(rates, duration);
    let e2 = (-rates.r2[0] * duration).exp();
    RelaxationOperator::Coupled {
        transverse: Matrix2::new(
            Complex64::from(e2),
            Complex64::from(0.0),
            Complex64::from(0.0),
            Complex64::from(0.0),
        ),
        longitudinal,
        recovery,
    }
}

impl RelaxationOperator {
    /// Applies the operator to the states of one order; recovery is only
    /// added when `order_zero` is set.
    pub fn apply(
        &self,
        f: &mut PoolValues,
        f_star: &mut PoolValues,
        z: &mut PoolValues,
        order_zero: bool,
    ) {
        match self {
            RelaxationOperator::Single { e1, e2, recovery } => {
                f[0] *= *e2;
                f_star[0] *= *e2;
                z[0] *= *e1;
                if order_zero {
                    z[0] += *recovery;
                }
            }
            RelaxationOperator::Coupled {
                transverse: t,
                longitudinal: l,
                recovery,
            } => {
                let (fa, fb) = (f[0], f[1]);
                f[0] = t[(0, 0)] * fa + t[(0, 1)] * fb;
                f[1] = t[(1, 0)] * fa + t[(1, 1)] * fb;
                let (sa, sb) = (f_star[0], f_star[1]);
                f_star[0] = t[(0, 0)].conj() * sa + t[(0, 1)].conj() * sb;
                f_star[1] = t[(1, 0)].conj() * sa + t[(1, 1)].conj() * sb;
                let (za, zb) = (z[0], z[1]);
                z[0] = za * l[(0, 0)] + zb * l[(0, 1)];
                z[1] = za * l[(1, 0)] + zb * l[(1, 1)];
                if order_zero {
                    z[0] += recovery[0];
                    z[1] += recovery[1];
                }
            }
        }
    }
}
