//! RF pulse operators acting on the `(F, F*, Z)` triple of each pool.

use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;

use crate::pool::PoolValues;

/// Rotation of the `(F, F*, Z)` column for a hard pulse of flip angle `angle`
/// and phase `phase`, both in radians.
pub fn single_pool(angle: f64, phase: f64) -> Matrix3<Complex64> {
    let i = Complex64::i();
    let half = 0.5 * angle;
    let cos_sq = Complex64::from(half.cos().powi(2));
    let sin_sq = half.sin().powi(2);
    let sin = angle.sin();
    let e_phase = Complex64::from_polar(1.0, phase);
    let e_double = Complex64::from_polar(1.0, 2.0 * phase);

    Matrix3::new(
        cos_sq,
        e_double * sin_sq,
        -i * e_phase * sin,
        e_double.conj() * sin_sq,
        cos_sq,
        i * e_phase.conj() * sin,
        -0.5 * i * e_phase.conj() * sin,
        0.5 * i * e_phase * sin,
        Complex64::from(angle.cos()),
    )
}

/// Pulse operator matched to a pool kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PulseOperator {
    /// One rotation for the single pool.
    Single(Matrix3<Complex64>),
    /// Independent rotations for pools a and b.
    Exchange([Matrix3<Complex64>; 2]),
    /// Rotation of pool a; pool b longitudinal magnetization scaled by `saturation`.
    MagnetizationTransfer {
        /// Rotation of the free pool.
        rotation: Matrix3<Complex64>,
        /// Fraction of the bound pool longitudinal magnetization left after the pulse.
        saturation: f64,
    },
}

fn rotate(
    matrix: &Matrix3<Complex64>,
    f: &mut PoolValues,
    f_star: &mut PoolValues,
    z: &mut PoolValues,
    pool: usize,
) {
    let rotated = matrix * Vector3::new(f[pool], f_star[pool], z[pool]);
    f[pool] = rotated[0];
    f_star[pool] = rotated[1];
    z[pool] = rotated[2];
}

impl PulseOperator {
    /// Applies the pulse to the states of one order.
    pub fn apply(&self, f: &mut PoolValues, f_star: &mut PoolValues, z: &mut PoolValues) {
        match self {
            PulseOperator::Single(matrix) => rotate(matrix, f, f_star, z, 0),
            PulseOperator::Exchange(matrices) => {
                rotate(&matrices[0], f, f_star, z, 0);
                rotate(&matrices[1], f, f_star, z, 1);
            }
            PulseOperator::MagnetizationTransfer {
                rotation,
                saturation,
            } => {
                rotate(rotation, f, f_star, z, 0);
                z[1] *= *saturation;
            }
        }
    }
}
