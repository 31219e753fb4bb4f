//! Diffusion attenuation of configuration states over a gradient interval.

use nalgebra::{Matrix3, Vector3};

/// Attenuation factors of the three branches of one configuration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Factor applied to `F`.
    pub transverse_plus: f64,
    /// Factor applied to `F*`.
    pub transverse_minus: f64,
    /// Factor applied to `Z`.
    pub longitudinal: f64,
}

impl Attenuation {
    /// No attenuation.
    pub const NONE: Attenuation = Attenuation {
        transverse_plus: 1.0,
        transverse_minus: 1.0,
        longitudinal: 1.0,
    };
}

/// Attenuation of order `k` (pre-shift wavenumber, rad/m) while a gradient
/// of moment `delta_k` is played over `duration`, for a diffusivity in m²/s.
///
/// `F` travels from `k` to `k + Δk` and `F*` from `−k` to `−k + Δk`, so the
/// transverse b-values differ: `b_T± = dt·((k ± Δk/2)² + Δk²/12)`.
pub fn attenuation(duration: f64, k: f64, delta_k: f64, diffusivity: f64) -> Attenuation {
    let b_plus = duration * ((k + 0.5 * delta_k).powi(2) + delta_k * delta_k / 12.0);
    let b_minus = duration * ((k - 0.5 * delta_k).powi(2) + delta_k * delta_k / 12.0);
    let b_long = duration * k * k;
    Attenuation {
        transverse_plus: (-b_plus * diffusivity).exp(),
        transverse_minus: (-b_minus * diffusivity).exp(),
        longitudinal: (-b_long * diffusivity).exp(),
    }
}

/// Three-dimensional attenuation, contracting the b-tensors with the
/// diffusion tensor.
pub fn attenuation_3d(
    duration: f64,
    k: &Vector3<f64>,
    delta_k: &Vector3<f64>,
    diffusion: &Matrix3<f64>,
) -> Attenuation {
    let spread = delta_k * delta_k.transpose() / 12.0;
    let plus = k + delta_k * 0.5;
    let minus = -k + delta_k * 0.5;
    let contract = |b: Matrix3<f64>| (b * duration).component_mul(diffusion).sum();
    Attenuation {
        transverse_plus: (-contract(plus * plus.transpose() + spread)).exp(),
        transverse_minus: (-contract(minus * minus.transpose() + spread)).exp(),
        longitudinal: (-contract(k * k.transpose())).exp(),
    }
}
