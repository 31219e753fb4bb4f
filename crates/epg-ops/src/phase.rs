//! Phase accumulation: off-resonance precession and bulk motion.

use std::f64::consts::PI;

use nalgebra::Vector3;
use num_complex::Complex64;

/// Phase factor `exp(iθ)`, `θ = 2π·duration·offset`, applied to `F`; `F*`
/// receives the conjugate.
pub fn off_resonance(duration: f64, offset: f64) -> Complex64 {
    Complex64::from_polar(1.0, 2.0 * PI * duration * offset)
}

/// Phase factors of the three branches under bulk motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPhase {
    /// Factor applied to `F`.
    pub f: Complex64,
    /// Factor applied to `F*`.
    pub f_star: Complex64,
    /// Factor applied to `Z`.
    pub z: Complex64,
}

fn phases(vk: f64, v_delta: f64, duration: f64) -> MotionPhase {
    MotionPhase {
        f: Complex64::from_polar(1.0, -duration * (vk - 0.5 * v_delta)),
        f_star: Complex64::from_polar(1.0, -duration * (vk + 0.5 * v_delta)),
        z: Complex64::from_polar(1.0, -duration * vk),
    }
}

/// Bulk-motion phases for a velocity (m/s) along the gradient axis, `k` the
/// post-shift wavenumber of the order and `delta_k` the interval moment.
///
/// Sign convention: `F·exp(−i·v·dt·(k − Δk/2))`, `F*·exp(−i·v·dt·(k + Δk/2))`,
/// `Z·exp(−i·v·dt·k)`. The `F*` factor is the conjugate of the `F` factor at
/// `−k`, so order 0 keeps `F*(0) = conj(F(0))`.
pub fn bulk_motion(duration: f64, velocity: f64, k: f64, delta_k: f64) -> MotionPhase {
    phases(velocity * k, velocity * delta_k, duration)
}

/// Three-dimensional bulk-motion phases, same convention with dot products.
pub fn bulk_motion_3d(
    duration: f64,
    velocity: &Vector3<f64>,
    k: &Vector3<f64>,
    delta_k: &Vector3<f64>,
) -> MotionPhase {
    phases(velocity.dot(k), velocity.dot(delta_k), duration)
}
