//! Relaxation, diffusion and frequency parameters of a magnetization pool.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, EpgError, ErrorInfo};
use crate::units::{Dimensions, Quantity};

/// Accepts either a rate (s⁻¹) or a characteristic time (s), returning the rate.
pub fn rate_from(value: Quantity, name: &str) -> Result<f64, EpgError> {
    let rate = if value.has_dimensions(Dimensions::frequency()) {
        value.magnitude
    } else if value.has_dimensions(Dimensions::time()) {
        if value.magnitude == 0.0 {
            return Err(EpgError::Parameter(
                ErrorInfo::new("zero-time", "relaxation time must be positive")
                    .with_context("parameter", name),
            ));
        }
        1.0 / value.magnitude
    } else {
        return Err(EpgError::Dimension(
            ErrorInfo::new("dimension-mismatch", "expected a rate or a time")
                .with_context("quantity", name)
                .with_context("found", value.dimensions),
        ));
    };
    require_non_negative(name, rate)
}

/// Physical parameters of one pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    r1: f64,
    r2: f64,
    diffusion: Matrix3<f64>,
    delta_omega: f64,
}

impl Species {
    /// Creates a species from R1 (or T1) and R2 (or T2), without diffusion or offset.
    pub fn new(r1_or_t1: Quantity, r2_or_t2: Quantity) -> Result<Self, EpgError> {
        Ok(Self {
            r1: rate_from(r1_or_t1, "R1")?,
            r2: rate_from(r2_or_t2, "R2")?,
            diffusion: Matrix3::zeros(),
            delta_omega: 0.0,
        })
    }

    /// Sets an isotropic diffusion coefficient.
    pub fn with_diffusion(mut self, diffusion: Quantity) -> Result<Self, EpgError> {
        let value = require_non_negative(
            "D",
            diffusion.require(Dimensions::diffusivity(), "D")?,
        )?;
        self.diffusion = Matrix3::from_diagonal_element(value);
        Ok(self)
    }

    /// Sets a full diffusion tensor, given row by row.
    pub fn with_diffusion_tensor(mut self, tensor: [[Quantity; 3]; 3]) -> Result<Self, EpgError> {
        let mut matrix = Matrix3::zeros();
        for (row, values) in tensor.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                matrix[(row, col)] = value.require(Dimensions::diffusivity(), "D")?;
            }
        }
        for axis in 0..3 {
            require_non_negative("D", matrix[(axis, axis)])?;
        }
        self.diffusion = matrix;
        Ok(self)
    }

    /// Sets the frequency offset of the species.
    pub fn with_delta_omega(mut self, delta_omega: Quantity) -> Result<Self, EpgError> {
        self.delta_omega = delta_omega.require(Dimensions::frequency(), "delta_omega")?;
        Ok(self)
    }

    /// Longitudinal relaxation rate (s⁻¹).
    pub fn r1(&self) -> f64 {
        self.r1
    }

    /// Transverse relaxation rate (s⁻¹).
    pub fn r2(&self) -> f64 {
        self.r2
    }

    /// Longitudinal relaxation time (s); infinite when R1 is zero.
    pub fn t1(&self) -> f64 {
        1.0 / self.r1
    }

    /// Transverse relaxation time (s); infinite when R2 is zero.
    pub fn t2(&self) -> f64 {
        1.0 / self.r2
    }

    /// Diffusion tensor (m²/s).
    pub fn diffusion_tensor(&self) -> &Matrix3<f64> {
        &self.diffusion
    }

    /// Mean diffusivity, one third of the tensor trace (m²/s).
    pub fn mean_diffusivity(&self) -> f64 {
        self.diffusion.trace() / 3.0
    }

    /// Frequency offset (Hz).
    pub fn delta_omega(&self) -> f64 {
        self.delta_omega
    }
}
