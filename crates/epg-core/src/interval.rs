//! Time intervals: a duration and the gradient moment accumulated over it.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, EpgError, ErrorInfo};
use crate::units::{Dimensions, Quantity, GAMMA};

/// Converts a gradient amplitude, area or dephasing into a dephasing (rad/m).
pub fn dephasing_from(duration: f64, gradient: Quantity) -> Result<f64, EpgError> {
    let dims = gradient.dimensions;
    if dims == Dimensions::dephasing() {
        Ok(gradient.magnitude)
    } else if dims == Dimensions::gradient_area() {
        Ok(GAMMA * gradient.magnitude)
    } else if dims == Dimensions::gradient_amplitude() {
        Ok(GAMMA * gradient.magnitude * duration)
    } else {
        Err(EpgError::Dimension(
            ErrorInfo::new(
                "dimension-mismatch",
                "gradient must be an amplitude, an area or a dephasing",
            )
            .with_context("found", dims),
        ))
    }
}

/// Converts a gradient area or dephasing into a dephasing (rad/m). An
/// amplitude has no moment without a duration and is rejected.
pub fn moment_from(gradient: Quantity) -> Result<f64, EpgError> {
    if gradient.has_dimensions(Dimensions::gradient_amplitude()) {
        return Err(EpgError::Dimension(
            ErrorInfo::new("dimension-mismatch", "gradient moment needs an area or a dephasing")
                .with_context("found", gradient.dimensions)
                .with_hint("use an interval to apply a gradient amplitude over a duration"),
        ));
    }
    dephasing_from(0.0, gradient)
}

/// Duration and gradient moment of a free-evolution period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    duration: f64,
    gradient_moment: Vector3<f64>,
}

impl TimeInterval {
    /// Interval with a gradient along the first axis.
    pub fn new(duration: Quantity, gradient: Quantity) -> Result<Self, EpgError> {
        let zero = Quantity::new(0.0, Dimensions::dephasing());
        Self::new_3d(duration, [gradient, zero, zero])
    }

    /// Interval with a three-dimensional gradient.
    pub fn new_3d(duration: Quantity, gradient: [Quantity; 3]) -> Result<Self, EpgError> {
        let duration = require_non_negative(
            "duration",
            duration.require(Dimensions::time(), "duration")?,
        )?;
        let mut moment = Vector3::zeros();
        for (axis, value) in gradient.iter().enumerate() {
            moment[axis] = dephasing_from(duration, *value)?;
        }
        Ok(Self {
            duration,
            gradient_moment: moment,
        })
    }

    /// Interval without gradient.
    pub fn free(duration: Quantity) -> Result<Self, EpgError> {
        Self::new(duration, Quantity::new(0.0, Dimensions::dephasing()))
    }

    /// Duration (s).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Gradient moment (rad/m).
    pub fn gradient_moment(&self) -> Vector3<f64> {
        self.gradient_moment
    }

    /// Gradient moment along the single axis of a one-dimensional model.
    ///
    /// Fails when the moment has components along the second or third axis.
    pub fn axial_moment(&self) -> Result<f64, EpgError> {
        if self.gradient_moment[1] != 0.0 || self.gradient_moment[2] != 0.0 {
            return Err(EpgError::Gradient(
                ErrorInfo::new(
                    "not-one-dimensional",
                    "one-dimensional model received a three-dimensional gradient",
                )
                .with_context("moment", format!("{:?}", self.gradient_moment.as_slice())),
            ));
        }
        Ok(self.gradient_moment[0])
    }
}
