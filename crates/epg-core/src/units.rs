//! Dimensioned physical quantities and the unit constants used by the engine.
//!
//! A [`Quantity`] stores its magnitude in SI base units together with the
//! exponents of the seven SI base dimensions. Multiplication and division
//! combine exponents freely; addition, subtraction and conversion require
//! matching dimensions and report [`EpgError::Dimension`] otherwise.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Div, Mul, Neg};

use serde::{Deserialize, Serialize};

use crate::errors::{EpgError, ErrorInfo};

/// Exponents of the SI base dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length (metre).
    pub length: i8,
    /// Mass (kilogram).
    pub mass: i8,
    /// Time (second).
    pub time: i8,
    /// Electric current (ampere).
    pub current: i8,
    /// Thermodynamic temperature (kelvin).
    pub temperature: i8,
    /// Amount of substance (mole).
    pub amount: i8,
    /// Luminous intensity (candela).
    pub luminous: i8,
}

impl Dimensions {
    /// Builds a dimension vector from its first four exponents.
    pub const fn new(length: i8, mass: i8, time: i8, current: i8) -> Self {
        Self {
            length,
            mass,
            time,
            current,
            temperature: 0,
            amount: 0,
            luminous: 0,
        }
    }

    /// Dimensionless (also used for angles in radians).
    pub const fn dimensionless() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Length (m).
    pub const fn length() -> Self {
        Self::new(1, 0, 0, 0)
    }

    /// Time (s).
    pub const fn time() -> Self {
        Self::new(0, 0, 1, 0)
    }

    /// Frequency or rate (s⁻¹).
    pub const fn frequency() -> Self {
        Self::new(0, 0, -1, 0)
    }

    /// Magnetic flux density (T = kg·s⁻²·A⁻¹).
    pub const fn magnetic_field() -> Self {
        Self::new(0, 1, -2, -1)
    }

    /// Gradient amplitude (T/m).
    pub const fn gradient_amplitude() -> Self {
        Self::new(-1, 1, -2, -1)
    }

    /// Gradient area (T·s/m).
    pub const fn gradient_area() -> Self {
        Self::new(-1, 1, -1, -1)
    }

    /// Gradient dephasing or wavenumber (rad/m).
    pub const fn dephasing() -> Self {
        Self::new(-1, 0, 0, 0)
    }

    /// Diffusivity (m²/s).
    pub const fn diffusivity() -> Self {
        Self::new(2, 0, -1, 0)
    }

    /// Velocity (m/s).
    pub const fn velocity() -> Self {
        Self::new(1, 0, -1, 0)
    }

    /// Gyromagnetic ratio (rad·s⁻¹·T⁻¹ = A·s/kg).
    pub const fn gyromagnetic_ratio() -> Self {
        Self::new(0, -1, 1, 1)
    }

    fn combine(self, other: Self, sign: i8) -> Self {
        Self {
            length: self.length + sign * other.length,
            mass: self.mass + sign * other.mass,
            time: self.time + sign * other.time,
            current: self.current + sign * other.current,
            temperature: self.temperature + sign * other.temperature,
            amount: self.amount + sign * other.amount,
            luminous: self.luminous + sign * other.luminous,
        }
    }

    fn inverse(self) -> Self {
        Self::dimensionless().combine(self, -1)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = [
            ("m", self.length),
            ("kg", self.mass),
            ("s", self.time),
            ("A", self.current),
            ("K", self.temperature),
            ("mol", self.amount),
            ("cd", self.luminous),
        ];
        let mut first = true;
        for (symbol, exponent) in symbols {
            if exponent == 0 {
                continue;
            }
            if !first {
                write!(f, "·")?;
            }
            first = false;
            if exponent == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        if first {
            write!(f, "1")?;
        }
        Ok(())
    }
}

/// Numeric magnitude (SI) tagged with its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Magnitude expressed in SI base units.
    pub magnitude: f64,
    /// Dimension exponents.
    pub dimensions: Dimensions,
}

fn mismatch(expected: Dimensions, found: Dimensions, name: &str) -> EpgError {
    EpgError::Dimension(
        ErrorInfo::new("dimension-mismatch", "quantity has an incompatible dimension")
            .with_context("quantity", name)
            .with_context("expected", expected)
            .with_context("found", found),
    )
}

impl Quantity {
    /// Creates a quantity from an SI magnitude and its dimensions.
    pub const fn new(magnitude: f64, dimensions: Dimensions) -> Self {
        Self {
            magnitude,
            dimensions,
        }
    }

    /// Creates a dimensionless quantity.
    pub const fn scalar(magnitude: f64) -> Self {
        Self::new(magnitude, Dimensions::dimensionless())
    }

    /// Returns whether the quantity has the provided dimensions.
    pub fn has_dimensions(&self, dimensions: Dimensions) -> bool {
        self.dimensions == dimensions
    }

    /// Returns the SI magnitude when the dimensions match, a dimension error otherwise.
    pub fn require(&self, dimensions: Dimensions, name: &str) -> Result<f64, EpgError> {
        if self.dimensions != dimensions {
            return Err(mismatch(dimensions, self.dimensions, name));
        }
        Ok(self.magnitude)
    }

    /// Expresses the quantity as a multiple of `unit`.
    pub fn convert_to(&self, unit: Quantity) -> Result<f64, EpgError> {
        if self.dimensions != unit.dimensions {
            return Err(mismatch(unit.dimensions, self.dimensions, "conversion"));
        }
        Ok(self.magnitude / unit.magnitude)
    }

    /// Dimension-checked addition.
    pub fn checked_add(self, rhs: Quantity) -> Result<Quantity, EpgError> {
        if self.dimensions != rhs.dimensions {
            return Err(mismatch(self.dimensions, rhs.dimensions, "addition"));
        }
        Ok(Quantity::new(self.magnitude + rhs.magnitude, self.dimensions))
    }

    /// Dimension-checked subtraction.
    pub fn checked_sub(self, rhs: Quantity) -> Result<Quantity, EpgError> {
        self.checked_add(-rhs)
    }

    /// Multiplicative inverse.
    pub fn recip(self) -> Quantity {
        Quantity::new(1.0 / self.magnitude, self.dimensions.inverse())
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        Quantity::new(
            self.magnitude * rhs.magnitude,
            self.dimensions.combine(rhs.dimensions, 1),
        )
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        Quantity::new(
            self.magnitude / rhs.magnitude,
            self.dimensions.combine(rhs.dimensions, -1),
        )
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude * rhs, self.dimensions)
    }
}

impl Mul<Quantity> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        rhs * self
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude / rhs, self.dimensions)
    }
}

impl Div<Quantity> for f64 {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        rhs.recip() * self
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity::new(-self.magnitude, self.dimensions)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.dimensions)
    }
}

/// Metre.
pub const M: Quantity = Quantity::new(1.0, Dimensions::length());
/// Millimetre.
pub const MM: Quantity = Quantity::new(1e-3, Dimensions::length());
/// Micrometre.
pub const UM: Quantity = Quantity::new(1e-6, Dimensions::length());
/// Second.
pub const S: Quantity = Quantity::new(1.0, Dimensions::time());
/// Millisecond.
pub const MS: Quantity = Quantity::new(1e-3, Dimensions::time());
/// Microsecond.
pub const US: Quantity = Quantity::new(1e-6, Dimensions::time());
/// Tesla.
pub const T: Quantity = Quantity::new(1.0, Dimensions::magnetic_field());
/// Millitesla.
pub const MT: Quantity = Quantity::new(1e-3, Dimensions::magnetic_field());
/// Hertz.
pub const HZ: Quantity = Quantity::new(1.0, Dimensions::frequency());
/// Kilohertz.
pub const KHZ: Quantity = Quantity::new(1e3, Dimensions::frequency());
/// Radian.
pub const RAD: Quantity = Quantity::scalar(1.0);
/// Degree.
pub const DEG: Quantity = Quantity::scalar(PI / 180.0);

/// Proton gyromagnetic ratio over 2π, in Hz/T.
pub const GAMMA_BAR: f64 = 42.577_478_518e6;
/// Proton gyromagnetic ratio, in rad·s⁻¹·T⁻¹.
pub const GAMMA: f64 = 2.0 * PI * GAMMA_BAR;

/// Proton gyromagnetic ratio as a dimensioned quantity.
pub fn gamma() -> Quantity {
    Quantity::new(GAMMA, Dimensions::gyromagnetic_ratio())
}
