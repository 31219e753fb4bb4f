use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use epg_core::errors::{EpgError, ErrorInfo};
use epg_core::serde::{from_json_slice, from_yaml_slice, to_yaml_string};

/// Options shared by every configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Orders whose summed squared magnitude falls below `threshold²` are
    /// pruned after each time interval. Zero disables threshold pruning.
    #[serde(default)]
    pub threshold: f64,
    /// Minimum number of stored orders for which pointwise kernels run on
    /// the rayon pool.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Uniform-step store settings.
    #[serde(default)]
    pub regular: RegularOptions,
    /// Arbitrary-step store settings.
    #[serde(default)]
    pub discrete: DiscreteOptions,
}

fn default_parallel_threshold() -> usize {
    2048
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            parallel_threshold: default_parallel_threshold(),
            regular: RegularOptions::default(),
            discrete: DiscreteOptions::default(),
        }
    }
}

/// Growth and tolerance settings of the uniform-step store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularOptions {
    /// Orders allocated at construction.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    /// Orders added whenever the arrays run out of room.
    #[serde(default = "default_growth_step")]
    pub growth_step: usize,
    /// Accepted deviation of a gradient moment from an integer number of
    /// unit steps, as a fraction of the unit step.
    #[serde(default = "default_gradient_tolerance")]
    pub gradient_tolerance: f64,
}

fn default_initial_capacity() -> usize {
    100
}

fn default_growth_step() -> usize {
    100
}

fn default_gradient_tolerance() -> f64 {
    1e-5
}

impl Default for RegularOptions {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            growth_step: default_growth_step(),
            gradient_tolerance: default_gradient_tolerance(),
        }
    }
}

/// Quantization settings of the arbitrary-step stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteOptions {
    /// Width of one wavenumber bin (rad/m).
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
}

fn default_bin_width() -> f64 {
    1.0
}

impl Default for DiscreteOptions {
    fn default() -> Self {
        Self {
            bin_width: default_bin_width(),
        }
    }
}

fn invalid_option(name: &str, value: impl ToString, message: &str) -> EpgError {
    EpgError::Parameter(
        ErrorInfo::new("invalid-option", message)
            .with_context("option", name)
            .with_context("value", value),
    )
}

impl ModelOptions {
    /// Checks every option for a physically meaningful value.
    pub fn validate(&self) -> Result<(), EpgError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(invalid_option(
                "threshold",
                self.threshold,
                "threshold must be finite and non-negative",
            ));
        }
        if self.regular.growth_step == 0 {
            return Err(invalid_option(
                "regular.growth_step",
                0,
                "growth step must be positive",
            ));
        }
        let tolerance = self.regular.gradient_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(invalid_option(
                "regular.gradient_tolerance",
                tolerance,
                "gradient tolerance must be finite and non-negative",
            ));
        }
        let bin_width = self.discrete.bin_width;
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(invalid_option(
                "discrete.bin_width",
                bin_width,
                "bin width must be finite and positive",
            ));
        }
        Ok(())
    }

    /// Parses and validates options from YAML bytes.
    pub fn from_yaml(bytes: &[u8]) -> Result<Self, EpgError> {
        let options: ModelOptions = from_yaml_slice(bytes)?;
        options.validate()?;
        Ok(options)
    }

    /// Parses and validates options from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EpgError> {
        let options: ModelOptions = from_json_slice(bytes)?;
        options.validate()?;
        Ok(options)
    }

    /// Renders the options as YAML, every field included.
    pub fn to_yaml(&self) -> Result<String, EpgError> {
        to_yaml_string(self)
    }

    /// Loads options from a `.json` file, or YAML for any other extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EpgError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            EpgError::Serde(
                ErrorInfo::new("options-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&bytes),
            _ => Self::from_yaml(&bytes),
        }
    }
}
