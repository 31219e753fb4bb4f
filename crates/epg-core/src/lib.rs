#![deny(missing_docs)]
#![doc = "Error surface, physical quantities and parameter records shared by the EPG crates."]

/// Structured error surface.
pub mod errors;
/// Time-interval records.
pub mod interval;
/// Canonical JSON and YAML helpers.
pub mod serde;
/// Species parameter records.
pub mod species;
/// Dimensioned quantities and units.
pub mod units;

pub use errors::{EpgError, ErrorInfo};
pub use interval::{dephasing_from, moment_from, TimeInterval};
pub use species::{rate_from, Species};
pub use units::{Dimensions, Quantity, GAMMA, GAMMA_BAR};
