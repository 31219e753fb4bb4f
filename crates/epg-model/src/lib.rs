#![deny(missing_docs)]
#![doc = "Configuration-state stores of the extended phase graph engine."]

/// Generation-tagged lazy caches.
pub mod cache;
/// Serde-defaulted model options.
pub mod config;
/// One-dimensional store over quantized bins.
pub mod discrete;
/// Three-dimensional store over quantized bins.
pub mod discrete3d;
/// Model core shared by the stores.
pub mod engine;
/// Shift of folded, conjugate-symmetric order sets.
pub mod fold;
/// Data-parallel per-order kernels.
pub mod kernel;
/// The operations every store shares.
pub mod model;
/// Threshold pruning of negligible orders.
pub mod prune;
/// Uniform-step store.
pub mod regular;
/// Snapshots and their stable hash.
pub mod snapshot;
/// Per-order state arrays.
pub mod state;
/// Per-operation timing counters.
pub mod timing;

pub use cache::Cached;
pub use config::{DiscreteOptions, ModelOptions, RegularOptions};
pub use engine::ModelCore;
pub use discrete::DiscreteModel;
pub use discrete3d::Discrete3DModel;
pub use fold::{check_shift, shift_folded, Folded, OrderKey};
pub use kernel::for_each_order;
pub use model::ConfigurationModel;
pub use regular::RegularModel;
pub use snapshot::{snapshot_hash, Snapshot, SNAPSHOT_SCHEMA_VERSION};
pub use state::{StateArrays, Triple};
pub use timing::{Operation, OperationTiming, Timings};
