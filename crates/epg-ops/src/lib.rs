#![deny(missing_docs)]
#![doc = "Closed-form EPG operators and the pool-kind dispatch layer."]

/// Diffusion attenuation factors.
pub mod diffusion;
/// Off-resonance and bulk-motion phase factors.
pub mod phase;
/// Pools, pool models and operator dispatch.
pub mod pool;
/// RF pulse rotations.
pub mod pulse;
/// Relaxation and Bloch-McConnell exchange propagators.
pub mod relaxation;

pub use diffusion::{attenuation, attenuation_3d, Attenuation};
pub use phase::{bulk_motion, bulk_motion_3d, off_resonance, MotionPhase};
pub use pool::{Pool, PoolKind, PoolModel, PoolValues, PulseRequest, MAX_POOLS, ZERO_POOLS};
pub use pulse::PulseOperator;
pub use relaxation::{expm2, ExchangeRates, RelaxationOperator};
