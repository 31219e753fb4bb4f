use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use epg_core::errors::EpgError;
use epg_core::serde::to_canonical_json_bytes;
use epg_ops::PoolKind;

use crate::state::Triple;

/// Schema version written into every snapshot.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Serializable view of a model's configuration states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Layout version of this record.
    pub schema_version: u32,
    /// Pool kind of the model.
    pub pool_kind: PoolKind,
    /// Number of pools.
    pub pool_count: usize,
    /// Simulated time (s).
    pub elapsed: f64,
    /// Wavenumber of each stored order (rad/m); one-dimensional stores fill
    /// the first component only.
    pub orders: Vec<[f64; 3]>,
    /// States of each pool, aligned with `orders`.
    pub pools: Vec<Vec<Triple>>,
}

/// Stable SHA-256 hex digest of a snapshot's canonical JSON.
pub fn snapshot_hash(snapshot: &Snapshot) -> Result<String, EpgError> {
    let bytes = to_canonical_json_bytes(snapshot)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}
