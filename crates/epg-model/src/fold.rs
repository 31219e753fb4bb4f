//! Shift of a folded, conjugate-symmetric order set by an arbitrary number
//! of bins.
//!
//! Only the canonical half of the signed order axis is stored: order `k`
//! holds `F(k)` and `F*(k)`, the latter standing for `conj(F(−k))`. A shift
//! unfolds the transverse states onto the full signed axis, offsets every key
//! by the bin delta, and refolds onto the canonical half. `Z` does not move.
//!
//! Entries whose value is exactly zero in every pool are not carried, so a
//! shift followed by its inverse restores the order set exactly. Keys never
//! take the value `i64::MIN`, so mirroring a stored key cannot overflow.

use epg_core::errors::{EpgError, ErrorInfo};
use epg_ops::{PoolValues, ZERO_POOLS};

use crate::state::StateArrays;

/// Key of one stored order, as signed bin counts.
pub trait OrderKey: Copy + Ord + Send + Sync + std::fmt::Debug {
    /// The origin, order 0.
    const ORIGIN: Self;

    /// Key of the opposite order.
    fn mirror(self) -> Self;

    /// Key offset by `delta` bins, or `None` when a component leaves the
    /// representable range.
    fn offset(self, delta: Self) -> Option<Self>;

    /// True for keys on the stored half of the axis.
    fn is_canonical(self) -> bool;

    /// Stored representative of `±self`.
    fn canonical(self) -> Self {
        if self.is_canonical() {
            self
        } else {
            self.mirror()
        }
    }
}

fn offset_component(key: i64, delta: i64) -> Option<i64> {
    key.checked_add(delta).filter(|shifted| *shifted != i64::MIN)
}

impl OrderKey for i64 {
    const ORIGIN: Self = 0;

    fn mirror(self) -> Self {
        -self
    }

    fn offset(self, delta: Self) -> Option<Self> {
        offset_component(self, delta)
    }

    fn is_canonical(self) -> bool {
        self >= 0
    }
}

impl OrderKey for [i64; 3] {
    const ORIGIN: Self = [0; 3];

    fn mirror(self) -> Self {
        [-self[0], -self[1], -self[2]]
    }

    fn offset(self, delta: Self) -> Option<Self> {
        Some([
            offset_component(self[0], delta[0])?,
            offset_component(self[1], delta[1])?,
            offset_component(self[2], delta[2])?,
        ])
    }

    /// The first non-zero component is positive.
    fn is_canonical(self) -> bool {
        self.iter()
            .find(|component| **component != 0)
            .map_or(true, |component| *component > 0)
    }
}

/// Sorted keys and the matching state arrays after a shift.
#[derive(Debug, Clone, PartialEq)]
pub struct Folded<K> {
    /// Canonical keys in ascending order; the origin comes first.
    pub keys: Vec<K>,
    /// States aligned with `keys`.
    pub arrays: StateArrays,
}

fn is_zero(values: &PoolValues) -> bool {
    values.iter().all(|value| value.re == 0.0 && value.im == 0.0)
}

fn conj(values: &PoolValues) -> PoolValues {
    values.map(|value| value.conj())
}

fn lookup<K: OrderKey>(entries: &[(K, PoolValues)], key: K) -> Option<PoolValues> {
    entries
        .binary_search_by(|(probe, _)| probe.cmp(&key))
        .ok()
        .map(|position| entries[position].1)
}

fn overflow<K: std::fmt::Debug>(key: K, delta: K) -> EpgError {
    EpgError::Gradient(
        ErrorInfo::new("order-overflow", "shifted order leaves the representable bin range")
            .with_context("order", format!("{key:?}"))
            .with_context("delta", format!("{delta:?}")),
    )
}

/// Fails when shifting any of `keys` or their mirrors by `delta` bins leaves
/// the representable range.
pub fn check_shift<K, I>(keys: I, delta: K) -> Result<(), EpgError>
where
    K: OrderKey,
    I: IntoIterator<Item = K>,
{
    for key in keys {
        for signed in [key, key.mirror()] {
            if signed.offset(delta).is_none() {
                return Err(overflow(signed, delta));
            }
        }
    }
    Ok(())
}

/// Shifts the stored orders `keys` (canonical, aligned with `arrays`) by
/// `delta` bins. Nothing is built when a shifted order would overflow.
pub fn shift_folded<K: OrderKey>(
    keys: &[K],
    arrays: &StateArrays,
    delta: K,
) -> Result<Folded<K>, EpgError> {
    check_shift(keys.iter().copied(), delta)?;
    let len = keys.len().min(arrays.len());
    let mut transverse = Vec::with_capacity(2 * len);
    let mut longitudinal = Vec::with_capacity(len);
    for (index, key) in keys.iter().copied().take(len).enumerate() {
        let f = arrays.f[index];
        if !is_zero(&f) {
            let shifted = key.offset(delta).ok_or_else(|| overflow(key, delta))?;
            transverse.push((shifted, f));
        }
        if key != K::ORIGIN {
            let mirrored = conj(&arrays.f_star[index]);
            if !is_zero(&mirrored) {
                let shifted = key
                    .mirror()
                    .offset(delta)
                    .ok_or_else(|| overflow(key.mirror(), delta))?;
                transverse.push((shifted, mirrored));
            }
        }
        let z = arrays.z[index];
        if key == K::ORIGIN || !is_zero(&z) {
            longitudinal.push((key, z));
        }
    }
    transverse.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    longitudinal.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut folded_keys: Vec<K> = transverse
        .iter()
        .map(|(key, _)| key.canonical())
        .chain(longitudinal.iter().map(|(key, _)| *key))
        .chain(std::iter::once(K::ORIGIN))
        .collect();
    folded_keys.sort_unstable();
    folded_keys.dedup();

    let mut f = Vec::with_capacity(folded_keys.len());
    let mut f_star = Vec::with_capacity(folded_keys.len());
    let mut z = Vec::with_capacity(folded_keys.len());
    for key in &folded_keys {
        f.push(lookup(&transverse, *key).unwrap_or(ZERO_POOLS));
        f_star.push(
            lookup(&transverse, key.mirror())
                .map(|values| conj(&values))
                .unwrap_or(ZERO_POOLS),
        );
        z.push(lookup(&longitudinal, *key).unwrap_or(ZERO_POOLS));
    }

    Ok(Folded {
        keys: folded_keys,
        arrays: StateArrays::from_parts(f, f_star, z),
    })
}
