use rayon::prelude::*;

use epg_ops::PoolValues;

use crate::state::StateArrays;

/// Applies `op` to the `(F, F*, Z)` values of every active order.
///
/// Orders are independent, so the map runs on the rayon pool once the
/// active length reaches `parallel_threshold`, and sequentially below it.
/// Both paths visit every order exactly once with its index.
pub fn for_each_order<F>(arrays: &mut StateArrays, parallel_threshold: usize, op: F)
where
    F: Fn(usize, &mut PoolValues, &mut PoolValues, &mut PoolValues) + Sync + Send,
{
    let len = arrays.len;
    let f = &mut arrays.f[..len];
    let f_star = &mut arrays.f_star[..len];
    let z = &mut arrays.z[..len];
    if len >= parallel_threshold {
        (f, f_star, z)
            .into_par_iter()
            .enumerate()
            .for_each(|(index, (f, f_star, z))| op(index, f, f_star, z));
    } else {
        for (index, ((f, f_star), z)) in f
            .iter_mut()
            .zip(f_star.iter_mut())
            .zip(z.iter_mut())
            .enumerate()
        {
            op(index, f, f_star, z);
        }
    }
}
