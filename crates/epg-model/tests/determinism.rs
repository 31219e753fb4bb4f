use nalgebra::Vector3;

use epg_core::units::{Dimensions, Quantity, DEG, HZ, M, MS, S, UM};
use epg_core::{Species, TimeInterval};
use epg_model::{
    snapshot_hash, ConfigurationModel, Discrete3DModel, DiscreteModel, ModelOptions, RegularModel,
    Snapshot,
};
use epg_ops::PoolModel;

fn dephasing(value: f64) -> Quantity {
    Quantity::new(value, Dimensions::dephasing())
}

fn pools() -> PoolModel {
    let species = Species::new(900.0 * MS, 70.0 * MS)
        .unwrap()
        .with_diffusion(2.5 * UM * UM / MS)
        .unwrap();
    PoolModel::exchange(
        species.clone(),
        species.with_delta_omega(-4.0 * HZ).unwrap(),
        Vector3::new(0.0, 0.0, 0.6),
        Vector3::new(0.0, 0.0, 0.4),
        3.0 * HZ,
        10.0 * HZ,
    )
    .unwrap()
}

fn options(parallel_threshold: usize) -> ModelOptions {
    let mut options = ModelOptions::default();
    options.parallel_threshold = parallel_threshold;
    options.discrete.bin_width = 250.0;
    options
}

fn drive<Store: ConfigurationModel>(model: &mut Store, interval: impl Fn(usize) -> TimeInterval) {
    model.set_delta_omega(3.0 * HZ).unwrap();
    for n in 0..40 {
        let phase = (n * n) as f64 * 13.0;
        model.pulse(25.0 * DEG, phase * DEG).unwrap();
        model.apply_time_interval(&interval(n)).unwrap();
    }
}

fn regular(parallel_threshold: usize) -> Snapshot {
    let mut model =
        RegularModel::new(pools(), dephasing(1.0e3), &options(parallel_threshold)).unwrap();
    model.set_velocity(0.01 * M / S).unwrap();
    drive(&mut model, |n| {
        TimeInterval::new(3.0 * MS, dephasing(if n % 3 == 0 { -1.0e3 } else { 2.0e3 })).unwrap()
    });
    model.snapshot()
}

fn discrete(parallel_threshold: usize) -> Snapshot {
    let mut model = DiscreteModel::new(pools(), &options(parallel_threshold)).unwrap();
    model.set_velocity(0.01 * M / S).unwrap();
    drive(&mut model, |n| {
        TimeInterval::new(3.0 * MS, dephasing(730.0 + 110.0 * (n % 4) as f64)).unwrap()
    });
    model.snapshot()
}

fn spatial(parallel_threshold: usize) -> Snapshot {
    let mut model = Discrete3DModel::new(pools(), &options(parallel_threshold)).unwrap();
    let v = 0.005 * M / S;
    model.set_velocity([v, -1.0 * v, 0.0 * v]).unwrap();
    drive(&mut model, |n| {
        let axis = n % 3;
        let mut gradient = [dephasing(0.0); 3];
        gradient[axis] = dephasing(500.0 + 250.0 * axis as f64);
        TimeInterval::new_3d(3.0 * MS, gradient).unwrap()
    });
    model.snapshot()
}

#[test]
fn parallel_kernels_match_sequential_execution() {
    for run in [regular, discrete, spatial] {
        let sequential = run(usize::MAX);
        let parallel = run(0);
        assert!(sequential.orders.len() > 10);
        assert_eq!(
            snapshot_hash(&sequential).unwrap(),
            snapshot_hash(&parallel).unwrap()
        );
    }
}

#[test]
fn repeated_runs_hash_identically() {
    assert_eq!(
        snapshot_hash(&discrete(64)).unwrap(),
        snapshot_hash(&discrete(64)).unwrap()
    );
    assert_ne!(
        snapshot_hash(&discrete(64)).unwrap(),
        snapshot_hash(&regular(64)).unwrap()
    );
}

#[test]
fn snapshot_round_trips_through_json() {
    let snapshot = spatial(usize::MAX);
    assert_eq!(snapshot.pool_count, 2);
    assert_eq!(snapshot.pools.len(), 2);
    assert_eq!(snapshot.orders[0], [0.0, 0.0, 0.0]);
    assert!((snapshot.elapsed - 0.12).abs() < 1e-12);
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn timings_count_each_operation() {
    let mut model = DiscreteModel::new(pools(), &options(usize::MAX)).unwrap();
    model.set_velocity(0.01 * M / S).unwrap();
    drive(&mut model, |_| TimeInterval::new(3.0 * MS, dephasing(500.0)).unwrap());
    let timings = model.timings();
    assert_eq!(timings.pulse.calls, 40);
    assert_eq!(timings.relaxation.calls, 40);
    assert_eq!(timings.diffusion.calls, 40);
    assert_eq!(timings.shift.calls, 40);
    assert_eq!(timings.off_resonance.calls, 40);
    assert_eq!(timings.bulk_motion.calls, 40);
    assert_eq!(timings.prune.calls, 0);
    assert!(timings.total() >= timings.pulse.total);
    let json = serde_json::to_value(timings).unwrap();
    assert_eq!(json["shift"]["calls"], 40);
    model.reset_timings();
    assert_eq!(model.timings().pulse.calls, 0);
}
