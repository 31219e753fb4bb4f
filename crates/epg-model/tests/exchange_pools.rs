use nalgebra::Vector3;

use epg_core::units::{Dimensions, Quantity, DEG, HZ, MS, S};
use epg_core::{EpgError, Species, TimeInterval};
use epg_model::{ConfigurationModel, DiscreteModel, ModelOptions, RegularModel};
use epg_ops::PoolModel;

fn exchange(k_a: f64) -> PoolModel {
    PoolModel::exchange(
        Species::new(1000.0 * MS, 80.0 * MS).unwrap(),
        Species::new(400.0 * MS, 20.0 * MS).unwrap(),
        Vector3::new(0.0, 0.0, 0.7),
        Vector3::new(0.0, 0.0, 0.3),
        k_a * HZ,
        15.0 * HZ,
    )
    .unwrap()
}

fn transfer() -> PoolModel {
    PoolModel::magnetization_transfer(
        Species::new(1000.0 * MS, 80.0 * MS).unwrap(),
        1.0 * S,
        Vector3::new(0.0, 0.0, 0.85),
        Vector3::new(0.0, 0.0, 0.15),
        4.0 * HZ,
    )
    .unwrap()
}

fn z(model: &DiscreteModel, pool: usize) -> f64 {
    model.pool_state(pool, 0).unwrap().z.re
}

#[test]
fn equilibrium_survives_relaxation() {
    let mut model = DiscreteModel::new(exchange(6.0), &ModelOptions::default()).unwrap();
    model.relax(25.0 * MS).unwrap();
    assert!((z(&model, 0) - 0.7).abs() < 1e-12);
    assert!((z(&model, 1) - 0.3).abs() < 1e-12);
    assert_eq!(model.elapsed(), 0.0);
}

#[test]
fn exchange_moves_recovery_between_pools() {
    // Saturate pool a only; pool b is refilled from its own recovery and
    // drained towards pool a at k_b = k_a·M0_a/M0_b.
    let mut coupled = DiscreteModel::new(exchange(6.0), &ModelOptions::default()).unwrap();
    let mut isolated = DiscreteModel::new(exchange(0.0), &ModelOptions::default()).unwrap();
    for model in [&mut coupled, &mut isolated] {
        model
            .exchange_pulse([90.0 * DEG, 0.0 * DEG], [0.0 * DEG, 0.0 * DEG])
            .unwrap();
        model.relax(50.0 * MS).unwrap();
    }
    assert!(z(&coupled, 0) > z(&isolated, 0));
    assert!(z(&coupled, 1) < z(&isolated, 1));
    assert!((z(&isolated, 1) - 0.3).abs() < 1e-12);

    // Total longitudinal flow a→b equals flow b→a at equilibrium.
    let (k_a, k_b) = coupled.pool_model().exchange_rates().unwrap();
    assert!((k_a * 0.7 - k_b * 0.3).abs() < 1e-12);
}

#[test]
fn exchange_states_converge_to_populations() {
    let mut model = DiscreteModel::new(exchange(6.0), &ModelOptions::default()).unwrap();
    model
        .exchange_pulse([90.0 * DEG, 90.0 * DEG], [0.0 * DEG, 0.0 * DEG])
        .unwrap();
    for _ in 0..400 {
        model.apply_time_interval(&TimeInterval::free(50.0 * MS).unwrap()).unwrap();
    }
    assert!((z(&model, 0) - 0.7).abs() < 1e-6);
    assert!((z(&model, 1) - 0.3).abs() < 1e-6);
    assert!(model.pool_echo(1).unwrap().norm() < 1e-9);
}

#[test]
fn frequency_offset_of_pool_b_precesses_its_echo() {
    let mut model = DiscreteModel::new(exchange(0.0), &ModelOptions::default()).unwrap();
    model.pulse(90.0 * DEG, 0.0 * DEG).unwrap();
    model.relax(1000.0 / 15.0 / 4.0 * MS).unwrap();
    // A quarter cycle at 15 Hz turns pool b's echo from −i towards +1.
    let echo = model.pool_echo(1).unwrap();
    assert!(echo.re > 0.0);
    assert!(echo.im.abs() < 1e-9);
}

#[test]
fn saturation_pulse_only_scales_bound_pool() {
    let mut model = DiscreteModel::new(transfer(), &ModelOptions::default()).unwrap();
    model.saturation_pulse(20.0 * DEG, 0.0 * DEG, 0.4).unwrap();
    assert!((z(&model, 1) - 0.06).abs() < 1e-12);
    assert!((z(&model, 0) - 0.85 * 20f64.to_radians().cos()).abs() < 1e-12);
    assert_eq!(model.pool_echo(1).unwrap().norm(), 0.0);

    model.relax(200.0 * MS).unwrap();
    assert!(z(&model, 1) > 0.06);
}

#[test]
fn pulse_shape_must_match_pool_kind() {
    let mut model = DiscreteModel::new(transfer(), &ModelOptions::default()).unwrap();
    let before = model.snapshot();
    let err = model.pulse(30.0 * DEG, 0.0 * DEG).unwrap_err();
    assert!(matches!(err, EpgError::Pool(_)));
    let err = model
        .exchange_pulse([30.0 * DEG, 30.0 * DEG], [0.0 * DEG, 0.0 * DEG])
        .unwrap_err();
    assert!(matches!(err, EpgError::Pool(_)));
    assert_eq!(model.snapshot(), before);

    let mut single = RegularModel::new(
        PoolModel::at_equilibrium(Species::new(1.0 * S, 0.1 * S).unwrap()),
        Quantity::new(1.0e3, Dimensions::dephasing()),
        &ModelOptions::default(),
    )
    .unwrap();
    assert!(single.saturation_pulse(30.0 * DEG, 0.0 * DEG, 0.5).is_err());
    assert!(single.pool_state(1, 0).is_err());
}

#[test]
fn pool_model_swaps_only_within_kind() {
    let mut model = DiscreteModel::new(exchange(6.0), &ModelOptions::default()).unwrap();
    model.set_pool_model(exchange(2.0)).unwrap();
    assert_eq!(model.pool_model().k_a().unwrap(), 2.0);
    let err = model.set_pool_model(transfer()).unwrap_err();
    assert_eq!(err.info().code, "pool-kind");
}
