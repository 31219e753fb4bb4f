use nalgebra::Vector3;
use num_complex::Complex64;

use epg_core::units::{HZ, MS, S, UM};
use epg_core::{EpgError, Species};
use epg_ops::{PoolKind, PoolModel, PulseOperator, PulseRequest, RelaxationOperator};

fn tissue() -> Species {
    Species::new(1000.0 * MS, 100.0 * MS).unwrap()
}

fn exchange_model() -> PoolModel {
    PoolModel::exchange(
        tissue(),
        Species::new(500.0 * MS, 20.0 * MS).unwrap(),
        Vector3::new(0.0, 0.0, 0.8),
        Vector3::new(0.0, 0.0, 0.2),
        5.0 * HZ,
        40.0 * HZ,
    )
    .unwrap()
}

fn transfer_model() -> PoolModel {
    PoolModel::magnetization_transfer(
        tissue(),
        1.0 * S,
        Vector3::new(0.0, 0.0, 0.85),
        Vector3::new(0.0, 0.0, 0.15),
        3.0 * HZ,
    )
    .unwrap()
}

#[test]
fn exchange_derives_reverse_rate() {
    let model = exchange_model();
    assert_eq!(model.kind(), PoolKind::Exchange);
    assert_eq!(model.pool_count(), 2);
    assert!((model.k_a().unwrap() - 5.0).abs() < 1e-12);
    assert!((model.k_b().unwrap() - 20.0).abs() < 1e-12);
    assert_eq!(model.delta_b().unwrap(), 40.0);
    assert!((model.equilibrium(1).unwrap() - 0.2).abs() < 1e-12);
}

#[test]
fn exchange_rejects_empty_partner_pool() {
    let err = PoolModel::exchange(
        tissue(),
        tissue(),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zeros(),
        5.0 * HZ,
        0.0 * HZ,
    )
    .unwrap_err();
    assert!(matches!(err, EpgError::Parameter(_)));
    assert_eq!(err.info().code, "empty-pool");

    let uncoupled = PoolModel::exchange(
        tissue(),
        tissue(),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zeros(),
        0.0 * HZ,
        0.0 * HZ,
    )
    .unwrap();
    assert_eq!(uncoupled.k_b().unwrap(), 0.0);
}

#[test]
fn transfer_rejects_transverse_bound_pool() {
    let err = PoolModel::magnetization_transfer(
        tissue(),
        1.0 * S,
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.1, 0.0, 0.1),
        1.0 * HZ,
    )
    .unwrap_err();
    assert_eq!(err.info().code, "transverse-bound-pool");
}

#[test]
fn rate_arguments_require_frequency() {
    let err = PoolModel::exchange(
        tissue(),
        tissue(),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, 1.0),
        5.0 * MS,
        0.0 * HZ,
    )
    .unwrap_err();
    assert!(matches!(err, EpgError::Dimension(_)));
}

#[test]
fn pulse_shapes_dispatch_on_pool_kind() {
    let single = PoolModel::at_equilibrium(tissue());
    let uniform = PulseRequest::Uniform {
        angle: 0.5,
        phase: 0.1,
    };
    let per_pool = PulseRequest::PerPool {
        angles: [0.5, 0.2],
        phases: [0.0, 0.0],
    };
    let saturating = PulseRequest::Saturating {
        angle: 0.5,
        phase: 0.0,
        saturation: 0.5,
    };

    assert!(matches!(single.pulse_operator(&uniform), Ok(PulseOperator::Single(_))));
    assert_eq!(single.pulse_operator(&per_pool).unwrap_err().info().code, "pool-kind");
    assert!(matches!(single.pulse_operator(&saturating), Err(EpgError::Pool(_))));

    let exchange = exchange_model();
    assert!(matches!(exchange.pulse_operator(&uniform), Ok(PulseOperator::Exchange(_))));
    assert!(matches!(exchange.pulse_operator(&per_pool), Ok(PulseOperator::Exchange(_))));
    assert!(matches!(exchange.pulse_operator(&saturating), Err(EpgError::Pool(_))));

    let transfer = transfer_model();
    assert!(matches!(transfer.pulse_operator(&uniform), Err(EpgError::Pool(_))));
    assert!(matches!(transfer.pulse_operator(&per_pool), Err(EpgError::Pool(_))));
    assert!(matches!(
        transfer.pulse_operator(&saturating),
        Ok(PulseOperator::MagnetizationTransfer { .. })
    ));
}

#[test]
fn saturation_outside_unit_interval_is_rejected() {
    let request = PulseRequest::Saturating {
        angle: 0.5,
        phase: 0.0,
        saturation: 1.5,
    };
    let err = transfer_model().pulse_operator(&request).unwrap_err();
    assert!(matches!(err, EpgError::Parameter(_)));
}

#[test]
fn relaxation_dispatch_matches_kind() {
    assert!(matches!(
        PoolModel::at_equilibrium(tissue()).relaxation_operator(0.01),
        RelaxationOperator::Single { .. }
    ));
    assert!(matches!(
        exchange_model().relaxation_operator(0.01),
        RelaxationOperator::Coupled { .. }
    ));
}

#[test]
fn species_access_is_pool_checked() {
    let mut transfer = transfer_model();
    assert!(transfer.species(0).is_ok());
    assert_eq!(transfer.species(1).unwrap_err().info().code, "bound-pool-species");
    assert_eq!(transfer.species(2).unwrap_err().info().code, "pool-index");
    assert!(transfer.set_species(1, tissue()).is_err());

    let mut single = PoolModel::at_equilibrium(tissue());
    single
        .set_species(0, Species::new(2.0 * S, 0.05 * S).unwrap())
        .unwrap();
    assert!((single.species(0).unwrap().t1() - 2.0).abs() < 1e-12);
    assert!(single.set_exchange_rate(1.0 * HZ).is_err());
    assert!(single.delta_b().is_err());
}

#[test]
fn changing_exchange_rate_rederives_reverse_rate() {
    let mut model = transfer_model();
    model.set_exchange_rate(6.0 * HZ).unwrap();
    let (k_a, k_b) = model.exchange_rates().unwrap();
    assert_eq!(k_a, 6.0);
    assert!((k_b - 6.0 * 0.85 / 0.15).abs() < 1e-9);
}

#[test]
fn initial_state_follows_magnetization() {
    let model = PoolModel::single(tissue(), Vector3::new(0.3, -0.4, 0.5)).unwrap();
    let (f, f_star, z) = model.initial_state();
    assert_eq!(f[0], Complex64::new(0.3, -0.4));
    assert_eq!(f_star[0], Complex64::new(0.3, 0.4));
    assert_eq!(z[0], Complex64::from(0.5));
    assert!((model.equilibrium(0).unwrap() - (0.5f64).sqrt()).abs() < 1e-12);

    let (_, _, z) = transfer_model().initial_state();
    assert_eq!(z[1], Complex64::from(0.15));
}

#[test]
fn pool_model_serializes_with_kind_tag() {
    let model = exchange_model();
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["kind"], "exchange");
    let back: PoolModel = serde_json::from_value(json).unwrap();
    assert_eq!(back.kind(), PoolKind::Exchange);
}

#[test]
fn only_pools_with_diffusion_are_attenuated() {
    assert!(exchange_model().diffusing_species().iter().all(Option::is_none));

    let diffusing = tissue().with_diffusion(2.0 * UM * UM / MS).unwrap();
    let single = PoolModel::at_equilibrium(diffusing.clone());
    let [a, b] = single.diffusing_species();
    assert!((a.unwrap().mean_diffusivity() - 2e-9).abs() < 1e-21);
    assert!(b.is_none());

    let transfer = PoolModel::magnetization_transfer(
        diffusing,
        1.0 * S,
        Vector3::new(0.0, 0.0, 0.85),
        Vector3::new(0.0, 0.0, 0.15),
        3.0 * HZ,
    )
    .unwrap();
    let [a, b] = transfer.diffusing_species();
    assert!(a.is_some());
    assert!(b.is_none());
}
