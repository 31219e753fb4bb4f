use epg_core::units::{Dimensions, Quantity, DEG, GAMMA, HZ, M, MS, MT, S, UM};
use epg_core::{EpgError, Species, TimeInterval};

#[test]
fn species_accepts_times_or_rates() {
    let from_times = Species::new(1000.0 * MS, 100.0 * MS).unwrap();
    let from_rates = Species::new(1.0 * HZ, 10.0 * HZ).unwrap();
    assert!((from_times.r1() - from_rates.r1()).abs() < 1e-12);
    assert!((from_times.r2() - from_rates.r2()).abs() < 1e-12);
    assert!((from_times.t2() - 0.1).abs() < 1e-12);
}

#[test]
fn species_rejects_wrong_dimensions_and_negative_rates() {
    assert!(matches!(Species::new(1.0 * M, 1.0 * S), Err(EpgError::Dimension(_))));
    assert!(matches!(Species::new(-1.0 * HZ, 1.0 * HZ), Err(EpgError::Parameter(_))));
    assert!(matches!(Species::new(0.0 * S, 1.0 * HZ), Err(EpgError::Parameter(_))));
}

#[test]
fn species_diffusion_and_offset() {
    let species = Species::new(1000.0 * MS, 100.0 * MS)
        .unwrap()
        .with_diffusion(3.0 * UM * UM / MS)
        .unwrap()
        .with_delta_omega(12.0 * HZ)
        .unwrap();
    assert!((species.mean_diffusivity() - 3e-9).abs() < 1e-21);
    assert_eq!(species.diffusion_tensor()[(0, 1)], 0.0);
    assert_eq!(species.delta_omega(), 12.0);
    assert!(species.clone().with_delta_omega(1.0 * MS).is_err());
}

#[test]
fn anisotropic_tensor_mean() {
    let d = UM * UM / MS;
    let zero = 0.0 * d;
    let species = Species::new(1.0 * S, 0.1 * S)
        .unwrap()
        .with_diffusion_tensor([[1.0 * d, zero, zero], [zero, 2.0 * d, zero], [zero, zero, 3.0 * d]])
        .unwrap();
    assert!((species.mean_diffusivity() - 2e-9).abs() < 1e-21);
}

#[test]
fn interval_dispatches_on_gradient_dimension() {
    let amplitude = TimeInterval::new(10.0 * MS, 2.0 * MT / M).unwrap();
    let area = TimeInterval::new(10.0 * MS, 2.0 * MT / M * (10.0 * MS)).unwrap();
    let expected = GAMMA * 2e-3 * 10e-3;
    assert!((amplitude.gradient_moment()[0] - expected).abs() < 1e-9);
    assert!((area.gradient_moment()[0] - expected).abs() < 1e-9);

    let dephasing = TimeInterval::new(1.0 * MS, Quantity::new(500.0, Dimensions::dephasing())).unwrap();
    assert_eq!(dephasing.axial_moment().unwrap(), 500.0);
    assert!((dephasing.duration() - 1e-3).abs() < 1e-15);
}

#[test]
fn interval_rejects_invalid_inputs() {
    assert!(matches!(TimeInterval::new(1.0 * MS, 1.0 * DEG), Err(EpgError::Dimension(_))));
    assert!(matches!(TimeInterval::free(-1.0 * MS), Err(EpgError::Parameter(_))));
    assert!(matches!(TimeInterval::free(1.0 * M), Err(EpgError::Dimension(_))));
}

#[test]
fn three_dimensional_interval_is_not_axial() {
    let g = 1.0 * MT / M;
    let interval = TimeInterval::new_3d(1.0 * MS, [g, g, 0.0 * g]).unwrap();
    assert!(interval.gradient_moment()[1] > 0.0);
    assert!(matches!(interval.axial_moment(), Err(EpgError::Gradient(_))));
}

#[test]
fn records_round_trip_json() {
    let species = Species::new(1.0 * S, 0.1 * S).unwrap().with_delta_omega(3.0 * HZ).unwrap();
    let json = serde_json::to_string(&species).unwrap();
    let decoded: Species = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, species);

    let interval = TimeInterval::new(5.0 * MS, 1.0 * MT / M).unwrap();
    let bytes = epg_core::serde::to_canonical_json_bytes(&interval).unwrap();
    let decoded: TimeInterval = epg_core::serde::from_json_slice(&bytes).unwrap();
    assert_eq!(decoded, interval);
}

#[test]
fn moment_requires_area_or_dephasing() {
    let area = epg_core::moment_from(2.0 * MT / M * (10.0 * MS)).unwrap();
    assert!((area - GAMMA * 2e-5).abs() < 1e-9);
    assert_eq!(epg_core::moment_from(Quantity::new(5.0, Dimensions::dephasing())).unwrap(), 5.0);
    let err = epg_core::moment_from(2.0 * MT / M).unwrap_err();
    assert!(matches!(err, EpgError::Dimension(_)));
    assert!(err.info().hint.is_some());
}
