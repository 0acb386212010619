//! Shared test fixtures for integration tests.

use pv_bess_sim::finance::DepreciationModel;
use pv_bess_sim::load::UserType;
use pv_bess_sim::orchestrator::{BackupPreference, ProposalInputs};
use pv_bess_sim::rates::HOURS_PER_YEAR;
use pv_bess_sim::services::{SyntheticProduction, TableGeocoder};
use pv_bess_sim::sim::DispatchPolicy;

/// An all-zero year-long series.
pub fn zero_year() -> Vec<f32> {
    vec![0.0; HOURS_PER_YEAR]
}

/// A year of repeating daily profiles: solar between 7 AM and 5 PM, flat
/// load with an evening bump.
pub fn daily_profiles(solar_peak_kw: f32, base_load_kw: f32) -> (Vec<f32>, Vec<f32>) {
    let mut solar = zero_year();
    let mut load = zero_year();
    for hour in 0..HOURS_PER_YEAR {
        let hod = hour % 24;
        if (7..17).contains(&hod) {
            let x = (hod as f32 - 7.0) / 10.0;
            solar[hour] = solar_peak_kw * (std::f32::consts::PI * x).sin();
        }
        load[hour] = base_load_kw + if (17..22).contains(&hod) { 1.0 } else { 0.0 };
    }
    (solar, load)
}

/// The 4-9 PM peak window mask used by the residential tariff.
pub fn evening_peak_mask() -> [bool; 24] {
    DispatchPolicy::peak_mask(&[16, 17, 18, 19, 20])
}

/// Default residential proposal inputs resolvable by the offline services.
pub fn residential_inputs() -> ProposalInputs {
    ProposalInputs {
        address: "456 Prairie Ave, Hibbing, MN 55714".to_string(),
        monthly_kwh_usage: Some(900.0),
        system_size_kw: Some(8.0),
        inverter_size_kw: Some(7.6),
        backup_pref: BackupPreference::EssentialsOnly,
        min_battery_reserve_pct: Some(20.0),
        self_consumption_priority: true,
        tou_enabled: true,
        rate_plan: "Residential E-TOU-C".to_string(),
        user_type: UserType::Homeowner,
        battery_cost_per_kwh: Some(900.0),
        ev_annual_miles: None,
        ev_efficiency_mi_kwh: None,
        heat_pump_btu_yr: None,
        heat_pump_cop: None,
        depreciation: DepreciationModel::SimplifiedFlat,
    }
}

/// Offline collaborators with a fixed seed and no weather noise.
pub fn offline_services() -> (TableGeocoder, SyntheticProduction) {
    (TableGeocoder, SyntheticProduction::new(0.0, 42))
}
