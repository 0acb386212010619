//! Hourly dispatch engine: routes solar among battery, load, export, and grid.

use super::kpi::DispatchKpis;
use super::policy::{BATTERY_CHARGE_EFF, DispatchPolicy, INVERTER_EFF};

/// Output of one dispatch simulation run.
///
/// Holds the input load and (DC) solar series alongside the five routed
/// energy series, all hour-aligned, plus the derived annual KPIs. Immutable
/// once returned; financial derivation and reporting only read it.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Hourly load input (kWh).
    pub hourly_load_kwh: Vec<f32>,
    /// Hourly DC solar production input (kWh).
    pub hourly_solar_kwh: Vec<f32>,
    /// Grid import per hour (kWh).
    pub import_kwh: Vec<f32>,
    /// Grid export per hour (kWh).
    pub export_kwh: Vec<f32>,
    /// Solar served directly to load per hour (kWh, AC side).
    pub solar_to_load_kwh: Vec<f32>,
    /// Solar drawn into the battery per hour (kWh, as drawn from production).
    pub solar_to_battery_kwh: Vec<f32>,
    /// Battery energy served to load per hour (kWh, AC side).
    pub battery_to_load_kwh: Vec<f32>,
    /// Annual KPIs derived from the series above.
    pub kpis: DispatchKpis,
}

/// Runs the hour-by-hour dispatch state machine.
///
/// The loop is strictly sequential: battery state of charge at hour `h`
/// depends on hour `h - 1`, so hours are never reordered or parallelized
/// within a run. Per hour:
///
/// 1. Clip DC solar to the inverter's AC capacity; clipped DC remains
///    available for battery charging only.
/// 2. Charge the battery from clipped DC first, then from AC solar through
///    the inverter, bounded by capacity headroom; charge efficiency applies
///    on the way in.
/// 3. Serve load directly from remaining AC solar.
/// 4. Export leftover AC solar, or curtail it when self-consumption
///    priority holds and the battery still has headroom.
/// 5. Discharge down to the reserve floor when the timing policy allows.
/// 6. Import the unmet remainder from the grid.
///
/// # Arguments
///
/// * `hourly_load` - Load series (kWh per hour, values >= 0)
/// * `hourly_solar` - DC solar production series (kWh per hour, values >= 0)
/// * `policy` - Dispatch rules for this run
///
/// # Panics
///
/// Panics if the two series differ in length; series alignment is a caller
/// responsibility.
pub fn run_dispatch(
    hourly_load: &[f32],
    hourly_solar: &[f32],
    policy: &DispatchPolicy,
) -> DispatchResult {
    assert_eq!(
        hourly_load.len(),
        hourly_solar.len(),
        "load and solar series must be hour-aligned"
    );
    let hours = hourly_load.len();

    let mut import_kwh = vec![0.0_f32; hours];
    let mut export_kwh = vec![0.0_f32; hours];
    let mut solar_to_load_kwh = vec![0.0_f32; hours];
    let mut solar_to_battery_kwh = vec![0.0_f32; hours];
    let mut battery_to_load_kwh = vec![0.0_f32; hours];

    let min_soc = policy.min_soc_kwh();
    let mut soc = 0.0_f32;

    for hour in 0..hours {
        let mut load = hourly_load[hour].max(0.0);
        let solar_dc = hourly_solar[hour].max(0.0);

        // 1. Inverter clipping: AC-usable solar vs. DC-only surplus.
        let mut ac_solar = solar_dc.min(policy.inverter_size_kw);
        let clipped_dc = (solar_dc - policy.inverter_size_kw).max(0.0);

        // 2. Charge, clipped DC first. Headroom is measured on the input
        //    side; charge efficiency shrinks what actually lands in the
        //    battery.
        let headroom = (policy.battery_kwh - soc).max(0.0);
        if headroom > 0.0 {
            let from_clipped = clipped_dc.min(headroom);
            let from_ac = (ac_solar * INVERTER_EFF).min(headroom - from_clipped);
            let ac_draw = from_ac / INVERTER_EFF;
            soc += (from_clipped + from_ac) * BATTERY_CHARGE_EFF;
            // Guard the 1-ulp residue of the efficiency round trip.
            ac_solar = (ac_solar - ac_draw).max(0.0);
            solar_to_battery_kwh[hour] = from_clipped + ac_draw;
        }

        // 3. Direct solar to load.
        let direct = load.min(ac_solar);
        solar_to_load_kwh[hour] = direct;
        load -= direct;
        ac_solar -= direct;

        // 4. Export or curtail the leftover.
        if ac_solar > 0.0 {
            let battery_full = soc >= policy.battery_kwh;
            if !policy.self_consumption_priority || battery_full {
                export_kwh[hour] = ac_solar;
            }
            // Otherwise the leftover is curtailed: the battery had headroom
            // this hour but the charge step already took what it could.
        }

        // 5. Battery discharge, gated by timing policy and reserve floor.
        if load > 0.0 && soc > min_soc && policy.may_discharge(hour % 24) {
            let discharge = (soc - min_soc).min(load / INVERTER_EFF);
            soc -= discharge;
            let served = discharge * INVERTER_EFF;
            battery_to_load_kwh[hour] = served;
            load -= served;
        }

        // 6. Grid import of whatever remains.
        if load > 0.0 {
            import_kwh[hour] = load;
        }
    }

    let kpis = DispatchKpis::from_series(
        hourly_load,
        hourly_solar,
        &solar_to_load_kwh,
        &solar_to_battery_kwh,
        &battery_to_load_kwh,
        &import_kwh,
        &export_kwh,
    );

    DispatchResult {
        hourly_load_kwh: hourly_load.to_vec(),
        hourly_solar_kwh: hourly_solar.to_vec(),
        import_kwh,
        export_kwh,
        solar_to_load_kwh,
        solar_to_battery_kwh,
        battery_to_load_kwh,
        kpis,
    }
}
