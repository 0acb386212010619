//! Full proposal pipeline: geocode, production, load, rates, dispatch,
//! financials.

use std::fmt;

use serde::Deserialize;

use crate::finance::{DepreciationModel, FinancialResult, derive_financials};
use crate::load::{UserType, future_electrification_kwh, synthesize_hourly_load};
use crate::rates::RateSchedule;
use crate::services::{Geocoder, ProductionSource, ServiceError};
use crate::sim::{DispatchPolicy, DispatchResult, run_dispatch};

/// Installed solar cost per nameplate kW ($).
pub const SOLAR_COST_PER_KW: f32 = 2500.0;

/// Estimated DC production per unit of reported AC production.
pub const DC_AC_RATIO: f32 = 1.2;

/// Battery backup preference, mapping to a fixed usable capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupPreference {
    /// No battery.
    NoBackup,
    /// Critical circuits only (10 kWh).
    EssentialsOnly,
    /// Whole-house backup (25 kWh).
    WholeHouse,
}

impl BackupPreference {
    /// Battery capacity implied by the preference.
    pub fn battery_kwh(&self) -> f32 {
        match self {
            Self::NoBackup => 0.0,
            Self::EssentialsOnly => 10.0,
            Self::WholeHouse => 25.0,
        }
    }

    /// Parses the scenario-file label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "none" => Some(Self::NoBackup),
            "essentials" => Some(Self::EssentialsOnly),
            "whole_house" => Some(Self::WholeHouse),
            _ => None,
        }
    }
}

/// Flat named-input bundle for one proposal run.
///
/// Optional numerics model fields the intake layer may leave blank; they
/// coerce to 0.0 with a recorded warning rather than failing the run.
#[derive(Debug, Clone)]
pub struct ProposalInputs {
    /// Free-text site address; must geocode.
    pub address: String,
    /// Average monthly consumption (kWh).
    pub monthly_kwh_usage: Option<f32>,
    /// Proposed PV nameplate capacity (kW DC).
    pub system_size_kw: Option<f32>,
    /// Inverter AC capacity (kW).
    pub inverter_size_kw: Option<f32>,
    /// Battery backup preference.
    pub backup_pref: BackupPreference,
    /// Minimum battery reserve (percent of capacity).
    pub min_battery_reserve_pct: Option<f32>,
    /// Prefer on-site consumption over export.
    pub self_consumption_priority: bool,
    /// Time-of-use aware battery discharge timing.
    pub tou_enabled: bool,
    /// Rate plan name from the tariff catalog.
    pub rate_plan: String,
    /// Customer classification.
    pub user_type: UserType,
    /// Installed battery cost per kWh ($).
    pub battery_cost_per_kwh: Option<f32>,
    /// Planned annual EV mileage.
    pub ev_annual_miles: Option<f32>,
    /// EV efficiency (miles per kWh).
    pub ev_efficiency_mi_kwh: Option<f32>,
    /// Planned annual heat-pump output (BTU).
    pub heat_pump_btu_yr: Option<f32>,
    /// Heat-pump coefficient of performance.
    pub heat_pump_cop: Option<f32>,
    /// Depreciation strategy for commercial users.
    pub depreciation: DepreciationModel,
}

/// Stage-tagged error from a proposal run.
///
/// The pipeline stops at the first fatal stage: a proposal without a
/// location or a production estimate is meaningless, so those errors are
/// never defaulted away.
#[derive(Debug, Clone)]
pub enum ProposalError {
    /// A required non-numeric input was missing or unusable.
    MissingInput(String),
    /// Geocoding failed; nothing downstream was attempted.
    Geocoding(ServiceError),
    /// Production fetch failed; dispatch and financials were not attempted.
    Production(ServiceError),
}

impl fmt::Display for ProposalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(name) => write!(f, "missing required input: {name}"),
            Self::Geocoding(err) => write!(f, "geocoding failed: {err}"),
            Self::Production(err) => write!(f, "production fetch failed: {err}"),
        }
    }
}

/// Completed proposal bundle consumed by reporting and export.
#[derive(Debug, Clone)]
pub struct Proposal {
    /// Geocoded latitude.
    pub lat: f64,
    /// Geocoded longitude.
    pub lon: f64,
    /// Annual AC production of the proposed system (kWh).
    pub ac_annual_kwh: f32,
    /// Battery capacity from the backup preference (kWh).
    pub battery_kwh: f32,
    /// Additional annual load from planned electrification (kWh).
    pub future_load_kwh: f32,
    /// Baseline plus future annual load (kWh).
    pub total_projected_annual_kwh: f32,
    /// Days the battery alone could carry the average daily load.
    pub backup_duration_days: f32,
    /// Resolved rate schedule (including the fallback flag).
    pub rates: RateSchedule,
    /// Non-fatal input coercions and fallbacks collected during the run.
    pub warnings: Vec<String>,
    /// Hourly dispatch output.
    pub dispatch: DispatchResult,
    /// Financial derivation output.
    pub financials: FinancialResult,
}

/// Coerces an optional numeric input to a usable value.
///
/// `None`, non-finite, and negative values all become 0.0; anything other
/// than a plain `None` default records a warning so the caller can surface
/// it.
fn coerce_input(value: Option<f32>, name: &str, warnings: &mut Vec<String>) -> f32 {
    match value {
        None => 0.0,
        Some(v) if !v.is_finite() => {
            warnings.push(format!("{name}: non-numeric value replaced with 0"));
            0.0
        }
        Some(v) if v < 0.0 => {
            warnings.push(format!("{name}: negative value {v} replaced with 0"));
            0.0
        }
        Some(v) => v,
    }
}

/// Runs the full proposal calculation.
///
/// Stages run in order: geocode, battery sizing, production fetch, future
/// load, load synthesis, rate generation, dispatch, capex, financials. The
/// first geocoding or production failure short-circuits the pipeline.
///
/// # Errors
///
/// Returns a [`ProposalError`] naming the failed stage.
pub fn run_proposal(
    inputs: &ProposalInputs,
    geocoder: &dyn Geocoder,
    production: &dyn ProductionSource,
) -> Result<Proposal, ProposalError> {
    let mut warnings = Vec::new();

    if inputs.address.trim().is_empty() {
        return Err(ProposalError::MissingInput("address".to_string()));
    }

    // 1. Geocode. Fatal on failure: no location, no estimate.
    let (lat, lon) = geocoder
        .geocode(&inputs.address)
        .map_err(ProposalError::Geocoding)?;

    // 2. Battery sizing from the backup preference.
    let battery_kwh = inputs.backup_pref.battery_kwh();

    // 3. Hourly production for the proposed system; DC series estimated from
    //    the reported AC output.
    let system_size_kw = coerce_input(inputs.system_size_kw, "system_size_kw", &mut warnings);
    let hourly_ac = production
        .hourly_production(lat, lon, system_size_kw)
        .map_err(ProposalError::Production)?;
    let ac_annual_kwh: f32 = hourly_ac.iter().sum();
    let hourly_solar_dc: Vec<f32> = hourly_ac.iter().map(|&v| v * DC_AC_RATIO).collect();

    // 4. Projected annual load: billed usage plus planned electrification.
    let monthly_kwh = coerce_input(inputs.monthly_kwh_usage, "monthly_kwh_usage", &mut warnings);
    let future_load_kwh = future_electrification_kwh(
        coerce_input(inputs.ev_annual_miles, "ev_annual_miles", &mut warnings),
        coerce_input(
            inputs.ev_efficiency_mi_kwh,
            "ev_efficiency_mi_kwh",
            &mut warnings,
        ),
        coerce_input(inputs.heat_pump_btu_yr, "heat_pump_btu_yr", &mut warnings),
        coerce_input(inputs.heat_pump_cop, "heat_pump_cop", &mut warnings),
    );
    let total_projected_annual_kwh = monthly_kwh * 12.0 + future_load_kwh;
    let hourly_load = synthesize_hourly_load(total_projected_annual_kwh, inputs.user_type);

    // 5. Rate schedule; an unknown plan degrades to the flat default.
    let rates = RateSchedule::for_plan(&inputs.rate_plan);
    if rates.fallback {
        warnings.push(format!(
            "rate plan \"{}\" not in catalog; using flat default rate",
            inputs.rate_plan
        ));
    }

    // 6. Dispatch.
    let policy = DispatchPolicy::new(
        battery_kwh,
        coerce_input(inputs.inverter_size_kw, "inverter_size_kw", &mut warnings),
        coerce_input(
            inputs.min_battery_reserve_pct,
            "min_battery_reserve_pct",
            &mut warnings,
        ),
        inputs.self_consumption_priority,
        inputs.tou_enabled,
        rates.peak_hours,
    );
    let dispatch = run_dispatch(&hourly_load, &hourly_solar_dc, &policy);

    // 7. Capex and financials.
    let battery_cost_per_kwh = coerce_input(
        inputs.battery_cost_per_kwh,
        "battery_cost_per_kwh",
        &mut warnings,
    );
    let capex = system_size_kw * SOLAR_COST_PER_KW + battery_kwh * battery_cost_per_kwh;
    let financials = derive_financials(
        capex,
        &dispatch,
        &rates.rates,
        inputs.user_type,
        inputs.depreciation,
    );

    let avg_daily_load = total_projected_annual_kwh / 365.0;
    let backup_duration_days = if avg_daily_load > 0.0 {
        battery_kwh / avg_daily_load
    } else {
        0.0
    };

    Ok(Proposal {
        lat,
        lon,
        ac_annual_kwh,
        battery_kwh,
        future_load_kwh,
        total_projected_annual_kwh,
        backup_duration_days,
        rates,
        warnings,
        dispatch,
        financials,
    })
}
