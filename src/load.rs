//! Hourly load-profile synthesis and future-electrification load estimates.

use std::fmt;

use serde::Deserialize;

use crate::rates::HOURS_PER_YEAR;

/// BTU content of one kWh, used for heat-pump load conversion.
const BTU_PER_KWH: f32 = 3412.0;

/// Customer classification carried through load synthesis and financials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum UserType {
    #[serde(rename = "Homeowner")]
    Homeowner,
    #[serde(rename = "Commercial / Business")]
    Commercial,
    #[serde(rename = "Farm / Agriculture")]
    Farm,
    #[serde(rename = "Nonprofit")]
    Nonprofit,
}

impl UserType {
    /// Parses the intake-form label used by scenario files.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Homeowner" => Some(Self::Homeowner),
            "Commercial / Business" => Some(Self::Commercial),
            "Farm / Agriculture" => Some(Self::Farm),
            "Nonprofit" => Some(Self::Nonprofit),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Homeowner => "Homeowner",
            Self::Commercial => "Commercial / Business",
            Self::Farm => "Farm / Agriculture",
            Self::Nonprofit => "Nonprofit",
        };
        write!(f, "{label}")
    }
}

/// Expands an annual kWh total into a flat hourly series.
///
/// The series sums to the annual total to floating-point tolerance. Load is
/// deliberately shapeless at this fidelity: no diurnal or seasonal profile
/// is applied, only the average hourly draw.
///
/// A non-positive annual total yields the zero series.
pub fn synthesize_hourly_load(annual_kwh: f32, user_type: UserType) -> Vec<f32> {
    if annual_kwh <= 0.0 && user_type == UserType::Homeowner {
        return vec![0.0; HOURS_PER_YEAR];
    }
    let hourly = (annual_kwh / HOURS_PER_YEAR as f32).max(0.0);
    vec![hourly; HOURS_PER_YEAR]
}

/// Additional annual kWh from planned electrification (EV + heat pump).
///
/// Each additive term is ignored when its governing input is non-positive or
/// not finite; invalid inputs contribute 0.0 rather than an error.
///
/// # Arguments
///
/// * `ev_annual_miles` - Annual EV mileage
/// * `ev_mi_per_kwh` - EV efficiency in miles per kWh
/// * `heat_pump_btu_yr` - Annual heat-pump output in BTU
/// * `heat_pump_cop` - Heat-pump coefficient of performance
pub fn future_electrification_kwh(
    ev_annual_miles: f32,
    ev_mi_per_kwh: f32,
    heat_pump_btu_yr: f32,
    heat_pump_cop: f32,
) -> f32 {
    let mut additional = 0.0;

    if ev_annual_miles > 0.0
        && ev_mi_per_kwh > 0.0
        && ev_annual_miles.is_finite()
        && ev_mi_per_kwh.is_finite()
    {
        additional += ev_annual_miles / ev_mi_per_kwh;
    }

    if heat_pump_btu_yr > 0.0
        && heat_pump_cop > 0.0
        && heat_pump_btu_yr.is_finite()
        && heat_pump_cop.is_finite()
    {
        additional += heat_pump_btu_yr / BTU_PER_KWH / heat_pump_cop;
    }

    additional
}
