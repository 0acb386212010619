//! Financial derivation: savings, incentives, payback, ROI, and cash flow.

use std::fmt;

use crate::load::UserType;
use crate::sim::DispatchResult;

pub mod cashflow;
pub mod incentives;

pub use cashflow::{MonthlyCashFlow, monthly_cash_flow};
pub use incentives::{BASE_ITC_RATE, DepreciationModel, EFFECTIVE_TAX_RATE, itc_amount};

/// Fraction of the retail rate credited for exported energy.
pub const NET_METER_CREDIT_FACTOR: f32 = 0.75;

/// Annual rate of the simplified interest-only financing model.
pub const LOAN_RATE: f32 = 0.06;

/// Horizon in years for the simple ROI figure.
const ROI_HORIZON_YEARS: f32 = 25.0;

/// Derived financial outcome of a proposal.
///
/// Created once per derivation from a [`DispatchResult`] and a capex figure;
/// read-only afterward. `payback_years` and `roi_pct_25_yr` use
/// `f32::INFINITY` as the "no payback" / "infinite return" sentinel.
#[derive(Debug, Clone)]
pub struct FinancialResult {
    /// Avoided cost from direct solar consumption ($/yr).
    pub solar_avoided_cost: f32,
    /// Avoided cost from battery discharge ($/yr).
    pub battery_avoided_cost: f32,
    /// Net-metering export revenue ($/yr).
    pub export_revenue: f32,
    /// Sum of the three value streams above ($/yr).
    pub total_annual_savings: f32,
    /// Total capital expenditure ($).
    pub capex: f32,
    /// Investment tax credit ($).
    pub itc_amount: f32,
    /// First-year depreciation benefit ($, commercial only).
    pub depreciation_benefit: f32,
    /// Capex net of ITC and depreciation ($).
    pub net_cost: f32,
    /// Years to recover the net cost from annual savings.
    pub payback_years: f32,
    /// Simple 25-year return on the net cost (percent).
    pub roi_pct_25_yr: f32,
    /// 12-row calendar-month cash-flow table.
    pub monthly: Vec<MonthlyCashFlow>,
}

/// Computes savings, incentives, and returns from a dispatch result.
///
/// A non-finite or negative capex is coerced to 0.0 so the estimator stays
/// available; the orchestrator records a warning when it does this.
///
/// # Panics
///
/// Panics if `hourly_rates` is not hour-aligned with the dispatch series.
pub fn derive_financials(
    capex: f32,
    dispatch: &DispatchResult,
    hourly_rates: &[f32],
    user_type: UserType,
    depreciation: DepreciationModel,
) -> FinancialResult {
    assert_eq!(
        hourly_rates.len(),
        dispatch.import_kwh.len(),
        "rate schedule must be hour-aligned with dispatch series"
    );
    let capex = if capex.is_finite() { capex.max(0.0) } else { 0.0 };

    let mut solar_avoided_cost = 0.0;
    let mut battery_avoided_cost = 0.0;
    let mut export_revenue = 0.0;
    for (hour, &rate) in hourly_rates.iter().enumerate() {
        solar_avoided_cost += dispatch.solar_to_load_kwh[hour] * rate;
        battery_avoided_cost += dispatch.battery_to_load_kwh[hour] * rate;
        export_revenue += dispatch.export_kwh[hour] * rate * NET_METER_CREDIT_FACTOR;
    }
    let total_annual_savings = solar_avoided_cost + battery_avoided_cost + export_revenue;

    let itc = itc_amount(capex);
    let depreciation_benefit = depreciation.benefit(capex, itc, user_type);
    let net_cost = capex - itc - depreciation_benefit;

    let payback_years = if total_annual_savings > 0.0 {
        net_cost / total_annual_savings
    } else {
        f32::INFINITY
    };

    let roi_pct_25_yr = if net_cost > 0.0 {
        (total_annual_savings * ROI_HORIZON_YEARS - net_cost) / net_cost * 100.0
    } else if total_annual_savings > 0.0 {
        f32::INFINITY
    } else {
        0.0
    };

    let monthly = monthly_cash_flow(dispatch, hourly_rates, net_cost);

    FinancialResult {
        solar_avoided_cost,
        battery_avoided_cost,
        export_revenue,
        total_annual_savings,
        capex,
        itc_amount: itc,
        depreciation_benefit,
        net_cost,
        payback_years,
        roi_pct_25_yr,
        monthly,
    }
}

impl fmt::Display for FinancialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial Summary ---")?;
        writeln!(f, "Annual savings:        ${:.2}", self.total_annual_savings)?;
        writeln!(f, "  solar avoided:       ${:.2}", self.solar_avoided_cost)?;
        writeln!(f, "  battery avoided:     ${:.2}", self.battery_avoided_cost)?;
        writeln!(f, "  export revenue:      ${:.2}", self.export_revenue)?;
        writeln!(f, "Capex:                 ${:.2}", self.capex)?;
        writeln!(f, "ITC:                   ${:.2}", self.itc_amount)?;
        writeln!(f, "Depreciation benefit:  ${:.2}", self.depreciation_benefit)?;
        writeln!(f, "Net cost:              ${:.2}", self.net_cost)?;
        if self.payback_years.is_finite() {
            writeln!(f, "Payback:               {:.1} years", self.payback_years)?;
        } else {
            writeln!(f, "Payback:               n/a (no positive savings)")?;
        }
        if self.roi_pct_25_yr.is_finite() {
            write!(f, "25-yr ROI:             {:.1}%", self.roi_pct_25_yr)
        } else {
            write!(f, "25-yr ROI:             n/a")
        }
    }
}
