//! Calendar-month resampling of hourly flows into a cash-flow table.

use crate::rates::{HOURS_PER_YEAR, MONTH_LABELS, month_hour_spans};
use crate::sim::DispatchResult;

use super::{LOAN_RATE, NET_METER_CREDIT_FACTOR};

/// One row of the 12-month cash-flow table.
#[derive(Debug, Clone)]
pub struct MonthlyCashFlow {
    /// Three-letter month label ("Jan".."Dec").
    pub month: &'static str,
    /// Grid import for the month (kWh).
    pub import_kwh: f32,
    /// Grid export for the month (kWh).
    pub export_kwh: f32,
    /// Cost of remaining grid import ($).
    pub grid_import_cost: f32,
    /// Net-metering export revenue ($).
    pub export_revenue: f32,
    /// What the bill would have been with no system ($).
    pub original_bill: f32,
    /// Cost avoided by direct solar consumption ($).
    pub solar_avoided_cost: f32,
    /// Cost avoided by battery discharge ($).
    pub battery_avoided_cost: f32,
    /// Resulting bill: import cost minus export revenue ($).
    pub new_bill: f32,
    /// Original bill minus new bill ($).
    pub savings: f32,
    /// Interest-only loan payment, recorded as a negative cash flow ($).
    pub loan_payment: f32,
    /// Savings plus the (negative) loan payment ($).
    pub net_cash_flow: f32,
}

/// Resamples the hourly dispatch series into 12 calendar-month rows.
///
/// The loan payment is a simplified interest-only figure,
/// `net_cost x annual rate / 12`, zero when the net cost is not positive.
///
/// # Panics
///
/// Panics unless the dispatch series and rate schedule cover the full year.
pub fn monthly_cash_flow(
    dispatch: &DispatchResult,
    hourly_rates: &[f32],
    net_cost: f32,
) -> Vec<MonthlyCashFlow> {
    assert_eq!(dispatch.import_kwh.len(), HOURS_PER_YEAR);
    assert_eq!(hourly_rates.len(), HOURS_PER_YEAR);
    let monthly_payment = if net_cost > 0.0 {
        net_cost * LOAN_RATE / 12.0
    } else {
        0.0
    };

    month_hour_spans()
        .iter()
        .enumerate()
        .map(|(month, &(start, end))| {
            let mut import_kwh = 0.0;
            let mut export_kwh = 0.0;
            let mut grid_import_cost = 0.0;
            let mut export_revenue = 0.0;
            let mut original_bill = 0.0;
            let mut solar_avoided_cost = 0.0;
            let mut battery_avoided_cost = 0.0;

            for hour in start..end {
                let rate = hourly_rates[hour];
                import_kwh += dispatch.import_kwh[hour];
                export_kwh += dispatch.export_kwh[hour];
                grid_import_cost += dispatch.import_kwh[hour] * rate;
                export_revenue += dispatch.export_kwh[hour] * rate * NET_METER_CREDIT_FACTOR;
                original_bill += dispatch.hourly_load_kwh[hour] * rate;
                solar_avoided_cost += dispatch.solar_to_load_kwh[hour] * rate;
                battery_avoided_cost += dispatch.battery_to_load_kwh[hour] * rate;
            }

            let new_bill = grid_import_cost - export_revenue;
            let savings = original_bill - new_bill;

            MonthlyCashFlow {
                month: MONTH_LABELS[month],
                import_kwh,
                export_kwh,
                grid_import_cost,
                export_revenue,
                original_bill,
                solar_avoided_cost,
                battery_avoided_cost,
                new_bill,
                savings,
                loan_payment: -monthly_payment,
                net_cash_flow: savings - monthly_payment,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::HOURS_PER_YEAR;
    use crate::sim::{DispatchPolicy, run_dispatch};

    fn flat_dispatch() -> DispatchResult {
        let load = vec![1.0_f32; HOURS_PER_YEAR];
        let mut solar = vec![0.0_f32; HOURS_PER_YEAR];
        for (h, s) in solar.iter_mut().enumerate() {
            if (8..16).contains(&(h % 24)) {
                *s = 2.0;
            }
        }
        let policy = DispatchPolicy::new(0.0, 10.0, 0.0, false, false, [false; 24]);
        run_dispatch(&load, &solar, &policy)
    }

    #[test]
    fn produces_twelve_labelled_rows() {
        let dispatch = flat_dispatch();
        let rates = vec![0.10_f32; HOURS_PER_YEAR];
        let rows = monthly_cash_flow(&dispatch, &rates, 12_000.0);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, "Jan");
        assert_eq!(rows[11].month, "Dec");
    }

    #[test]
    fn monthly_sums_match_annual_totals() {
        let dispatch = flat_dispatch();
        let rates = vec![0.10_f32; HOURS_PER_YEAR];
        let rows = monthly_cash_flow(&dispatch, &rates, 0.0);

        let import_sum: f32 = rows.iter().map(|r| r.import_kwh).sum();
        let export_sum: f32 = rows.iter().map(|r| r.export_kwh).sum();
        assert!((import_sum - dispatch.kpis.annual_import_kwh).abs() < 0.5);
        assert!((export_sum - dispatch.kpis.annual_export_kwh).abs() < 0.5);
    }

    #[test]
    fn loan_payment_is_interest_only_and_negative() {
        let dispatch = flat_dispatch();
        let rates = vec![0.10_f32; HOURS_PER_YEAR];
        let rows = monthly_cash_flow(&dispatch, &rates, 12_000.0);
        let expected = 12_000.0 * LOAN_RATE / 12.0;
        for row in &rows {
            assert!((row.loan_payment + expected).abs() < 1e-3);
            assert!((row.net_cash_flow - (row.savings - expected)).abs() < 1e-3);
        }
    }

    #[test]
    fn zero_net_cost_means_zero_loan_payment() {
        let dispatch = flat_dispatch();
        let rates = vec![0.10_f32; HOURS_PER_YEAR];
        let rows = monthly_cash_flow(&dispatch, &rates, 0.0);
        assert!(rows.iter().all(|r| r.loan_payment == 0.0));
    }

    #[test]
    fn savings_reconcile_with_bills() {
        let dispatch = flat_dispatch();
        let rates = vec![0.25_f32; HOURS_PER_YEAR];
        let rows = monthly_cash_flow(&dispatch, &rates, 5_000.0);
        for row in &rows {
            assert!((row.new_bill - (row.grid_import_cost - row.export_revenue)).abs() < 1e-3);
            assert!((row.savings - (row.original_bill - row.new_bill)).abs() < 1e-3);
        }
    }
}
