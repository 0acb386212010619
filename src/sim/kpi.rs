//! Post-hoc KPI derivation from dispatch series.

use std::fmt;

/// Annual key performance indicators for one dispatch run.
///
/// Computed post-hoc from the complete hourly series so reported metrics
/// always agree with the per-hour data. Every division is guarded: all-zero
/// load or solar yields zero rates, never NaN.
#[derive(Debug, Clone)]
pub struct DispatchKpis {
    /// Total grid import over the year (kWh).
    pub annual_import_kwh: f32,
    /// Total grid export over the year (kWh).
    pub annual_export_kwh: f32,
    /// Share of solar production consumed on-site, directly or via the
    /// battery (percent, 0-100).
    pub self_consumption_rate_pct: f32,
    /// Share of load met without grid import (percent, capped at 100).
    pub grid_independence_rate_pct: f32,
    /// Annual import minus annual export (kWh).
    pub net_grid_interaction_kwh: f32,
}

impl DispatchKpis {
    /// Derives all KPIs from the hour-aligned series of one run.
    ///
    /// Percentages are scaled by 100 exactly once here and stored as 0-100
    /// values; callers must not rescale them.
    pub fn from_series(
        hourly_load: &[f32],
        hourly_solar: &[f32],
        solar_to_load: &[f32],
        solar_to_battery: &[f32],
        battery_to_load: &[f32],
        import_kwh: &[f32],
        export_kwh: &[f32],
    ) -> Self {
        let total_solar: f32 = hourly_solar.iter().sum();
        let total_load: f32 = hourly_load.iter().sum();
        let solar_direct: f32 = solar_to_load.iter().sum();
        let solar_stored: f32 = solar_to_battery.iter().sum();
        let battery_served: f32 = battery_to_load.iter().sum();
        let annual_import: f32 = import_kwh.iter().sum();
        let annual_export: f32 = export_kwh.iter().sum();

        let self_consumption_rate_pct = if total_solar > 0.0 {
            100.0 * (solar_direct + solar_stored) / total_solar
        } else {
            0.0
        };

        let grid_independence_rate_pct = if total_load > 0.0 {
            (100.0 * (solar_direct + battery_served) / total_load).min(100.0)
        } else {
            0.0
        };

        Self {
            annual_import_kwh: annual_import,
            annual_export_kwh: annual_export,
            self_consumption_rate_pct,
            grid_independence_rate_pct,
            net_grid_interaction_kwh: annual_import - annual_export,
        }
    }
}

impl fmt::Display for DispatchKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch KPIs ---")?;
        writeln!(f, "Annual grid import:    {:.1} kWh", self.annual_import_kwh)?;
        writeln!(f, "Annual grid export:    {:.1} kWh", self.annual_export_kwh)?;
        writeln!(
            f,
            "Self-consumption rate: {:.1}%",
            self.self_consumption_rate_pct
        )?;
        writeln!(
            f,
            "Grid independence:     {:.1}%",
            self.grid_independence_rate_pct
        )?;
        write!(
            f,
            "Net grid interaction:  {:.1} kWh",
            self.net_grid_interaction_kwh
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_when_inputs_are_zero() {
        let z = vec![0.0_f32; 24];
        let kpis = DispatchKpis::from_series(&z, &z, &z, &z, &z, &z, &z);
        assert_eq!(kpis.self_consumption_rate_pct, 0.0);
        assert_eq!(kpis.grid_independence_rate_pct, 0.0);
        assert_eq!(kpis.net_grid_interaction_kwh, 0.0);
    }

    #[test]
    fn self_consumption_counts_direct_and_stored_solar() {
        let solar = vec![10.0, 10.0];
        let load = vec![5.0, 5.0];
        let s2l = vec![5.0, 5.0];
        let s2b = vec![4.0, 0.0];
        let z = vec![0.0, 0.0];
        let kpis = DispatchKpis::from_series(&load, &solar, &s2l, &s2b, &z, &z, &z);
        // (10 + 4) / 20 = 70%
        assert!((kpis.self_consumption_rate_pct - 70.0).abs() < 1e-4);
    }

    #[test]
    fn grid_independence_caps_at_100() {
        let solar = vec![10.0];
        let load = vec![2.0];
        let s2l = vec![2.0];
        let b2l = vec![1.0];
        let z = vec![0.0];
        let kpis = DispatchKpis::from_series(&load, &solar, &s2l, &z, &b2l, &z, &z);
        assert_eq!(kpis.grid_independence_rate_pct, 100.0);
    }

    #[test]
    fn net_grid_interaction_is_import_minus_export() {
        let z = vec![0.0, 0.0];
        let import = vec![3.0, 2.0];
        let export = vec![1.0, 0.5];
        let kpis = DispatchKpis::from_series(&z, &z, &z, &z, &z, &import, &export);
        assert!((kpis.net_grid_interaction_kwh - 3.5).abs() < 1e-6);
    }

    #[test]
    fn display_does_not_panic() {
        let z = vec![0.0_f32; 2];
        let kpis = DispatchKpis::from_series(&z, &z, &z, &z, &z, &z, &z);
        let s = format!("{kpis}");
        assert!(s.contains("Self-consumption"));
    }
}
