//! CSV export for hourly dispatch series and the monthly cash-flow table.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::finance::MonthlyCashFlow;
use crate::orchestrator::Proposal;

/// Column header for hourly telemetry export.
const HOURLY_HEADER: &str = "hour,load_kwh,solar_dc_kwh,solar_to_load_kwh,\
                             solar_to_battery_kwh,battery_to_load_kwh,\
                             import_kwh,export_kwh,rate_usd_per_kwh";

/// Column header for monthly cash-flow export.
const CASHFLOW_HEADER: &str = "month,import_kwh,export_kwh,grid_import_cost,\
                               export_revenue,original_bill,solar_avoided_cost,\
                               battery_avoided_cost,new_bill,savings,\
                               loan_payment,net_cash_flow";

/// Exports the hourly dispatch series of a proposal to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_hourly_csv(proposal: &Proposal, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_hourly_csv(proposal, buf)
}

/// Writes the hourly dispatch series as CSV to any writer.
///
/// One row per hour of the year; deterministic for identical proposals.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(proposal: &Proposal, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HOURLY_HEADER.split(',').map(str::trim))?;

    let d = &proposal.dispatch;
    for hour in 0..d.hourly_load_kwh.len() {
        wtr.write_record(&[
            hour.to_string(),
            format!("{:.4}", d.hourly_load_kwh[hour]),
            format!("{:.4}", d.hourly_solar_kwh[hour]),
            format!("{:.4}", d.solar_to_load_kwh[hour]),
            format!("{:.4}", d.solar_to_battery_kwh[hour]),
            format!("{:.4}", d.battery_to_load_kwh[hour]),
            format!("{:.4}", d.import_kwh[hour]),
            format!("{:.4}", d.export_kwh[hour]),
            format!("{:.4}", proposal.rates.rates[hour]),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the monthly cash-flow table to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cashflow_csv(rows: &[MonthlyCashFlow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_cashflow_csv(rows, buf)
}

/// Writes the monthly cash-flow table as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cashflow_csv(rows: &[MonthlyCashFlow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CASHFLOW_HEADER.split(',').map(str::trim))?;

    for row in rows {
        wtr.write_record(&[
            row.month.to_string(),
            format!("{:.2}", row.import_kwh),
            format!("{:.2}", row.export_kwh),
            format!("{:.2}", row.grid_import_cost),
            format!("{:.2}", row.export_revenue),
            format!("{:.2}", row.original_bill),
            format!("{:.2}", row.solar_avoided_cost),
            format!("{:.2}", row.battery_avoided_cost),
            format!("{:.2}", row.new_bill),
            format!("{:.2}", row.savings),
            format!("{:.2}", row.loan_payment),
            format!("{:.2}", row.net_cash_flow),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::orchestrator::run_proposal;
    use crate::rates::HOURS_PER_YEAR;
    use crate::services::{SyntheticProduction, TableGeocoder};

    fn sample_proposal() -> Proposal {
        let cfg = ScenarioConfig::residential_tou();
        let inputs = cfg.to_inputs();
        let production = SyntheticProduction::new(cfg.production.noise_std, cfg.production.seed);
        run_proposal(&inputs, &TableGeocoder, &production).expect("preset proposal should run")
    }

    #[test]
    fn hourly_csv_has_header_and_one_row_per_hour() {
        let proposal = sample_proposal();
        let mut buf = Vec::new();
        write_hourly_csv(&proposal, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines.len(), HOURS_PER_YEAR + 1);
        assert!(lines[0].starts_with("hour,load_kwh,solar_dc_kwh"));
    }

    #[test]
    fn hourly_csv_is_deterministic() {
        let proposal = sample_proposal();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_hourly_csv(&proposal, &mut buf1).ok();
        write_hourly_csv(&proposal, &mut buf2).ok();
        assert_eq!(buf1, buf2);
    }

    #[test]
    fn cashflow_csv_has_twelve_rows() {
        let proposal = sample_proposal();
        let mut buf = Vec::new();
        write_cashflow_csv(&proposal.financials.monthly, &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let lines: Vec<&str> = output.as_deref().unwrap_or("").lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[1].starts_with("Jan,"));
        assert!(lines[12].starts_with("Dec,"));
    }

    #[test]
    fn hourly_csv_round_trip_parseable() {
        let proposal = sample_proposal();
        let mut buf = Vec::new();
        write_hourly_csv(&proposal, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(9));

        let mut rows = 0;
        for record in rdr.records().take(48) {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let rec = rec.as_ref();
            for i in 1..9 {
                let val: Result<f32, _> = rec.map(|r| r[i].parse()).unwrap_or(Ok(0.0));
                assert!(val.is_ok(), "column {i} should parse as f32");
            }
            rows += 1;
        }
        assert_eq!(rows, 48);
    }
}
