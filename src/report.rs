use crate::orchestrator::Proposal;

pub fn print_proposal_report(proposal: &Proposal) {
    println!("--- Proposal Summary ---");
    println!(
        "Location:              ({:.2}, {:.2})",
        proposal.lat, proposal.lon
    );
    println!("Rate plan:             {}", proposal.rates);
    println!(
        "Annual production:     {:.0} kWh AC",
        proposal.ac_annual_kwh
    );
    println!(
        "Projected annual load: {:.0} kWh ({:.0} kWh future electrification)",
        proposal.total_projected_annual_kwh, proposal.future_load_kwh
    );
    println!(
        "Battery:               {:.1} kWh ({:.1} days of backup)",
        proposal.battery_kwh, proposal.backup_duration_days
    );
    println!("\n{}", proposal.dispatch.kpis);
    println!("\n{}", proposal.financials);

    if !proposal.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &proposal.warnings {
            println!("  - {warning}");
        }
    }
}
