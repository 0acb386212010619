//! Hourly dispatch simulation: policy, engine, and KPI derivation.

pub mod engine;
pub mod kpi;
/// Dispatch rules and efficiency constants.
pub mod policy;

pub use engine::{DispatchResult, run_dispatch};
pub use kpi::DispatchKpis;
pub use policy::{BATTERY_CHARGE_EFF, DispatchPolicy, INVERTER_EFF};
