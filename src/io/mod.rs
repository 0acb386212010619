//! Input/output helpers: CSV export of simulation results.

pub mod export;
