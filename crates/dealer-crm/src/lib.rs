//! Dealership lead desk: SPPC prospect scoring and guard-duty lead distribution.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
