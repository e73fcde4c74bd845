//! Shared background services for TrayPilot.
//!
//! Services own their state and publish snapshots that panels consume.
//!
//! - `monitor` - polls the service control facility, diffs, publishes
//! - `control` - start/stop/kill with forced-kill escalation

pub mod control;
pub mod monitor;
