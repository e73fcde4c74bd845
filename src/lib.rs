//! TrayPilot - tray commander for OS services
//!
//! A polling monitor keeps last-known service state in sync with the
//! service control facility, a controller drives start/stop/kill with
//! forced-kill escalation, and a projector derives the tray menu tree
//! from (config, live state).

pub mod config;
pub mod icons;
pub mod panels;
pub mod report;
pub mod services;

pub use panels::tray_menu::{MenuProjector, MenuSurface};
pub use services::control::ServiceController;
pub use services::monitor::ServiceMonitor;
