//! Presentation panels driven by background service state.

pub mod tray_menu;
