//! Core types for pilot-winsvc

use std::collections::HashMap;

/// Service state as reported by the control facility.
///
/// The discriminants match the numeric codes in the status text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ServiceState {
    #[default]
    Unknown,
    Stopped,
    StartPending,
    StopPending,
    Running,
    ContinuePending,
    PausePending,
    Paused,
}

impl ServiceState {
    /// Map the numeric token of a `STATE` line. Out-of-range codes are
    /// `Unknown`.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => ServiceState::Stopped,
            2 => ServiceState::StartPending,
            3 => ServiceState::StopPending,
            4 => ServiceState::Running,
            5 => ServiceState::ContinuePending,
            6 => ServiceState::PausePending,
            7 => ServiceState::Paused,
            _ => ServiceState::Unknown,
        }
    }

    /// Human label used for menu decoration. `Unknown` has none.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ServiceState::Unknown => None,
            ServiceState::Stopped => Some("Stopped"),
            ServiceState::StartPending => Some("Starting"),
            ServiceState::StopPending => Some("Stopping"),
            ServiceState::Running => Some("Running"),
            ServiceState::ContinuePending => Some("Resuming"),
            ServiceState::PausePending => Some("Pausing"),
            ServiceState::Paused => Some("Paused"),
        }
    }

    /// True for the four transitional states.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ServiceState::StartPending
                | ServiceState::StopPending
                | ServiceState::ContinuePending
                | ServiceState::PausePending
        )
    }
}

/// One observation of a service. Rebuilt wholesale on every poll cycle,
/// never merged field by field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServiceRecord {
    pub name: String,
    pub display_name: Option<String>,
    pub state: ServiceState,
    /// Raw secondary status text from the `STATE` line.
    pub state_description: Option<String>,
    /// Present only while a process backs the service.
    pub pid: Option<u32>,
}

impl ServiceRecord {
    /// Lookup key: service names compare case-insensitively.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Last-known records keyed by lower-cased service name.
pub type ServiceMap = HashMap<String, ServiceRecord>;
