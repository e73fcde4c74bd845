//! pilot-winsvc - service control facility client
//!
//! Features:
//! - Lazy parser for the line-oriented status text
//! - Subprocess bridge for queries, start/stop and forced kill
//! - Typed service states and observations

pub mod bridge;
pub mod error;
pub mod parser;
pub mod types;

pub use bridge::{ScBridge, SystemSc};
pub use error::SvcError;
pub use parser::{parse_first, parse_records};
pub use types::{ServiceMap, ServiceRecord, ServiceState};
