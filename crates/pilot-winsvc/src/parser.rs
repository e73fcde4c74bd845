//! Parser for the line-oriented status text returned by the service
//! control facility.
//!
//! A record looks like:
//!
//! ```text
//! SERVICE_NAME: wuauserv
//! DISPLAY_NAME: Windows Update
//!         TYPE               : 30  WIN32
//!         STATE              : 4  RUNNING
//!                                 (STOPPABLE, NOT_PAUSABLE)
//!         WIN32_EXIT_CODE    : 0  (0x0)
//!         PID                : 2352
//!         FLAGS              :
//! ```
//!
//! `SERVICE_NAME` starts a record (discarding any unterminated
//! accumulation), `PID` terminates it. No quoting or escaping.

use crate::types::{ServiceRecord, ServiceState};
use std::str::Lines;

/// Lazily parse records out of a full status response.
pub fn parse_records(text: &str) -> Records<'_> {
    Records {
        lines: text.lines(),
    }
}

/// First record of a scoped (single service) response.
pub fn parse_first(text: &str) -> Option<ServiceRecord> {
    parse_records(text).next()
}

/// Iterator over the records of one status response.
pub struct Records<'a> {
    lines: Lines<'a>,
}

impl Iterator for Records<'_> {
    type Item = ServiceRecord;

    fn next(&mut self) -> Option<ServiceRecord> {
        let mut current: Option<ServiceRecord> = None;
        for line in self.lines.by_ref() {
            if line.starts_with("SERVICE_NAME") {
                current = Some(ServiceRecord {
                    name: line_value(line).unwrap_or_default().to_string(),
                    ..ServiceRecord::default()
                });
                continue;
            }
            let Some(record) = current.as_mut() else {
                continue;
            };
            if line.starts_with("DISPLAY_NAME") {
                record.display_name = line_value(line).map(str::to_string);
            } else if token_line(line, "STATE") {
                let value = line_value(line).unwrap_or_default();
                let (code, description) = split_value(value);
                record.state = code
                    .and_then(|c| c.parse::<u32>().ok())
                    .map(ServiceState::from_code)
                    .unwrap_or(ServiceState::Unknown);
                record.state_description = description.map(str::to_string);
            } else if token_line(line, "PID") {
                record.pid = line_value(line).and_then(|v| v.parse().ok());
                return current.take();
            }
        }
        current.take()
    }
}

/// Text after the first `:`, trimmed. `None` when missing or empty.
fn line_value(line: &str) -> Option<&str> {
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Does the trimmed line start with `token` at a token boundary?
fn token_line(line: &str, token: &str) -> bool {
    line.trim_start()
        .strip_prefix(token)
        .is_some_and(|rest| rest.starts_with([' ', '\t', ':']))
}

/// Split a `STATE` value into the leading token and the trailing
/// description.
fn split_value(value: &str) -> (Option<&str>, Option<&str>) {
    match value.split_once(char::is_whitespace) {
        Some((first, rest)) => {
            let rest = rest.trim();
            (Some(first), (!rest.is_empty()).then_some(rest))
        }
        None if value.is_empty() => (None, None),
        None => (Some(value), None),
    }
}
