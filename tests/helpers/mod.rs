#![allow(dead_code)]

use TrayPilot::MenuSurface;
use TrayPilot::config::{Config, ConfigSource, MenuOptionConfig};
use TrayPilot::icons::IconResolver;
use TrayPilot::panels::tray_menu::item::MenuItem;
use TrayPilot::report::{Failure, FailureReporter};
use async_trait::async_trait;
use pilot_winsvc::{ScBridge, ServiceMap, ServiceRecord, ServiceState, SvcError};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Render one status record in the facility's line format.
pub fn record_text(name: &str, state: u32, pid: Option<u32>) -> String {
    let desc = match state {
        1 => "STOPPED",
        2 => "START_PENDING",
        3 => "STOP_PENDING",
        4 => "RUNNING",
        5 => "CONTINUE_PENDING",
        6 => "PAUSE_PENDING",
        7 => "PAUSED",
        _ => "UNKNOWN",
    };
    let mut text = String::new();
    text.push_str(&format!("SERVICE_NAME: {name}\r\n"));
    text.push_str(&format!("DISPLAY_NAME: {name}\r\n"));
    text.push_str("        TYPE               : 10  WIN32_OWN_PROCESS\r\n");
    text.push_str(&format!("        STATE              : {state}  {desc}\r\n"));
    text.push_str("        WIN32_EXIT_CODE    : 0  (0x0)\r\n");
    if let Some(pid) = pid {
        text.push_str(&format!("        PID                : {pid}\r\n"));
        text.push_str("        FLAGS              :\r\n");
    }
    text
}

/// In-memory record for feeding the projector directly.
pub fn record(name: &str, state: ServiceState, pid: Option<u32>) -> ServiceRecord {
    ServiceRecord {
        name: name.to_string(),
        display_name: Some(name.to_string()),
        state,
        state_description: None,
        pid,
    }
}

pub fn map_of(records: Vec<ServiceRecord>) -> ServiceMap {
    records.into_iter().map(|r| (r.key(), r)).collect()
}

/// Scripted `ScBridge` with call recording. Responses are queues; the
/// last response repeats once a queue drains.
pub struct MockBridge {
    query_all: Mutex<VecDeque<Result<String, String>>>,
    query_all_last: Mutex<Option<Result<String, String>>>,
    query_one: Mutex<HashMap<String, VecDeque<String>>>,
    query_one_last: Mutex<HashMap<String, String>>,
    query_all_calls: AtomicU64,
    start_calls: Mutex<Vec<String>>,
    stop_calls: Mutex<Vec<String>>,
    kill_calls: Mutex<Vec<u32>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self {
            query_all: Mutex::new(VecDeque::new()),
            query_all_last: Mutex::new(None),
            query_one: Mutex::new(HashMap::new()),
            query_one_last: Mutex::new(HashMap::new()),
            query_all_calls: AtomicU64::new(0),
            start_calls: Mutex::new(Vec::new()),
            stop_calls: Mutex::new(Vec::new()),
            kill_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_query_all(&self, text: &str) {
        self.query_all
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn push_query_all_error(&self, detail: &str) {
        self.query_all
            .lock()
            .unwrap()
            .push_back(Err(detail.to_string()));
    }

    /// Single repeating scoped response for `name`.
    pub fn set_service(&self, name: &str, text: &str) {
        self.query_one_last
            .lock()
            .unwrap()
            .insert(name.to_string(), text.to_string());
    }

    /// Scripted scoped response for `name`; consumed in push order, then
    /// the last one repeats.
    pub fn push_service(&self, name: &str, text: &str) {
        self.query_one
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push_back(text.to_string());
    }

    pub fn query_all_calls(&self) -> u64 {
        self.query_all_calls.load(Ordering::Relaxed)
    }

    pub fn start_calls(&self) -> Vec<String> {
        self.start_calls.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> Vec<String> {
        self.stop_calls.lock().unwrap().clone()
    }

    pub fn kill_calls(&self) -> Vec<u32> {
        self.kill_calls.lock().unwrap().clone()
    }

    fn not_scripted(what: &str) -> SvcError {
        SvcError::CommandFailed {
            command: what.to_string(),
            detail: "no scripted response".to_string(),
        }
    }
}

#[async_trait]
impl ScBridge for MockBridge {
    async fn query_all(&self) -> Result<String, SvcError> {
        self.query_all_calls.fetch_add(1, Ordering::Relaxed);
        let next = {
            let mut queue = self.query_all.lock().unwrap();
            let mut last = self.query_all_last.lock().unwrap();
            if let Some(response) = queue.pop_front() {
                *last = Some(response.clone());
                response
            } else if let Some(response) = last.clone() {
                response
            } else {
                return Err(Self::not_scripted("sc queryex state= all"));
            }
        };
        next.map_err(|detail| SvcError::CommandFailed {
            command: "sc queryex state= all".to_string(),
            detail,
        })
    }

    async fn query_one(&self, name: &str) -> Result<String, SvcError> {
        let mut scripted = self.query_one.lock().unwrap();
        let mut last = self.query_one_last.lock().unwrap();
        if let Some(queue) = scripted.get_mut(name)
            && let Some(text) = queue.pop_front()
        {
            last.insert(name.to_string(), text.clone());
            return Ok(text);
        }
        last.get(name)
            .cloned()
            .ok_or_else(|| Self::not_scripted(&format!("sc queryex {name}")))
    }

    async fn start(&self, name: &str) -> Result<(), SvcError> {
        self.start_calls.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), SvcError> {
        self.stop_calls.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn kill_pid(&self, pid: u32) -> Result<(), SvcError> {
        self.kill_calls.lock().unwrap().push(pid);
        Ok(())
    }
}

/// Collecting reporter.
pub struct MockReporter {
    failures: Mutex<Vec<String>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

#[async_trait]
impl FailureReporter for MockReporter {
    async fn report(&self, failure: Failure) {
        self.failures.lock().unwrap().push(failure.to_string());
    }
}

/// Resolver that answers every key and records what was asked.
pub struct MockIconResolver {
    requested: Mutex<Vec<String>>,
}

impl MockIconResolver {
    pub fn new() -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl IconResolver for MockIconResolver {
    async fn resolve(&self, key: &str) -> Option<PathBuf> {
        self.requested.lock().unwrap().push(key.to_string());
        Some(PathBuf::from(format!("{key}.png")))
    }
}

/// Surface that records replacement trees and an open flag.
pub struct RecordingSurface {
    open: AtomicBool,
    trees: Mutex<Vec<Vec<MenuItem>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            trees: Mutex::new(Vec::new()),
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::Relaxed);
    }

    pub fn replace_count(&self) -> usize {
        self.trees.lock().unwrap().len()
    }

    pub fn last_tree(&self) -> Option<Vec<MenuItem>> {
        self.trees.lock().unwrap().last().cloned()
    }
}

impl MenuSurface for RecordingSurface {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    fn replace_menu(&self, items: Vec<MenuItem>) {
        self.trees.lock().unwrap().push(items);
    }
}

/// Watch-backed config source for tests.
pub struct TestConfigSource {
    tx: watch::Sender<Arc<Config>>,
    edit_calls: AtomicU64,
}

impl TestConfigSource {
    pub fn new(config: Config) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(config));
        Self {
            tx,
            edit_calls: AtomicU64::new(0),
        }
    }

    pub fn replace(&self, config: Config) {
        self.tx.send_replace(Arc::new(config));
    }

    pub fn edit_calls(&self) -> u64 {
        self.edit_calls.load(Ordering::Relaxed)
    }
}

impl ConfigSource for TestConfigSource {
    fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.tx.subscribe()
    }

    fn edit(&self) -> std::io::Result<()> {
        self.edit_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

pub fn service_node(label: &str, service: &str) -> MenuOptionConfig {
    MenuOptionConfig {
        label: label.to_string(),
        service_name: Some(service.to_string()),
        ..MenuOptionConfig::default()
    }
}

pub fn command_node(label: &str, command: &str) -> MenuOptionConfig {
    MenuOptionConfig {
        label: label.to_string(),
        command: Some(command.to_string()),
        ..MenuOptionConfig::default()
    }
}

pub fn group_node(label: &str, group: &str) -> MenuOptionConfig {
    MenuOptionConfig {
        label: label.to_string(),
        service_group_name: Some(group.to_string()),
        ..MenuOptionConfig::default()
    }
}

pub fn config_with_menu(nodes: Vec<MenuOptionConfig>) -> Config {
    Config {
        menu_option_configs: nodes,
        ..Config::default()
    }
}

pub fn config_with_groups(
    nodes: Vec<MenuOptionConfig>,
    groups: Vec<(&str, Vec<&str>)>,
) -> Config {
    Config {
        menu_option_configs: nodes,
        service_groups: groups
            .into_iter()
            .map(|(name, members)| {
                (
                    name.to_string(),
                    members.into_iter().map(str::to_string).collect(),
                )
            })
            .collect(),
        ..Config::default()
    }
}
