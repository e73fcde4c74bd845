//! Service state monitor.
//!
//! Owns the interest set derived from configuration, polls the control
//! facility on a fixed period, diffs against last-known state and
//! publishes a new snapshot only when something changed. Subscribers get
//! replay-latest semantics: the current snapshot immediately, then every
//! published change.

use crate::config::{Config, MenuOptionConfig};
use crate::report::FailureReporter;
use log::info;
use pilot_winsvc::{ScBridge, ServiceMap, ServiceRecord, SvcError, parse_first, parse_records};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Fixed poll period. Not user-configurable.
const POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub struct ServiceMonitor {
    bridge: Arc<dyn ScBridge>,
    reporter: Arc<dyn FailureReporter>,
    state_tx: watch::Sender<ServiceMap>,
}

impl ServiceMonitor {
    pub fn new(bridge: Arc<dyn ScBridge>, reporter: Arc<dyn FailureReporter>) -> Self {
        let (state_tx, _rx) = watch::channel(ServiceMap::new());
        Self {
            bridge,
            reporter,
            state_tx,
        }
    }

    /// Replay-latest subscription. The receiver immediately holds the
    /// current snapshot (initially an empty map).
    pub fn subscribe(&self) -> watch::Receiver<ServiceMap> {
        self.state_tx.subscribe()
    }

    /// Latest published snapshot.
    pub fn current(&self) -> ServiceMap {
        self.state_tx.borrow().clone()
    }

    /// Out-of-band truth read used by control decisions; bypasses the
    /// poll cadence and may race an in-flight poll.
    pub async fn query_one(&self, name: &str) -> Result<ServiceRecord, SvcError> {
        let text = self.bridge.query_one(name).await?;
        parse_first(&text).ok_or_else(|| SvcError::ServiceNotFound(name.to_string()))
    }

    /// Spawn the polling task. Each configuration value triggers one
    /// immediate poll, then the fixed cadence.
    pub fn start(self: Arc<Self>, config_rx: watch::Receiver<Arc<Config>>) -> JoinHandle<()> {
        tokio::spawn(self.run(config_rx))
    }

    async fn run(self: Arc<Self>, mut config_rx: watch::Receiver<Arc<Config>>) {
        let mut interest = interest_names(&config_rx.borrow_and_update());
        let mut last_known = ServiceMap::new();
        let mut ticker = self.new_ticker();
        loop {
            tokio::select! {
                changed = config_rx.changed() => {
                    // The source dropping means shutdown.
                    if changed.is_err() {
                        break;
                    }
                    interest = interest_names(&config_rx.borrow_and_update());
                    last_known.retain(|name, _| interest.binary_search(name).is_ok());
                    // Fresh ticker: immediate first tick, then the cadence.
                    ticker = self.new_ticker();
                }
                _ = ticker.tick() => {
                    self.poll(&interest, &mut last_known).await;
                }
            }
        }
    }

    fn new_ticker(&self) -> Interval {
        let mut ticker = interval(POLL_INTERVAL);
        // Cycles are serialized; a slow query skips ticks instead of
        // letting cycles interleave.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    }

    /// One poll cycle: query all, parse, diff, publish at most once.
    async fn poll(&self, interest: &[String], last_known: &mut ServiceMap) {
        let text = match self.bridge.query_all().await {
            Ok(text) => text,
            Err(failure) => {
                self.reporter.report(Box::new(failure)).await;
                return;
            }
        };
        let mut seen_any = false;
        let mut changed = false;
        for record in parse_records(&text) {
            seen_any = true;
            let key = record.key();
            if interest.binary_search(&key).is_err() {
                continue;
            }
            match last_known.get(&key).map(|previous| previous.state) {
                Some(state) if state == record.state => {}
                Some(_) => {
                    changed = true;
                    if let Some(label) = record.state.label() {
                        info!("{} state changed to {}", record.name, label.to_lowercase());
                    }
                }
                // First observation: published, but not a transition.
                None => changed = true,
            }
            last_known.insert(key, record);
        }
        if !seen_any && !interest.is_empty() {
            self.reporter.report(Box::new(SvcError::EmptyResponse)).await;
            return;
        }
        if changed {
            self.state_tx.send_replace(last_known.clone());
        }
    }
}

/// Interest set for a configuration value: every service-bound node plus
/// the members of every referenced group, case-insensitively deduplicated
/// and sorted.
pub fn interest_names(config: &Config) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    collect_names(&config.menu_option_configs, config, &mut names);
    names.sort();
    names.dedup();
    names
}

fn collect_names(options: &[MenuOptionConfig], config: &Config, out: &mut Vec<String>) {
    for option in options {
        if let Some(name) = &option.service_name {
            out.push(name.to_lowercase());
        }
        if let Some(group) = &option.service_group_name
            && let Some(members) = config.service_groups.get(group)
        {
            out.extend(members.iter().map(|member| member.to_lowercase()));
        }
        if let Some(children) = &option.children {
            collect_names(children, config, out);
        }
    }
}
