//! Service controller: start/stop/kill with forced-kill escalation.
//!
//! Control decisions compare against a fresh truth query, never the
//! monitor's cached snapshot, so they cannot act on state that went stale
//! between poll cycles. Completion of a transition is observed by later
//! polls, not awaited here.

use crate::config::{Config, ServiceControlAction};
use crate::report::FailureReporter;
use crate::services::monitor::ServiceMonitor;
use log::warn;
use pilot_winsvc::{ScBridge, ServiceRecord, ServiceState, SvcError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Grace period before a stop escalates to a forced kill.
const STOP_TIMEOUT: Duration = Duration::from_millis(2000);

pub struct ServiceController {
    bridge: Arc<dyn ScBridge>,
    monitor: Arc<ServiceMonitor>,
    config_rx: watch::Receiver<Arc<Config>>,
    reporter: Arc<dyn FailureReporter>,
}

impl ServiceController {
    pub fn new(
        bridge: Arc<dyn ScBridge>,
        monitor: Arc<ServiceMonitor>,
        config_rx: watch::Receiver<Arc<Config>>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self {
            bridge,
            monitor,
            config_rx,
            reporter,
        }
    }

    /// Start a service. No-op when the freshest observation is already
    /// `Running`.
    pub async fn start(&self, name: &str) -> Result<(), SvcError> {
        if self.monitor.query_one(name).await?.state == ServiceState::Running {
            return Ok(());
        }
        self.bridge.start(name).await
    }

    pub async fn stop(&self, name: &str) -> Result<(), SvcError> {
        self.stop_with_timeout(name, STOP_TIMEOUT).await
    }

    /// Stop a service. No-op when already `Stopped`. A detached check
    /// after `timeout` force-kills the backing process if the service has
    /// not stopped by then; escalation failures are reported, never
    /// returned (this call has already completed).
    pub async fn stop_with_timeout(&self, name: &str, timeout: Duration) -> Result<(), SvcError> {
        if self.monitor.query_one(name).await?.state == ServiceState::Stopped {
            return Ok(());
        }
        self.bridge.stop(name).await?;
        let bridge = Arc::clone(&self.bridge);
        let monitor = Arc::clone(&self.monitor);
        let reporter = Arc::clone(&self.reporter);
        let name = name.to_string();
        tokio::spawn(async move {
            sleep(timeout).await;
            if let Err(failure) = escalate(bridge.as_ref(), &monitor, &name).await {
                reporter.report(Box::new(failure)).await;
            }
        });
        Ok(())
    }

    pub async fn restart(&self, name: &str) -> Result<(), SvcError> {
        self.restart_with_timeout(name, STOP_TIMEOUT).await
    }

    /// Stop then start. The start begins once the stop's immediate
    /// portion completes; it does not wait for the escalation timer.
    pub async fn restart_with_timeout(&self, name: &str, timeout: Duration) -> Result<(), SvcError> {
        self.stop_with_timeout(name, timeout).await?;
        self.start(name).await
    }

    /// Force-kill the backing process regardless of reported state.
    /// Fails when no process backs the service.
    pub async fn kill(&self, name: &str) -> Result<(), SvcError> {
        let record = self.monitor.query_one(name).await?;
        let pid = record.pid.ok_or_else(|| SvcError::NoPid(name.to_string()))?;
        self.bridge.kill_pid(pid).await
    }

    /// Resolve a configured group against the latest published snapshot,
    /// in declared order. Untracked members are skipped with a warning.
    pub fn get_group(&self, group_name: &str) -> Vec<ServiceRecord> {
        let config = self.config_rx.borrow().clone();
        let Some(members) = config.service_groups.get(group_name) else {
            warn!("service group not found: {group_name}");
            return Vec::new();
        };
        let current = self.monitor.current();
        members
            .iter()
            .filter_map(|name| {
                let record = current.get(&name.to_lowercase()).cloned();
                if record.is_none() {
                    warn!("service not tracked: {name} (group {group_name})");
                }
                record
            })
            .collect()
    }

    /// Apply one control operation to every member of a group, in
    /// declared order. Per-member failures are reported and the sweep
    /// continues.
    pub async fn apply_group(&self, group_name: &str, action: ServiceControlAction) {
        for record in self.get_group(group_name) {
            if let Err(failure) = self.apply(&record.name, action).await {
                self.reporter.report(Box::new(failure)).await;
            }
        }
    }

    /// Dispatch one named control operation.
    pub async fn apply(&self, name: &str, action: ServiceControlAction) -> Result<(), SvcError> {
        match action {
            ServiceControlAction::Start => self.start(name).await,
            ServiceControlAction::Stop => self.stop(name).await,
            ServiceControlAction::Restart => self.restart(name).await,
            ServiceControlAction::Kill => self.kill(name).await,
        }
    }
}

async fn escalate(
    bridge: &dyn ScBridge,
    monitor: &ServiceMonitor,
    name: &str,
) -> Result<(), SvcError> {
    let record = monitor.query_one(name).await?;
    if record.state == ServiceState::Stopped {
        return Ok(());
    }
    warn!("{name} did not stop in time, killing");
    let pid = record.pid.ok_or_else(|| SvcError::NoPid(name.to_string()))?;
    bridge.kill_pid(pid).await
}
