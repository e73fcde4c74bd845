//! Menu action dispatch.
//!
//! Every failure is routed to the reporter; a click never propagates an
//! error past this layer.

use crate::config::ConfigSource;
use crate::panels::tray_menu::item::{MenuAction, SpawnSpec};
use crate::report::{Failure, FailureReporter};
use crate::services::control::ServiceController;
use log::debug;
use std::process::{Command, Stdio};
use std::sync::Arc;

pub struct ActionDispatcher {
    controller: Arc<ServiceController>,
    config: Arc<dyn ConfigSource>,
    reporter: Arc<dyn FailureReporter>,
}

impl ActionDispatcher {
    pub fn new(
        controller: Arc<ServiceController>,
        config: Arc<dyn ConfigSource>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self {
            controller,
            config,
            reporter,
        }
    }

    /// Execute one bound operation from a click.
    pub async fn dispatch(&self, action: &MenuAction) {
        let result = match action {
            MenuAction::OpenUrl(url) => webbrowser::open(url).map_err(Failure::from),
            MenuAction::Spawn(spec) => spawn_detached(spec),
            MenuAction::ControlService(name, op) => {
                self.controller.apply(name, *op).await.map_err(Failure::from)
            }
            MenuAction::ControlGroup(group, op) => {
                // Per-member failures are reported inside the sweep.
                self.controller.apply_group(group, *op).await;
                Ok(())
            }
            MenuAction::EditConfig => self.config.edit().map_err(Failure::from),
            MenuAction::Exit => std::process::exit(0),
        };
        if let Err(failure) = result {
            self.reporter.report(failure).await;
        }
    }
}

/// Fire-and-forget spawn: detached, null stdio, window visibility honored
/// on Windows.
fn spawn_detached(spec: &SpawnSpec) -> Result<(), Failure> {
    debug!("spawning {}", spec.command);
    let mut command = Command::new(&spec.command);
    command
        .args(&spec.args)
        .envs(&spec.environment)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Some(dir) = &spec.working_directory {
        command.current_dir(dir);
    }
    #[cfg(windows)]
    if spec.hidden {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }
    command.spawn().map(drop).map_err(Failure::from)
}
