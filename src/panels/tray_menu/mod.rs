//! Menu projector.
//!
//! Derives the presentational tree from (config, live service state) and
//! replaces it on the surface. Rebuild triggers are debounced. A rebuild
//! firing while the menu is open is dropped, not deferred: mutating an
//! open interactive menu is unsafe, and the drop is not replayed on
//! close.

pub mod actions;
pub mod item;

use crate::config::{Config, ConfigSource};
use crate::icons::IconResolver;
use item::{MenuItem, ProjectionInputs, build_menu};
use log::debug;
use pilot_winsvc::ServiceMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Window in which rebuild triggers collapse into a single rebuild.
const REBUILD_DEBOUNCE: Duration = Duration::from_millis(300);

/// Presented-surface seam: consumes whole replacement trees and reports
/// whether the menu is currently open to the user.
pub trait MenuSurface: Send + Sync {
    fn is_open(&self) -> bool;
    fn replace_menu(&self, items: Vec<MenuItem>);
}

pub struct MenuProjector {
    config_source: Arc<dyn ConfigSource>,
    state_rx: watch::Receiver<ServiceMap>,
    surface: Arc<dyn MenuSurface>,
    icons: Arc<dyn IconResolver>,
}

impl MenuProjector {
    pub fn new(
        config_source: Arc<dyn ConfigSource>,
        state_rx: watch::Receiver<ServiceMap>,
        surface: Arc<dyn MenuSurface>,
        icons: Arc<dyn IconResolver>,
    ) -> Self {
        Self {
            config_source,
            state_rx,
            surface,
            icons,
        }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut config_rx = self.config_source.subscribe();
        let mut state_rx = self.state_rx.clone();
        // One initial projection for the value already present at
        // startup; it goes through the same debounce window.
        let mut pending = true;
        let mut deadline = Instant::now() + REBUILD_DEBOUNCE;
        loop {
            tokio::select! {
                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if !pending {
                        pending = true;
                        deadline = Instant::now() + REBUILD_DEBOUNCE;
                    }
                }
                changed = state_rx.changed() => {
                    // The monitor never publishes before its first poll,
                    // so an unset state map cannot trigger a rebuild.
                    if changed.is_err() {
                        break;
                    }
                    if !pending {
                        pending = true;
                        deadline = Instant::now() + REBUILD_DEBOUNCE;
                    }
                }
                _ = sleep_until(deadline), if pending => {
                    pending = false;
                    if self.surface.is_open() {
                        debug!("menu open, dropping rebuild");
                        continue;
                    }
                    let config = config_rx.borrow_and_update().clone();
                    let services = state_rx.borrow_and_update().clone();
                    self.rebuild(&config, &services).await;
                }
            }
        }
    }

    /// Recompute the whole tree from the inputs latched at fire time and
    /// replace it atomically on the surface.
    async fn rebuild(&self, config: &Config, services: &ServiceMap) {
        debug!("rebuilding menu");
        let inputs = ProjectionInputs {
            config,
            services,
            icons: self.icons.as_ref(),
        };
        let items = build_menu(&inputs).await;
        self.surface.replace_menu(items);
    }
}
