//! TrayPilot - tray commander for OS services
//!
//! Wires the core against the built-in collaborators: a load-once JSON
//! config source, an asset-directory icon resolver and a log-backed
//! failure reporter. A tray chrome plugs in through `MenuSurface` and
//! routes clicks to the `ActionDispatcher`; without one the projected
//! tree is logged.

use TrayPilot::config::{ConfigSource, StaticConfigSource};
use TrayPilot::icons::AssetIconResolver;
use TrayPilot::panels::tray_menu::actions::ActionDispatcher;
use TrayPilot::panels::tray_menu::item::MenuItem;
use TrayPilot::report::LogReporter;
use TrayPilot::{MenuProjector, MenuSurface, ServiceController, ServiceMonitor};
use log::info;
use pilot_winsvc::SystemSc;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "traypilot.json";
const ICON_DIR: &str = "assets/menu-icons";

/// Headless surface used until a tray chrome is attached.
#[derive(Default)]
struct LogSurface;

impl MenuSurface for LogSurface {
    fn is_open(&self) -> bool {
        false
    }

    fn replace_menu(&self, items: Vec<MenuItem>) {
        info!("menu replaced:");
        log_items(&items, 1);
    }
}

fn log_items(items: &[MenuItem], depth: usize) {
    for item in items {
        match item {
            MenuItem::Separator => info!("{}-----", "  ".repeat(depth)),
            MenuItem::Entry(entry) => {
                info!("{}{}", "  ".repeat(depth), entry.label);
                log_items(&entry.children, depth + 1);
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    info!("Starting TrayPilot...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config_source: Arc<dyn ConfigSource> = Arc::new(StaticConfigSource::load(&config_path)?);

    let bridge = Arc::new(SystemSc::new());
    let reporter = Arc::new(LogReporter);
    let icons = Arc::new(AssetIconResolver::new(Path::new(ICON_DIR)));

    let monitor = Arc::new(ServiceMonitor::new(bridge.clone(), reporter.clone()));
    let controller = Arc::new(ServiceController::new(
        bridge,
        monitor.clone(),
        config_source.subscribe(),
        reporter.clone(),
    ));
    // The chrome holds the dispatcher and calls it from click handlers.
    let _dispatcher = Arc::new(ActionDispatcher::new(
        controller,
        config_source.clone(),
        reporter,
    ));

    let projector = MenuProjector::new(
        config_source.clone(),
        monitor.subscribe(),
        Arc::new(LogSurface),
        icons,
    );

    let monitor_task = monitor.start(config_source.subscribe());
    let projector_task = projector.start();

    info!("TrayPilot running.");

    let _ = tokio::join!(monitor_task, projector_task);

    Ok(())
}
