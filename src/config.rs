//! Configuration model and the source seam.
//!
//! The configuration collaborator owns persistence, file watching and
//! editor integration. The core only reads the validated value and
//! observes replacement values; a new value always replaces the whole
//! tree.

use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Top-level configuration value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub settings: Settings,
    pub menu_option_configs: Vec<MenuOptionConfig>,
    /// Named lists of service identifiers, in declared order.
    pub service_groups: HashMap<String, Vec<String>>,
}

/// Settings are owned by the excluded shell plumbing; the core carries
/// them through without reading them.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub launch_at_login: bool,
}

/// One configured menu node. `label == "-"` renders as a separator and
/// carries no other behavior.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuOptionConfig {
    pub label: String,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_directory: Option<String>,
    pub environment: Option<HashMap<String, String>>,
    pub hidden: Option<bool>,
    pub icon_key: Option<String>,
    pub children: Option<Vec<MenuOptionConfig>>,
    pub service_name: Option<String>,
    pub service_control_action: Option<ServiceControlAction>,
    pub service_group_name: Option<String>,
}

impl MenuOptionConfig {
    pub fn is_separator(&self) -> bool {
        self.label == "-"
    }
}

/// Control operation a node can bind explicitly.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceControlAction {
    Start,
    Stop,
    Restart,
    Kill,
}

/// Seam to the external configuration collaborator.
pub trait ConfigSource: Send + Sync {
    /// Replay-latest subscription: the receiver always holds a current
    /// value.
    fn subscribe(&self) -> watch::Receiver<Arc<Config>>;

    /// Open the configuration for editing.
    fn edit(&self) -> std::io::Result<()>;
}

/// Load-once JSON source used by the binary. Replacement values never
/// arrive through it; watching the file on disk is the real
/// collaborator's job.
pub struct StaticConfigSource {
    tx: watch::Sender<Arc<Config>>,
    path: PathBuf,
}

impl StaticConfigSource {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&text)?;
        let (tx, _rx) = watch::channel(Arc::new(config));
        Ok(Self { tx, path })
    }
}

impl ConfigSource for StaticConfigSource {
    fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.tx.subscribe()
    }

    fn edit(&self) -> std::io::Result<()> {
        // Editor integration belongs to the full configuration
        // collaborator; the static source can only point at the file.
        info!("edit requested for {}", self.path.display());
        Ok(())
    }
}
