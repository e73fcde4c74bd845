//! Icon resolution seam and icon-key inference.
//!
//! Resolution (extraction, caching, scaling) lives behind `IconResolver`;
//! the core only decides which key to ask for.

use crate::config::MenuOptionConfig;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Macro token that resolves the icon key to the node's command string.
const CMD_MACRO: &str = "[cmd]";

/// Built-in inference table: recognizable command substring -> icon key.
/// First match wins.
const INFERRED_KEYS: &[(&str, &str)] = &[
    ("powershell", "powershell"),
    ("pwsh", "powershell"),
    ("wsl", "wsl"),
    ("cmd", "cmd"),
];

/// Async key -> image handle lookup. A miss is an empty result, not an
/// error.
#[async_trait]
pub trait IconResolver: Send + Sync {
    async fn resolve(&self, key: &str) -> Option<PathBuf>;
}

/// Icon key for a configured node: explicit key, the `[cmd]` macro, then
/// command-substring inference.
pub fn icon_key_for(option: &MenuOptionConfig) -> Option<String> {
    let command = option.command.as_deref().unwrap_or("");
    if let Some(key) = option.icon_key.as_deref() {
        if key.eq_ignore_ascii_case(CMD_MACRO) {
            return (!command.is_empty()).then(|| command.to_string());
        }
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }
    let lowered = command.to_lowercase();
    INFERRED_KEYS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, key)| (*key).to_string())
}

/// Looks icons up by file stem in an asset directory.
pub struct AssetIconResolver {
    icons: HashMap<String, PathBuf>,
}

impl AssetIconResolver {
    /// Index every .png under `dir` by lower-cased stem. A missing
    /// directory simply yields no icons.
    pub fn new(dir: &Path) -> Self {
        let mut icons = HashMap::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
                    && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                {
                    icons.insert(stem.to_lowercase(), path.clone());
                }
            }
        }
        debug!("indexed {} menu icons", icons.len());
        Self { icons }
    }
}

#[async_trait]
impl IconResolver for AssetIconResolver {
    async fn resolve(&self, key: &str) -> Option<PathBuf> {
        self.icons.get(&key.to_lowercase()).cloned()
    }
}
