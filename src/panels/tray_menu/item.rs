//! Derived menu tree construction.
//!
//! Every projection rebuilds the whole tree from (config, live state); no
//! node survives between rebuilds and nothing is diffed structurally.

use crate::config::{Config, MenuOptionConfig, ServiceControlAction};
use crate::icons::{IconResolver, icon_key_for};
use futures_util::future::{BoxFuture, join_all};
use log::warn;
use pilot_winsvc::{ServiceMap, ServiceRecord, ServiceState};
use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

const EDIT_LABEL: &str = "Edit commands";
const EXIT_LABEL: &str = "Exit";

/// One derived node.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuItem {
    Separator,
    Entry(MenuEntry),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub icon: Option<PathBuf>,
    pub enabled: bool,
    pub action: Option<MenuAction>,
    pub children: Vec<MenuItem>,
}

impl MenuEntry {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            enabled: true,
            action: None,
            children: Vec::new(),
        }
    }
}

/// Operation bound to a menu entry. Plain data; execution happens at the
/// click site through the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuAction {
    OpenUrl(String),
    Spawn(SpawnSpec),
    ControlService(String, ServiceControlAction),
    ControlGroup(String, ServiceControlAction),
    EditConfig,
    Exit,
}

/// Everything a detached fire-and-forget spawn needs.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnSpec {
    pub command: String,
    pub args: Vec<String>,
    pub working_directory: Option<String>,
    pub environment: HashMap<String, String>,
    pub hidden: bool,
}

/// Inputs one projection reads. The service map is a single consistent
/// snapshot for the whole tree.
pub struct ProjectionInputs<'a> {
    pub config: &'a Config,
    pub services: &'a ServiceMap,
    pub icons: &'a dyn IconResolver,
}

/// Derive the full menu tree: configured nodes, then the fixed trailing
/// separator + edit + exit entries.
pub async fn build_menu(inputs: &ProjectionInputs<'_>) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = join_all(
        inputs
            .config
            .menu_option_configs
            .iter()
            .map(|option| build_item(inputs, option)),
    )
    .await;
    if !items.is_empty() {
        items.push(MenuItem::Separator);
    }
    items.push(MenuItem::Entry(MenuEntry {
        action: Some(MenuAction::EditConfig),
        ..MenuEntry::new(EDIT_LABEL)
    }));
    items.push(MenuItem::Entry(MenuEntry {
        action: Some(MenuAction::Exit),
        ..MenuEntry::new(EXIT_LABEL)
    }));
    items
}

fn build_item<'a>(
    inputs: &'a ProjectionInputs<'a>,
    option: &'a MenuOptionConfig,
) -> BoxFuture<'a, MenuItem> {
    Box::pin(async move {
        if option.is_separator() {
            return MenuItem::Separator;
        }
        let mut entry = MenuEntry::new(option.label.clone());

        if let Some(key) = icon_key_for(option) {
            entry.icon = inputs.icons.resolve(&key).await;
        }

        if let Some(children) = &option.children {
            entry.children = join_all(children.iter().map(|child| build_item(inputs, child))).await;
        }

        if let Some(command) = &option.command {
            entry.action = Some(command_action(option, command));
        }

        if let Some(name) = &option.service_name {
            decorate_service(inputs, option, name, &mut entry).await;
        }

        if let Some(group) = &option.service_group_name {
            decorate_group(inputs, option, group, &mut entry).await;
        }

        MenuItem::Entry(entry)
    })
}

/// URLs open with the platform handler; anything else spawns detached.
fn command_action(option: &MenuOptionConfig, command: &str) -> MenuAction {
    if Url::parse(command).is_ok() {
        return MenuAction::OpenUrl(command.to_string());
    }
    MenuAction::Spawn(SpawnSpec {
        command: command.to_string(),
        args: option.args.clone().unwrap_or_default(),
        working_directory: option.working_directory.clone(),
        environment: option.environment.clone().unwrap_or_default(),
        hidden: option.hidden.unwrap_or(false),
    })
}

async fn decorate_service(
    inputs: &ProjectionInputs<'_>,
    option: &MenuOptionConfig,
    name: &str,
    entry: &mut MenuEntry,
) {
    let Some(record) = inputs.services.get(&name.to_lowercase()) else {
        warn!("service not tracked: {name}");
        return;
    };
    decorate_with_state(inputs, record, entry).await;
    if let Some(action) = option.service_control_action {
        entry.action = Some(MenuAction::ControlService(record.name.clone(), action));
    }
}

/// Label suffix, state icon, pending-state disable and the generated
/// control submenu. An `Unknown` state gets no augmentation.
async fn decorate_with_state(
    inputs: &ProjectionInputs<'_>,
    record: &ServiceRecord,
    entry: &mut MenuEntry,
) {
    let Some(label) = record.state.label() else {
        warn!("service state unknown: {}", record.name);
        return;
    };
    entry.label = format!("{} ({})", entry.label, label);
    entry.icon = inputs.icons.resolve(state_icon_key(record.state)).await;
    if record.state.is_pending() {
        entry.enabled = false;
    }
    entry.children.extend(control_submenu(record));
}

async fn decorate_group(
    inputs: &ProjectionInputs<'_>,
    option: &MenuOptionConfig,
    group: &str,
    entry: &mut MenuEntry,
) {
    let Some(members) = inputs.config.service_groups.get(group) else {
        warn!("service group not found: {group}");
        return;
    };
    for name in members {
        let Some(record) = inputs.services.get(&name.to_lowercase()) else {
            warn!("service not tracked: {name} (group {group})");
            continue;
        };
        let base = record.display_name.clone().unwrap_or_else(|| record.name.clone());
        let mut member = MenuEntry::new(base);
        decorate_with_state(inputs, record, &mut member).await;
        entry.children.push(MenuItem::Entry(member));
    }
    if let Some(action) = option.service_control_action {
        entry.action = Some(MenuAction::ControlGroup(group.to_string(), action));
    }
}

/// Generated control entries for an observed state: Start when stopped or
/// paused, Stop when running or paused, Kill whenever not stopped.
fn control_submenu(record: &ServiceRecord) -> Vec<MenuItem> {
    let mut items = Vec::new();
    if matches!(record.state, ServiceState::Stopped | ServiceState::Paused) {
        items.push(control_entry("Start", &record.name, ServiceControlAction::Start));
    }
    if matches!(record.state, ServiceState::Running | ServiceState::Paused) {
        items.push(control_entry("Stop", &record.name, ServiceControlAction::Stop));
    }
    if record.state != ServiceState::Stopped {
        items.push(control_entry("Kill", &record.name, ServiceControlAction::Kill));
    }
    items
}

fn control_entry(label: &str, name: &str, action: ServiceControlAction) -> MenuItem {
    MenuItem::Entry(MenuEntry {
        action: Some(MenuAction::ControlService(name.to_string(), action)),
        ..MenuEntry::new(label)
    })
}

fn state_icon_key(state: ServiceState) -> &'static str {
    match state {
        ServiceState::Stopped => "service-stopped",
        ServiceState::Running => "service-running",
        ServiceState::Paused => "service-paused",
        _ => "service-pending",
    }
}
