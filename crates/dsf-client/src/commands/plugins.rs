//! Plugin management requests.

use serde::Serialize;
use serde::de::IgnoredAny;

use super::command;

/// Installs or upgrades a plugin from a ZIP bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallPlugin {
    /// Absolute path of the bundle.
    pub plugin_file: String,
}

command!(InstallPlugin => IgnoredAny);

/// Starts an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartPlugin {
    /// Plugin name.
    pub plugin: String,
}

command!(StartPlugin => IgnoredAny);

/// Stops a running plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopPlugin {
    /// Plugin name.
    pub plugin: String,
}

command!(StopPlugin => IgnoredAny);

/// Removes an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallPlugin {
    /// Plugin name.
    pub plugin: String,
}

command!(UninstallPlugin => IgnoredAny);

/// Stores custom data under a plugin's object model entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetPluginData {
    /// Plugin name; empty for the calling plugin.
    pub plugin: String,
    /// Data key.
    pub key: String,
    /// Data value as JSON text.
    pub value: String,
}

command!(SetPluginData => IgnoredAny);

/// Starts every plugin that was running before the last shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StartPlugins;

command!(StartPlugins => IgnoredAny);

/// Stops every running plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StopPlugins;

command!(StopPlugins => IgnoredAny);
