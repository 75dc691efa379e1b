//! Tool configuration
//!
//! Every constant the hooks depend on lives in [`Config`], which is built
//! once in `main` and handed to each component. A config file may override
//! any subset of fields; the rest keep their built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Names of the executables shipped by the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Executables {
    /// This tool; used to recognise an installed layout
    pub installtool: String,
    /// The D-Bus service, installed next to this tool
    pub service: String,
    pub gui: String,
    pub cli: String,
}

impl Default for Executables {
    fn default() -> Self {
        Self {
            installtool: "soundcraft_installtool".into(),
            service: "soundcraft_dbus_service".into(),
            gui: "soundcraft_gui".into(),
            cli: "soundcraft_ctl".into(),
        }
    }
}

/// Bounded retry for bus activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of activation attempts
    pub attempts: u32,
    /// Pause between attempts, in milliseconds
    pub delay_ms: u64,
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_ms: 1000,
        }
    }
}

/// External desktop-integration tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XdgTools {
    pub desktop_menu: String,
    pub icon_resource: String,
}

impl Default for XdgTools {
    fn default() -> Self {
        Self {
            desktop_menu: "xdg-desktop-menu".into(),
            icon_resource: "xdg-icon-resource".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package name reported by `--version`
    pub package: String,
    pub version: String,
    /// Well-known session bus name of the service
    pub bus_name: String,
    /// Interface carrying the service's `version` property and `Shutdown` method
    pub service_interface: String,
    pub executables: Executables,
    /// Candidate installation prefixes, in priority order (`~` is expanded)
    pub prefixes: Vec<String>,
    /// Executable directories searched below each prefix
    pub exe_dirs: Vec<String>,
    /// Sizes passed to the icon-resource tool for each PNG icon
    pub icon_sizes: Vec<u32>,
    pub retry: RetryPolicy,
    pub xdg_tools: XdgTools,
    /// Use data files from this directory instead of the bundled ones
    pub data_dir: Option<PathBuf>,
    /// Bus address to use instead of the session bus (`DBUS_SESSION_BUS_ADDRESS`)
    pub bus_address: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package: "soundcraft-utils".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            bus_name: "soundcraft.utils.notepad".into(),
            service_interface: "soundcraft.utils.notepad.service".into(),
            executables: Executables::default(),
            prefixes: vec!["/usr/local".into(), "/usr".into(), "~/.local".into()],
            exe_dirs: vec!["bin".into(), "sbin".into(), "libexec".into()],
            icon_sizes: vec![16, 24, 32, 48, 256],
            retry: RetryPolicy::default(),
            xdg_tools: XdgTools::default(),
            data_dir: None,
            bus_address: None,
        }
    }
}

impl Config {
    /// Object path the service exports itself at, derived from the bus name
    pub fn service_object_path(&self) -> String {
        format!("/{}", self.bus_name.replace('.', "/"))
    }

    /// File name of the installed service descriptor
    pub fn service_file_name(&self) -> String {
        format!("{}.service", self.bus_name)
    }

    /// Candidate prefixes with `~` expanded against the given home directory
    pub fn candidate_prefixes(&self, home: &Path) -> Vec<PathBuf> {
        self.prefixes
            .iter()
            .map(|prefix| expand_home(prefix, home))
            .collect()
    }
}

fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// The invoking user's home directory
///
/// `$HOME` wins; otherwise the password database entry for the real uid.
pub fn home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    let uid = nix::unistd::getuid();
    let user = nix::unistd::User::from_uid(uid)
        .context("Failed to look up the current user")?
        .with_context(|| format!("No password entry for uid {}", uid))?;
    Ok(user.dir)
}

/// Load a config file (YAML or JSON)
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "json" => parse_json(&content),
        "yaml" | "yml" => parse_yaml(&content),
        _ => parse_auto(&content),
    }
}

fn parse_yaml(content: &str) -> Result<Config> {
    serde_yaml::from_str(content).context("Failed to parse YAML config")
}

fn parse_json(content: &str) -> Result<Config> {
    serde_json::from_str(content).context("Failed to parse JSON config")
}

fn parse_auto(content: &str) -> Result<Config> {
    if content.trim_start().starts_with('{') {
        parse_json(content)
    } else {
        parse_yaml(content)
    }
}
