//! Post-install / pre-uninstall hooks for soundcraft-utils
//!
//! Registers the soundcraft D-Bus session service and the XDG application
//! launcher below the prefix the package was installed into, and removes
//! them again before the package is uninstalled.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod data;
pub mod dbus;
pub mod hooks;
pub mod paths;
pub mod prefix;
pub mod template;
pub mod xdg;
