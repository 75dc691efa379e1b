use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cmd::SystemRunner;
use crate::config::{self, Config};
use crate::dbus::SessionBus;
use crate::hooks::Hooks;

#[derive(Debug, Parser)]
#[command(
    name = "soundcraft_installtool",
    version = concat!("(soundcraft-utils) ", env!("CARGO_PKG_VERSION")),
    about = "Hook soundcraft-utils into the system post-install (or do the reverse)"
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["post_install", "pre_uninstall"])
))]
pub struct Args {
    /// Install and set up soundcraft-utils and exit
    #[arg(long)]
    pub post_install: bool,

    /// Undo any installation and setup performed by --post-install and exit
    #[arg(long)]
    pub pre_uninstall: bool,

    /// Override built-in settings from a YAML or JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PostInstall,
    PreUninstall,
}

impl Args {
    pub fn action(&self) -> Action {
        if self.post_install {
            Action::PostInstall
        } else {
            Action::PreUninstall
        }
    }
}

/// Log filter from a `RUST_LOG`-style spec; warnings and errors show by default
pub fn log_filter(spec: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(spec)
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    let runner = SystemRunner;
    let hooks = Hooks::for_current_exe(&config, &runner)?;
    tracing::debug!("Resolved datadir {}", hooks.datadir().display());

    match args.action() {
        Action::PostInstall => {
            println!("\n=== {} post-install ===\n", config.package);
            hooks.post_install(|| SessionBus::connect(&config))
        }
        Action::PreUninstall => {
            println!("\n=== {} pre-uninstall ===\n", config.package);
            hooks.pre_uninstall(|| SessionBus::connect(&config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("soundcraft_installtool").chain(args.iter().copied()))
    }

    #[test]
    fn post_install_flag() {
        assert_eq!(parse(&["--post-install"]).unwrap().action(), Action::PostInstall);
    }

    #[test]
    fn pre_uninstall_flag() {
        assert_eq!(parse(&["--pre-uninstall"]).unwrap().action(), Action::PreUninstall);
    }

    #[test]
    fn an_action_is_required() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn actions_are_mutually_exclusive() {
        let err = parse(&["--post-install", "--pre-uninstall"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn version_flag_short_circuits() {
        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert_eq!(
            err.to_string().trim(),
            format!(
                "soundcraft_installtool (soundcraft-utils) {}",
                env!("CARGO_PKG_VERSION")
            )
        );
    }

    #[test]
    fn config_file_is_optional() {
        let args = parse(&["--post-install", "--config", "/etc/soundcraft/installtool.yml"]).unwrap();
        assert_eq!(
            args.config,
            Some(PathBuf::from("/etc/soundcraft/installtool.yml"))
        );
    }

    #[test]
    fn warnings_are_logged_without_rust_log() {
        assert_eq!(log_filter("").to_string(), "warn");
    }

    #[test]
    fn rust_log_overrides_default_level() {
        assert_eq!(log_filter("installtool=debug").to_string(), "installtool=debug");
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let err = parse(&["--reinstall"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
