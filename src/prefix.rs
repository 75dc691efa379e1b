//! Installation prefix discovery
//!
//! The D-Bus descriptor and XDG icons go below the `share` directory of the
//! prefix this tool was installed into, so the running executable's own path
//! decides where everything lands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{self, Config};
use crate::paths;

#[derive(Debug, Error)]
pub enum PrefixError {
    #[error("running the installtool as a script is not supported: {0}")]
    ScriptInvocation(PathBuf),

    #[error("running the installtool out of a cargo build directory is not supported: {0}")]
    DevelopmentBuild(PathBuf),

    #[error("executable path is not supported: {0}")]
    Unsupported(PathBuf),
}

const SCRIPT_EXTENSIONS: &[&str] = &["py", "sh"];

/// Resolved absolute path of the running executable
pub fn current_exe() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to determine the running executable")?;
    exe.canonicalize()
        .with_context(|| format!("Failed to resolve {}", exe.display()))
}

/// Path of the D-Bus service executable shipped next to `exe`
pub fn service_exe_path(exe: &Path, config: &Config) -> PathBuf {
    exe.parent()
        .unwrap_or_else(|| Path::new("/"))
        .join(&config.executables.service)
}

fn reject_dev_invocation(exe: &Path) -> Result<(), PrefixError> {
    let is_script = exe
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e));
    if is_script {
        return Err(PrefixError::ScriptInvocation(exe.to_path_buf()));
    }

    let in_cargo_target = exe.parent().is_some_and(|dir| {
        let profile = dir.file_name().and_then(|n| n.to_str());
        let parent = dir.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str());
        matches!(profile, Some("debug" | "release")) && parent == Some("target")
    });
    if in_cargo_target {
        return Err(PrefixError::DevelopmentBuild(exe.to_path_buf()));
    }

    Ok(())
}

/// Find the datadir (`<prefix>/share`) for an executable at `exe`.
///
/// Prefixes are tried in order. Within a prefix, an exact
/// `<prefix>/<bin|sbin|libexec>/<installtool>` match is checked first; failing
/// that, any executable below the prefix still selects it, so a virtualenv-like
/// layout under `~/.local/share/...` installs into `~/.local/share`.
pub fn locate_datadir(exe: &Path, prefixes: &[PathBuf], config: &Config) -> Result<PathBuf, PrefixError> {
    reject_dev_invocation(exe)?;

    for prefix in prefixes {
        for exe_dir in &config.exe_dirs {
            let candidate = prefix.join(exe_dir).join(&config.executables.installtool);
            tracing::debug!("Checking candidate {}", candidate.display());
            if candidate == exe {
                return Ok(prefix.join(paths::SHARE_DIR));
            }
        }

        if exe.starts_with(prefix) {
            tracing::debug!("{} is below prefix {}", exe.display(), prefix.display());
            return Ok(prefix.join(paths::SHARE_DIR));
        }
    }

    Err(PrefixError::Unsupported(exe.to_path_buf()))
}

/// Locate the datadir for the running executable
pub fn find_datadir(exe: &Path, config: &Config) -> Result<PathBuf> {
    let home = config::home_dir()?;
    let prefixes = config.candidate_prefixes(&home);
    println!("Executable path: {}", exe.display());

    let datadir = locate_datadir(exe, &prefixes, config)?;
    Ok(datadir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<PathBuf> {
        Config::default().candidate_prefixes(Path::new("/home/alice"))
    }

    fn locate(exe: &str) -> Result<PathBuf, PrefixError> {
        locate_datadir(Path::new(exe), &prefixes(), &Config::default())
    }

    #[test]
    fn usr_local_bin() {
        assert_eq!(
            locate("/usr/local/bin/soundcraft_installtool").unwrap(),
            PathBuf::from("/usr/local/share")
        );
    }

    #[test]
    fn usr_bin() {
        assert_eq!(
            locate("/usr/bin/soundcraft_installtool").unwrap(),
            PathBuf::from("/usr/share")
        );
    }

    #[test]
    fn user_local_bin() {
        assert_eq!(
            locate("/home/alice/.local/bin/soundcraft_installtool").unwrap(),
            PathBuf::from("/home/alice/.local/share")
        );
    }

    #[test]
    fn sbin_and_libexec_match() {
        assert_eq!(
            locate("/usr/sbin/soundcraft_installtool").unwrap(),
            PathBuf::from("/usr/share")
        );
        assert_eq!(
            locate("/usr/local/libexec/soundcraft_installtool").unwrap(),
            PathBuf::from("/usr/local/share")
        );
    }

    #[test]
    fn nested_layout_falls_back_to_containing_prefix() {
        let exe = "/home/alice/.local/share/virtualenvs/soundcraft-ABC/bin/soundcraft_installtool";
        assert_eq!(
            locate(exe).unwrap(),
            PathBuf::from("/home/alice/.local/share")
        );
    }

    #[test]
    fn first_containing_prefix_wins() {
        // /usr/local is tried before /usr even without an exact match
        assert_eq!(
            locate("/usr/local/opt/tools/soundcraft_installtool").unwrap(),
            PathBuf::from("/usr/local/share")
        );
    }

    #[test]
    fn prefix_match_is_per_component() {
        assert!(matches!(
            locate("/usr-other/bin/soundcraft_installtool"),
            Err(PrefixError::Unsupported(_))
        ));
    }

    #[test]
    fn path_outside_prefixes_is_unsupported() {
        assert!(matches!(
            locate("/home/alice/src/soundcraft/soundcraft_installtool"),
            Err(PrefixError::Unsupported(_))
        ));
    }

    #[test]
    fn script_invocation_fails_fast() {
        // Would otherwise match /usr exactly by prefix
        assert!(matches!(
            locate("/usr/lib/python3/site-packages/soundcraft/installtool.py"),
            Err(PrefixError::ScriptInvocation(_))
        ));
    }

    #[test]
    fn cargo_build_dir_fails_fast() {
        assert!(matches!(
            locate("/usr/local/src/soundcraft/target/debug/soundcraft_installtool"),
            Err(PrefixError::DevelopmentBuild(_))
        ));
    }

    #[test]
    fn service_exe_is_a_sibling() {
        let exe = Path::new("/usr/bin/soundcraft_installtool");
        assert_eq!(
            service_exe_path(exe, &Config::default()),
            PathBuf::from("/usr/bin/soundcraft_dbus_service")
        );
    }
}
