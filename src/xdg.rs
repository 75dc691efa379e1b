//! XDG application launcher: desktop entry, fixed-size icons and scalable icon
//!
//! Desktop entries and PNG icons are handed to `xdg-desktop-menu` and
//! `xdg-icon-resource`; this module never edits their stores directly. SVG
//! icons are copied into the hicolor scalable directory of the datadir.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cmd::{self, CommandRunner};
use crate::config::Config;
use crate::data::{DataFile, DataFiles, FileKind};
use crate::paths;

pub struct XdgInstaller<'a> {
    config: &'a Config,
    datadir: &'a Path,
    runner: &'a dyn CommandRunner,
}

impl<'a> XdgInstaller<'a> {
    pub fn new(config: &'a Config, datadir: &'a Path, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            datadir,
            runner,
        }
    }

    fn scalable_icon_dir(&self) -> PathBuf {
        self.datadir.join(paths::SCALABLE_ICON_DIR)
    }

    /// Fail early if a tool needed for `files` is missing from `PATH`
    pub fn check_tools(&self, files: &DataFiles) -> Result<()> {
        let tools = &self.config.xdg_tools;
        if files.iter().any(|f| f.kind() == FileKind::Desktop) {
            cmd::require_tool(&tools.desktop_menu)?;
        }
        if files.iter().any(|f| f.kind() == FileKind::Png) {
            cmd::require_tool(&tools.icon_resource)?;
        }
        Ok(())
    }

    pub fn install(&self, files: &DataFiles) -> Result<()> {
        println!("Using datadir {}", self.datadir.display());

        for file in files.iter() {
            self.install_file(file)?;
        }

        println!("✓ Installed all XDG application launcher files");
        Ok(())
    }

    fn install_file(&self, file: &DataFile) -> Result<()> {
        let tools = &self.config.xdg_tools;
        let source = file.source.display().to_string();

        match file.kind() {
            FileKind::Desktop => {
                println!("Installing {}", file.file_name());
                self.runner.run(
                    &tools.desktop_menu,
                    &args(["install", "--novendor", source.as_str()]),
                )?;
            }
            FileKind::Png => {
                println!("Installing {}", file.file_name());
                for size in &self.config.icon_sizes {
                    self.runner.run(
                        &tools.icon_resource,
                        &args([
                            "install",
                            "--novendor",
                            "--size",
                            size.to_string().as_str(),
                            source.as_str(),
                        ]),
                    )?;
                }
            }
            FileKind::Svg => {
                println!("Installing {}", file.file_name());
                let icon_dir = self.scalable_icon_dir();
                fs::create_dir_all(&icon_dir)
                    .with_context(|| format!("Failed to create {}", icon_dir.display()))?;
                let dst = icon_dir.join(file.file_name());
                fs::copy(&file.source, &dst).with_context(|| {
                    format!(
                        "Failed to copy {} to {}",
                        file.source.display(),
                        dst.display()
                    )
                })?;
            }
            FileKind::Service | FileKind::Other => {
                tracing::debug!("Ignoring {}", file.relative.display());
            }
        }

        Ok(())
    }

    /// Remove everything [`install`](Self::install) put in place.
    ///
    /// Safe to run after a partial or failed install: absent icons and tool
    /// failures are reported but do not abort.
    pub fn uninstall(&self, files: &DataFiles) -> Result<()> {
        println!("Using datadir {}", self.datadir.display());

        for file in files.iter() {
            self.uninstall_file(file)?;
        }

        println!("✓ Removed all XDG application launcher files");
        Ok(())
    }

    fn uninstall_file(&self, file: &DataFile) -> Result<()> {
        let tools = &self.config.xdg_tools;
        let name = file.file_name();

        match file.kind() {
            FileKind::Desktop => {
                println!("Uninstalling {}", name);
                self.run_tolerated(
                    &tools.desktop_menu,
                    &args(["uninstall", "--novendor", name.as_str()]),
                )?;
            }
            FileKind::Png => {
                println!("Uninstalling {}", name);
                for size in &self.config.icon_sizes {
                    self.run_tolerated(
                        &tools.icon_resource,
                        &args(["uninstall", "--size", size.to_string().as_str(), name.as_str()]),
                    )?;
                }
            }
            FileKind::Svg => {
                println!("Uninstalling {}", name);
                let svg = self.scalable_icon_dir().join(&name);
                match fs::remove_file(&svg) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        tracing::debug!("{} was already absent", svg.display());
                    }
                    Err(e) => {
                        return Err(e)
                            .with_context(|| format!("Failed to remove {}", svg.display()));
                    }
                }
            }
            FileKind::Service | FileKind::Other => {
                tracing::debug!("Ignoring {}", file.relative.display());
            }
        }

        Ok(())
    }

    fn run_tolerated(&self, program: &str, args: &[String]) -> Result<()> {
        if !self.runner.run_lenient(program, args)? {
            println!(
                "Warning: {} {} did not succeed, continuing",
                program,
                args.join(" ")
            );
        }
        Ok(())
    }
}

fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::RecordingRunner;
    use crate::data::{self, DataSource};

    fn data_tree() -> (tempfile::TempDir, DataSource) {
        let root = tempfile::tempdir().unwrap();
        let xdg = root.path().join("xdg");
        fs::create_dir_all(&xdg).unwrap();
        fs::write(xdg.join("soundcraft-utils.desktop"), "[Desktop Entry]\n").unwrap();
        fs::write(xdg.join("soundcraft-utils.png"), b"png").unwrap();
        fs::write(xdg.join("soundcraft-utils.svg"), "<svg/>").unwrap();
        fs::write(xdg.join("NOTES.txt"), "ignored").unwrap();
        let source = DataSource::Directory(root.path().to_path_buf());
        (root, source)
    }

    fn sorted(mut calls: Vec<Vec<String>>) -> Vec<Vec<String>> {
        calls.sort();
        calls
    }

    #[test]
    fn install_dispatches_by_extension() {
        let (root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();

        XdgInstaller::new(&config, datadir.path(), &runner)
            .install(&files)
            .unwrap();

        let xdg = root.path().join("xdg");
        let desktop = xdg.join("soundcraft-utils.desktop").display().to_string();
        let png = xdg.join("soundcraft-utils.png").display().to_string();

        let mut expected = vec![vec![
            "xdg-desktop-menu".to_string(),
            "install".into(),
            "--novendor".into(),
            desktop,
        ]];
        for size in [16, 24, 32, 48, 256] {
            expected.push(vec![
                "xdg-icon-resource".into(),
                "install".into(),
                "--novendor".into(),
                "--size".into(),
                size.to_string(),
                png.clone(),
            ]);
        }
        assert_eq!(sorted(runner.calls()), sorted(expected));

        let svg = datadir
            .path()
            .join("icons/hicolor/scalable/apps/soundcraft-utils.svg");
        assert_eq!(fs::read_to_string(svg).unwrap(), "<svg/>");
    }

    #[test]
    fn uninstall_uses_bare_names() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();

        XdgInstaller::new(&config, datadir.path(), &runner)
            .uninstall(&files)
            .unwrap();

        let calls = runner.calls();
        assert!(calls.contains(&vec![
            "xdg-desktop-menu".to_string(),
            "uninstall".into(),
            "--novendor".into(),
            "soundcraft-utils.desktop".into(),
        ]));
        let icon_calls: Vec<_> = calls
            .iter()
            .filter(|c| c[0] == "xdg-icon-resource")
            .collect();
        assert_eq!(icon_calls.len(), 5);
        for call in icon_calls {
            assert_eq!(call[1], "uninstall");
            assert_eq!(call[4], "soundcraft-utils.png");
        }
    }

    #[test]
    fn svg_install_is_idempotent() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();
        let installer = XdgInstaller::new(&config, datadir.path(), &runner);

        installer.install(&files).unwrap();
        installer.install(&files).unwrap();

        let icon_dir = datadir.path().join(paths::SCALABLE_ICON_DIR);
        let entries: Vec<_> = fs::read_dir(&icon_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn removing_absent_svg_succeeds() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();

        assert!(XdgInstaller::new(&config, datadir.path(), &runner)
            .uninstall(&files)
            .is_ok());
    }

    #[test]
    fn uninstall_tolerates_tool_failures() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut runner = RecordingRunner::new();
        runner.lenient_exit_ok = false;
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();

        XdgInstaller::new(&config, datadir.path(), &runner)
            .uninstall(&files)
            .unwrap();
        assert_eq!(runner.calls().len(), 6);
    }

    #[test]
    fn install_then_uninstall_leaves_no_svg() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();
        let installer = XdgInstaller::new(&config, datadir.path(), &runner);

        installer.install(&files).unwrap();
        installer.uninstall(&files).unwrap();

        let icon_dir = datadir.path().join(paths::SCALABLE_ICON_DIR);
        assert_eq!(fs::read_dir(icon_dir).unwrap().count(), 0);
    }

    #[test]
    fn check_tools_reports_missing_tool() {
        let (_root, source) = data_tree();
        let datadir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.xdg_tools.desktop_menu = "soundcraft-no-such-tool".into();
        let runner = RecordingRunner::new();
        let files = data::collect(&source, paths::XDG_DATA_SUBDIR).unwrap();

        let err = XdgInstaller::new(&config, datadir.path(), &runner)
            .check_tools(&files)
            .unwrap_err();
        assert!(err.to_string().contains("soundcraft-no-such-tool"));
    }
}
