//! Post-install and pre-uninstall sequences
//!
//! Each sequence runs its D-Bus step and then its XDG step. Nothing is rolled
//! back; both sequences are safe to repeat.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cmd::CommandRunner;
use crate::config::Config;
use crate::data::{self, DataSource};
use crate::dbus::{self, BusError, ServiceBus};
use crate::paths;
use crate::prefix;
use crate::xdg::XdgInstaller;

pub struct Hooks<'a> {
    config: &'a Config,
    datadir: PathBuf,
    service_exe: PathBuf,
    source: DataSource,
    runner: &'a dyn CommandRunner,
}

impl<'a> Hooks<'a> {
    pub fn new(
        config: &'a Config,
        datadir: PathBuf,
        service_exe: PathBuf,
        source: DataSource,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            datadir,
            service_exe,
            source,
            runner,
        }
    }

    /// Hooks for the running executable's installation prefix
    pub fn for_current_exe(config: &'a Config, runner: &'a dyn CommandRunner) -> Result<Self> {
        let exe = prefix::current_exe()?;
        let datadir = prefix::find_datadir(&exe, config)?;
        let service_exe = prefix::service_exe_path(&exe, config);

        Ok(Self::new(
            config,
            datadir,
            service_exe,
            DataSource::from_config(config),
            runner,
        ))
    }

    pub fn datadir(&self) -> &std::path::Path {
        &self.datadir
    }

    fn xdg(&self) -> XdgInstaller<'_> {
        XdgInstaller::new(self.config, &self.datadir, self.runner)
    }

    /// Register and smoke-test the D-Bus service, then install the launcher.
    ///
    /// `connect` is called once the service descriptor is in place.
    pub fn post_install<B, C>(&self, connect: C) -> Result<()>
    where
        B: ServiceBus,
        C: FnOnce() -> Result<B, BusError>,
    {
        self.post_install_dbus(connect)?;
        self.post_install_xdg()?;
        Ok(())
    }

    pub fn post_install_dbus<B, C>(&self, connect: C) -> Result<String>
    where
        B: ServiceBus,
        C: FnOnce() -> Result<B, BusError>,
    {
        let files = data::collect(&self.source, paths::DBUS_DATA_SUBDIR)?;
        dbus::install_service_file(self.config, &self.datadir, &self.service_exe, &files)?;

        let bus = connect().context("Failed to connect to the session bus")?;
        let version = dbus::verify_service(&bus, self.config, std::thread::sleep)?;

        println!("✓ D-Bus post-install is complete");
        println!(
            "Run {} or {} as a regular user",
            self.config.executables.gui, self.config.executables.cli
        );
        Ok(version)
    }

    pub fn post_install_xdg(&self) -> Result<()> {
        let files = data::collect(&self.source, paths::XDG_DATA_SUBDIR)?;
        let xdg = self.xdg();
        xdg.check_tools(&files)?;
        xdg.install(&files)
    }

    /// Stop and unregister the D-Bus service, then remove the launcher.
    pub fn pre_uninstall<B, C>(&self, connect: C) -> Result<()>
    where
        B: ServiceBus,
        C: FnOnce() -> Result<B, BusError>,
    {
        self.pre_uninstall_dbus(connect)?;
        self.pre_uninstall_xdg()?;
        Ok(())
    }

    pub fn pre_uninstall_dbus<B, C>(&self, connect: C) -> Result<()>
    where
        B: ServiceBus,
        C: FnOnce() -> Result<B, BusError>,
    {
        let bus = connect().context("Failed to connect to the session bus")?;
        dbus::stop_running_service(&bus, self.config)?;
        dbus::remove_service_file(self.config, &self.datadir)?;

        println!("✓ D-Bus service is unregistered");
        Ok(())
    }

    pub fn pre_uninstall_xdg(&self) -> Result<()> {
        let files = data::collect(&self.source, paths::XDG_DATA_SUBDIR)?;
        self.xdg().uninstall(&files)
    }
}
