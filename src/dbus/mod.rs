//! Session bus registration of the soundcraft D-Bus service
//!
//! Post-install renders the service descriptor into the datadir and proves it
//! works by activating the service, reading its version and shutting it down
//! again. Pre-uninstall stops a running instance and removes the descriptor.

mod bus;
mod activation;

pub use bus::{BusError, ServiceBus, SessionBus};
pub use activation::activate_with_retry;

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::data::{DataFiles, FileKind};
use crate::paths;
use crate::template;

/// Where the service descriptor is installed below `datadir`
pub fn service_file_path(config: &Config, datadir: &Path) -> PathBuf {
    datadir
        .join(paths::DBUS_SERVICES_DIR)
        .join(config.service_file_name())
}

/// Render the bundled descriptor template(s) into the datadir.
///
/// Re-running overwrites the previous descriptor.
pub fn install_service_file(
    config: &Config,
    datadir: &Path,
    service_exe: &Path,
    files: &DataFiles,
) -> Result<PathBuf> {
    let values = HashMap::from([
        ("dbus_service_bin", service_exe.display().to_string()),
        ("busname", config.bus_name.clone()),
    ]);
    let dst = service_file_path(config, datadir);
    let mut installed = false;

    for file in files.iter().filter(|f| f.kind() == FileKind::Service) {
        println!("Installing {}", dst.display());

        let source = fs::read_to_string(&file.source)
            .with_context(|| format!("Failed to read {}", file.source.display()))?;
        let rendered = template::render(&source, &values)
            .with_context(|| format!("Failed to render {}", file.relative.display()))?;

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&dst, rendered)
            .with_context(|| format!("Failed to write {}", dst.display()))?;
        installed = true;
    }

    if !installed {
        bail!("No D-Bus service descriptor template found in the data files");
    }

    Ok(dst)
}

/// Activate the freshly registered service, report its version and stop it.
///
/// Errors from the final shutdown are not suppressed: by then the service is
/// known to be running.
pub fn verify_service<B, F>(bus: &B, config: &Config, sleep: F) -> Result<String>
where
    B: ServiceBus + ?Sized,
    F: FnMut(Duration),
{
    println!("Starting D-Bus service as a test");
    println!("Installtool version: {}", config.version);

    let attempts = activate_with_retry(bus, &config.bus_name, &config.retry, sleep)
        .with_context(|| format!("Failed to activate {}", config.bus_name))?;
    tracing::debug!("{} activated after {} attempt(s)", config.bus_name, attempts);

    let version = bus
        .service_version()
        .context("Failed to read the service version")?;
    println!("Service     version: {}", version);

    println!("Shutting down session D-Bus service...");
    bus.shutdown_service()
        .context("Failed to shut down the D-Bus service")?;
    println!("Session D-Bus service has been shut down");

    Ok(version)
}

/// Stop the service if it currently owns its bus name.
///
/// Returns the version of the stopped instance, if one was running.
pub fn stop_running_service<B>(bus: &B, config: &Config) -> Result<Option<String>>
where
    B: ServiceBus + ?Sized,
{
    let owned = bus
        .name_has_owner(&config.bus_name)
        .with_context(|| format!("Failed to query owner of {}", config.bus_name))?;
    if !owned {
        println!("Service not running");
        return Ok(None);
    }

    let version = bus
        .service_version()
        .context("Failed to read the service version")?;
    println!("Shutting down service version {}", version);
    bus.shutdown_service()
        .context("Failed to shut down the D-Bus service")?;
    println!("Stopped");

    Ok(Some(version))
}

/// Remove the installed descriptor; a missing file is not an error.
///
/// Returns whether a file was removed.
pub fn remove_service_file(config: &Config, datadir: &Path) -> Result<bool> {
    let dst = service_file_path(config, datadir);
    println!("Removing {}", dst.display());

    match fs::remove_file(&dst) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} was already absent", dst.display());
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dst.display())),
    }
}
