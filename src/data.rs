//! Bundled data files
//!
//! The service descriptor template, desktop entry and icons are compiled into
//! the binary. External tools need real paths, so a subdirectory's files are
//! staged into a temporary directory that lives as long as the [`DataFiles`]
//! handle. A config can instead point at an unpacked data tree on disk.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::Config;
use crate::paths;

struct EmbeddedFile {
    subdir: &'static str,
    path: &'static str,
    contents: &'static [u8],
}

const EMBEDDED: &[EmbeddedFile] = &[
    EmbeddedFile {
        subdir: paths::DBUS_DATA_SUBDIR,
        path: "soundcraft.utils.notepad.service",
        contents: include_bytes!("../data/dbus-1/soundcraft.utils.notepad.service"),
    },
    EmbeddedFile {
        subdir: paths::XDG_DATA_SUBDIR,
        path: "soundcraft-utils.desktop",
        contents: include_bytes!("../data/xdg/soundcraft-utils.desktop"),
    },
    EmbeddedFile {
        subdir: paths::XDG_DATA_SUBDIR,
        path: "soundcraft-utils.png",
        contents: include_bytes!("../data/xdg/soundcraft-utils.png"),
    },
    EmbeddedFile {
        subdir: paths::XDG_DATA_SUBDIR,
        path: "soundcraft-utils.svg",
        contents: include_bytes!("../data/xdg/soundcraft-utils.svg"),
    },
];

/// Where data files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Embedded,
    Directory(PathBuf),
}

impl DataSource {
    pub fn from_config(config: &Config) -> Self {
        match &config.data_dir {
            Some(dir) => Self::Directory(dir.clone()),
            None => Self::Embedded,
        }
    }
}

/// How a data file is installed, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Service,
    Desktop,
    Png,
    Svg,
    Other,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("service") => Self::Service,
            Some("desktop") => Self::Desktop,
            Some("png") => Self::Png,
            Some("svg") => Self::Svg,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataFile {
    /// Path relative to the data subdirectory
    pub relative: PathBuf,
    /// Readable location on disk
    pub source: PathBuf,
}

impl DataFile {
    pub fn kind(&self) -> FileKind {
        FileKind::of(&self.relative)
    }

    /// Bare file name, as used when uninstalling
    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Files of one data subdirectory, kept readable while this handle lives
#[derive(Debug)]
pub struct DataFiles {
    files: Vec<DataFile>,
    _staging: Option<TempDir>,
}

impl DataFiles {
    pub fn iter(&self) -> impl Iterator<Item = &DataFile> {
        self.files.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Collect the files of `subdir` (e.g. `dbus-1` or `xdg`) from `source`
pub fn collect(source: &DataSource, subdir: &str) -> Result<DataFiles> {
    match source {
        DataSource::Embedded => stage_embedded(subdir),
        DataSource::Directory(root) => walk_directory(&root.join(subdir)),
    }
}

fn stage_embedded(subdir: &str) -> Result<DataFiles> {
    let staging = tempfile::Builder::new()
        .prefix("soundcraft-installtool-")
        .tempdir()
        .context("Failed to create staging directory")?;

    let mut files = Vec::new();
    for embedded in EMBEDDED.iter().filter(|f| f.subdir == subdir) {
        let source = staging.path().join(embedded.path);
        if let Some(parent) = source.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&source, embedded.contents)
            .with_context(|| format!("Failed to stage {}", embedded.path))?;
        tracing::debug!("Staged {} at {}", embedded.path, source.display());

        files.push(DataFile {
            relative: PathBuf::from(embedded.path),
            source,
        });
    }

    Ok(DataFiles {
        files,
        _staging: Some(staging),
    })
}

fn walk_directory(dir: &Path) -> Result<DataFiles> {
    let mut files = Vec::new();

    if dir.is_dir() {
        for entry in WalkDir::new(dir) {
            let entry =
                entry.with_context(|| format!("Failed to walk data directory {}", dir.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(dir)
                .with_context(|| format!("{} escaped {}", entry.path().display(), dir.display()))?
                .to_path_buf();
            tracing::debug!("Found data file {}", relative.display());

            files.push(DataFile {
                relative,
                source: entry.into_path(),
            });
        }
    } else {
        tracing::debug!("Data directory {} does not exist", dir.display());
    }

    Ok(DataFiles {
        files,
        _staging: None,
    })
}
