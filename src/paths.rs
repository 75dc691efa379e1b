/// Shared-data directory below an installation prefix
pub const SHARE_DIR: &str = "share";

/// D-Bus session service descriptors, relative to the datadir
pub const DBUS_SERVICES_DIR: &str = "dbus-1/services";

/// Scalable hicolor application icons, relative to the datadir
pub const SCALABLE_ICON_DIR: &str = "icons/hicolor/scalable/apps";

/// Bundled data subdirectory holding the service descriptor template
pub const DBUS_DATA_SUBDIR: &str = "dbus-1";

/// Bundled data subdirectory holding desktop entries and icons
pub const XDG_DATA_SUBDIR: &str = "xdg";
