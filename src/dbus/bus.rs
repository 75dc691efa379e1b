use thiserror::Error;
use zbus::blocking::fdo::DBusProxy;
use zbus::blocking::{connection, Connection, Proxy};
use zbus::names::{BusName, WellKnownName};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum BusError {
    /// The bus daemon does not (yet) know an activatable service by this name
    #[error("service {name} is not known to the bus: {message}")]
    ServiceUnknown { name: String, message: String },

    #[error(transparent)]
    Fdo(zbus::fdo::Error),

    #[error(transparent)]
    ZBus(#[from] zbus::Error),
}

impl BusError {
    /// Whether a later attempt may succeed without intervention
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnknown { .. })
    }
}

impl From<zbus::fdo::Error> for BusError {
    fn from(err: zbus::fdo::Error) -> Self {
        match err {
            zbus::fdo::Error::ZBus(err) => Self::ZBus(err),
            other => Self::Fdo(other),
        }
    }
}

/// Operations the hooks need from the session bus
pub trait ServiceBus {
    /// Ask the bus daemon to activate `name`
    fn start_service_by_name(&self, name: &str) -> Result<(), BusError>;

    fn name_has_owner(&self, name: &str) -> Result<bool, BusError>;

    /// Read the running service's `version` property
    fn service_version(&self) -> Result<String, BusError>;

    /// Ask the running service to exit
    fn shutdown_service(&self) -> Result<(), BusError>;
}

impl<T: ServiceBus + ?Sized> ServiceBus for &T {
    fn start_service_by_name(&self, name: &str) -> Result<(), BusError> {
        (**self).start_service_by_name(name)
    }

    fn name_has_owner(&self, name: &str) -> Result<bool, BusError> {
        (**self).name_has_owner(name)
    }

    fn service_version(&self) -> Result<String, BusError> {
        (**self).service_version()
    }

    fn shutdown_service(&self) -> Result<(), BusError> {
        (**self).shutdown_service()
    }
}

/// The user's session bus, reached through zbus
pub struct SessionBus {
    connection: Connection,
    bus_name: String,
    object_path: String,
    interface: String,
}

impl SessionBus {
    /// Connect to `config.bus_address`, or the user's session bus when unset
    pub fn connect(config: &Config) -> Result<Self, BusError> {
        let connection = match &config.bus_address {
            Some(address) => connection::Builder::address(address.as_str())?.build()?,
            None => Connection::session()?,
        };
        Ok(Self::with_connection(connection, config))
    }

    pub fn with_connection(connection: Connection, config: &Config) -> Self {
        Self {
            connection,
            bus_name: config.bus_name.clone(),
            object_path: config.service_object_path(),
            interface: config.service_interface.clone(),
        }
    }

    fn daemon(&self) -> Result<DBusProxy<'_>, BusError> {
        Ok(DBusProxy::new(&self.connection)?)
    }

    fn service(&self) -> Result<Proxy<'_>, BusError> {
        let proxy = Proxy::new(
            &self.connection,
            self.bus_name.as_str(),
            self.object_path.as_str(),
            self.interface.as_str(),
        )?;
        Ok(proxy)
    }
}

impl ServiceBus for SessionBus {
    fn start_service_by_name(&self, name: &str) -> Result<(), BusError> {
        let well_known = WellKnownName::try_from(name).map_err(zbus::Error::from)?;
        match self.daemon()?.start_service_by_name(well_known, 0) {
            Ok(reply) => {
                tracing::debug!("StartServiceByName({}) -> {:?}", name, reply);
                Ok(())
            }
            Err(zbus::fdo::Error::ServiceUnknown(message)) => Err(BusError::ServiceUnknown {
                name: name.to_string(),
                message,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn name_has_owner(&self, name: &str) -> Result<bool, BusError> {
        let bus_name = BusName::try_from(name).map_err(zbus::Error::from)?;
        Ok(self.daemon()?.name_has_owner(bus_name)?)
    }

    fn service_version(&self) -> Result<String, BusError> {
        Ok(self.service()?.get_property::<String>("version")?)
    }

    fn shutdown_service(&self) -> Result<(), BusError> {
        self.service()?.call_method("Shutdown", &())?;
        Ok(())
    }
}
