//! Publishing the HID service record through BlueZ.
//!
//! The record is registered as an external profile with the BlueZ profile
//! manager. BlueZ only uses it to answer discovery requests; the control
//! and interrupt channels are accepted on our own L2CAP sockets.

use std::collections::HashMap;
use std::fmt::Write;

use thiserror::Error;
use zbus::blocking::{Connection, Proxy};
use zbus::zvariant::{ObjectPath, OwnedFd, OwnedObjectPath, OwnedValue, Value};
use zbus_macros::interface;

use crate::config::AdvertisementConfig;
use crate::constants::{HID_SERVICE_UUID, PROFILE_PATH, PSM_HID_CONTROL, PSM_HID_INTERRUPT};
use crate::drivers::bthid::report_descriptor::REPORT_DESCRIPTOR;

const BLUEZ_SERVICE: &str = "org.bluez";
const BLUEZ_PATH: &str = "/org/bluez";
const PROFILE_MANAGER_IFACE: &str = "org.bluez.ProfileManager1";

/// Possible errors publishing the service record
#[derive(Debug, Error)]
pub enum AdvertisementError {
    #[error("DBus error: {0}")]
    DBus(#[from] zbus::Error),
    #[error("Invalid object path: {0}")]
    Path(#[from] zbus::zvariant::Error),
}

/// Handle to a published service record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle(String);

impl ServiceHandle {
    pub fn new(path: &str) -> Self {
        Self(path.to_string())
    }

    pub fn path(&self) -> &str {
        self.0.as_str()
    }
}

/// Publishes and retracts the discovery record remote hosts use to find
/// this device
pub trait AdvertisementService {
    fn register(&mut self) -> Result<ServiceHandle, AdvertisementError>;

    /// Retract the record. Failures are logged and otherwise ignored.
    fn unregister(&mut self, handle: ServiceHandle);
}

/// DBus object implementing `org.bluez.Profile1`
pub struct HidProfile;

#[interface(name = "org.bluez.Profile1")]
impl HidProfile {
    fn release(&self) {
        log::info!("BlueZ released the HID profile");
    }

    fn cancel(&self) {
        log::debug!("BlueZ cancelled a profile request");
    }

    fn new_connection(
        &self,
        device: OwnedObjectPath,
        _fd: OwnedFd,
        _properties: HashMap<String, OwnedValue>,
    ) {
        // Connections are accepted on our own sockets, drop the descriptor
        log::debug!("Ignoring profile connection from {}", device.as_str());
    }

    fn request_disconnection(&self, device: OwnedObjectPath) {
        log::debug!("BlueZ requested disconnection of {}", device.as_str());
    }
}

/// [AdvertisementService] backed by the BlueZ profile manager
pub struct BluezAdvertisement {
    connection: Connection,
    config: AdvertisementConfig,
}

impl BluezAdvertisement {
    /// Connect to the system bus
    pub fn new(config: AdvertisementConfig) -> Result<Self, AdvertisementError> {
        let connection = Connection::system()?;
        Ok(Self { connection, config })
    }

    fn profile_manager(&self) -> Result<Proxy<'_>, AdvertisementError> {
        let proxy = Proxy::new(
            &self.connection,
            BLUEZ_SERVICE,
            BLUEZ_PATH,
            PROFILE_MANAGER_IFACE,
        )?;
        Ok(proxy)
    }
}

impl AdvertisementService for BluezAdvertisement {
    fn register(&mut self) -> Result<ServiceHandle, AdvertisementError> {
        self.connection.object_server().at(PROFILE_PATH, HidProfile)?;

        let record = service_record(&self.config);
        let mut options: HashMap<&str, Value> = HashMap::new();
        options.insert("ServiceRecord", Value::from(record));
        options.insert("Role", Value::from("server"));
        options.insert("RequireAuthentication", Value::from(false));
        options.insert("RequireAuthorization", Value::from(false));

        let path = ObjectPath::try_from(PROFILE_PATH)?;
        let result = self.profile_manager().and_then(|proxy| {
            proxy.call_method("RegisterProfile", &(&path, HID_SERVICE_UUID, options))?;
            Ok(())
        });
        if let Err(e) = result {
            let _ = self.connection.object_server().remove::<HidProfile, _>(PROFILE_PATH);
            return Err(e);
        }

        log::info!("Registered HID service record '{}'", self.config.name);
        Ok(ServiceHandle::new(PROFILE_PATH))
    }

    fn unregister(&mut self, handle: ServiceHandle) {
        let result = ObjectPath::try_from(handle.path())
            .map_err(AdvertisementError::from)
            .and_then(|path| {
                let proxy = self.profile_manager()?;
                proxy.call_method("UnregisterProfile", &(&path,))?;
                Ok(())
            });
        if let Err(e) = result {
            log::warn!("Unable to unregister service record: {e}");
        }
        if let Err(e) = self
            .connection
            .object_server()
            .remove::<HidProfile, _>(handle.path())
        {
            log::debug!("Unable to remove profile object: {e}");
        }
        log::info!("Unregistered HID service record");
    }
}

/// Escape a string for use in an XML attribute value
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build the SDP record, in BlueZ XML form, describing a combined keyboard
/// and mouse HID device.
pub fn service_record(config: &AdvertisementConfig) -> String {
    let descriptor = REPORT_DESCRIPTOR.iter().fold(String::new(), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    });

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<record>
  <attribute id="0x0001">
    <sequence>
      <uuid value="0x1124" />
    </sequence>
  </attribute>
  <attribute id="0x0004">
    <sequence>
      <sequence>
        <uuid value="0x0100" />
        <uint16 value="{control:#06x}" />
      </sequence>
      <sequence>
        <uuid value="0x0011" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x0005">
    <sequence>
      <uuid value="0x1002" />
    </sequence>
  </attribute>
  <attribute id="0x0006">
    <sequence>
      <uint16 value="0x656e" />
      <uint16 value="0x006a" />
      <uint16 value="0x0100" />
    </sequence>
  </attribute>
  <attribute id="0x0009">
    <sequence>
      <sequence>
        <uuid value="0x1124" />
        <uint16 value="0x0100" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x000d">
    <sequence>
      <sequence>
        <sequence>
          <uuid value="0x0100" />
          <uint16 value="{interrupt:#06x}" />
        </sequence>
        <sequence>
          <uuid value="0x0011" />
        </sequence>
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x0100">
    <text value="{name}" />
  </attribute>
  <attribute id="0x0101">
    <text value="{description}" />
  </attribute>
  <attribute id="0x0102">
    <text value="{provider}" />
  </attribute>
  <attribute id="0x0200">
    <uint16 value="0x0100" />
  </attribute>
  <attribute id="0x0201">
    <uint16 value="0x0111" />
  </attribute>
  <attribute id="0x0202">
    <uint8 value="0x40" />
  </attribute>
  <attribute id="0x0203">
    <uint8 value="0x00" />
  </attribute>
  <attribute id="0x0204">
    <boolean value="true" />
  </attribute>
  <attribute id="0x0205">
    <boolean value="true" />
  </attribute>
  <attribute id="0x0206">
    <sequence>
      <sequence>
        <uint8 value="0x22" />
        <text encoding="hex" value="{descriptor}" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x0207">
    <sequence>
      <sequence>
        <uint16 value="0x0409" />
        <uint16 value="0x0100" />
      </sequence>
    </sequence>
  </attribute>
  <attribute id="0x020b">
    <uint16 value="0x0100" />
  </attribute>
  <attribute id="0x020e">
    <boolean value="false" />
  </attribute>
</record>
"#,
        control = PSM_HID_CONTROL,
        interrupt = PSM_HID_INTERRUPT,
        name = escape(config.name.as_str()),
        description = escape(config.description.as_str()),
        provider = escape(config.provider.as_str()),
        descriptor = descriptor,
    )
}
