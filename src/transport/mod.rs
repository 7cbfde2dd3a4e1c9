//! Transport trait and built-in implementations (serial, Ethernet, Wi-Fi, BLE).

use crate::config::ConnectionConfig;
use crate::core::error::Result;

pub mod ble;
pub mod ethernet;
pub mod serial;
pub mod wifi;

pub use ble::BleTransport;
pub use ethernet::EthernetTransport;
pub use serial::SerialTransport;
pub use wifi::WifiTransport;

/// Code-generation hooks every communication medium provides.
///
/// Each method returns a fragment of sketch text; the default implementations
/// return an empty string for hooks that do not apply to a medium.
/// [`config_block`](Transport::config_block) doubles as the validation point
/// for user-supplied network parameters, so it is the only fallible hook.
pub trait Transport: Send + Sync {
    /// Includes, macros and global declarations near the top of the sketch.
    ///
    /// Validates address and port fields as a side effect.
    fn config_block(&self) -> Result<String>;

    /// The `initTransport()` function definition that establishes the link
    /// at startup.
    fn init_transport_fn(&self) -> String;

    /// Whether this medium reserves microcontroller pins for its own
    /// hardware (SPI-attached shields do; serial and BLE never do).
    fn has_ignore_pins(&self) -> bool {
        false
    }

    /// The `ignorePins()` function definition, when
    /// [`has_ignore_pins`](Transport::has_ignore_pins) is true.
    fn ignore_pins_fn(&self) -> String {
        String::new()
    }

    /// Hook at the very start of `loop()`; may early-return the iteration.
    fn loop_begin_block(&self) -> String {
        String::new()
    }

    /// Hook at the very end of `loop()` for periodic connection maintenance.
    fn loop_end_block(&self) -> String {
        String::new()
    }

    /// Optional diagnostic routine reporting the connection status.
    fn debug_status_fn(&self) -> String {
        String::new()
    }

    /// Optional callback invoked on host link state transitions.
    fn host_connection_fn(&self) -> String {
        String::new()
    }

    /// Human-readable transport name, used in error and log messages.
    fn name(&self) -> &str;
}

/// Create the transport matching a connection configuration.
///
/// Fails with `UnknownController` when the configuration names a controller
/// its medium does not know.
pub fn from_connection(connection: &ConnectionConfig) -> Result<Box<dyn Transport>> {
    match connection {
        ConnectionConfig::Serial(cfg) => Ok(Box::new(SerialTransport::new(cfg.clone()))),
        ConnectionConfig::Ethernet(cfg) => Ok(Box::new(EthernetTransport::new(cfg.clone())?)),
        ConnectionConfig::Wifi(cfg) => Ok(Box::new(WifiTransport::new(cfg.clone())?)),
        ConnectionConfig::Ble(cfg) => Ok(Box::new(BleTransport::new(cfg.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BleConfig, EthernetConfig, SerialConfig, WifiConfig};

    #[test]
    fn test_factory_selects_serial() {
        let transport =
            from_connection(&ConnectionConfig::Serial(SerialConfig::default())).unwrap();
        assert_eq!(transport.name(), "Serial");
    }

    #[test]
    fn test_factory_selects_ethernet() {
        let transport = from_connection(&ConnectionConfig::Ethernet(EthernetConfig {
            controller: "WIZ5100".to_string(),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(transport.name(), "Ethernet");
    }

    #[test]
    fn test_factory_selects_wifi() {
        let transport = from_connection(&ConnectionConfig::Wifi(WifiConfig {
            controller: "MKR1000".to_string(),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(transport.name(), "Wi-Fi");
    }

    #[test]
    fn test_factory_selects_ble() {
        let transport = from_connection(&ConnectionConfig::Ble(BleConfig {
            controller: "ARDUINO_101".to_string(),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(transport.name(), "BLE");
    }

    #[test]
    fn test_factory_rejects_unknown_controller() {
        let result = from_connection(&ConnectionConfig::Ethernet(EthernetConfig {
            controller: "INVALID_CONTROLLER".to_string(),
            ..Default::default()
        }));
        assert!(result.is_err());
    }
}
