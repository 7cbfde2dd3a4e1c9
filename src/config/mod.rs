//! Build request types: the connection union and per-medium configuration.

use serde::{Deserialize, Serialize};

mod loader;
pub use loader::RequestLoader;

/// Sketch name used when the request does not name one.
pub const DEFAULT_SKETCH_NAME: &str = "ConfiguredFirmata";

/// Baud rate used when a serial connection does not specify one.
pub const DEFAULT_SERIAL_BAUD: u32 = 57600;

/// A complete build request: which sketch to generate, over which transport,
/// with which features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Name of the generated sketch (and of the `.ino` file).
    #[serde(default = "default_sketch_name")]
    pub sketch_name: String,

    /// Communication medium and its parameters.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Ordered feature ids to compile in; must resolve in the registry.
    #[serde(default)]
    pub selected_features: Vec<String>,
}

impl BuildRequest {
    /// The sketch name, falling back to the default when empty.
    pub fn sketch_name(&self) -> &str {
        if self.sketch_name.is_empty() {
            DEFAULT_SKETCH_NAME
        } else {
            &self.sketch_name
        }
    }
}

fn default_sketch_name() -> String {
    DEFAULT_SKETCH_NAME.to_string()
}

/// Connection configuration, exactly one medium per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionConfig {
    /// Serial link over the board's UART/USB.
    Serial(SerialConfig),
    /// Ethernet client (wired).
    Ethernet(EthernetConfig),
    /// Wi-Fi client or server.
    Wifi(WifiConfig),
    /// Bluetooth Low Energy peripheral.
    Ble(BleConfig),
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig::Serial(SerialConfig::default())
    }
}

/// Serial connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate passed to `Firmata.begin`.
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud: DEFAULT_SERIAL_BAUD,
        }
    }
}

/// Ethernet connection parameters. The board is configured as a TCP client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EthernetConfig {
    /// Ethernet chip or board name; resolved through an alias table.
    pub controller: String,

    /// Remote host IP the board connects to. Preferred over `remote_host`
    /// when both are given.
    pub remote_ip: Option<String>,

    /// Remote hostname the board connects to.
    pub remote_host: Option<String>,

    /// TCP port on the remote host. Required.
    pub remote_port: Option<u16>,

    /// MAC address for the board, colon-separated. A default is substituted
    /// (with a warning) when omitted.
    pub mac: Option<String>,

    /// Static local IP; DHCP is used when omitted.
    pub local_ip: Option<String>,
}

/// Wi-Fi connection parameters. The board runs as a TCP server unless a
/// remote server IP is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    /// Wi-Fi shield or board name; resolved through an alias table.
    pub controller: String,

    /// Network SSID.
    pub ssid: Option<String>,

    /// Network security parameters.
    pub security: WifiSecurity,

    /// TCP port the stream listens on (server) or connects to (client).
    /// Required.
    pub network_port: Option<u16>,

    /// IP of a remote TCP server; switches the board into client mode.
    pub remote_server_ip: Option<String>,

    /// Static local IP; DHCP is used when omitted.
    pub local_ip: Option<String>,

    /// Subnet mask for a static IP setup.
    pub subnet_mask: Option<String>,

    /// Gateway IP for a static IP setup.
    pub gateway_ip: Option<String>,
}

/// Wi-Fi security selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiSecurity {
    /// WPA/WPA2 passphrase authentication.
    Wpa(WpaSecurity),
    /// WEP key authentication.
    Wep(WepSecurity),
    /// Open network, no security.
    #[default]
    #[serde(alias = "none")]
    Open,
}

/// WPA/WPA2 parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WpaSecurity {
    /// Network passphrase; a placeholder is generated when omitted.
    pub passphrase: Option<String>,
}

/// WEP parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WepSecurity {
    /// Key index in the range 0-3, even if the router numbers keys 1-4.
    /// Required.
    pub index: Option<u32>,

    /// WEP key; a placeholder is generated when omitted.
    pub key: Option<String>,
}

/// BLE connection parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// BLE board name; resolved through an alias table.
    pub controller: String,

    /// Minimum connection interval (time in ms / 1.25). Clamped up to the
    /// protocol minimum of 6.
    pub min_interval: Option<f64>,

    /// Maximum connection interval (time in ms / 1.25). Defaults to 24 when
    /// unset or below the minimum.
    pub max_interval: Option<f64>,

    /// Advertised local name. Defaults to `FIRMATA`.
    pub local_name: Option<String>,
}

/// Treat empty strings in optional fields as absent; web-form callers submit
/// blanks for fields the user left untouched.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
