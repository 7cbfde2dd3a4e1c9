use super::Transport;
use crate::config::{WifiConfig, WifiSecurity, non_empty};
use crate::core::error::{Error, Result};
use crate::util::net;
use serde::Deserialize;

/// Association attempts before the sketch proceeds without a link.
const MAX_CONN_ATTEMPTS: u32 = 20;

/// Subnet mask substituted when a static IP setup leaves it out.
const DEFAULT_SUBNET_MASK: &str = "255.255.255.0";

/// Gateway substituted when a static IP setup leaves it out.
const DEFAULT_GATEWAY_IP: &str = "0.0.0.0";

/// Wi-Fi shield and board classes the generator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WifiController {
    /// Arduino MKR1000 (WINC1500 on board, no pins to reserve).
    #[serde(rename = "MKR1000", alias = "Arduino MKR1000")]
    Mkr1000,

    /// ESP8266 modules running the Arduino core.
    #[serde(rename = "ESP8266")]
    Esp8266,

    /// Arduino WiFi Shield 101 (WINC1500).
    #[serde(rename = "WIFI_SHIELD_101", alias = "Arduino WiFi Shield 101")]
    Shield101,

    /// The legacy Arduino WiFi Shield (HDG204).
    #[serde(rename = "WIFI_SHIELD", alias = "Arduino WiFi Shield (legacy)")]
    LegacyShield,
}

impl WifiController {
    /// Resolve a controller name through the alias table.
    pub fn resolve(name: &str) -> Result<Self> {
        serde_plain::from_str(name).map_err(|_| Error::unknown_controller("Wi-Fi", name))
    }

    /// Label used in the generated connection banner.
    fn library_label(self) -> &'static str {
        match self {
            WifiController::LegacyShield => "legacy WiFi",
            WifiController::Shield101 | WifiController::Mkr1000 => "WiFi 101",
            WifiController::Esp8266 => "ESP8266 WiFi",
        }
    }
}

/// Wi-Fi transport. The board runs as a TCP server unless the configuration
/// names a remote server to connect to.
pub struct WifiTransport {
    config: WifiConfig,
    controller: WifiController,
    // static-ip companions after defaulting; the ESP8266 core requires both
    subnet_mask: Option<String>,
    gateway_ip: Option<String>,
}

impl WifiTransport {
    /// Create a Wi-Fi transport, resolving the configured controller and
    /// normalizing the static IP companions.
    pub fn new(config: WifiConfig) -> Result<Self> {
        let controller = WifiController::resolve(&config.controller)?;

        let mut subnet_mask = non_empty(&config.subnet_mask).map(str::to_owned);
        let mut gateway_ip = non_empty(&config.gateway_ip).map(str::to_owned);
        if non_empty(&config.local_ip).is_some() {
            if controller == WifiController::Esp8266 {
                subnet_mask.get_or_insert_with(|| DEFAULT_SUBNET_MASK.to_string());
                gateway_ip.get_or_insert_with(|| DEFAULT_GATEWAY_IP.to_string());
            }
            // complete a half-specified pair for the other controllers
            if subnet_mask.is_some() && gateway_ip.is_none() {
                gateway_ip = Some(DEFAULT_GATEWAY_IP.to_string());
            }
            if gateway_ip.is_some() && subnet_mask.is_none() {
                subnet_mask = Some(DEFAULT_SUBNET_MASK.to_string());
            }
        }

        Ok(Self {
            config,
            controller,
            subnet_mask,
            gateway_ip,
        })
    }

    /// The resolved controller class.
    pub fn controller(&self) -> WifiController {
        self.controller
    }

    fn local_ip(&self) -> Option<&str> {
        non_empty(&self.config.local_ip)
    }

    fn remote_server_ip(&self) -> Option<&str> {
        non_empty(&self.config.remote_server_ip)
    }

    /// `IS_IGNORE_PIN` macro definition for the controller, where one is
    /// needed.
    fn ignore_pin_defines(&self) -> String {
        let mut text = String::new();
        match self.controller {
            WifiController::Mkr1000 => {
                // no pins to reserve on the MKR1000
            }
            WifiController::Shield101 => {
                // SPI pins, pin 5 (shield reset), pin 7 (handshake) and
                // pin 10 (SS); the SS pin stays usable when it is not pin 10
                text.push_str(
                    "#define IS_IGNORE_PIN(p)  ((p) == 10 || (IS_PIN_SPI(p) && (p) != SS) || (p) == 5 || (p) == 7)\n\n",
                );
            }
            WifiController::LegacyShield => {
                text.push_str("#if defined(ARDUINO_WIFI_SHIELD) && defined(__AVR_ATmega32U4__)\n");
                // SPI pins, pin 4 (SD-card SS), pin 7 (handshake), pin 10
                // (WiFi SS); on Leonardo pin 24 maps to D4 and 28 to D10
                text.push_str(
                    "#define IS_IGNORE_PIN(p)  ((IS_PIN_SPI(p) || (p) == 4) || (p) == 7 || (p) == 10 || (p) == 24 || (p) == 28)\n",
                );
                text.push_str("#elif defined(ARDUINO_WIFI_SHIELD)\n");
                text.push_str(
                    "#define IS_IGNORE_PIN(p)  ((IS_PIN_SPI(p) || (p) == 4) || (p) == 7 || (p) == 10)\n",
                );
                text.push_str("#endif\n\n");
            }
            WifiController::Esp8266 => {
                // pin 1 doubles as the serial TX used for debugging
                text.push_str("#if defined(ESP8266) && defined(SERIAL_DEBUG)\n");
                text.push_str("#define IS_IGNORE_PIN(p)  ((p) == 1)\n");
                text.push_str("#endif\n\n");
            }
        }
        text
    }

    /// `stream.begin(...)` call for the configured security type, plus the
    /// bounded wait for the association to come up.
    fn security_begin_block(&self) -> String {
        let (label, params) = match &self.config.security {
            WifiSecurity::Wpa(_) => ("WPA", ", wpa_passphrase"),
            WifiSecurity::Wep(_) => ("WEP", ", wep_index, wep_key"),
            WifiSecurity::Open => ("open", ""),
        };

        let mut text = String::new();
        text.push_str(&format!(
            "  DEBUG_PRINT(\"Attempting to connect to {label} SSID: \");\n"
        ));
        text.push_str("  DEBUG_PRINTLN(ssid);\n");
        text.push_str(&format!("  stream.begin(ssid{params});\n\n"));

        text.push_str("  DEBUG_PRINTLN(\"WiFi setup done.\");\n\n");

        // wait for the access point association, bounded by the attempt cap
        text.push_str(
            "  while (WiFi.status() != WL_CONNECTED && ++connectionAttempts <= WIFI_MAX_CONN_ATTEMPTS) {\n",
        );
        text.push_str("    delay(500);\n");
        text.push_str("    DEBUG_PRINT(\".\");\n");
        text.push_str("  }\n\n");
        text
    }
}

impl Transport for WifiTransport {
    fn config_block(&self) -> Result<String> {
        let mut config = String::new();

        config.push_str("// uncomment to enable debugging over Serial (9600 baud)\n");
        config.push_str("//#define SERIAL_DEBUG\n");
        config.push_str("#include \"utility/firmataDebug.h\"\n\n");

        match self.controller {
            WifiController::LegacyShield => config.push_str("#include <WiFi.h>\n"),
            WifiController::Shield101 | WifiController::Mkr1000 => {
                config.push_str("#include <WiFi101.h>\n")
            }
            WifiController::Esp8266 => config.push_str("#include <ESP8266WiFi.h>\n"),
        }
        config.push_str("#include \"utility/WiFiClientStream.h\"\n");
        config.push_str("#include \"utility/WiFiServerStream.h\"\n\n");

        config.push_str(&format!(
            "#define WIFI_MAX_CONN_ATTEMPTS {MAX_CONN_ATTEMPTS}\n\n"
        ));

        config.push_str(&self.ignore_pin_defines());

        if let Some(ip) = self.remote_server_ip() {
            if !net::is_valid_ipv4(ip) {
                return Err(Error::invalid_address("remote_server_ip", ip));
            }
            config.push_str("// IP address of remote server\n");
            config.push_str(&format!(
                "#define REMOTE_SERVER_IP {}\n\n",
                net::ipv4_octet_list(ip)
            ));
        }

        let network_port = self
            .config
            .network_port
            .ok_or_else(|| Error::missing_field("network_port"))?;
        config.push_str(&format!("#define NETWORK_PORT {network_port}\n\n"));

        let ssid = non_empty(&self.config.ssid).unwrap_or("your_network_name");
        config.push_str(&format!("char ssid[] = \"{ssid}\";\n"));

        match &self.config.security {
            WifiSecurity::Wpa(wpa) => {
                let passphrase = non_empty(&wpa.passphrase).unwrap_or("your_wpa_passphrase");
                config.push_str(&format!("char wpa_passphrase[] = \"{passphrase}\";\n\n"));
            }
            WifiSecurity::Wep(wep) => {
                let index = wep.index.filter(|index| *index <= 3).ok_or_else(|| {
                    Error::missing_field(
                        "security.wep.index in the range [0-3], even if your router/gateway numbers its keys [1-4]",
                    )
                })?;
                let key = non_empty(&wep.key).unwrap_or("your_wep_key");
                config.push_str(&format!("byte wep_index = {index};\n"));
                config.push_str(&format!("char wep_key[] = \"{key}\";\n\n"));
            }
            WifiSecurity::Open => config.push('\n'),
        }

        if let Some(ip) = self.local_ip() {
            if !net::is_valid_ipv4(ip) {
                return Err(Error::invalid_address("local_ip", ip));
            }
            config.push_str("// comment out local_ip, subnet and gateway to use DHCP\n");
            config.push_str(&format!(
                "IPAddress local_ip({});\n",
                net::ipv4_octet_list(ip)
            ));

            if let Some(subnet) = self.subnet_mask.as_deref() {
                if !net::is_valid_ipv4(subnet) {
                    return Err(Error::invalid_address("subnet_mask", subnet));
                }
                config.push_str(&format!(
                    "IPAddress subnet({});\n",
                    net::ipv4_octet_list(subnet)
                ));
            }
            if let Some(gateway) = self.gateway_ip.as_deref() {
                if !net::is_valid_ipv4(gateway) {
                    return Err(Error::invalid_address("gateway_ip", gateway));
                }
                config.push_str(&format!(
                    "IPAddress gateway({});\n\n",
                    net::ipv4_octet_list(gateway)
                ));
            }
        }

        if self.remote_server_ip().is_some() {
            config.push_str("// configure board as a TCP client\n");
            config.push_str("WiFiClientStream stream(IPAddress(REMOTE_SERVER_IP), NETWORK_PORT);\n\n");
        } else {
            config.push_str("// configure board as a TCP server\n");
            config.push_str("WiFiServerStream stream(NETWORK_PORT);\n\n");
        }

        config.push_str("int connectionAttempts = 0;\n");
        config.push_str("bool streamConnected = false;\n\n");
        Ok(config)
    }

    fn init_transport_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void initTransport()\n");
        fn_text.push_str("{\n");

        fn_text.push_str("  // IMPORTANT: if SERIAL_DEBUG is enabled, program execution will stop\n");
        fn_text.push_str("  // at DEBUG_BEGIN until a Serial connection is established.\n");
        fn_text.push_str("  DEBUG_BEGIN(9600);\n");

        fn_text.push_str(&format!(
            "  DEBUG_PRINTLN(\"Attempting a WiFi connection using the {} library.\");\n\n",
            self.controller.library_label()
        ));

        if self.local_ip().is_some() {
            fn_text.push_str("  DEBUG_PRINT(\"Using static IP: \");\n");
            fn_text.push_str("  DEBUG_PRINTLN(local_ip);\n");
            if self.subnet_mask.is_some() && self.gateway_ip.is_some() {
                fn_text.push_str("  stream.config(local_ip, gateway, subnet);\n\n");
            } else {
                fn_text.push_str("  stream.config(local_ip);\n\n");
            }
        } else {
            fn_text.push_str("  DEBUG_PRINTLN(\"IP will be requested from DHCP ...\");\n\n");
        }

        fn_text.push_str("  stream.attach(hostConnectionCallback);\n\n");

        fn_text.push_str(&self.security_begin_block());

        fn_text.push_str("  printWiFiStatus();\n\n");

        if self.has_ignore_pins() {
            fn_text.push_str("  ignorePins();\n\n");
        }

        fn_text.push_str("  Firmata.begin(stream);\n");
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn has_ignore_pins(&self) -> bool {
        self.controller != WifiController::Mkr1000
    }

    fn ignore_pins_fn(&self) -> String {
        if !self.has_ignore_pins() {
            return String::new();
        }
        let mut fn_text = String::new();
        fn_text.push_str("void ignorePins()\n");
        fn_text.push_str("{\n");

        // The firmware talks to the Wi-Fi controller over SPI, so every pin
        // the controller claims must be set to IGNORE or Firmata would
        // overwrite its mode and break the link.
        fn_text.push_str("#ifdef IS_IGNORE_PIN\n");
        fn_text.push_str("  // ignore pins used for the WiFi controller or Firmata will overwrite their modes\n");
        fn_text.push_str("  for (byte i = 0; i < TOTAL_PINS; i++) {\n");
        fn_text.push_str("    if (IS_IGNORE_PIN(i)) {\n");
        fn_text.push_str("      Firmata.setPinMode(i, PIN_MODE_IGNORE);\n");
        fn_text.push_str("    }\n");
        fn_text.push_str("  }\n");
        fn_text.push_str("#endif\n");

        if self.controller == WifiController::LegacyShield {
            fn_text.push('\n');
            fn_text.push_str(
                "  pinMode(PIN_TO_DIGITAL(4), OUTPUT); // switch off SD card bypassing Firmata\n",
            );
            fn_text.push_str("  digitalWrite(PIN_TO_DIGITAL(4), HIGH); // SS is active low\n\n");

            fn_text.push_str("#if defined(__AVR_ATmega1280__) || defined(__AVR_ATmega2560__)\n");
            fn_text.push_str(
                "  pinMode(PIN_TO_DIGITAL(53), OUTPUT); // configure hardware SS as output on MEGA\n",
            );
            fn_text.push_str("#endif\n");
        }

        fn_text.push_str("}\n\n");
        fn_text
    }

    fn loop_end_block(&self) -> String {
        "\n  stream.maintain();\n".to_string()
    }

    fn debug_status_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void printWiFiStatus()\n");
        fn_text.push_str("{\n");
        fn_text.push_str("  if (WiFi.status() != WL_CONNECTED) {\n");
        fn_text.push_str("    DEBUG_PRINT(\"WiFi connection failed. Status value: \");\n");
        fn_text.push_str("    DEBUG_PRINTLN(WiFi.status());\n");
        fn_text.push_str("  } else {\n");
        if let Some(ip) = self.remote_server_ip() {
            fn_text.push_str("    DEBUG_PRINTLN(\"Board configured as a TCP client\");\n");
            fn_text.push_str("    DEBUG_PRINT(\"Remote TCP server address: \");\n");
            fn_text.push_str(&format!(
                "    DEBUG_PRINTLN(\"{}\");\n\n",
                net::ipv4_octet_list(ip)
            ));
        } else {
            fn_text.push_str("    DEBUG_PRINTLN(\"Board configured as a TCP server\");\n\n");
        }

        fn_text.push_str("    DEBUG_PRINT(\"SSID: \");\n");
        fn_text.push_str("    DEBUG_PRINTLN(WiFi.SSID());\n\n");

        fn_text.push_str("    DEBUG_PRINT(\"Local IP Address: \");\n");
        fn_text.push_str("    IPAddress ip = WiFi.localIP();\n");
        fn_text.push_str("    DEBUG_PRINTLN(ip);\n\n");

        fn_text.push_str("    DEBUG_PRINT(\"Signal strength (RSSI): \");\n");
        fn_text.push_str("    long rssi = WiFi.RSSI();\n");
        fn_text.push_str("    DEBUG_PRINT(rssi);\n");
        fn_text.push_str("    DEBUG_PRINTLN(\" dBm\");\n");
        fn_text.push_str("  }\n");
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn host_connection_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void hostConnectionCallback(byte state)\n");
        fn_text.push_str("{\n");
        fn_text.push_str("  switch (state) {\n");
        fn_text.push_str("    case HOST_CONNECTION_CONNECTED:\n");
        fn_text.push_str("      DEBUG_PRINTLN(\"TCP connection established\");\n");
        fn_text.push_str("      break;\n");
        fn_text.push_str("    case HOST_CONNECTION_DISCONNECTED:\n");
        fn_text.push_str("      DEBUG_PRINTLN(\"TCP connection disconnected\");\n");
        fn_text.push_str("      break;\n");
        fn_text.push_str("  }\n");
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn name(&self) -> &str {
        "Wi-Fi"
    }
}
