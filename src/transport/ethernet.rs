use super::Transport;
use crate::config::{EthernetConfig, non_empty};
use crate::core::error::{Error, Result};
use crate::util::net;
use log::warn;
use serde::Deserialize;

/// MAC substituted when the request does not supply one.
const DEFAULT_MAC: &str = "DE:AA:BB:CC:DD:01";

/// Ethernet chip and board classes the generator can drive.
///
/// Several historical shield and board names are synonyms for the WIZ5100
/// class; the alias table resolves the user's free-text controller name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EthernetController {
    /// Wiznet W5100 class chips (stock Ethernet library over SPI).
    #[serde(
        rename = "WIZ5100",
        alias = "Arduino Ethernet Shield",
        alias = "Arduino Ethernet Board",
        alias = "DFRobot X-Board V2",
        alias = "Ethernet Shield W5100"
    )]
    Wiz5100,

    /// ENC28J60 chips (UIPEthernet library over SPI).
    #[serde(rename = "ENC28J60")]
    Enc28j60,

    /// Arduino Yun (Bridge to the onboard Linux side, no SPI pins used).
    #[serde(rename = "Arduino Yun", alias = "YUN")]
    Yun,
}

impl EthernetController {
    /// Resolve a controller name through the alias table.
    pub fn resolve(name: &str) -> Result<Self> {
        serde_plain::from_str(name).map_err(|_| Error::unknown_controller("Ethernet", name))
    }
}

/// Ethernet transport. Currently configurable as client only.
pub struct EthernetTransport {
    config: EthernetConfig,
    controller: EthernetController,
}

impl EthernetTransport {
    /// Create an Ethernet transport, resolving the configured controller.
    pub fn new(config: EthernetConfig) -> Result<Self> {
        let controller = EthernetController::resolve(&config.controller)?;
        Ok(Self { config, controller })
    }

    /// The resolved controller class.
    pub fn controller(&self) -> EthernetController {
        self.controller
    }

    fn is_yun(&self) -> bool {
        self.controller == EthernetController::Yun
    }

    /// Static local IP, when configured and meaningful for this controller.
    /// The Yun gets its address from the Linux side, so the field is ignored
    /// there.
    fn local_ip(&self) -> Option<&str> {
        non_empty(&self.config.local_ip).filter(|_| !self.is_yun())
    }
}

impl Transport for EthernetTransport {
    fn config_block(&self) -> Result<String> {
        let mut config = String::new();

        match self.controller {
            EthernetController::Wiz5100 => {
                config.push_str("#include <SPI.h>\n");
                config.push_str("#include <Ethernet.h>\n");
            }
            EthernetController::Enc28j60 => {
                config.push_str("#include <UIPEthernet.h>\n");
            }
            EthernetController::Yun => {
                config.push_str("#include <Bridge.h>\n");
                config.push_str("#include <YunClient.h>\n");
            }
        }

        let remote_ip = non_empty(&self.config.remote_ip);
        let remote_host = non_empty(&self.config.remote_host);
        if remote_ip.is_none() && remote_host.is_none() {
            return Err(Error::missing_field("remote_ip or remote_host"));
        }

        config.push_str("#include <EthernetClientStream.h>\n\n");

        if self.is_yun() {
            config.push_str("YunClient client;\n\n");
        } else {
            config.push_str("EthernetClient client;\n\n");
        }

        match non_empty(&self.config.mac).filter(|_| !self.is_yun()) {
            Some(mac) => {
                if !net::is_valid_mac(mac) {
                    return Err(Error::invalid_address("mac", mac));
                }
                config.push_str(&format!(
                    "const byte mac[] = {{{}}};\n",
                    net::mac_byte_list(mac)
                ));
            }
            None => {
                warn!(
                    "Using default MAC address {DEFAULT_MAC}. If this is not unique on your \
                     network you may experience issues; supply a MAC in the request if so."
                );
                config.push_str("const byte mac[] = {0xDE, 0xAA, 0xBB, 0xCC, 0xDD, 0x01};\n");
            }
        }

        let remote_port = self
            .config
            .remote_port
            .ok_or_else(|| Error::missing_field("remote_port"))?;
        config.push_str(&format!("int remotePort = {remote_port};\n"));

        let local_ip = self.local_ip();
        if let Some(ip) = local_ip {
            if !net::is_valid_ipv4(ip) {
                return Err(Error::invalid_address("local_ip", ip));
            }
            config.push_str(&format!("IPAddress localIp({});\n", net::ipv4_octet_list(ip)));
        }

        if remote_ip.is_some() && remote_host.is_some() {
            warn!("Only remote_ip or remote_host should be specified, not both. remote_ip will be used");
        }

        // remote_ip wins when both are defined
        if let Some(ip) = remote_ip {
            if !net::is_valid_ipv4(ip) {
                return Err(Error::invalid_address("remote_ip", ip));
            }
            config.push_str(&format!(
                "IPAddress remoteIp({});\n",
                net::ipv4_octet_list(ip)
            ));
            if local_ip.is_some() {
                config.push_str("EthernetClientStream stream(client, localIp, remoteIp, NULL, remotePort);\n");
            } else {
                config.push_str(
                    "EthernetClientStream stream(client, IPAddress(0, 0, 0, 0), remoteIp, NULL, remotePort);\n",
                );
            }
        } else if let Some(host) = remote_host {
            config.push_str(&format!("#define REMOTE_HOST \"{host}\"\n"));
            if local_ip.is_some() {
                config.push_str(
                    "EthernetClientStream stream(client, localIp, IPAddress(0, 0, 0, 0), REMOTE_HOST, remotePort);\n",
                );
            } else {
                config.push_str(
                    "EthernetClientStream stream(client, IPAddress(0, 0, 0, 0), IPAddress(0, 0, 0, 0), REMOTE_HOST, remotePort);\n",
                );
            }
        }

        config.push('\n');
        Ok(config)
    }

    fn init_transport_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void initTransport()\n");
        fn_text.push_str("{\n");

        if self.is_yun() {
            fn_text.push_str("  Bridge.begin();\n");
        } else if self.local_ip().is_some() {
            fn_text.push_str("  Ethernet.begin((uint8_t *)mac, localIp);\n");
        } else {
            fn_text.push_str("  Ethernet.begin((uint8_t *)mac);\n");
        }
        fn_text.push('\n');
        // TODO: check whether ENC28J60 needs a settle delay after begin();
        // StandardFirmataEthernet never needed one for the W5100.

        if self.has_ignore_pins() {
            fn_text.push_str("  ignorePins();\n\n");
        }

        fn_text.push_str("  Firmata.begin(stream);\n");
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn has_ignore_pins(&self) -> bool {
        matches!(
            self.controller,
            EthernetController::Wiz5100 | EthernetController::Enc28j60
        )
    }

    fn ignore_pins_fn(&self) -> String {
        if !self.has_ignore_pins() {
            return String::new();
        }
        let mut fn_text = String::new();
        fn_text.push_str("void ignorePins()\n");
        fn_text.push_str("{\n");

        // SD-card on the Ethernet shield uses pin 4 for SS, the shield itself
        // pin 10. On Leonardo (ATmega32U4), pin 24 maps to D4 and 28 to D10.
        fn_text.push_str("  for (byte i = 0; i < TOTAL_PINS; i++) {\n");
        fn_text.push_str("    if (IS_PIN_SPI(i)\n");
        fn_text.push_str("        || 4 == i\n");
        fn_text.push_str("        || 10 == i\n");
        fn_text.push_str("#if defined(__AVR_ATmega32U4__)\n");
        fn_text.push_str("        || 24 == i\n");
        fn_text.push_str("        || 28 == i\n");
        fn_text.push_str("#endif\n");
        fn_text.push_str("      ) {\n");
        fn_text.push_str("      Firmata.setPinMode(i, PIN_MODE_IGNORE);\n");
        fn_text.push_str("    }\n");
        fn_text.push_str("  }\n\n");

        // switch off the SD-card, bypassing Firmata; SS is active low
        fn_text.push_str("  pinMode(PIN_TO_DIGITAL(4), OUTPUT);\n");
        fn_text.push_str("  digitalWrite(PIN_TO_DIGITAL(4), HIGH);\n\n");

        // configure hardware SS as output on MEGA
        fn_text.push_str("#if defined(__AVR_ATmega1280__) || defined(__AVR_ATmega2560__)\n");
        fn_text.push_str("  pinMode(PIN_TO_DIGITAL(53), OUTPUT);\n");
        fn_text.push_str("#endif\n");

        fn_text.push_str("}\n\n");
        fn_text
    }

    fn loop_end_block(&self) -> String {
        let mut text = String::new();
        if self.local_ip().is_none() && !self.is_yun() {
            text.push('\n');
            text.push_str("  if (Ethernet.maintain()) {\n");
            text.push_str("    stream.maintain(Ethernet.localIP());\n");
            text.push_str("  }\n");
        }
        text
    }

    fn name(&self) -> &str {
        "Ethernet"
    }
}
