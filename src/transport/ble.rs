use super::Transport;
use crate::config::{BleConfig, non_empty};
use crate::core::error::{Error, Result};
use serde::Deserialize;

/// Smallest connection interval the protocol allows: 7.5 ms / 1.25.
const MIN_CONNECTION_INTERVAL: u32 = 6;

/// Maximum interval used when none is given: 30 ms / 1.25.
const DEFAULT_MAX_INTERVAL: u32 = 24;

/// Advertised name used when the request does not supply one.
const DEFAULT_LOCAL_NAME: &str = "FIRMATA";

/// BLE boards the generator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BleController {
    /// Arduino 101 (CurieBLE driver).
    #[serde(rename = "ARDUINO_101", alias = "Arduino 101")]
    Arduino101,

    /// RedBearLab BLE Nano (BLEPeripheral driver).
    #[serde(rename = "BLE_NANO", alias = "RedBearLab BLE Nano")]
    BleNano,
}

impl BleController {
    /// Resolve a controller name through the alias table.
    pub fn resolve(name: &str) -> Result<Self> {
        serde_plain::from_str(name).map_err(|_| Error::unknown_controller("BLE", name))
    }
}

/// BLE transport. The board advertises as a peripheral and the sketch loop
/// idles until a central connects.
pub struct BleTransport {
    config: BleConfig,
    controller: BleController,
}

impl BleTransport {
    /// Create a BLE transport, resolving the configured controller.
    pub fn new(config: BleConfig) -> Result<Self> {
        let controller = BleController::resolve(&config.controller)?;
        Ok(Self { config, controller })
    }

    /// The resolved controller class.
    pub fn controller(&self) -> BleController {
        self.controller
    }

    /// Connection interval bounds, clamped into the range the protocol
    /// accepts. The minimum is raised to 6; the maximum falls back to 24
    /// when unset or below the minimum. Fractional inputs are floored since
    /// the firmware macros must be integers.
    fn intervals(&self) -> (u32, u32) {
        let min = match self.config.min_interval {
            Some(value) if value >= MIN_CONNECTION_INTERVAL as f64 => value.floor() as u32,
            _ => MIN_CONNECTION_INTERVAL,
        };
        let max = match self.config.max_interval {
            Some(value) if value >= min as f64 => value.floor() as u32,
            _ => DEFAULT_MAX_INTERVAL,
        };
        (min, max)
    }

    fn local_name(&self) -> &str {
        non_empty(&self.config.local_name).unwrap_or(DEFAULT_LOCAL_NAME)
    }
}

impl Transport for BleTransport {
    fn config_block(&self) -> Result<String> {
        let mut config = String::new();

        config.push_str("// Uncomment to enable debugging over Serial (9600 baud).\n");
        config.push_str("//#define SERIAL_DEBUG\n");
        config.push_str("#include \"utility/firmataDebug.h\"\n\n");

        match self.controller {
            BleController::Arduino101 => {
                config.push_str("#include <CurieBLE.h>\n");
            }
            BleController::BleNano => {
                config.push_str("// BLE Nano support requires patching the RedBearLab nRF51822-Arduino\n");
                config.push_str("// core library. See steps 1 - 3 in this gist for instructions:\n");
                config.push_str("// https://gist.github.com/soundanalogous/d39bb3eb36333a0906df\n");
                config.push_str("#include <BLEPeripheral.h>\n");
            }
        }

        config.push_str("#include \"utility/BLEStream.h\"\n\n");

        let (min_interval, max_interval) = self.intervals();
        config.push_str("// Specify min and max as time in ms / 1.25. The result must be an integer.\n");
        config.push_str("// For example 7.5ms = 7.5 / 1.25 = 6.\n");
        config.push_str("// Min interval cannot be < 6 (7.5ms / 1.25)\n");
        config.push_str(&format!(
            "#define FIRMATA_BLE_MIN_INTERVAL {min_interval} // interval = time in ms / 1.25\n"
        ));
        config.push_str(&format!(
            "#define FIRMATA_BLE_MAX_INTERVAL {max_interval} // interval = time in ms / 1.25\n\n"
        ));

        config.push_str("// Change this to a unique name per board if running this sketch\n");
        config.push_str("// on multiple boards within the same physical space.\n");
        config.push_str(&format!(
            "#define FIRMATA_BLE_LOCAL_NAME \"{}\"\n\n",
            self.local_name()
        ));

        config.push_str("BLEStream stream;\n\n");

        Ok(config)
    }

    fn init_transport_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void initTransport()\n");
        fn_text.push_str("{\n");

        fn_text.push_str("  // IMPORTANT: if SERIAL_DEBUG is enabled, program execution will stop\n");
        fn_text.push_str("  // at DEBUG_BEGIN until a Serial connection is established.\n");
        fn_text.push_str("  DEBUG_BEGIN(9600);\n\n");

        fn_text.push_str("  stream.setLocalName(FIRMATA_BLE_LOCAL_NAME);\n");
        // the connection interval is the fastest rate inputs can be read at
        fn_text.push_str(
            "  stream.setConnectionInterval(FIRMATA_BLE_MIN_INTERVAL, FIRMATA_BLE_MAX_INTERVAL);\n",
        );
        fn_text.push_str("  // Set how often the BLE TX buffer is flushed (if not full).\n");
        fn_text.push_str("  stream.setFlushInterval(FIRMATA_BLE_MAX_INTERVAL);\n\n");

        fn_text.push_str("  stream.begin();\n");
        fn_text.push_str("  Firmata.begin(stream);\n");
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn loop_begin_block(&self) -> String {
        let mut text = String::new();
        text.push_str("  // stream.poll() will send the TX buffer at the specified flush interval or when\n");
        text.push_str("  // the buffer is full. It will return false if no BLE connection is established.\n");
        text.push_str("  if (!stream.poll()) return;\n\n");
        text
    }

    fn name(&self) -> &str {
        "BLE"
    }
}
