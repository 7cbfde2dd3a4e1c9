use crate::config::BuildRequest;
use crate::core::context::{BuildContext, FeatureFlags};
use crate::core::error::{Error, Result};
use crate::features::FeatureRegistry;
use crate::transport;
use chrono::{DateTime, Local};
use std::collections::HashSet;

/// Builder assembling a ConfigurableFirmata sketch from a build request.
///
/// The builder itself is stateless across calls; every `build` resolves its
/// own transport and feature sets, so one builder can serve concurrent
/// requests. With a pinned [`generated_at`](SketchBuilder::generated_at)
/// timestamp, `build` is a pure function of its input.
pub struct SketchBuilder<'r> {
    registry: &'r FeatureRegistry,
    generated_at: Option<DateTime<Local>>,
}

impl SketchBuilder<'static> {
    /// Create a builder over the built-in feature registry.
    pub fn new() -> Self {
        Self {
            registry: FeatureRegistry::builtin(),
            generated_at: None,
        }
    }
}

impl<'r> SketchBuilder<'r> {
    /// Create a builder over a custom feature registry.
    pub fn with_registry(registry: &'r FeatureRegistry) -> Self {
        Self {
            registry,
            generated_at: None,
        }
    }

    /// Pin the header timestamp instead of using the current time.
    pub fn generated_at(mut self, timestamp: DateTime<Local>) -> Self {
        self.generated_at = Some(timestamp);
        self
    }

    /// Generate the sketch text for a request.
    ///
    /// Fails without producing any partial output; see the crate error
    /// taxonomy for the conditions.
    pub fn build(&self, request: &BuildRequest) -> Result<String> {
        if request.selected_features.is_empty() {
            return Err(Error::NoFeaturesSelected);
        }

        let mut features = Vec::with_capacity(request.selected_features.len());
        let mut reporting_features = Vec::new();
        let mut updating_features = Vec::new();
        let mut flags = FeatureFlags::default();

        for id in &request.selected_features {
            let feature = self.registry.lookup(id)?;
            flags.note(feature.id);
            if feature.reporting {
                reporting_features.push(feature);
            }
            if feature.update {
                updating_features.push(feature);
            }
            features.push(feature);
        }

        let ctx = BuildContext {
            sketch_name: request.sketch_name(),
            generated_at: self.generated_at.unwrap_or_else(Local::now),
            transport: transport::from_connection(&request.connection)?,
            features,
            reporting_features,
            updating_features,
            flags,
        };

        let mut sketch = String::new();
        sketch.push_str(&header(&ctx));
        sketch.push_str(&includes(&ctx)?);
        sketch.push_str(&post_dependencies(&ctx));
        sketch.push_str(&system_reset_fn(&ctx));
        sketch.push_str(&init_functions(&ctx));
        sketch.push_str(&loop_fn(&ctx));
        Ok(sketch)
    }
}

impl Default for SketchBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

/// Header comment naming the sketch and the generation time.
fn header(ctx: &BuildContext) -> String {
    format!(
        "/*\n * {}.ino generated by firmata-forge\n * {}\n */\n\n",
        ctx.sketch_name,
        ctx.generated_at.format("%a %b %d %Y %H:%M:%S")
    )
}

/// The block of includes, macros and instance declarations at the top of the
/// sketch: base library, transport configuration, then each feature with its
/// 3rd party dependencies, the servo companion when needed, and the
/// extension registry last.
fn includes(ctx: &BuildContext) -> Result<String> {
    let mut includes = String::from("#include <ConfigurableFirmata.h>\n\n");

    includes.push_str(&ctx.transport.config_block()?);

    // A dependency shared by several features is included once, at the first
    // selection that needs it.
    let mut emitted = HashSet::new();
    for feature in &ctx.features {
        for dependency in feature.dependencies {
            if emitted.insert(dependency.library) {
                includes.push_str(&format!("#include <{}.h>\n", dependency.library));
            }
        }

        includes.push_str(&format!("#include <{}.h>\n", feature.class_name));
        includes.push_str(&format!(
            "{} {};\n\n",
            feature.class_name, feature.instance_name
        ));
    }

    // necessary until Servo can be decoupled from analog output
    if ctx.flags.needs_analog_output_companion() {
        includes.push_str("#include <AnalogOutputFirmata.h>\n");
        includes.push_str("AnalogOutputFirmata analogOutput;\n\n");
    }

    // always include FirmataExt
    includes.push_str("#include <FirmataExt.h>\n");
    includes.push_str("FirmataExt firmataExt;\n\n");

    Ok(includes)
}

/// Helpers that must come after the initial set of includes.
fn post_dependencies(ctx: &BuildContext) -> String {
    let mut includes = String::new();
    if ctx.flags.writes_analog_output() {
        includes.push_str("#include <AnalogWrite.h>\n\n");
    }
    if ctx.reporting_enabled() {
        includes.push_str("#include <FirmataReporting.h>\n");
        includes.push_str("FirmataReporting reporting;\n\n");
    }
    includes
}

/// The system reset callback restoring every pin to its initial mode.
fn system_reset_fn(ctx: &BuildContext) -> String {
    let mut fn_text = String::new();
    fn_text.push_str("void systemResetCallback()\n");
    fn_text.push_str("{\n");
    fn_text.push_str("  for (byte i = 0; i < TOTAL_PINS; i++) {\n");
    fn_text.push_str("    if (IS_PIN_ANALOG(i)) {\n");

    if ctx.flags.analog_input {
        fn_text.push_str("      Firmata.setPinMode(i, ANALOG);\n");
    }

    fn_text.push_str("    } else if (IS_PIN_DIGITAL(i)) {\n");

    if ctx.flags.digital_output {
        fn_text.push_str("      Firmata.setPinMode(i, OUTPUT);\n");
    }

    fn_text.push_str("    }\n");
    fn_text.push_str("  }\n");

    fn_text.push_str("  firmataExt.reset();\n");
    fn_text.push_str("}\n\n");
    fn_text
}

/// Support and initialization functions: the transport's callbacks and
/// `initTransport()`, then `initFirmata()` and `setup()`.
fn init_functions(ctx: &BuildContext) -> String {
    let mut text = String::new();
    text.push_str(&ctx.transport.host_connection_fn());
    text.push_str(&ctx.transport.debug_status_fn());
    text.push_str(&ctx.transport.ignore_pins_fn());
    text.push_str(&ctx.transport.init_transport_fn());
    text.push_str(&init_firmata_fn(ctx));
    text.push_str(&setup_fn(ctx));
    text
}

/// `initFirmata()`: firmware version, feature registration, reset hookup.
fn init_firmata_fn(ctx: &BuildContext) -> String {
    let mut fn_text = String::new();
    fn_text.push_str("void initFirmata()\n");
    fn_text.push_str("{\n");
    fn_text.push_str("  Firmata.setFirmwareVersion(FIRMWARE_MAJOR_VERSION, FIRMWARE_MINOR_VERSION);\n\n");

    for feature in &ctx.features {
        fn_text.push_str(&format!(
            "  firmataExt.addFeature({});\n",
            feature.instance_name
        ));
    }

    if ctx.flags.needs_analog_output_companion() {
        fn_text.push_str("  firmataExt.addFeature(analogOutput);\n");
    }

    if ctx.reporting_enabled() {
        fn_text.push_str("  firmataExt.addFeature(reporting);\n");
    }

    fn_text.push('\n');
    fn_text.push_str("  Firmata.attach(SYSTEM_RESET, systemResetCallback);\n");
    fn_text.push_str("}\n\n");
    fn_text
}

/// The Arduino `setup()` function.
fn setup_fn(_ctx: &BuildContext) -> String {
    let mut fn_text = String::new();
    fn_text.push_str("void setup()\n");
    fn_text.push_str("{\n");
    fn_text.push_str("  initFirmata();\n\n");
    fn_text.push_str("  initTransport();\n\n");
    // apply the initial pin configuration
    fn_text.push_str("  Firmata.parse(SYSTEM_RESET);\n");
    fn_text.push_str("}\n\n");
    fn_text
}

/// The Arduino `loop()` function: transport begin hook, input polling and
/// drain, scheduler pass, reporting, updates, transport end hook.
fn loop_fn(ctx: &BuildContext) -> String {
    let mut fn_text = String::new();
    fn_text.push_str("void loop()\n");
    fn_text.push_str("{\n");

    fn_text.push_str(&ctx.transport.loop_begin_block());

    if ctx.flags.digital_input {
        fn_text.push_str("  digitalInput.report();\n\n");
    }

    fn_text.push_str("  while (Firmata.available()) {\n");
    fn_text.push_str("    Firmata.processInput();\n");
    fn_text.push_str("  }\n");

    if ctx.flags.scheduler {
        // run queued tasks only once the parser is idle between messages
        fn_text.push_str("  if (!Firmata.isParsingMessage()) {\n");
        fn_text.push_str("    scheduler.runTasks();\n");
        fn_text.push_str("  }\n");
    }
    fn_text.push('\n');

    if ctx.reporting_enabled() {
        fn_text.push_str("  if (reporting.elapsed()) {\n");
        for feature in &ctx.reporting_features {
            fn_text.push_str(&format!("    {}.report();\n", feature.instance_name));
        }
        fn_text.push_str("  }\n");
    }

    if ctx.update_enabled() {
        fn_text.push('\n');
        for feature in &ctx.updating_features {
            fn_text.push_str(&format!("  {}.update();\n", feature.instance_name));
        }
    }

    fn_text.push_str(&ctx.transport.loop_end_block());

    fn_text.push_str("}\n");
    fn_text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BleConfig, ConnectionConfig, EthernetConfig, SerialConfig, WifiConfig, WifiSecurity,
        WpaSecurity,
    };
    use crate::features::{FeatureDescriptor, FeatureRegistry};

    fn serial_request(features: &[&str]) -> BuildRequest {
        BuildRequest {
            sketch_name: "TestFirmata".to_string(),
            connection: ConnectionConfig::Serial(SerialConfig { baud: 57600 }),
            selected_features: features.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ethernet_request(features: &[&str]) -> BuildRequest {
        BuildRequest {
            sketch_name: "TestFirmata".to_string(),
            connection: ConnectionConfig::Ethernet(EthernetConfig {
                controller: "WIZ5100".to_string(),
                remote_ip: Some("192.168.0.1".to_string()),
                remote_host: Some(String::new()),
                remote_port: Some(3030),
                mac: Some("90:A2:DA:0D:07:02".to_string()),
                local_ip: Some(String::new()),
            }),
            selected_features: features.iter().map(|s| s.to_string()).collect(),
        }
    }

    const FULL_SELECTION: &[&str] = &[
        "DigitalInputFirmata",
        "DigitalOutputFirmata",
        "AnalogInputFirmata",
        "AnalogOutputFirmata",
        "ServoFirmata",
        "I2CFirmata",
    ];

    #[test]
    fn test_no_features_selected_rejected() {
        let err = SketchBuilder::new()
            .build(&serial_request(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::NoFeaturesSelected));
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let err = SketchBuilder::new()
            .build(&serial_request(&["BogusFirmata"]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFeature(_)));
    }

    #[test]
    fn test_default_sketch_name_and_connection() {
        let request = BuildRequest {
            sketch_name: String::new(),
            connection: ConnectionConfig::default(),
            selected_features: vec!["DigitalInputFirmata".to_string()],
        };
        let text = SketchBuilder::new().build(&request).unwrap();
        assert!(text.contains("ConfiguredFirmata.ino"));
        assert!(text.contains("Firmata.begin(57600);"));
    }

    #[test]
    fn test_all_selected_features_included_and_instantiated() {
        let text = SketchBuilder::new()
            .build(&serial_request(FULL_SELECTION))
            .unwrap();
        for id in FULL_SELECTION {
            let feature = FeatureRegistry::builtin().lookup(id).unwrap();
            assert!(text.contains(&format!("#include <{}.h>", feature.class_name)));
            assert!(text.contains(&format!(
                "{} {};",
                feature.class_name, feature.instance_name
            )));
            assert!(text.contains(&format!(
                "firmataExt.addFeature({});",
                feature.instance_name
            )));
        }
    }

    #[test]
    fn test_sketch_structure() {
        let text = SketchBuilder::new()
            .build(&serial_request(FULL_SELECTION))
            .unwrap();
        assert!(text.contains("#include <ConfigurableFirmata.h>"));
        assert!(text.contains("#include <Servo.h>"));
        assert!(text.contains("#include <Wire.h>"));
        assert!(text.contains("#include <FirmataExt.h>"));
        assert!(text.contains("void systemResetCallback()"));
        assert!(text.contains("void initTransport()"));
        assert!(text.contains("void initFirmata()"));
        assert!(text.contains("void setup()"));
        assert!(text.contains("void loop()"));
        assert!(text.contains("Firmata.parse(SYSTEM_RESET);"));
    }

    #[test]
    fn test_shared_dependency_included_once() {
        const TABLE: &[FeatureDescriptor] = &[
            FeatureDescriptor {
                id: "MotorFirmata",
                class_name: "MotorFirmata",
                instance_name: "motor",
                description: "fake motor feature",
                reporting: false,
                update: false,
                dependencies: &[crate::features::Dependency {
                    library: "Servo",
                    url: None,
                    version: None,
                }],
                url: None,
                version: None,
            },
            FeatureDescriptor {
                id: "ArmFirmata",
                class_name: "ArmFirmata",
                instance_name: "arm",
                description: "fake arm feature",
                reporting: false,
                update: false,
                dependencies: &[crate::features::Dependency {
                    library: "Servo",
                    url: None,
                    version: None,
                }],
                url: None,
                version: None,
            },
        ];
        let registry = FeatureRegistry::from_tables(&[TABLE]);
        let text = SketchBuilder::with_registry(&registry)
            .build(&serial_request(&["MotorFirmata", "ArmFirmata"]))
            .unwrap();
        assert_eq!(text.matches("#include <Servo.h>").count(), 1);
    }

    #[test]
    fn test_reporting_features_reported_in_selection_order() {
        let text = SketchBuilder::new()
            .build(&serial_request(&[
                "I2CFirmata",
                "DigitalOutputFirmata",
                "AnalogInputFirmata",
            ]))
            .unwrap();
        assert!(text.contains("if (reporting.elapsed()) {"));
        assert_eq!(text.matches(".report();").count(), 2);
        let i2c = text.find("i2c.report();").unwrap();
        let analog = text.find("analogInput.report();").unwrap();
        assert!(i2c < analog, "selection order must be preserved");
    }

    #[test]
    fn test_no_reporting_helper_without_reporting_features() {
        let text = SketchBuilder::new()
            .build(&serial_request(&[
                "DigitalInputFirmata",
                "DigitalOutputFirmata",
            ]))
            .unwrap();
        assert!(!text.contains("FirmataReporting"));
        // digitalInput.report() polls inputs each iteration; the periodic
        // reporting block must not appear
        assert!(!text.contains("reporting.elapsed()"));
    }

    #[test]
    fn test_update_features_updated_in_loop() {
        let text = SketchBuilder::new()
            .build(&serial_request(&["DigitalInputFirmata", "StepperFirmata"]))
            .unwrap();
        assert!(text.contains("stepper.update();"));
    }

    #[test]
    fn test_servo_synthesizes_analog_output_companion_once() {
        let text = SketchBuilder::new()
            .build(&serial_request(&["DigitalInputFirmata", "ServoFirmata"]))
            .unwrap();
        assert_eq!(text.matches("AnalogOutputFirmata analogOutput;").count(), 1);
        assert_eq!(
            text.matches("firmataExt.addFeature(analogOutput);").count(),
            1
        );
        assert!(text.contains("#include <AnalogWrite.h>"));
    }

    #[test]
    fn test_no_companion_when_analog_output_selected() {
        let text = SketchBuilder::new()
            .build(&serial_request(&["ServoFirmata", "AnalogOutputFirmata"]))
            .unwrap();
        // only the user's own instance declaration, no synthesized duplicate
        assert_eq!(text.matches("AnalogOutputFirmata analogOutput;").count(), 1);
        assert_eq!(
            text.matches("firmataExt.addFeature(analogOutput);").count(),
            1
        );
    }

    #[test]
    fn test_reset_callback_pin_modes_follow_selection() {
        let text = SketchBuilder::new()
            .build(&serial_request(&[
                "AnalogInputFirmata",
                "DigitalOutputFirmata",
            ]))
            .unwrap();
        assert!(text.contains("Firmata.setPinMode(i, ANALOG);"));
        assert!(text.contains("Firmata.setPinMode(i, OUTPUT);"));
        assert!(text.contains("firmataExt.reset();"));

        let text = SketchBuilder::new()
            .build(&serial_request(&["DigitalInputFirmata"]))
            .unwrap();
        assert!(!text.contains("(i, ANALOG)"));
        assert!(!text.contains("(i, OUTPUT)"));
    }

    #[test]
    fn test_scheduler_runs_after_structured_drain() {
        let text = SketchBuilder::new()
            .build(&serial_request(&["DigitalInputFirmata", "FirmataScheduler"]))
            .unwrap();
        assert!(text.contains("while (Firmata.available()) {"));
        assert!(text.contains("if (!Firmata.isParsingMessage()) {"));
        assert!(text.contains("scheduler.runTasks();"));
        assert!(!text.contains("goto"));
    }

    #[test]
    fn test_digital_input_polled_at_loop_start() {
        let text = SketchBuilder::new()
            .build(&serial_request(&["DigitalInputFirmata"]))
            .unwrap();
        let loop_start = text.find("void loop()").unwrap();
        assert!(text[loop_start..].contains("digitalInput.report();"));
    }

    #[test]
    fn test_ethernet_build_wires_transport_hooks() {
        let text = SketchBuilder::new()
            .build(&ethernet_request(FULL_SELECTION))
            .unwrap();
        assert!(text.contains("#include <Ethernet.h>"));
        assert!(text.contains("EthernetClientStream stream"));
        assert!(text.contains("IPAddress remoteIp(192, 168, 0, 1);"));
        assert!(!text.contains("#define REMOTE_HOST"));
        assert!(text.contains("void ignorePins()"));
        assert!(text.contains("Ethernet.begin((uint8_t *)mac);"));
        assert!(text.contains("Firmata.begin(stream);"));
        assert!(text.contains("stream.maintain(Ethernet.localIP());"));
    }

    #[test]
    fn test_wifi_build_wires_transport_hooks() {
        let request = BuildRequest {
            sketch_name: "TestFirmata".to_string(),
            connection: ConnectionConfig::Wifi(WifiConfig {
                controller: "WIFI_SHIELD_101".to_string(),
                ssid: Some("your_network_name".to_string()),
                security: WifiSecurity::Wpa(WpaSecurity {
                    passphrase: Some("your_wpa_passphrase".to_string()),
                }),
                network_port: Some(3030),
                local_ip: Some("192.168.0.6".to_string()),
                ..Default::default()
            }),
            selected_features: FULL_SELECTION.iter().map(|s| s.to_string()).collect(),
        };
        let text = SketchBuilder::new().build(&request).unwrap();
        assert!(text.contains("void hostConnectionCallback(byte state)"));
        assert!(text.contains("void printWiFiStatus()"));
        assert!(text.contains("void ignorePins()"));
        assert!(text.contains("stream.maintain();"));
    }

    #[test]
    fn test_ble_build_early_returns_from_loop() {
        let request = BuildRequest {
            sketch_name: "TestFirmata".to_string(),
            connection: ConnectionConfig::Ble(BleConfig {
                controller: "ARDUINO_101".to_string(),
                min_interval: Some(6.0),
                max_interval: Some(24.0),
                local_name: Some("FIRMATA".to_string()),
            }),
            selected_features: vec!["DigitalInputFirmata".to_string()],
        };
        let text = SketchBuilder::new().build(&request).unwrap();
        let loop_start = text.find("void loop()").unwrap();
        let poll = text[loop_start..].find("if (!stream.poll()) return;").unwrap();
        let report = text[loop_start..].find("digitalInput.report();").unwrap();
        assert!(poll < report, "poll gate must come first in the loop");
    }

    #[test]
    fn test_build_is_deterministic_with_pinned_timestamp() {
        use chrono::TimeZone;
        let timestamp = Local.with_ymd_and_hms(2016, 4, 15, 12, 30, 0).unwrap();
        let request = ethernet_request(FULL_SELECTION);
        let first = SketchBuilder::new()
            .generated_at(timestamp)
            .build(&request)
            .unwrap();
        let second = SketchBuilder::new()
            .generated_at(timestamp)
            .build(&request)
            .unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Fri Apr 15 2016 12:30:00"));
    }

    #[test]
    fn test_transport_error_propagates_without_output() {
        let mut request = ethernet_request(FULL_SELECTION);
        if let ConnectionConfig::Ethernet(ref mut ethernet) = request.connection {
            ethernet.remote_ip = None;
            ethernet.remote_host = None;
        }
        let err = SketchBuilder::new().build(&request).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField(_)));
    }
}
