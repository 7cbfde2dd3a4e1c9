use crate::features::FeatureDescriptor;
use crate::transport::Transport;
use chrono::{DateTime, Local};

/// Per-build flags for the features the assembly special-cases.
///
/// These are the fixed cross-feature rules that registry metadata alone
/// cannot express (pin reset modes, input polling, the servo companion, the
/// scheduler loop rewrite). One instance per build; concurrent builds never
/// share them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFlags {
    /// AnalogInputFirmata selected.
    pub analog_input: bool,

    /// AnalogOutputFirmata selected.
    pub analog_output: bool,

    /// DigitalInputFirmata selected.
    pub digital_input: bool,

    /// DigitalOutputFirmata selected.
    pub digital_output: bool,

    /// ServoFirmata selected.
    pub servo: bool,

    /// FirmataScheduler selected.
    pub scheduler: bool,
}

impl FeatureFlags {
    /// Record one selected feature id. New features should not be added here;
    /// anything expressible through registry metadata stays out of this list.
    pub(crate) fn note(&mut self, id: &str) {
        match id {
            "AnalogInputFirmata" => self.analog_input = true,
            "AnalogOutputFirmata" => self.analog_output = true,
            "DigitalInputFirmata" => self.digital_input = true,
            "DigitalOutputFirmata" => self.digital_output = true,
            "ServoFirmata" => self.servo = true,
            "FirmataScheduler" => self.scheduler = true,
            _ => {}
        }
    }

    /// Servo drives PWM through the analog-output handler, so selecting servo
    /// without analog output pulls the companion in.
    pub fn needs_analog_output_companion(&self) -> bool {
        self.servo && !self.analog_output
    }

    /// Whether any selected feature writes analog output.
    pub fn writes_analog_output(&self) -> bool {
        self.analog_output || self.servo
    }
}

/// Scratch state for one build: the resolved request plus derived feature
/// sets. Constructed once per `build` call and dropped with it.
pub struct BuildContext<'a> {
    /// Sketch (and output file) name.
    pub sketch_name: &'a str,

    /// Timestamp stamped into the generated header.
    pub generated_at: DateTime<Local>,

    /// Transport matching the request's connection.
    pub transport: Box<dyn Transport>,

    /// Resolved features in selection order.
    pub features: Vec<&'a FeatureDescriptor>,

    /// Features with periodic reporting, in selection order.
    pub reporting_features: Vec<&'a FeatureDescriptor>,

    /// Features needing a per-iteration update call, in selection order.
    pub updating_features: Vec<&'a FeatureDescriptor>,

    /// Special-cased feature flags.
    pub flags: FeatureFlags,
}

impl BuildContext<'_> {
    /// Whether the periodic reporting helper is needed.
    pub fn reporting_enabled(&self) -> bool {
        !self.reporting_features.is_empty()
    }

    /// Whether any feature needs a per-iteration update call.
    pub fn update_enabled(&self) -> bool {
        !self.updating_features.is_empty()
    }
}
