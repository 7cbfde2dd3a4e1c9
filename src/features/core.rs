//! Core Firmata features.
//!
//! Core features are implemented by the ConfigurableFirmata library itself.
//! They cover board-level capabilities such as digital and analog I/O and I2C
//! as well as wrappers for stock Arduino libraries such as Servo.
//!
//! OneWire and Stepper are kept here for legacy reasons; they wrap libraries
//! that do not ship with the Arduino distribution and would ideally live in
//! the contributed table instead.

use super::{Dependency, FeatureDescriptor, NO_DEPS};

pub(super) const CORE_FEATURES: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        id: "DigitalInputFirmata",
        class_name: "DigitalInputFirmata",
        instance_name: "digitalInput",
        description: "Read digital input pins",
        reporting: false,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "DigitalOutputFirmata",
        class_name: "DigitalOutputFirmata",
        instance_name: "digitalOutput",
        description: "Write to digital output pins",
        reporting: false,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "AnalogInputFirmata",
        class_name: "AnalogInputFirmata",
        instance_name: "analogInput",
        description: "Read analog input pins",
        reporting: true,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "AnalogOutputFirmata",
        class_name: "AnalogOutputFirmata",
        instance_name: "analogOutput",
        description: "Write to analog output (PWM) pins",
        reporting: false,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "ServoFirmata",
        class_name: "ServoFirmata",
        instance_name: "servo",
        description: "Control servo motors",
        reporting: false,
        update: false,
        dependencies: &[Dependency {
            library: "Servo",
            url: None,
            version: None,
        }],
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "I2CFirmata",
        class_name: "I2CFirmata",
        instance_name: "i2c",
        description: "Interface with I2C devices",
        reporting: true,
        update: false,
        dependencies: &[Dependency {
            library: "Wire",
            url: None,
            version: None,
        }],
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "OneWireFirmata",
        class_name: "OneWireFirmata",
        instance_name: "oneWire",
        description: "Interface with OneWire devices",
        reporting: false,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "StepperFirmata",
        class_name: "StepperFirmata",
        instance_name: "stepper",
        description: "Control stepper motor drivers (2 and 4 wire H-bridge and step + direction style drivers such as EasyDriver)",
        reporting: false,
        update: true,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
    FeatureDescriptor {
        id: "FirmataScheduler",
        class_name: "FirmataScheduler",
        instance_name: "scheduler",
        description: "A task scheduler for Firmata",
        reporting: false,
        update: false,
        dependencies: NO_DEPS,
        url: None,
        version: None,
    },
];
