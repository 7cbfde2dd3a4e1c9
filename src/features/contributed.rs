//! Contributed Firmata features.
//!
//! Contributed features typically wrap 3rd party libraries and are hosted
//! outside the main ConfigurableFirmata repository. Entries here override
//! core entries with the same id.

use super::{Dependency, FeatureDescriptor};

pub(super) const CONTRIBUTED_FEATURES: &[FeatureDescriptor] = &[FeatureDescriptor {
    id: "FirmataEncoder",
    class_name: "FirmataEncoder",
    instance_name: "encoder",
    description: "Adds support for rotary encoders and other position sensors.",
    reporting: true,
    update: false,
    dependencies: &[Dependency {
        library: "Encoder",
        url: Some("https://www.pjrc.com/teensy/td_libs_Encoder.html"),
        version: Some("1.2"),
    }],
    url: Some("https://github.com/firmata/FirmataEncoder"),
    version: Some("0.1.0"),
}];
