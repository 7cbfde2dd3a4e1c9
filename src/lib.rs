//! firmata-forge: generate ConfigurableFirmata Arduino sketches from a
//! declarative transport and feature selection.
//!
//! A build request names a communication transport (serial, Ethernet, Wi-Fi
//! or BLE) and an ordered set of protocol features (digital I/O, analog I/O,
//! servo, I2C, ...). The builder validates the request, resolves feature
//! metadata through the registry, and assembles the complete `.ino` sketch
//! text — the caller decides where to write it.
//!
//! # Quick Start
//!
//! ```
//! use firmata_forge::{builder, RequestLoader};
//!
//! # fn main() -> firmata_forge::Result<()> {
//! let request = RequestLoader::from_toml_str(
//!     r#"
//!     sketch_name = "MyFirmata"
//!     selected_features = ["DigitalInputFirmata", "AnalogInputFirmata"]
//!
//!     [connection.serial]
//!     baud = 57600
//!     "#,
//! )?;
//!
//! let sketch = builder().build(&request)?;
//! assert!(sketch.contains("void setup()"));
//! # Ok(())
//! # }
//! ```
//!
//! # Request files
//!
//! Requests are TOML (or JSON, the shape a web form posts). A network
//! transport carries its own parameters:
//!
//! ```toml
//! sketch_name = "GarageFirmata"
//! selected_features = ["DigitalOutputFirmata", "I2CFirmata"]
//!
//! [connection.ethernet]
//! controller = "Arduino Ethernet Shield"
//! remote_ip = "192.168.0.1"
//! remote_port = 3030
//! mac = "90:A2:DA:0D:07:02"
//! ```
//!
//! # Architecture
//!
//! The pipeline is built around two extension points:
//!
//! - [`Transport`](transport::Transport): everything that varies by
//!   communication medium — configuration declarations, pin reservation,
//!   connection establishment and per-iteration maintenance hooks. One
//!   implementation per medium; the builder only sees the trait.
//! - [`FeatureRegistry`](features::FeatureRegistry): metadata-driven feature
//!   composition. New features are added by inserting a descriptor into the
//!   core or contributed table; the builder needs no change unless a feature
//!   requires a cross-feature special case.
//!
//! Each [`SketchBuilder::build`](core::SketchBuilder::build) call is
//! independent: all scratch state (resolved features, dependency dedup,
//! transport instance) is per call, so concurrent builds over the shared
//! read-only registry are safe.

pub mod config;
pub mod core;
pub mod features;
pub mod transport;
pub mod util;

// Re-export commonly used types
pub use crate::core::{Error, Result, SketchBuilder};
pub use config::{BuildRequest, ConnectionConfig, RequestLoader};
pub use features::{FeatureDescriptor, FeatureRegistry};

/// Create a new sketch builder over the built-in feature registry.
///
/// This is the main entry point for the fluent API.
///
/// # Example
///
/// ```
/// use firmata_forge::{builder, RequestLoader};
///
/// # fn main() -> firmata_forge::Result<()> {
/// let request = RequestLoader::from_json_str(
///     r#"{
///         "connection": { "serial": { "baud": 57600 } },
///         "selected_features": ["DigitalInputFirmata"]
///     }"#,
/// )?;
/// let sketch = builder().build(&request)?;
/// assert!(sketch.contains("Firmata.begin(57600);"));
/// # Ok(())
/// # }
/// ```
pub fn builder() -> SketchBuilder<'static> {
    SketchBuilder::new()
}
