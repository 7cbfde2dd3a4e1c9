/// Result type alias for firmata-forge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for firmata-forge.
///
/// Every variant is fatal to the build it occurred in; nothing is retried and
/// no partial sketch text is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No build request was provided to the loader.
    #[error("No build request provided")]
    MissingRequest,

    /// The request selected no features.
    #[error("Must specify at least one selected feature")]
    NoFeaturesSelected,

    /// A selected feature id is absent from the registry.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// A transport controller name did not resolve through its alias table.
    #[error("No valid {transport} controller defined: {name:?}")]
    UnknownController { transport: String, name: String },

    /// A medium-specific required field is absent.
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// An IP or MAC string failed validation.
    #[error("Invalid address format for {field}: {value:?}")]
    InvalidAddressFormat { field: String, value: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unknown feature error.
    pub fn unknown_feature(id: impl Into<String>) -> Self {
        Error::UnknownFeature(id.into())
    }

    /// Create an unknown controller error.
    pub fn unknown_controller(transport: impl Into<String>, name: impl Into<String>) -> Self {
        Error::UnknownController {
            transport: transport.into(),
            name: name.into(),
        }
    }

    /// Create a missing required field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingRequiredField(field.into())
    }

    /// Create an invalid address format error.
    pub fn invalid_address(field: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidAddressFormat {
            field: field.into(),
            value: value.into(),
        }
    }
}
