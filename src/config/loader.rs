use super::BuildRequest;
use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Loader for build request files.
///
/// Requests are TOML by default; files with a `.json` extension parse as
/// JSON, the shape the web form posts.
pub struct RequestLoader {
    request_file: Option<PathBuf>,
}

impl RequestLoader {
    /// Create a new request loader.
    pub fn new() -> Self {
        Self { request_file: None }
    }

    /// Set the request file path.
    pub fn request_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request_file = Some(path.into());
        self
    }

    /// Load the request from the configured source.
    pub fn load(self) -> Result<BuildRequest> {
        let path = self.request_file.ok_or(Error::MissingRequest)?;
        let content = std::fs::read_to_string(&path)?;

        if is_json(&path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse a request from TOML text.
    pub fn from_toml_str(content: &str) -> Result<BuildRequest> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a request from JSON text.
    pub fn from_json_str(content: &str) -> Result<BuildRequest> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for RequestLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.toml");
        std::fs::write(
            &path,
            r#"
sketch_name = "TestFirmata"
selected_features = ["DigitalInputFirmata", "AnalogInputFirmata"]

[connection.serial]
baud = 57600
"#,
        )
        .unwrap();

        let request = RequestLoader::new().request_file(&path).load().unwrap();
        assert_eq!(request.sketch_name(), "TestFirmata");
        assert_eq!(request.selected_features.len(), 2);
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{
                "sketch_name": "TestFirmata",
                "connection": { "ethernet": {
                    "controller": "WIZ5100",
                    "remote_ip": "192.168.0.1",
                    "remote_port": 3030,
                    "mac": "90:A2:DA:0D:07:02"
                }},
                "selected_features": ["DigitalInputFirmata"]
            }"#,
        )
        .unwrap();

        let request = RequestLoader::new().request_file(&path).load().unwrap();
        assert!(matches!(
            request.connection,
            ConnectionConfig::Ethernet(_)
        ));
    }

    #[test]
    fn test_toml_and_json_agree() {
        let from_toml = RequestLoader::from_toml_str(
            r#"
sketch_name = "SameFirmata"
selected_features = ["I2CFirmata"]

[connection.serial]
baud = 9600
"#,
        )
        .unwrap();
        let from_json = RequestLoader::from_json_str(
            r#"{
                "sketch_name": "SameFirmata",
                "connection": { "serial": { "baud": 9600 } },
                "selected_features": ["I2CFirmata"]
            }"#,
        )
        .unwrap();

        assert_eq!(from_toml.sketch_name(), from_json.sketch_name());
        assert_eq!(from_toml.selected_features, from_json.selected_features);
    }

    #[test]
    fn test_no_source_is_missing_request() {
        let err = RequestLoader::new().load().unwrap_err();
        assert!(matches!(err, Error::MissingRequest));
    }

    #[test]
    fn test_missing_file_error() {
        let result = RequestLoader::new()
            .request_file("/nonexistent/request.toml")
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid { toml [[[").unwrap();

        let result = RequestLoader::new().request_file(&path).load();
        assert!(result.is_err());
    }
}
