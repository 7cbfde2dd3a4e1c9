use super::Transport;
use crate::config::SerialConfig;
use crate::core::error::Result;

/// Serial transport. Trivially valid; the link is the board's own UART/USB,
/// so there is nothing to configure or maintain.
pub struct SerialTransport {
    config: SerialConfig,
}

impl SerialTransport {
    /// Create a new serial transport.
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }
}

impl Transport for SerialTransport {
    fn config_block(&self) -> Result<String> {
        Ok(String::new())
    }

    fn init_transport_fn(&self) -> String {
        let mut fn_text = String::new();
        fn_text.push_str("void initTransport()\n");
        fn_text.push_str("{\n");
        fn_text.push_str(
            "  // Uncomment to save a couple of seconds by disabling the startup blink sequence.\n",
        );
        fn_text.push_str("  // Firmata.disableBlinkVersion();\n");
        fn_text.push_str(&format!("  Firmata.begin({});\n", self.config.baud));
        fn_text.push_str("}\n\n");
        fn_text
    }

    fn name(&self) -> &str {
        "Serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_block_is_empty() {
        let transport = SerialTransport::new(SerialConfig::default());
        assert_eq!(transport.config_block().unwrap(), "");
    }

    #[test]
    fn test_init_transport_uses_baud() {
        let transport = SerialTransport::new(SerialConfig { baud: 57600 });
        let text = transport.init_transport_fn();
        assert!(text.contains("void initTransport()"));
        assert!(text.contains("Firmata.begin(57600);"));
    }

    #[test]
    fn test_no_pins_reserved() {
        let transport = SerialTransport::new(SerialConfig::default());
        assert!(!transport.has_ignore_pins());
        assert_eq!(transport.ignore_pins_fn(), "");
        assert_eq!(transport.loop_begin_block(), "");
        assert_eq!(transport.loop_end_block(), "");
    }
}
