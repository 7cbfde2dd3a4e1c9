//! Syntax checks and code-generation helpers for network addresses.

use regex::Regex;
use std::sync::LazyLock;

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$")
        .expect("IPv4 pattern")
});

static MAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Fa-f]{2}[:]){5}([0-9A-Fa-f]{2})$").expect("MAC pattern"));

/// Check that `ip` is a dotted-quad IPv4 address with each octet in 0-255.
///
/// Full-string match only; no partial matches are accepted.
pub fn is_valid_ipv4(ip: &str) -> bool {
    IPV4.is_match(ip)
}

/// Check that `mac` is six colon-separated two-hex-digit groups.
///
/// Dash-separated input is rejected; colon-separated is the only accepted
/// form.
pub fn is_valid_mac(mac: &str) -> bool {
    MAC.is_match(mac)
}

/// Turn a validated IPv4 address into `IPAddress` constructor arguments,
/// e.g. `"192.168.0.1"` into `"192, 168, 0, 1"`.
pub fn ipv4_octet_list(ip: &str) -> String {
    ip.split('.').collect::<Vec<_>>().join(", ")
}

/// Turn a validated MAC address into a byte-array initializer,
/// e.g. `"90:A2:DA:0D:07:02"` into `"0x90, 0xA2, 0xDA, 0x0D, 0x07, 0x02"`.
pub fn mac_byte_list(mac: &str) -> String {
    format!("0x{}", mac.split(':').collect::<Vec<_>>().join(", 0x"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ipv4() {
        assert!(is_valid_ipv4("192.168.0.1"));
        assert!(is_valid_ipv4("0.0.0.0"));
        assert!(is_valid_ipv4("255.255.255.255"));
    }

    #[test]
    fn test_invalid_ipv4() {
        assert!(!is_valid_ipv4("192,168,0,1"));
        assert!(!is_valid_ipv4("192.168.0"));
        assert!(!is_valid_ipv4("256.0.0.1"));
        assert!(!is_valid_ipv4("192.168.0.1.5"));
        assert!(!is_valid_ipv4(" 192.168.0.1"));
        assert!(!is_valid_ipv4(""));
    }

    #[test]
    fn test_valid_mac() {
        assert!(is_valid_mac("90:A2:DA:0D:07:02"));
        assert!(is_valid_mac("de:aa:bb:cc:dd:01"));
    }

    #[test]
    fn test_invalid_mac() {
        // dash-separated is not accepted
        assert!(!is_valid_mac("90-A2-DA-0D-07-02"));
        assert!(!is_valid_mac("90:A2:DA:0D:07"));
        assert!(!is_valid_mac("90:A2:DA:0D:07:02:11"));
        assert!(!is_valid_mac("GG:A2:DA:0D:07:02"));
        assert!(!is_valid_mac(""));
    }

    #[test]
    fn test_ipv4_octet_list() {
        assert_eq!(ipv4_octet_list("192.168.0.1"), "192, 168, 0, 1");
    }

    #[test]
    fn test_mac_byte_list() {
        assert_eq!(
            mac_byte_list("90:A2:DA:0D:07:02"),
            "0x90, 0xA2, 0xDA, 0x0D, 0x07, 0x02"
        );
    }
}
