//! Serial device discovery.

use crate::error::Result;
use serialport::{SerialPortInfo, SerialPortType};

/// USB-UART bridge descriptors that identify the capture board.
const KNOWN_BRIDGES: [&str; 4] = ["CP210", "CH340", "FTDI", "USB Serial"];

/// A serial port with a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescription {
    pub name: String,
    pub description: String,
}

impl PortDescription {
    fn from_info(info: &SerialPortInfo) -> Self {
        let description = match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                let parts: Vec<&str> = [usb.product.as_deref(), usb.manufacturer.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                if parts.is_empty() {
                    format!("USB Serial ({:04x}:{:04x})", usb.vid, usb.pid)
                } else {
                    parts.join(" - ")
                }
            }
            SerialPortType::PciPort => "PCI serial".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth serial".to_string(),
            SerialPortType::Unknown => "n/a".to_string(),
        };

        Self {
            name: info.port_name.clone(),
            description,
        }
    }

    /// Whether the description names a known USB-UART bridge.
    pub fn is_capture_device(&self) -> bool {
        KNOWN_BRIDGES
            .iter()
            .any(|bridge| self.description.contains(bridge))
    }
}

/// List all serial ports on the system.
pub fn list_ports() -> Result<Vec<PortDescription>> {
    let ports = serialport::available_ports()?;
    Ok(ports.iter().map(PortDescription::from_info).collect())
}

/// Auto-detect the first port that looks like the capture board.
pub fn find_capture_port() -> Result<Option<String>> {
    Ok(select_capture_port(&list_ports()?))
}

fn select_capture_port(ports: &[PortDescription]) -> Option<String> {
    ports
        .iter()
        .find(|p| p.is_capture_device())
        .map(|p| p.name.clone())
}

/// Format a numbered port listing for display.
pub fn format_port_list(ports: &[PortDescription]) -> String {
    if ports.is_empty() {
        return "No serial ports found.".to_string();
    }

    let mut out = String::from("Available ports:\n");
    for (i, port) in ports.iter().enumerate() {
        out.push_str(&format!("{}. {} - {}\n", i + 1, port.name, port.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, description: &str) -> PortDescription {
        PortDescription {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_known_bridges_are_detected() {
        assert!(port("/dev/ttyUSB0", "CP2102 USB to UART Bridge Controller").is_capture_device());
        assert!(port("COM3", "USB-SERIAL CH340").is_capture_device());
        assert!(!port("/dev/ttyS0", "n/a").is_capture_device());
    }

    #[test]
    fn test_select_first_matching_port() {
        let ports = vec![
            port("/dev/ttyS0", "n/a"),
            port("/dev/ttyUSB1", "FTDI FT232R"),
            port("/dev/ttyUSB2", "CP2102"),
        ];
        assert_eq!(select_capture_port(&ports).as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(select_capture_port(&ports[..1]), None);
    }

    #[test]
    fn test_format_port_list() {
        assert_eq!(format_port_list(&[]), "No serial ports found.");

        let listing = format_port_list(&[port("/dev/ttyUSB0", "CP2102")]);
        assert!(listing.starts_with("Available ports:"));
        assert!(listing.contains("1. /dev/ttyUSB0 - CP2102"));
    }
}
