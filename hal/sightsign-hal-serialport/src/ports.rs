//! Arm port discovery
//!
//! uArm boards enumerate as USB serial devices. Discovery matches the
//! USB vendor/product pair against the boards the drivers support.

use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, info};

/// A known arm board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmPort {
    /// Board name for logs
    pub name: &'static str,
    /// USB vendor ID
    pub vid: u16,
    /// USB product ID
    pub pid: u16,
}

/// Boards recognised by [`find_arm_port`]
pub const KNOWN_ARMS: &[ArmPort] = &[
    ArmPort {
        name: "uArm Metal (FTDI)",
        vid: 0x0403,
        pid: 0x6001,
    },
    ArmPort {
        name: "uArm Swift Pro (Arduino Mega)",
        vid: 0x2341,
        pid: 0x0042,
    },
];

/// Identify the board behind a port, if it is one we drive
pub fn identify(info: &SerialPortInfo) -> Option<&'static ArmPort> {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => KNOWN_ARMS
            .iter()
            .find(|arm| arm.vid == usb.vid && arm.pid == usb.pid),
        _ => None,
    }
}

/// All serial ports visible to the OS, paired with the recognised board
pub fn list_ports() -> Vec<(SerialPortInfo, Option<&'static ArmPort>)> {
    match serialport::available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|info| {
                let arm = identify(&info);
                (info, arm)
            })
            .collect(),
        Err(e) => {
            debug!("port enumeration failed: {}", e);
            Vec::new()
        }
    }
}

/// Find the first port with a supported arm attached
pub fn find_arm_port() -> Option<String> {
    let (info, arm) = list_ports()
        .into_iter()
        .find_map(|(info, arm)| arm.map(|arm| (info, arm)))?;
    info!("found {} on {}", arm.name, info.port_name);
    Some(info.port_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(vid: u16, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port_name: "/dev/ttyUSB0".into(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid,
                pid,
                serial_number: None,
                manufacturer: None,
                product: None,
            }),
        }
    }

    #[test]
    fn test_identify_metal() {
        let arm = identify(&usb_port(0x0403, 0x6001)).unwrap();
        assert_eq!(arm.name, "uArm Metal (FTDI)");
    }

    #[test]
    fn test_identify_swift() {
        assert!(identify(&usb_port(0x2341, 0x0042)).is_some());
    }

    #[test]
    fn test_identify_other_usb_device() {
        assert!(identify(&usb_port(0x1234, 0x5678)).is_none());
    }

    #[test]
    fn test_identify_non_usb_port() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyS0".into(),
            port_type: SerialPortType::Unknown,
        };
        assert!(identify(&info).is_none());
    }
}
