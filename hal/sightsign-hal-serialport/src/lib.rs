//! Host serial-port HAL for SightSign
//!
//! This crate implements the `sightsign-hal` serial traits over the
//! operating system's serial ports, and finds the port a uArm is attached
//! to. Supported boards:
//!
//! - uArm Metal (FTDI `0403:6001`)
//! - uArm Swift Pro (Arduino Mega `2341:0042`)

pub mod ports;
pub mod uart;

pub use ports::{find_arm_port, list_ports, ArmPort, KNOWN_ARMS};
pub use uart::{HostSerial, SerialBusError, SerialRx, SerialTx};
