//! Serial port driver for host operating systems
//!
//! Wraps a `serialport` handle and its clone as the transmit and receive
//! halves of the HAL traits.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use sightsign_hal::uart::{DataBits, Parity, StopBits};
use sightsign_hal::{SerialOpen, UartConfig, UartRx, UartTx};
use tracing::debug;

/// Error from serial operations
#[derive(Debug, thiserror::Error)]
pub enum SerialBusError {
    /// Port could not be opened or configured
    #[error("cannot open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    /// Read or write failed on an open port
    #[error("serial I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Transmit half of an open port
pub struct SerialTx {
    port: Box<dyn SerialPort>,
}

/// Receive half of an open port
pub struct SerialRx {
    port: Box<dyn SerialPort>,
}

impl UartTx for SerialTx {
    type Error = SerialBusError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port.flush()?;
        Ok(())
    }
}

impl UartRx for SerialRx {
    type Error = SerialBusError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// Opens operating-system serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSerial;

impl SerialOpen for HostSerial {
    type Tx = SerialTx;
    type Rx = SerialRx;
    type Error = SerialBusError;

    fn open(&self, port: &str, config: &UartConfig) -> Result<(SerialTx, SerialRx), SerialBusError> {
        let open_error = |source| SerialBusError::Open {
            port: port.to_owned(),
            source,
        };

        let tx = serialport::new(port, config.baudrate)
            .data_bits(match config.data_bits {
                DataBits::Seven => serialport::DataBits::Seven,
                DataBits::Eight => serialport::DataBits::Eight,
            })
            .parity(match config.parity {
                Parity::None => serialport::Parity::None,
                Parity::Even => serialport::Parity::Even,
                Parity::Odd => serialport::Parity::Odd,
            })
            .stop_bits(match config.stop_bits {
                StopBits::One => serialport::StopBits::One,
                StopBits::Two => serialport::StopBits::Two,
            })
            .timeout(Duration::from_millis(u64::from(config.read_timeout_ms)))
            .open()
            .map_err(open_error)?;
        let rx = tx.try_clone().map_err(open_error)?;

        debug!(port, baud = config.baudrate, "serial port open");
        Ok((SerialTx { port: tx }, SerialRx { port: rx }))
    }
}
