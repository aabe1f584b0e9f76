//! UART serial communication abstractions
//!
//! Provides blocking traits for serial communication that can be
//! implemented by host or test links.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error: core::fmt::Display;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error: core::fmt::Display;

    /// Read data from the UART
    ///
    /// Blocks until at least one byte arrives or the link's read timeout
    /// elapses. A timeout is reported as `Ok(0)`, not as an error, so
    /// reader loops can poll for shutdown.
    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single handle.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// Opens a named serial endpoint
///
/// The two halves are independent so that receiving can run on its own
/// thread while the owner keeps transmitting.
pub trait SerialOpen {
    /// Transmit half
    type Tx: UartTx + Send + 'static;
    /// Receive half
    type Rx: UartRx + Send + 'static;
    /// Error raised when the port cannot be opened
    type Error: core::fmt::Display;

    /// Open `port` with the given line settings
    fn open(&self, port: &str, config: &UartConfig) -> Result<(Self::Tx, Self::Rx), Self::Error>;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// How long a read may block before returning `Ok(0)`
    pub read_timeout_ms: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 57600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout_ms: 100,
        }
    }
}

impl UartConfig {
    /// Line settings for the uArm Swift Pro
    pub fn swift() -> Self {
        Self {
            baudrate: 115200,
            ..Self::default()
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
