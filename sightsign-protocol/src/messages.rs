//! Reports sent by the arm firmware
//!
//! The host never waits for replies to its move frames. The firmware does
//! push unsolicited frames back, though:
//! - Error reports: `[0xFF, code]`, raised for link or VM faults
//! - Events: `[id, data...]`, produced by Brief `event` words

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};

/// First payload byte of an error report
pub const REPORT_ERROR: u8 = 0xFF;

/// Faults the firmware reports asynchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirmwareError {
    /// A frame arrived with an unexpected sequence number
    OutOfSequence,
    /// Escape byte followed by an invalid byte
    UnexpectedEscape,
    /// Frame checksum did not match
    Checksum,
    /// Data stack underflow
    StackUnderflow,
    /// Data stack overflow
    StackOverflow,
    /// Return stack underflow
    ReturnStackUnderflow,
    /// Return stack overflow
    ReturnStackOverflow,
    /// Frame exceeded the firmware's receive buffer
    FrameTooLarge,
    /// Code not known to this host
    Unknown(u8),
}

impl FirmwareError {
    /// Decode a firmware error code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => FirmwareError::OutOfSequence,
            1 => FirmwareError::UnexpectedEscape,
            2 => FirmwareError::Checksum,
            3 => FirmwareError::StackUnderflow,
            4 => FirmwareError::StackOverflow,
            5 => FirmwareError::ReturnStackUnderflow,
            6 => FirmwareError::ReturnStackOverflow,
            7 => FirmwareError::FrameTooLarge,
            other => FirmwareError::Unknown(other),
        }
    }

    /// Wire code for this error
    pub fn code(&self) -> u8 {
        match self {
            FirmwareError::OutOfSequence => 0,
            FirmwareError::UnexpectedEscape => 1,
            FirmwareError::Checksum => 2,
            FirmwareError::StackUnderflow => 3,
            FirmwareError::StackOverflow => 4,
            FirmwareError::ReturnStackUnderflow => 5,
            FirmwareError::ReturnStackOverflow => 6,
            FirmwareError::FrameTooLarge => 7,
            FirmwareError::Unknown(code) => *code,
        }
    }
}

impl core::fmt::Display for FirmwareError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FirmwareError::OutOfSequence => f.write_str("frame out of sequence"),
            FirmwareError::UnexpectedEscape => f.write_str("unexpected escape byte"),
            FirmwareError::Checksum => f.write_str("checksum mismatch"),
            FirmwareError::StackUnderflow => f.write_str("data stack underflow"),
            FirmwareError::StackOverflow => f.write_str("data stack overflow"),
            FirmwareError::ReturnStackUnderflow => f.write_str("return stack underflow"),
            FirmwareError::ReturnStackOverflow => f.write_str("return stack overflow"),
            FirmwareError::FrameTooLarge => f.write_str("frame too large"),
            FirmwareError::Unknown(code) => write!(f, "unknown firmware error {}", code),
        }
    }
}

/// Reports parsed from firmware-originated frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareReport {
    /// Protocol or VM fault
    Error(FirmwareError),
    /// Event raised by a running Brief program
    Event {
        id: u8,
        data: Vec<u8, MAX_PAYLOAD_SIZE>,
    },
}

impl FirmwareReport {
    /// Parse a report from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.payload.split_first() {
            None => Err(FrameError::InvalidFrame),
            Some((&REPORT_ERROR, rest)) => {
                let code = rest.first().ok_or(FrameError::InvalidFrame)?;
                Ok(FirmwareReport::Error(FirmwareError::from_code(*code)))
            }
            Some((&id, rest)) => {
                let mut data = Vec::new();
                data.extend_from_slice(rest)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Ok(FirmwareReport::Event { id, data })
            }
        }
    }

    /// Encode this report into a frame (for testing or simulation)
    pub fn to_frame(&self, seq: u8) -> Result<Frame, FrameError> {
        match self {
            FirmwareReport::Error(err) => Frame::new(seq, &[REPORT_ERROR, err.code()]),
            FirmwareReport::Event { id, data } => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload.push(*id).map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(data)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(seq, &payload)
            }
        }
    }
}
