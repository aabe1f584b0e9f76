//! Reflecta link framing.
//!
//! ```text
//! START  SEQ  LEN  PAYLOAD[LEN]  CHECKSUM
//! 0xAA   u8   u8   0..=250       SEQ ^ LEN ^ PAYLOAD...
//! ```
//!
//! The sequence number is the sender's frame counter and wraps at 255.
//! The payload is opaque to the link; for outbound frames it is a
//! compiled Brief program.

use core::fmt;

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xAA;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// START + SEQ + LEN + payload + CHECKSUM
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload longer than `MAX_PAYLOAD_SIZE`
    PayloadTooLarge,
    /// Trailing checksum does not match the frame
    InvalidChecksum,
    /// Length byte or payload layout is not a valid frame
    InvalidFrame,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameError::PayloadTooLarge => "payload exceeds 250 bytes",
            FrameError::InvalidChecksum => "frame checksum mismatch",
            FrameError::InvalidFrame => "invalid frame",
        })
    }
}

impl core::error::Error for FrameError {}

fn checksum(seq: u8, payload: &[u8]) -> u8 {
    // LEN is bounded by MAX_PAYLOAD_SIZE, so the cast is exact
    payload.iter().fold(seq ^ payload.len() as u8, |acc, &b| acc ^ b)
}

/// One Reflecta frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(seq: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { seq, payload })
    }

    pub fn empty(seq: u8) -> Self {
        Self {
            seq,
            payload: Vec::new(),
        }
    }

    /// Bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 4
    }

    /// Wire bytes for this frame
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
        out.extend_from_slice(&[FRAME_START, self.seq, self.payload.len() as u8])
            .map_err(|_| FrameError::PayloadTooLarge)?;
        out.extend_from_slice(&self.payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        out.push(checksum(self.seq, &self.payload))
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Start,
    Seq,
    Len { seq: u8 },
    Payload { seq: u8, len: u8 },
    Checksum { seq: u8 },
}

/// Byte-at-a-time frame decoder
///
/// Bytes before a START are line noise and are skipped. After a bad
/// length or checksum the parser drops the partial frame and hunts for
/// the next START.
#[derive(Debug, Clone)]
pub struct FrameParser {
    expect: Expect,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            expect: Expect::Start,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.expect = Expect::Start;
        self.payload.clear();
    }

    /// Feed one received byte
    ///
    /// Returns `Ok(Some(frame))` when `byte` completes a valid frame.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        self.expect = match self.expect {
            Expect::Start if byte == FRAME_START => Expect::Seq,
            Expect::Start => Expect::Start,
            Expect::Seq => Expect::Len { seq: byte },
            Expect::Len { .. } if usize::from(byte) > MAX_PAYLOAD_SIZE => {
                self.reset();
                return Err(FrameError::InvalidFrame);
            }
            Expect::Len { seq } => {
                self.payload.clear();
                match byte {
                    0 => Expect::Checksum { seq },
                    len => Expect::Payload { seq, len },
                }
            }
            Expect::Payload { seq, len } => {
                // Bounded by the length check above
                let _ = self.payload.push(byte);
                if self.payload.len() == usize::from(len) {
                    Expect::Checksum { seq }
                } else {
                    Expect::Payload { seq, len }
                }
            }
            Expect::Checksum { seq } => {
                let valid = byte == checksum(seq, &self.payload);
                let payload = core::mem::take(&mut self.payload);
                self.reset();
                return if valid {
                    Ok(Some(Frame { seq, payload }))
                } else {
                    Err(FrameError::InvalidChecksum)
                };
            }
        };
        Ok(None)
    }
}
