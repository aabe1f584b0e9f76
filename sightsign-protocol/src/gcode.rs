//! uArm Swift Pro command lines
//!
//! The Swift firmware reads newline-terminated G-code, each line prefixed
//! with `#<n>` so replies (`$<n> ok`) can be matched to requests.

use core::fmt::Write;

use heapless::String;

/// Maximum length of one command line
pub const MAX_LINE_LEN: usize = 64;

/// End effector modes (`M2400`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwiftMode {
    /// Suction cup
    Normal,
    /// Laser engraver
    Laser,
    /// 3D printing head
    Printing,
    /// Universal holder (pens)
    UniversalHolder,
}

impl SwiftMode {
    fn code(self) -> u8 {
        match self {
            SwiftMode::Normal => 0,
            SwiftMode::Laser => 1,
            SwiftMode::Printing => 2,
            SwiftMode::UniversalHolder => 3,
        }
    }
}

/// Commands sent to a Swift Pro
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwiftCommand {
    /// Select the end effector mode
    SetMode(SwiftMode),
    /// Linear move to x/y/z millimetres at `speed` mm/min
    Move { x: f64, y: f64, z: f64, speed: u16 },
    /// Release all joints
    Detach,
}

impl SwiftCommand {
    /// Render as a numbered line, newline included
    pub fn to_line(&self, seq: u16) -> Result<String<MAX_LINE_LEN>, core::fmt::Error> {
        let mut line = String::new();
        match self {
            SwiftCommand::SetMode(mode) => writeln!(line, "#{} M2400 S{}", seq, mode.code())?,
            SwiftCommand::Move { x, y, z, speed } => writeln!(
                line,
                "#{} G0 X{:.2} Y{:.2} Z{:.2} F{}",
                seq, x, y, z, speed
            )?,
            SwiftCommand::Detach => writeln!(line, "#{} M2019", seq)?,
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_line() {
        let line = SwiftCommand::SetMode(SwiftMode::UniversalHolder)
            .to_line(1)
            .unwrap();
        assert_eq!(line.as_str(), "#1 M2400 S3\n");
    }

    #[test]
    fn test_move_line() {
        let line = SwiftCommand::Move {
            x: 200.0,
            y: -12.5,
            z: 58.0,
            speed: 5000,
        }
        .to_line(12)
        .unwrap();
        assert_eq!(line.as_str(), "#12 G0 X200.00 Y-12.50 Z58.00 F5000\n");
    }

    #[test]
    fn test_detach_line() {
        let line = SwiftCommand::Detach.to_line(3).unwrap();
        assert_eq!(line.as_str(), "#3 M2019\n");
    }
}
