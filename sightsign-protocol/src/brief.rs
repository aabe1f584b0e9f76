//! Brief bytecode compiler
//!
//! Brief is a tiny stack language executed by the uArm Metal firmware. A
//! program is a whitespace-separated list of tokens, each either a decimal
//! integer literal (pushed on the firmware's data stack) or an instruction
//! name (looked up in the compiler's symbol table and emitted as a single
//! opcode byte).
//!
//! The compiler only emits bytecode. Whether the firmware should run the
//! program or keep it is decided by the caller through a trailing
//! [`Control`] byte.

use core::fmt;

use heapless::{FnvIndexMap, String, Vec};

use crate::frame::MAX_PAYLOAD_SIZE;

/// Maximum instruction name length in bytes
pub const MAX_NAME_LEN: usize = 16;

/// Maximum user-defined instructions per session
pub const MAX_INSTRUCTIONS: usize = 16;

/// Maximum operations in one compiled program
pub const MAX_OPS: usize = 48;

/// Firmware opcodes
pub mod opcode {
    /// Return from the current word
    pub const RETURN: u8 = 0;
    /// 8-bit signed literal, one operand byte
    pub const LIT8: u8 = 1;
    /// 16-bit signed literal, two operand bytes (big-endian)
    pub const LIT16: u8 = 2;
    /// 32-bit signed literal, four operand bytes (big-endian)
    pub const LIT32: u8 = 3;
    /// Reset the VM: clear stacks and the firmware dictionary
    pub const RESET: u8 = 48;
    /// Attach the arm servos
    pub const ATTACH: u8 = 103;
    /// Detach the arm servos
    pub const DETACH: u8 = 104;
    /// Move to cartesian x/y/z at speed
    pub const XYZ: u8 = 110;
    /// Move to rotation/elevation/height at speed (SCARA)
    pub const RTZ: u8 = 113;
}

/// Primitives understood by every firmware image, regardless of the
/// session's symbol table
const BUILTINS: &[(&str, u8)] = &[("(reset)", opcode::RESET)];

/// Trailing control byte appended to a frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Run the program immediately
    Execute,
    /// Append the program to the firmware dictionary without running it
    Define,
}

impl Control {
    /// Wire value of this control byte
    pub const fn to_byte(self) -> u8 {
        match self {
            Control::Execute => 0,
            Control::Define => 1,
        }
    }
}

/// Compilation errors
///
/// With the fixed arm instruction set these indicate a defect in the
/// caller, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompileError {
    /// Token is neither an integer nor a known instruction
    /// (truncated to [`MAX_NAME_LEN`] bytes)
    UnknownToken(String<MAX_NAME_LEN>),
    /// Numeric token does not fit in 32 bits
    LiteralOutOfRange,
    /// Program does not fit in one frame
    ProgramTooLarge,
    /// Instruction name longer than [`MAX_NAME_LEN`]
    NameTooLong,
    /// Symbol table is full
    TableFull,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnknownToken(token) => write!(f, "unknown token `{}`", token),
            CompileError::LiteralOutOfRange => f.write_str("literal does not fit in 32 bits"),
            CompileError::ProgramTooLarge => f.write_str("program does not fit in one frame"),
            CompileError::NameTooLong => f.write_str("instruction name too long"),
            CompileError::TableFull => f.write_str("instruction table full"),
        }
    }
}

impl core::error::Error for CompileError {}

/// One compiled operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Op {
    /// Push an integer
    Literal(i32),
    /// Run a firmware instruction
    Instruction(u8),
}

impl Op {
    /// Append the bytecode for this operation
    fn encode_into(&self, out: &mut Vec<u8, MAX_PAYLOAD_SIZE>) -> Result<(), CompileError> {
        let pushed = match *self {
            Op::Instruction(code) => out.push(code).map_err(|_| ()),
            Op::Literal(value) => {
                if let Ok(v) = i8::try_from(value) {
                    out.extend_from_slice(&[opcode::LIT8, v as u8])
                } else if let Ok(v) = i16::try_from(value) {
                    let [hi, lo] = v.to_be_bytes();
                    out.extend_from_slice(&[opcode::LIT16, hi, lo])
                } else {
                    let [b0, b1, b2, b3] = value.to_be_bytes();
                    out.extend_from_slice(&[opcode::LIT32, b0, b1, b2, b3])
                }
            }
        };
        pushed.map_err(|_| CompileError::ProgramTooLarge)
    }
}

/// A compiled Brief program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    ops: Vec<Op, MAX_OPS>,
}

impl Program {
    /// Operations in source order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the program has no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Encode to bytecode, without the control byte
    pub fn to_bytes(&self) -> Result<Vec<u8, MAX_PAYLOAD_SIZE>, CompileError> {
        let mut out = Vec::new();
        for op in &self.ops {
            op.encode_into(&mut out)?;
        }
        Ok(out)
    }

    /// Encode to bytecode followed by the control byte, ready for framing
    pub fn to_payload(&self, control: Control) -> Result<Vec<u8, MAX_PAYLOAD_SIZE>, CompileError> {
        let mut out = self.to_bytes()?;
        out.push(control.to_byte())
            .map_err(|_| CompileError::ProgramTooLarge)?;
        Ok(out)
    }
}

/// Brief compiler with a per-session symbol table
#[derive(Debug, Default)]
pub struct Compiler {
    instructions: FnvIndexMap<String<MAX_NAME_LEN>, u8, MAX_INSTRUCTIONS>,
}

impl Compiler {
    /// Create a compiler with an empty symbol table
    pub fn new() -> Self {
        Self {
            instructions: FnvIndexMap::new(),
        }
    }

    /// Clear all user-defined instructions
    pub fn reset(&mut self) {
        self.instructions.clear();
    }

    /// Register a name for a firmware opcode
    ///
    /// Redefining a name replaces its opcode.
    pub fn define_instruction(&mut self, name: &str, code: u8) -> Result<(), CompileError> {
        let key = String::try_from(name).map_err(|_| CompileError::NameTooLong)?;
        self.instructions
            .insert(key, code)
            .map_err(|_| CompileError::TableFull)?;
        Ok(())
    }

    /// Resolve an instruction name, user table first
    pub fn lookup(&self, name: &str) -> Option<u8> {
        self.instructions
            .iter()
            .find(|(key, _)| key.as_str() == name)
            .map(|(_, &code)| code)
            .or_else(|| {
                BUILTINS
                    .iter()
                    .find(|(builtin, _)| *builtin == name)
                    .map(|&(_, code)| code)
            })
    }

    /// Compile a whitespace-separated program
    pub fn compile(&self, source: &str) -> Result<Program, CompileError> {
        let mut program = Program::default();

        for token in source.split_whitespace() {
            let op = if is_numeric(token) {
                let value = token
                    .parse::<i32>()
                    .map_err(|_| CompileError::LiteralOutOfRange)?;
                Op::Literal(value)
            } else if let Some(code) = self.lookup(token) {
                Op::Instruction(code)
            } else {
                return Err(CompileError::UnknownToken(truncated(token)));
            };

            program
                .ops
                .push(op)
                .map_err(|_| CompileError::ProgramTooLarge)?;
        }

        Ok(program)
    }
}

/// Decimal integer syntax: optional sign followed by at least one digit
fn is_numeric(token: &str) -> bool {
    let digits = token
        .strip_prefix('-')
        .or_else(|| token.strip_prefix('+'))
        .unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn truncated(token: &str) -> String<MAX_NAME_LEN> {
    let mut out = String::new();
    for ch in token.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
