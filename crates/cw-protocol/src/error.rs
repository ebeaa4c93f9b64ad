//! Protocol error types

use thiserror::Error;

/// Errors that can occur while framing or parsing instructions
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Element length prefix was not a decimal number
    #[error("Invalid element length prefix: {0:?}")]
    InvalidLength(String),

    /// Element declared a length beyond the accepted maximum
    #[error("Element too large: {size} characters exceeds maximum of {max}")]
    ElementTooLarge { size: usize, max: usize },

    /// Buffered data grew past the maximum instruction size without a terminator
    #[error("Instruction too large: {size} bytes exceeds maximum of {max} bytes")]
    InstructionTooLarge { size: usize, max: usize },

    /// An element was followed by something other than ',' or ';'
    #[error("Unexpected element terminator: {0:?}")]
    UnexpectedTerminator(char),

    /// Element value was not valid UTF-8
    #[error("Element is not valid UTF-8")]
    InvalidUtf8,

    /// Instruction arguments did not match what the opcode requires
    #[error("Malformed {opcode} instruction: {reason}")]
    Malformed { opcode: String, reason: String },

    /// Base64 payload of a blob could not be decoded
    #[error("Invalid blob payload: {0}")]
    Blob(#[from] base64::DecodeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
