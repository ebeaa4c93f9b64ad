//! cw-protocol: Guacamole instruction framing for console-windows
//!
//! This crate defines the text protocol spoken over the WebSocket tunnel
//! between a console window and the remote-desktop gateway, plus the
//! status-code taxonomy the gateway reports errors with.

pub mod codec;
pub mod element;
pub mod error;
pub mod instruction;
pub mod status;
pub mod stream;

pub use codec::InstructionCodec;
pub use element::{MAX_ELEMENT_LENGTH, MAX_INSTRUCTION_SIZE};
pub use error::ProtocolError;
pub use instruction::{Instruction, Opcode, INTERNAL_OPCODE};
pub use status::StatusCode;
pub use stream::{StreamAllocator, StreamIndex};
