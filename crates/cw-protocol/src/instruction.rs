//! Instruction types for the Guacamole protocol
//!
//! An instruction is an opcode followed by zero or more string arguments.
//! The client side of a console window only needs a small subset of the
//! protocol:
//!
//! 1. Client opens the tunnel with its connect data; the gateway answers
//!    with the internal tunnel instruction carrying the tunnel UUID
//! 2. Gateway sends `ready`, then display instructions (`size`, `sync`, ...)
//! 3. Client acknowledges every `sync` with a `sync` of the same timestamp
//! 4. Input flows client → gateway as `mouse` and `key`
//! 5. Clipboard text moves in both directions as a `clipboard` stream made of
//!    `blob` chunks closed by `end`
//! 6. Either side ends the session with `disconnect` (or `error`)

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::BytesMut;

use crate::element::encode_elements;
use crate::error::ProtocolError;
use crate::stream::StreamIndex;

/// Opcode of the tunnel-internal instruction (an empty string)
pub const INTERNAL_OPCODE: &str = "";

/// Known opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Tunnel-internal instruction (UUID announcement, pings)
    Internal,
    /// Stream acknowledgement
    Ack,
    /// Base64 chunk of a stream
    Blob,
    /// Start of a clipboard stream
    Clipboard,
    /// Session is ending
    Disconnect,
    /// End of a stream
    End,
    /// Gateway-reported error with a status code
    Error,
    /// Key press/release
    Key,
    /// Pointer state
    Mouse,
    /// Keep-alive
    Nop,
    /// Connection handshake complete
    Ready,
    /// Display or layer size
    Size,
    /// Frame boundary that must be acknowledged
    Sync,
    /// Anything this client does not interpret
    Other,
}

impl Opcode {
    /// Convert to the wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Internal => INTERNAL_OPCODE,
            Opcode::Ack => "ack",
            Opcode::Blob => "blob",
            Opcode::Clipboard => "clipboard",
            Opcode::Disconnect => "disconnect",
            Opcode::End => "end",
            Opcode::Error => "error",
            Opcode::Key => "key",
            Opcode::Mouse => "mouse",
            Opcode::Nop => "nop",
            Opcode::Ready => "ready",
            Opcode::Size => "size",
            Opcode::Sync => "sync",
            Opcode::Other => "",
        }
    }

    /// Classify a wire opcode
    pub fn from_wire(value: &str) -> Self {
        match value {
            INTERNAL_OPCODE => Self::Internal,
            "ack" => Self::Ack,
            "blob" => Self::Blob,
            "clipboard" => Self::Clipboard,
            "disconnect" => Self::Disconnect,
            "end" => Self::End,
            "error" => Self::Error,
            "key" => Self::Key,
            "mouse" => Self::Mouse,
            "nop" => Self::Nop,
            "ready" => Self::Ready,
            "size" => Self::Size,
            "sync" => Self::Sync,
            _ => Self::Other,
        }
    }
}

/// A single protocol instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: String,
    args: Vec<String>,
}

impl Instruction {
    /// Create an instruction from an opcode and its arguments
    pub fn new(opcode: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            opcode: opcode.into(),
            args,
        }
    }

    /// Build an instruction from decoded elements (opcode first)
    pub fn from_elements(mut elements: Vec<String>) -> Self {
        if elements.is_empty() {
            return Self::new(INTERNAL_OPCODE, vec![]);
        }
        let opcode = elements.remove(0);
        Self::new(opcode, elements)
    }

    /// Raw opcode string
    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    /// Classified opcode
    pub fn kind(&self) -> Opcode {
        Opcode::from_wire(&self.opcode)
    }

    /// All arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Argument at `index`, or a `Malformed` error naming it
    pub fn arg(&self, index: usize) -> Result<&str, ProtocolError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.malformed(format!("missing argument {}", index)))
    }

    /// Argument at `index` parsed as an integer
    pub fn arg_i64(&self, index: usize) -> Result<i64, ProtocolError> {
        let raw = self.arg(index)?;
        raw.parse()
            .map_err(|_| self.malformed(format!("argument {} is not a number: {:?}", index, raw)))
    }

    fn malformed(&self, reason: String) -> ProtocolError {
        ProtocolError::Malformed {
            opcode: self.opcode.clone(),
            reason,
        }
    }

    /// Pointer state in remote framebuffer coordinates
    pub fn mouse(x: i32, y: i32, button_mask: u8) -> Self {
        Self::new(
            "mouse",
            vec![x.to_string(), y.to_string(), button_mask.to_string()],
        )
    }

    /// Key press (`pressed = true`) or release of an X11 keysym
    pub fn key(keysym: u32, pressed: bool) -> Self {
        Self::new(
            "key",
            vec![keysym.to_string(), (if pressed { "1" } else { "0" }).to_string()],
        )
    }

    /// Request a new remote display size
    pub fn size(width: u32, height: u32) -> Self {
        Self::new("size", vec![width.to_string(), height.to_string()])
    }

    /// Open a clipboard stream
    pub fn clipboard(stream: StreamIndex, mimetype: &str) -> Self {
        Self::new("clipboard", vec![stream.to_string(), mimetype.to_string()])
    }

    /// One base64-encoded chunk of a stream
    pub fn blob(stream: StreamIndex, data: &[u8]) -> Self {
        Self::new("blob", vec![stream.to_string(), BASE64.encode(data)])
    }

    /// Close a stream
    pub fn end(stream: StreamIndex) -> Self {
        Self::new("end", vec![stream.to_string()])
    }

    /// Acknowledge a stream instruction
    pub fn ack(stream: StreamIndex, message: &str, status: u16) -> Self {
        Self::new(
            "ack",
            vec![stream.to_string(), message.to_string(), status.to_string()],
        )
    }

    /// Acknowledge a frame
    pub fn sync(timestamp: i64) -> Self {
        Self::new("sync", vec![timestamp.to_string()])
    }

    /// End the session
    pub fn disconnect() -> Self {
        Self::new("disconnect", vec![])
    }

    /// Keep-alive
    pub fn nop() -> Self {
        Self::new("nop", vec![])
    }

    /// Decode the base64 payload of a `blob` instruction
    pub fn blob_data(&self) -> Result<Vec<u8>, ProtocolError> {
        let payload = self.arg(1)?;
        Ok(BASE64.decode(payload)?)
    }

    /// Append the wire encoding to `dst`
    pub fn encode(&self, dst: &mut BytesMut) {
        let elements =
            std::iter::once(self.opcode.as_str()).chain(self.args.iter().map(String::as_str));
        encode_elements(elements, dst);
    }

    /// Wire encoding as a string (one WebSocket text frame)
    pub fn to_wire(&self) -> String {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for opcode in [
            Opcode::Ack,
            Opcode::Blob,
            Opcode::Clipboard,
            Opcode::Disconnect,
            Opcode::End,
            Opcode::Error,
            Opcode::Key,
            Opcode::Mouse,
            Opcode::Nop,
            Opcode::Ready,
            Opcode::Size,
            Opcode::Sync,
        ] {
            assert_eq!(Opcode::from_wire(opcode.as_str()), opcode);
        }
        assert_eq!(Opcode::from_wire(""), Opcode::Internal);
        assert_eq!(Opcode::from_wire("png"), Opcode::Other);
    }

    #[test]
    fn test_input_instruction_wire_format() {
        assert_eq!(Instruction::mouse(200, 150, 1).to_wire(), "5.mouse,3.200,3.150,1.1;");
        assert_eq!(Instruction::key(65507, true).to_wire(), "3.key,5.65507,1.1;");
        assert_eq!(Instruction::key(65507, false).to_wire(), "3.key,5.65507,1.0;");
        assert_eq!(Instruction::size(1024, 768).to_wire(), "4.size,4.1024,3.768;");
        assert_eq!(Instruction::disconnect().to_wire(), "10.disconnect;");
    }

    #[test]
    fn test_blob_payload() {
        let blob = Instruction::blob(StreamIndex::new(2), b"hello");
        assert_eq!(blob.args()[1], "aGVsbG8=");
        assert_eq!(blob.blob_data().unwrap(), b"hello");
    }

    #[test]
    fn test_missing_argument_is_malformed() {
        let size = Instruction::new("size", vec!["0".to_string()]);
        assert!(matches!(size.arg(2), Err(ProtocolError::Malformed { .. })));
        let sync = Instruction::new("sync", vec!["soon".to_string()]);
        assert!(sync.arg_i64(0).is_err());
    }

    #[test]
    fn test_from_elements() {
        let ins = Instruction::from_elements(vec!["ready".into(), "$abc".into()]);
        assert_eq!(ins.kind(), Opcode::Ready);
        assert_eq!(ins.args(), &["$abc".to_string()]);
    }
}
