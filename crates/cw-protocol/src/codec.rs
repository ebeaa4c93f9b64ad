//! Tokio codec for Guacamole instructions

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::element::{decode_elements, MAX_INSTRUCTION_SIZE};
use crate::error::ProtocolError;
use crate::instruction::Instruction;

/// Codec for encoding/decoding protocol instructions
#[derive(Debug, Default)]
pub struct InstructionCodec {
    _private: (),
}

impl InstructionCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Decode every complete instruction in a text payload.
    ///
    /// WebSocket tunnels deliver whole instructions per message, so a
    /// trailing fragment is reported as an error rather than buffered.
    pub fn decode_all(&mut self, text: &str) -> Result<Vec<Instruction>, ProtocolError> {
        let mut buf = BytesMut::from(text.as_bytes());
        let mut out = Vec::new();
        while let Some(instruction) = self.decode(&mut buf)? {
            out.push(instruction);
        }
        if !buf.is_empty() {
            return Err(ProtocolError::Malformed {
                opcode: String::new(),
                reason: format!("{} trailing bytes without terminator", buf.len()),
            });
        }
        Ok(out)
    }
}

impl Decoder for InstructionCodec {
    type Item = Instruction;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match decode_elements(src)? {
            Some((elements, consumed)) => {
                src.advance(consumed);
                let instruction = Instruction::from_elements(elements);
                tracing::trace!(opcode = instruction.opcode(), "decoded instruction");
                Ok(Some(instruction))
            }
            None => {
                if src.len() > MAX_INSTRUCTION_SIZE {
                    return Err(ProtocolError::InstructionTooLarge {
                        size: src.len(),
                        max: MAX_INSTRUCTION_SIZE,
                    });
                }
                Ok(None) // Need more data
            }
        }
    }
}

impl Encoder<Instruction> for InstructionCodec {
    type Error = ProtocolError;

    fn encode(&mut self, instruction: Instruction, dst: &mut BytesMut) -> Result<(), Self::Error> {
        instruction.encode(dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;

    #[test]
    fn test_codec_roundtrip() {
        let mut codec = InstructionCodec::new();

        let mut buf = BytesMut::new();
        codec
            .encode(Instruction::key(65513, true), &mut buf)
            .unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, Instruction::key(65513, true));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_partial_read() {
        let mut codec = InstructionCodec::new();

        let mut full_buf = BytesMut::new();
        codec
            .encode(Instruction::sync(1_700_000_000), &mut full_buf)
            .unwrap();

        // Split the buffer to simulate partial read
        let mut partial = full_buf.split_to(6);

        // Should return None (need more data)
        assert!(codec.decode(&mut partial).unwrap().is_none());

        // Add the rest
        partial.extend_from_slice(&full_buf);

        let decoded = codec.decode(&mut partial).unwrap().unwrap();
        assert_eq!(decoded.kind(), Opcode::Sync);
        assert_eq!(decoded.arg_i64(0).unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_decode_all_batch() {
        let mut codec = InstructionCodec::new();
        let batch = codec
            .decode_all("0.,36.0f6c4a4e-2a0c-4f0b-9a39-0a5b1f7e9c11;5.ready,5.$conn;")
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind(), Opcode::Internal);
        assert_eq!(batch[1].kind(), Opcode::Ready);
    }

    #[test]
    fn test_decode_all_rejects_fragment() {
        let mut codec = InstructionCodec::new();
        assert!(codec.decode_all("3.nop;4.sync,").is_err());
    }
}
