//! The instruction-decoder seam.
//!
//! The engine drives disassembly through [`InstructionDecoder`], a
//! single-operation trait: decode one x86-64 instruction from the front of
//! a byte slice, formatted in Intel syntax for a given runtime address.
//! Production code plugs in [`IcedDecoder`]; renderer and dispatcher tests
//! plug in [`ScriptedDecoder`] to get deterministic "instructions" of a
//! known width without depending on real encodings.

use iced_x86::{Decoder, DecoderOptions, Formatter, IntelFormatter};

/// One decoded instruction: the bytes it consumed and its formatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub len: usize,
    pub text: String,
}

/// Decodes a single instruction at an instruction boundary in 64-bit long
/// mode with a 64-bit stack width. `None` means the bytes do not begin a
/// well-formed instruction (malformed or truncated); callers treat that as
/// the end of the decodable region.
pub trait InstructionDecoder {
    fn decode_one(&mut self, bytes: &[u8], address: u64) -> Option<Decoded>;
}

/// Production decoder backed by `iced-x86`.
pub struct IcedDecoder {
    formatter: IntelFormatter,
}

impl IcedDecoder {
    pub fn new() -> Self {
        Self {
            formatter: IntelFormatter::new(),
        }
    }
}

impl Default for IcedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstructionDecoder for IcedDecoder {
    fn decode_one(&mut self, bytes: &[u8], address: u64) -> Option<Decoded> {
        if bytes.is_empty() {
            return None;
        }
        let mut decoder = Decoder::with_ip(64, bytes, address, DecoderOptions::NONE);
        let instruction = decoder.decode();
        if instruction.is_invalid() {
            return None;
        }
        let mut text = String::new();
        self.formatter.format(&instruction, &mut text);
        Some(Decoded {
            len: instruction.len(),
            text,
        })
    }
}

/// Test decoder: every `width` bytes form one pseudo-instruction rendered
/// as a `db` line for the first byte. A tail shorter than `width` fails to
/// decode, which exercises the renderers' silent-termination path.
pub struct ScriptedDecoder {
    width: usize,
}

impl ScriptedDecoder {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl InstructionDecoder for ScriptedDecoder {
    fn decode_one(&mut self, bytes: &[u8], _address: u64) -> Option<Decoded> {
        if self.width == 0 || bytes.len() < self.width {
            return None;
        }
        Some(Decoded {
            len: self.width,
            text: format!("db 0x{:02x}", bytes[0]),
        })
    }
}
