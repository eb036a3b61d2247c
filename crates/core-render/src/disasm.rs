//! Decoder-driven disassembly of a byte region.
//!
//! The renderer walks the region one instruction at a time, prefixing each
//! formatted line with its runtime address (`base_address` + file offset).
//! Decode failure is not an error: machine code regions routinely trail
//! off into data, so the first undecodable position simply ends the
//! listing. Instructions are never decoded across the region's end; a
//! straddling instruction fails to decode and terminates the region the
//! same way.

use core_disasm::InstructionDecoder;
use std::fmt::Write;
use tracing::debug;

/// Render `[offset, min(offset + size, data.len()))` as Intel-syntax
/// disassembly. An empty or out-of-range region yields `(empty)\r\n`.
pub fn disasm_region(
    data: &[u8],
    offset: usize,
    size: usize,
    base_address: u64,
    decoder: &mut dyn InstructionDecoder,
) -> String {
    let end = data.len().min(offset.saturating_add(size));
    if end <= offset {
        return "(empty)\r\n".to_string();
    }
    let mut out = format!("Disasm @ offset 0x{offset:x}\r\n\r\n");
    let mut cursor = 0usize;
    let total = end - offset;
    while cursor < total {
        let address = base_address.wrapping_add((offset + cursor) as u64);
        let Some(decoded) = decoder.decode_one(&data[offset + cursor..end], address) else {
            debug!(
                target: "render",
                offset,
                cursor,
                remaining = total - cursor,
                "disasm_stopped_at_undecodable_bytes"
            );
            break;
        };
        let _ = write!(out, "0x{address:016x}  {}\r\n", decoded.text);
        if decoded.len == 0 {
            // A zero-length decode cannot advance the cursor.
            break;
        }
        cursor += decoded.len;
    }
    out
}
