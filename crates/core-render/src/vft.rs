//! Virtual-function-table walker.
//!
//! A region is reinterpreted as `count` little-endian 64-bit entries. Each
//! entry's raw value is reported as an RVA; values that land inside the
//! file are treated as file offsets and fed back through the disassembly
//! renderer, so each slot's first listed instruction carries the runtime
//! address `base_address + value`. Values outside the file are noted
//! and skipped: vtables sourced from arbitrary offsets are full of
//! non-pointers and that must not abort the walk.

use crate::disasm::disasm_region;
use core_disasm::InstructionDecoder;
use std::fmt::Write;

/// Walk `count` 8-byte entries starting at `offset`, disassembling
/// `window` bytes at each in-file target. A region extending past
/// end-of-file renders `(out of range)` and stops before any entry.
pub fn walk_vft(
    data: &[u8],
    offset: usize,
    count: usize,
    base_address: u64,
    window: usize,
    decoder: &mut dyn InstructionDecoder,
) -> String {
    let mut out = format!("VFT @ file offset 0x{offset:x}, count {count}\r\n\r\n");
    let end = count
        .checked_mul(8)
        .and_then(|len| offset.checked_add(len))
        .filter(|&end| end <= data.len());
    if end.is_none() {
        out.push_str("(out of range)\r\n");
        return out;
    }
    for i in 0..count {
        let at = offset + i * 8;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&data[at..at + 8]);
        let value = u64::from_le_bytes(raw);
        let _ = write!(out, "[#{i}] RVA 0x{value:x}");
        if value < data.len() as u64 {
            let _ = write!(out, " (file off 0x{value:x})\r\n");
            out.push_str(&disasm_region(
                data,
                value as usize,
                window,
                base_address,
                decoder,
            ));
            out.push_str("\r\n");
        } else {
            out.push_str(" (out of file range)\r\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_disasm::ScriptedDecoder;

    /// 256 bytes with three 64-bit entries planted at offset 0x80:
    /// 0x10 (in range), 0x4000 (out of range), 0x20 (in range).
    fn table_fixture() -> Vec<u8> {
        let mut data: Vec<u8> = (0..256).map(|i| (i % 256) as u8).collect();
        data[0x80..0x88].copy_from_slice(&0x10u64.to_le_bytes());
        data[0x88..0x90].copy_from_slice(&0x4000u64.to_le_bytes());
        data[0x90..0x98].copy_from_slice(&0x20u64.to_le_bytes());
        data
    }

    #[test]
    fn fans_out_once_per_in_file_entry() {
        let data = table_fixture();
        let mut dec = ScriptedDecoder::new(8);
        let out = walk_vft(&data, 0x80, 3, 0, 64, &mut dec);
        assert_eq!(out.matches("Disasm @ offset").count(), 2);
        assert!(out.contains("[#0] RVA 0x10 (file off 0x10)\r\n"));
        assert!(out.contains("[#1] RVA 0x4000 (out of file range)\r\n"));
        assert!(out.contains("[#2] RVA 0x20 (file off 0x20)\r\n"));
    }

    #[test]
    fn header_names_offset_and_count() {
        let data = table_fixture();
        let mut dec = ScriptedDecoder::new(8);
        let out = walk_vft(&data, 0x80, 2, 0, 64, &mut dec);
        assert!(out.starts_with("VFT @ file offset 0x80, count 2\r\n\r\n"));
    }

    #[test]
    fn entry_disassembly_uses_shifted_base() {
        let data = table_fixture();
        let mut dec = ScriptedDecoder::new(8);
        let out = walk_vft(&data, 0x80, 1, 0x140000000, 16, &mut dec);
        // First line of the nested listing: base + rva.
        assert!(out.contains("0x0000000140000010  db 0x10\r\n"), "got {out}");
    }

    #[test]
    fn region_spilling_past_eof_stops_before_entries() {
        let data = table_fixture();
        let mut dec = ScriptedDecoder::new(8);
        let out = walk_vft(&data, 0xf0, 3, 0, 64, &mut dec);
        assert_eq!(out, "VFT @ file offset 0xf0, count 3\r\n\r\n(out of range)\r\n");
        let out = walk_vft(&data, 0, usize::MAX, 0, 64, &mut dec);
        assert!(out.ends_with("(out of range)\r\n"));
    }

    #[test]
    fn zero_count_renders_header_only() {
        let data = table_fixture();
        let mut dec = ScriptedDecoder::new(8);
        let out = walk_vft(&data, 0x80, 0, 0, 64, &mut dec);
        assert_eq!(out, "VFT @ file offset 0x80, count 0\r\n\r\n");
    }
}
