//! Canonical hex+ASCII dump.
//!
//! The line format is contractual:
//!
//! ```text
//! 00001000  00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f  ................
//! ```
//!
//! Eight lowercase hex digits of address, two spaces, sixteen three-column
//! byte cells (missing bytes on a short final line pad to three spaces so
//! the ASCII column stays aligned), one more space, then the printable
//! projection of the same bytes.

use std::fmt::Write;

const BYTES_PER_LINE: usize = 16;

/// Dump the half-open range `[offset, min(offset + count, data.len()))`.
/// An empty range renders nothing.
pub fn hex_page(data: &[u8], offset: usize, count: usize) -> String {
    let end = data.len().min(offset.saturating_add(count));
    if end <= offset {
        return String::new();
    }
    let n = end - offset;
    let mut out = String::with_capacity(n.div_ceil(BYTES_PER_LINE) * 80);
    let mut i = 0usize;
    while i < n {
        let _ = write!(out, "{:08x}  ", offset + i);
        for j in 0..BYTES_PER_LINE {
            if i + j < n {
                let _ = write!(out, "{:02x} ", data[offset + i + j]);
            } else {
                out.push_str("   ");
            }
        }
        out.push(' ');
        for j in 0..BYTES_PER_LINE {
            if i + j >= n {
                break;
            }
            let b = data[offset + i + j];
            out.push(if (0x20..=0x7e).contains(&b) { b as char } else { '.' });
        }
        out.push_str("\r\n");
        i += BYTES_PER_LINE;
    }
    out
}

/// The `dump` verb: a header naming the start offset and the byte count
/// actually rendered after clamping, then the page itself.
pub fn hex_dump(data: &[u8], offset: usize, count: usize) -> String {
    let end = data.len().min(offset.saturating_add(count));
    let n = end.saturating_sub(offset);
    let mut out = format!("Dump @ 0x{offset:x}, size {n}\r\n\r\n");
    out.push_str(&hex_page(data, offset, n));
    out
}
