//! Text producers for the workbench.
//!
//! Every renderer here is a pure function from bytes (or the model) to a
//! `String` with `\r\n` line endings, ready for the shell's read-only text
//! widget. No renderer mutates state; the composer expects the caller to
//! have normalized the page offset first (the model owns that clamp).

pub mod disasm;
pub mod hex;
pub mod overview;
pub mod vft;

pub use disasm::disasm_region;
pub use hex::{hex_dump, hex_page};
pub use overview::compose_overview;
pub use vft::walk_vft;
