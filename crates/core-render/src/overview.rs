//! The standing view: file metadata, bookmarks, and the current hex page.
//!
//! Composed on every `RefreshStandingView` result. The caller normalizes
//! the page offset against the file size before composing (the model owns
//! that clamp); this module only reads.

use crate::hex::hex_page;
use core_model::Workbench;
use core_state::PAGE_SIZE;
use std::fmt::Write;

pub fn compose_overview(workbench: &Workbench) -> String {
    let Some(file) = workbench.file() else {
        return "No file loaded.".to_string();
    };
    let page_start = workbench.view().page_offset();
    debug_assert!(
        page_start % PAGE_SIZE == 0,
        "page offset must stay page-aligned"
    );
    let page_end = file.size().min(page_start + PAGE_SIZE);

    let mut out = String::new();
    let _ = write!(out, "File: {}\r\n", file.path().display());
    let _ = write!(out, "Size: {} bytes\r\n", file.size());
    let _ = write!(
        out,
        "Page: {} - {}\r\n\r\n",
        page_start,
        page_end.saturating_sub(1)
    );
    out.push_str("[Bookmarks]\r\n");
    for bookmark in workbench.view().bookmarks() {
        let _ = write!(out, "0x{:x} = {}\r\n", bookmark.offset, bookmark.label);
    }
    out.push_str("\r\n[Hex]\r\n");
    out.push_str(&hex_page(file.bytes(), page_start, PAGE_SIZE));
    out
}
