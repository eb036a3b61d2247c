//! Applies a parsed command to the workbench model.
//!
//! This is the engine's recovery boundary. Handlers resolve offset tokens
//! against the current page, perform their effect, and translate every
//! failure (unparseable token, wildcard in a write payload, span past
//! end-of-file, missing template, failed process write) into a `None`
//! result with a status line. Nothing below the shell ever aborts a
//! session.
//!
//! Result semantics: `RefreshStandingView` asks the shell to recompose the
//! overview, `ReplaceOutput` hands it a finished text to show instead, and
//! `None` means nothing visible changed. Arity shortfalls and unknown
//! verbs land on `None` silently, without a status.

use crate::command_parser::{CommandParser, ParsedCommand};
use core_bytes::{Pattern, find, parse_offset, parse_unsigned};
use core_model::Workbench;
use core_procmem::write_process_memory;
use core_render::{disasm_region, hex_dump, walk_vft};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    None,
    RefreshStandingView,
    ReplaceOutput(String),
}

/// Outcome of one command: the redraw discriminant plus an optional status
/// line describing a recovered failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub result: CommandResult,
    pub status: Option<String>,
}

impl Dispatch {
    pub fn none() -> Self {
        Self {
            result: CommandResult::None,
            status: None,
        }
    }

    pub fn refresh() -> Self {
        Self {
            result: CommandResult::RefreshStandingView,
            status: None,
        }
    }

    pub fn output(text: String) -> Self {
        Self {
            result: CommandResult::ReplaceOutput(text),
            status: None,
        }
    }

    /// A failure recovered at the command boundary: no redraw, status only.
    pub fn recovered(status: impl Into<String>) -> Self {
        let status = status.into();
        warn!(target: "dispatch", status = status.as_str(), "command_recovered");
        Self {
            result: CommandResult::None,
            status: Some(status),
        }
    }
}

/// Execute one command line against the model.
pub fn dispatch(line: &str, workbench: &mut Workbench) -> Dispatch {
    let parsed = CommandParser::parse(line);
    debug!(target: "dispatch", ?parsed, "command");
    match parsed {
        ParsedCommand::Patch { offset, hex } => patch_cmd(workbench, offset, hex),
        ParsedCommand::Label { offset, name } => label_cmd(workbench, offset, name),
        ParsedCommand::Goto { offset } => goto_cmd(workbench, offset),
        ParsedCommand::Find { hex } => find_cmd(workbench, hex),
        ParsedCommand::FindNext => find_next_cmd(workbench),
        ParsedCommand::SaveTpl { name, offset, hex } => save_tpl_cmd(workbench, name, offset, hex),
        ParsedCommand::ApplyTpl { name, offset } => apply_tpl_cmd(workbench, name, offset),
        ParsedCommand::MemPatch { pid, addr, hex } => mem_patch_cmd(pid, addr, hex),
        ParsedCommand::Dump { offset, size } => dump_cmd(workbench, offset, size),
        ParsedCommand::Disasm { offset, size } => disasm_cmd(workbench, offset, size),
        ParsedCommand::Vft { offset, count } => vft_cmd(workbench, offset, count),
        ParsedCommand::Incomplete | ParsedCommand::Unknown | ParsedCommand::Empty => {
            Dispatch::none()
        }
    }
}

fn resolve_offset(workbench: &Workbench, token: &str) -> Result<usize, Dispatch> {
    parse_offset(token, workbench.view().page_offset())
        .map_err(|e| Dispatch::recovered(e.to_string()))
}

fn resolve_count(token: &str, what: &str) -> Result<usize, Dispatch> {
    parse_unsigned(token).ok_or_else(|| Dispatch::recovered(format!("bad {what} {token:?}")))
}

/// Literal write payload, refusing wildcards: a wildcard byte has no
/// defined value to write.
fn resolve_payload(hex: &str) -> Result<Vec<u8>, Dispatch> {
    Pattern::parse(hex)
        .literal_bytes()
        .ok_or_else(|| Dispatch::recovered("wildcards are not allowed in a write payload"))
}

fn patch_cmd(workbench: &mut Workbench, offset: &str, hex: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let bytes = match resolve_payload(hex) {
        Ok(b) => b,
        Err(d) => return d,
    };
    let (Some(file), view, _) = workbench.parts_mut() else {
        return Dispatch::recovered("no file loaded");
    };
    match file.patch(off, &bytes) {
        Ok(()) => {
            // The bytes under the last hit may have changed; the cursor is
            // no longer trustworthy.
            view.clear_last_find();
            Dispatch::refresh()
        }
        Err(e) => Dispatch::recovered(e.to_string()),
    }
}

fn label_cmd(workbench: &mut Workbench, offset: &str, name: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    workbench.view_mut().add_bookmark(off, name.trim_end());
    Dispatch::refresh()
}

fn goto_cmd(workbench: &mut Workbench, offset: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let size = workbench.file_size();
    let clamped = if off >= size { size.saturating_sub(1) } else { off };
    workbench.view_mut().snap_page_to(clamped);
    Dispatch::refresh()
}

fn find_cmd(workbench: &mut Workbench, hex: &str) -> Dispatch {
    let pattern = Pattern::parse(hex);
    if pattern.is_empty() {
        return Dispatch::recovered("pattern contains no tokens");
    }
    let hit = {
        let data = workbench.file().map_or(&[][..], |f| f.bytes());
        find(data, &pattern, 0)
    };
    match hit {
        Some(h) => {
            debug!(target: "dispatch", offset = h, "find_hit");
            let view = workbench.view_mut();
            view.record_find(pattern, h);
            view.snap_page_to(h);
            Dispatch::refresh()
        }
        None => Dispatch::none(),
    }
}

fn find_next_cmd(workbench: &mut Workbench) -> Dispatch {
    let Some(last) = workbench.view().last_find() else {
        return Dispatch::none();
    };
    let pattern = last.pattern.clone();
    let start = last.offset + 1;
    let hit = {
        let data = workbench.file().map_or(&[][..], |f| f.bytes());
        find(data, &pattern, start)
    };
    match hit {
        Some(h) => {
            let view = workbench.view_mut();
            view.record_find(pattern, h);
            view.snap_page_to(h);
            Dispatch::refresh()
        }
        None => Dispatch::none(),
    }
}

fn save_tpl_cmd(workbench: &mut Workbench, name: &str, offset: &str, hex: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let bytes = match resolve_payload(hex) {
        Ok(b) => b,
        Err(d) => return d,
    };
    workbench.view_mut().upsert_template(name, off, bytes);
    Dispatch::none()
}

fn apply_tpl_cmd(workbench: &mut Workbench, name: &str, offset: Option<&str>) -> Dispatch {
    let Some(template) = workbench.view().template(name) else {
        return Dispatch::recovered(format!("unknown template {name:?}"));
    };
    let stored_offset = template.offset;
    let bytes = template.bytes.clone();
    let off = match offset {
        Some(token) => match resolve_offset(workbench, token) {
            Ok(v) => v,
            Err(d) => return d,
        },
        None => stored_offset,
    };
    let (Some(file), _view, _) = workbench.parts_mut() else {
        return Dispatch::recovered("no file loaded");
    };
    match file.patch(off, &bytes) {
        Ok(()) => Dispatch::refresh(),
        Err(e) => Dispatch::recovered(e.to_string()),
    }
}

fn mem_patch_cmd(pid: &str, addr: &str, hex: &str) -> Dispatch {
    let Some(pid_value) = parse_unsigned(pid).and_then(|v| u32::try_from(v).ok()) else {
        return Dispatch::recovered(format!("bad pid {pid:?}"));
    };
    let Some(address) = parse_unsigned(addr) else {
        return Dispatch::recovered(format!("bad address {addr:?}"));
    };
    let bytes = match resolve_payload(hex) {
        Ok(b) => b,
        Err(d) => return d,
    };
    match write_process_memory(pid_value, address as u64, &bytes) {
        Ok(()) => Dispatch::none(),
        Err(e) => Dispatch::recovered(e.to_string()),
    }
}

fn dump_cmd(workbench: &mut Workbench, offset: &str, size: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let size = match resolve_count(size, "size") {
        Ok(v) => v,
        Err(d) => return d,
    };
    let data = workbench.file().map_or(&[][..], |f| f.bytes());
    Dispatch::output(hex_dump(data, off, size))
}

fn disasm_cmd(workbench: &mut Workbench, offset: &str, size: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let size = match resolve_count(size, "size") {
        Ok(v) => v,
        Err(d) => return d,
    };
    let (file, _view, decoder) = workbench.parts_mut();
    let data: &[u8] = match file {
        Some(f) => f.bytes(),
        None => &[],
    };
    Dispatch::output(disasm_region(data, off, size, 0, decoder))
}

fn vft_cmd(workbench: &mut Workbench, offset: &str, count: &str) -> Dispatch {
    let off = match resolve_offset(workbench, offset) {
        Ok(v) => v,
        Err(d) => return d,
    };
    let count = match resolve_count(count, "count") {
        Ok(v) => v,
        Err(d) => return d,
    };
    let window = workbench.vft_window();
    let (file, _view, decoder) = workbench.parts_mut();
    let data: &[u8] = match file {
        Some(f) => f.bytes(),
        None => &[],
    };
    Dispatch::output(walk_vft(data, off, count, 0, window, decoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_disasm::ScriptedDecoder;

    fn empty_bench() -> Workbench {
        Workbench::new(Box::new(ScriptedDecoder::new(1)))
    }

    #[test]
    fn blank_and_unknown_lines_do_nothing() {
        let mut wb = empty_bench();
        assert_eq!(dispatch("", &mut wb), Dispatch::none());
        assert_eq!(dispatch("   ", &mut wb), Dispatch::none());
        assert_eq!(dispatch("frobnicate 1 2 3", &mut wb), Dispatch::none());
    }

    #[test]
    fn arity_shortfall_is_silent() {
        let mut wb = empty_bench();
        let d = dispatch("patch 0x10", &mut wb);
        assert_eq!(d, Dispatch::none());
        assert!(d.status.is_none());
    }

    #[test]
    fn patch_without_file_recovers_with_status() {
        let mut wb = empty_bench();
        let d = dispatch("patch 0 90", &mut wb);
        assert_eq!(d.result, CommandResult::None);
        assert!(d.status.is_some());
    }

    #[test]
    fn bad_offset_token_recovers_with_status() {
        let mut wb = empty_bench();
        let d = dispatch("goto zzz", &mut wb);
        assert_eq!(d.result, CommandResult::None);
        assert!(d.status.unwrap().contains("bad offset"));
    }

    #[test]
    fn findnext_without_prior_find_is_a_noop() {
        let mut wb = empty_bench();
        assert_eq!(dispatch("findnext", &mut wb), Dispatch::none());
    }

    #[test]
    fn label_without_file_still_bookmarks() {
        let mut wb = empty_bench();
        let d = dispatch("label 0x40 scratch", &mut wb);
        assert_eq!(d.result, CommandResult::RefreshStandingView);
        assert_eq!(wb.view().bookmarks()[0].offset, 0x40);
    }

    #[test]
    fn dump_without_file_renders_empty_region() {
        let mut wb = empty_bench();
        let d = dispatch("dump 0 16", &mut wb);
        match d.result {
            CommandResult::ReplaceOutput(text) => {
                assert_eq!(text, "Dump @ 0x0, size 0\r\n\r\n");
            }
            other => panic!("expected output, got {other:?}"),
        }
    }
}
