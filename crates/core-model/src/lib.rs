//! The workbench model: the single owner of everything a command can
//! touch.
//!
//! `Workbench` bundles the optional loaded file, the view state derived
//! from it, and the boxed instruction decoder. The shell constructs
//! exactly one and threads `&mut Workbench` through every command handler;
//! there is no process-wide state anywhere in the engine.
//!
//! Invariants:
//! * `view.page_offset()` is always a multiple of `PAGE_SIZE`.
//! * Loading a file resets the view state atomically with the buffer swap;
//!   a failed load changes nothing (previous file, previous view).
//! * Page motion clamps to the last page start, never past end-of-file.

use core_disasm::InstructionDecoder;
use core_file::{BinaryFile, FileError};
use core_state::{PAGE_SIZE, ViewState};
use std::path::Path;
use tracing::info;

/// First offset of the page containing the final byte of a `size`-byte
/// file; 0 for an empty file.
pub fn last_page_start(size: usize) -> usize {
    if size == 0 {
        0
    } else {
        (size - 1) / PAGE_SIZE * PAGE_SIZE
    }
}

pub struct Workbench {
    file: Option<BinaryFile>,
    view: ViewState,
    decoder: Box<dyn InstructionDecoder>,
    vft_window: usize,
}

/// Default byte window disassembled per VFT entry.
pub const VFT_WINDOW: usize = 64;

impl Workbench {
    pub fn new(decoder: Box<dyn InstructionDecoder>) -> Self {
        Self {
            file: None,
            view: ViewState::new(),
            decoder,
            vft_window: VFT_WINDOW,
        }
    }

    /// Override the per-entry VFT disassembly window (configuration hook;
    /// the default is [`VFT_WINDOW`]).
    pub fn set_vft_window(&mut self, window: usize) {
        self.vft_window = window;
    }

    pub fn vft_window(&self) -> usize {
        self.vft_window
    }

    /// Load a new file, discarding the previous buffer and all derived
    /// state. On failure the current file and view survive untouched.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), FileError> {
        let loaded = BinaryFile::load(path.as_ref().to_path_buf())?;
        info!(
            target: "runtime",
            file = %loaded.path().display(),
            size_bytes = loaded.size(),
            "file_opened"
        );
        self.file = Some(loaded);
        self.view.reset();
        Ok(())
    }

    pub fn file(&self) -> Option<&BinaryFile> {
        self.file.as_ref()
    }

    pub fn file_size(&self) -> usize {
        self.file.as_ref().map_or(0, BinaryFile::size)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Split borrow for command handlers that need the file, the view, and
    /// the decoder at once.
    pub fn parts_mut(
        &mut self,
    ) -> (
        Option<&mut BinaryFile>,
        &mut ViewState,
        &mut dyn InstructionDecoder,
    ) {
        (self.file.as_mut(), &mut self.view, self.decoder.as_mut())
    }

    pub fn decoder_mut(&mut self) -> &mut dyn InstructionDecoder {
        self.decoder.as_mut()
    }

    /// Advance the page window, clamped to the last page start.
    pub fn next_page(&mut self) {
        let limit = last_page_start(self.file_size());
        let next = self.view.page_offset().saturating_add(PAGE_SIZE).min(limit);
        self.view.set_page_offset(next);
    }

    /// Retreat the page window, clamped to 0.
    pub fn prev_page(&mut self) {
        let prev = self.view.page_offset().saturating_sub(PAGE_SIZE);
        self.view.set_page_offset(prev);
    }

    /// Pull the page window back inside the file before composing the
    /// standing view. A no-op while the offset is already in range.
    pub fn normalize_page(&mut self) {
        let size = self.file_size();
        if self.view.page_offset() >= size {
            self.view.set_page_offset(last_page_start(size));
        }
    }
}
