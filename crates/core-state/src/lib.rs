//! Per-session view state: the current page window, the resumable search
//! cursor, and the user's accumulated bookmarks and patch templates.
//!
//! All of this is derived state tied to whichever file is open. Loading a
//! new file calls [`ViewState::reset`], which discards everything; nothing
//! here survives the session or is persisted to disk. Bookmark offsets are
//! recorded as typed and never re-validated; a later patch or an undersized
//! file simply renders them stale, which is the user's business.

use core_bytes::Pattern;
use tracing::debug;

/// Bytes per standing-view page. The page offset is always a multiple of
/// this value.
pub const PAGE_SIZE: usize = 4096;

/// A user-supplied label attached to an offset. Duplicates are allowed;
/// insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub offset: usize,
    pub label: String,
}

/// A named literal-byte payload with a default application offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTemplate {
    pub name: String,
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// The search cursor left behind by the most recent successful `find`.
#[derive(Debug, Clone)]
pub struct LastFind {
    pub pattern: Pattern,
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct ViewState {
    page_offset: usize,
    last_find: Option<LastFind>,
    bookmarks: Vec<Bookmark>,
    templates: Vec<PatchTemplate>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    /// Set the page offset directly. Callers are responsible for keeping it
    /// page-aligned; prefer [`ViewState::snap_page_to`].
    pub fn set_page_offset(&mut self, offset: usize) {
        self.page_offset = offset;
    }

    /// Move the page window so that `offset` falls inside it.
    pub fn snap_page_to(&mut self, offset: usize) {
        self.page_offset = offset / PAGE_SIZE * PAGE_SIZE;
    }

    pub fn last_find(&self) -> Option<&LastFind> {
        self.last_find.as_ref()
    }

    /// Remember a successful hit so `findnext` can resume one past it.
    pub fn record_find(&mut self, pattern: Pattern, offset: usize) {
        self.last_find = Some(LastFind { pattern, offset });
    }

    /// Drop the search cursor. Patching does this: the hit may no longer
    /// match the bytes it was found against.
    pub fn clear_last_find(&mut self) {
        self.last_find = None;
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn add_bookmark(&mut self, offset: usize, label: impl Into<String>) {
        let label = label.into();
        debug!(target: "state", offset, label = label.as_str(), "bookmark_added");
        self.bookmarks.push(Bookmark { offset, label });
    }

    pub fn templates(&self) -> &[PatchTemplate] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&PatchTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Save a template; a name collision overwrites the stored offset and
    /// payload in place.
    pub fn upsert_template(&mut self, name: impl Into<String>, offset: usize, bytes: Vec<u8>) {
        let name = name.into();
        debug!(
            target: "state",
            name = name.as_str(),
            offset,
            len = bytes.len(),
            "template_saved"
        );
        if let Some(existing) = self.templates.iter_mut().find(|t| t.name == name) {
            existing.offset = offset;
            existing.bytes = bytes;
        } else {
            self.templates.push(PatchTemplate {
                name,
                offset,
                bytes,
            });
        }
    }

    /// Discard everything derived from the previously loaded file.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
