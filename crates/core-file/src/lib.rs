//! The byte-buffered file model.
//!
//! A `BinaryFile` owns an in-memory mirror of one on-disk file. Mutation
//! happens only through [`BinaryFile::patch`], which overwrites an
//! equal-length span in the mirror and then the same span on disk, so the
//! two images agree at every observable point. Patches never grow or
//! shrink the file; a span past the end is refused before anything is
//! touched. If the positioned disk write fails after the mirror was
//! updated, the saved previous bytes are copied back so the mirror keeps
//! matching the disk, and the error is surfaced to the caller.
//!
//! Loading reads the whole file up front. Concurrent modification of the
//! underlying file by another process is undefined; the write handle is
//! held only across a single patch.

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum FileError {
    #[error("file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("patch of {len} bytes at 0x{offset:x} exceeds file size {size}")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// An ordered sequence of octets mirroring one file on disk.
pub struct BinaryFile {
    path: PathBuf,
    buffer: Vec<u8>,
}

impl BinaryFile {
    /// Read `path` fully into memory. On failure nothing is constructed,
    /// so a caller holding an earlier `BinaryFile` keeps it unchanged.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let path = path.into();
        let buffer = fs::read(&path).inspect_err(|e| {
            error!(target: "io", file = %path.display(), ?e, "file_open_error");
        })?;
        debug!(
            target: "io",
            file = %path.display(),
            size_bytes = buffer.len(),
            "file_read_ok"
        );
        Ok(Self { path, buffer })
    }

    /// Overwrite `bytes.len()` bytes at `offset`, memory first, then the
    /// identical span on disk. The mirror is rolled back if the disk write
    /// fails.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<(), FileError> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.buffer.len())
            .ok_or(FileError::OutOfRange {
                offset,
                len: bytes.len(),
                size: self.buffer.len(),
            })?;
        let previous = self.buffer[offset..end].to_vec();
        self.buffer[offset..end].copy_from_slice(bytes);
        if let Err(e) = self.write_span(offset, bytes) {
            self.buffer[offset..end].copy_from_slice(&previous);
            error!(
                target: "io",
                file = %self.path.display(),
                offset,
                ?e,
                "patch_write_failed"
            );
            return Err(FileError::Io(e));
        }
        debug!(
            target: "io",
            file = %self.path.display(),
            offset,
            len = bytes.len(),
            "patch_ok"
        );
        Ok(())
    }

    fn write_span(&self, offset: usize, bytes: &[u8]) -> std::io::Result<()> {
        let mut f = OpenOptions::new().write(true).open(&self.path)?;
        f.seek(SeekFrom::Start(offset as u64))?;
        f.write_all(bytes)?;
        f.flush()
    }

    /// Immutable view of the whole buffer.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_reads_entire_file() {
        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0..512u32).map(|i| (i % 256) as u8).collect();
        let path = fixture(&dir, "blob.bin", &content);
        let file = BinaryFile::load(&path).unwrap();
        assert_eq!(file.size(), 512);
        assert_eq!(file.bytes(), &content[..]);
        assert_eq!(file.path(), path.as_path());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BinaryFile::load(dir.path().join("absent.bin")).is_err());
    }

    #[test]
    fn patch_updates_memory_and_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[0u8; 64]);
        let mut file = BinaryFile::load(&path).unwrap();
        file.patch(0x20, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(&file.bytes()[0x20..0x24], &[0xde, 0xad, 0xbe, 0xef]);
        let on_disk = fs::read(&path).unwrap();
        assert_eq!(on_disk, file.bytes());
    }

    #[test]
    fn patch_never_changes_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[7u8; 100]);
        let mut file = BinaryFile::load(&path).unwrap();
        for off in [0usize, 10, 96] {
            file.patch(off, &[1, 2, 3, 4]).unwrap();
            assert_eq!(file.size(), 100);
            assert_eq!(fs::read(&path).unwrap().len(), 100);
        }
    }

    #[test]
    fn patch_spanning_past_end_is_refused_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[0u8; 16]);
        let mut file = BinaryFile::load(&path).unwrap();
        let err = file.patch(14, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, FileError::OutOfRange { .. }));
        assert_eq!(file.bytes(), &[0u8; 16]);
        assert_eq!(fs::read(&path).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn patch_offset_overflow_is_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[0u8; 16]);
        let mut file = BinaryFile::load(&path).unwrap();
        let err = file.patch(usize::MAX, &[1]).unwrap_err();
        assert!(matches!(err, FileError::OutOfRange { .. }));
    }

    #[test]
    fn patch_at_exact_end_boundary_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[0u8; 8]);
        let mut file = BinaryFile::load(&path).unwrap();
        file.patch(6, &[0xaa, 0xbb]).unwrap();
        assert_eq!(&file.bytes()[6..], &[0xaa, 0xbb]);
    }

    #[cfg(unix)]
    #[test]
    fn failed_disk_write_rolls_back_the_mirror() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "blob.bin", &[0x11u8; 32]);
        let mut file = BinaryFile::load(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
        let err = file.patch(4, &[0xff, 0xff]).unwrap_err();
        assert!(matches!(err, FileError::Io(_)));
        // Mirror restored, so it still agrees with the untouched disk image.
        assert_eq!(file.bytes(), &[0x11u8; 32]);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0x11u8; 32]);
    }
}
