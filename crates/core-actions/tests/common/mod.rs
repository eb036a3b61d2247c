#![allow(dead_code)] // Shared across integration test binaries; each uses a subset.

use core_disasm::{IcedDecoder, ScriptedDecoder};
use core_model::Workbench;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Fixture {
    pub workbench: Workbench,
    pub path: PathBuf,
    _dir: TempDir, // keeps the backing file alive for the test's duration
}

/// A workbench over a `len`-byte file whose bytes are `i mod 256`, using
/// the real decoder.
pub fn counting_fixture(len: usize) -> Fixture {
    fixture_with_bytes((0..len).map(|i| (i % 256) as u8).collect())
}

pub fn fixture_with_bytes(content: Vec<u8>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.bin");
    fs::write(&path, &content).unwrap();
    let mut workbench = Workbench::new(Box::new(IcedDecoder::new()));
    workbench.open(&path).unwrap();
    Fixture {
        workbench,
        path,
        _dir: dir,
    }
}

/// Same, but with the fixed-width scripted decoder for deterministic
/// disassembly output.
pub fn scripted_fixture(content: Vec<u8>, width: usize) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.bin");
    fs::write(&path, &content).unwrap();
    let mut workbench = Workbench::new(Box::new(ScriptedDecoder::new(width)));
    workbench.open(&path).unwrap();
    Fixture {
        workbench,
        path,
        _dir: dir,
    }
}
