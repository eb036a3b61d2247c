//! Configuration loading and parsing.
//!
//! `hexscope.toml` is looked up in the working directory first, then the
//! platform config dir. Everything is optional and unknown fields are
//! tolerated so the file can evolve without breaking older binaries; a
//! file that fails to parse falls back to defaults rather than aborting
//! startup. The defaults preserve the engine's documented behavior, in
//! particular the 64-byte per-entry VFT disassembly window.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct DisasmConfig {
    /// Bytes disassembled per VFT entry.
    #[serde(default = "DisasmConfig::default_vft_window")]
    pub vft_window: usize,
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            vft_window: Self::default_vft_window(),
        }
    }
}

impl DisasmConfig {
    const fn default_vft_window() -> usize {
        64
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Fallback tracing filter when `RUST_LOG` is unset.
    #[serde(default = "LogConfig::default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::default_filter(),
        }
    }
}

impl LogConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub disasm: DisasmConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform
/// config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("hexscope.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("hexscope").join("hexscope.toml");
    }
    PathBuf::from("hexscope.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(
                    target: "config",
                    path = %path.display(),
                    vft_window = file.disasm.vft_window,
                    "config_loaded"
                );
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), %e, "config_parse_failed");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.file.disasm.vft_window, 64);
        assert_eq!(cfg.file.log.filter, "info");
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexscope.toml");
        fs::write(&path, "[disasm]\nvft_window = 128\n\n[log]\nfilter = \"debug\"\n").unwrap();
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.disasm.vft_window, 128);
        assert_eq!(cfg.file.log.filter, "debug");
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexscope.toml");
        fs::write(&path, "[log]\nfilter = \"trace\"\n").unwrap();
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.disasm.vft_window, 64);
        assert_eq!(cfg.file.log.filter, "trace");
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexscope.toml");
        fs::write(&path, "[future]\nshiny = true\n").unwrap();
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.disasm.vft_window, 64);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hexscope.toml");
        fs::write(&path, "not [valid toml").unwrap();
        let cfg = load_from(Some(path)).unwrap();
        assert_eq!(cfg.file.disasm.vft_window, 64);
        assert!(cfg.raw.is_none());
    }
}
