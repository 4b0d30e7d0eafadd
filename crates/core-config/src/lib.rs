//! Configuration loading and parsing.
//!
//! Parses `vedit.toml` (or an override path provided by the binary). Every key is optional;
//! absent keys take their defaults and unknown keys are ignored so older files keep loading.
//! A file that fails to parse is logged and replaced by the defaults.
//!
//! ```toml
//! [editor]
//! undo_levels = 100
//! shift_width = 2
//! max_count = 999999
//! macro_depth = 64
//! status_ttl_ms = 3000
//!
//! [clipboard]
//! enabled = true
//! ```

use anyhow::Result;
use core_state::EngineOptions;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "vedit.toml";

const SHIFT_WIDTH_MAX: usize = 16;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_undo_levels")]
    pub undo_levels: usize,
    #[serde(default = "EditorConfig::default_shift_width")]
    pub shift_width: usize,
    #[serde(default = "EditorConfig::default_max_count")]
    pub max_count: usize,
    #[serde(default = "EditorConfig::default_macro_depth")]
    pub macro_depth: usize,
    #[serde(default = "EditorConfig::default_status_ttl_ms")]
    pub status_ttl_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_levels: Self::default_undo_levels(),
            shift_width: Self::default_shift_width(),
            max_count: Self::default_max_count(),
            macro_depth: Self::default_macro_depth(),
            status_ttl_ms: Self::default_status_ttl_ms(),
        }
    }
}

impl EditorConfig {
    const fn default_undo_levels() -> usize {
        100
    }
    const fn default_shift_width() -> usize {
        2
    }
    const fn default_max_count() -> usize {
        999_999
    }
    const fn default_macro_depth() -> usize {
        64
    }
    const fn default_status_ttl_ms() -> u64 {
        3000
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ClipboardConfig {
    #[serde(default = "ClipboardConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
        }
    }
}

impl ClipboardConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file contents when one was read.
    pub raw: Option<String>,
    pub file: ConfigFile,
    pub path: Option<PathBuf>,
}

/// Best-effort config path: `./vedit.toml`, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vedit").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

fn clamp_logged(key: &'static str, raw: usize, min: usize, max: usize) -> usize {
    let clamped = raw.clamp(min, max);
    if clamped != raw {
        info!(target: "config", key, raw, clamped, min, max, "config_value_clamped");
    }
    clamped
}

impl Config {
    /// Runtime engine options derived from the file, with out-of-range values clamped.
    pub fn engine_options(&self) -> EngineOptions {
        let e = &self.file.editor;
        EngineOptions {
            undo_levels: clamp_logged("undo_levels", e.undo_levels, 1, usize::MAX),
            shift_width: clamp_logged("shift_width", e.shift_width, 1, SHIFT_WIDTH_MAX),
            max_count: clamp_logged("max_count", e.max_count, 1, usize::MAX),
            macro_depth: clamp_logged("macro_depth", e.macro_depth, 1, usize::MAX),
            status_ttl: Duration::from_millis(e.status_ttl_ms),
            clipboard_enabled: self.file.clipboard.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), body).unwrap();
        tmp
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
        assert_eq!(cfg.engine_options(), EngineOptions::default());
    }

    #[test]
    fn parses_editor_section() {
        let tmp = write_config("[editor]\nundo_levels = 7\nshift_width = 4\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let opts = cfg.engine_options();
        assert_eq!(opts.undo_levels, 7);
        assert_eq!(opts.shift_width, 4);
        assert_eq!(opts.max_count, 999_999);
        assert!(opts.clipboard_enabled);
    }

    #[test]
    fn parses_clipboard_section() {
        let tmp = write_config("[clipboard]\nenabled = false\n[editor]\nstatus_ttl_ms = 10\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let opts = cfg.engine_options();
        assert!(!opts.clipboard_enabled);
        assert_eq!(opts.status_ttl, Duration::from_millis(10));
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = write_config("[editor\nundo_levels = ");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn clamp_logging_uses_config_target() {
        let tmp = write_config("[editor]\nshift_width = 40\nundo_levels = 0\n");
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let opts = with_default(subscriber, || cfg.engine_options());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("config_value_clamped"));
        assert_eq!(opts.shift_width, 16);
        assert_eq!(opts.undo_levels, 1);
    }
}
