//! vedit entrypoint: replays a key script against a file and prints the result.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::Editor;
use core_config::load_from;
use core_events::parse_keys;
use core_text::Buffer;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

mod clipboard;
mod file_io;
mod runtime;

use file_io::LineEnding;
use runtime::{Document, EditorRuntime, spawn_key_script};

const LOG_FILE: &str = "vedit.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vedit", version, about = "Headless modal text editor")]
struct Args {
    /// File to edit (UTF-8). A missing file starts an empty buffer with that name.
    pub path: Option<PathBuf>,
    /// Keys to replay, in key notation (`3dw`, `ciwfoo<Esc>`, `:wq<CR>`).
    #[arg(long, conflicts_with = "keys_file")]
    pub keys: Option<String>,
    /// Read the key script from a file; line breaks in it are ignored.
    #[arg(long = "keys-file")]
    pub keys_file: Option<PathBuf>,
    /// Configuration file (overrides discovery of `vedit.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write the buffer back to PATH once the script has run.
    #[arg(long)]
    pub write: bool,
    /// Directory receiving `vedit.log`.
    #[arg(long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,
}

fn configure_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
        .ok()
        .map(|_| guard)
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// Key script from `--keys` or `--keys-file`; empty when neither is given.
fn read_script(args: &Args) -> Result<String> {
    if let Some(keys) = &args.keys {
        return Ok(keys.clone());
    }
    match &args.keys_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading key script {}", path.display()))?;
            Ok(raw.lines().collect())
        }
        None => Ok(String::new()),
    }
}

/// Initial buffer text and document for `path`.
fn load_document(path: Option<&Path>) -> Result<(String, Document)> {
    let Some(path) = path else {
        return Ok((String::new(), Document::default()));
    };
    if !path.exists() {
        info!(target: "io", file = %path.display(), "new_file");
        let doc = Document {
            path: Some(path.to_path_buf()),
            ..Document::default()
        };
        return Ok((String::new(), doc));
    }
    let norm = file_io::read_document(path)?;
    let doc = Document {
        path: Some(path.to_path_buf()),
        ending: norm.original,
        saved: norm.text.clone(),
    };
    Ok((norm.text, doc))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(&args.log_dir);
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = load_from(args.config.clone())?;
    let options = config.engine_options();
    let (text, doc) = load_document(args.path.as_deref())?;
    let script = read_script(&args)?;
    let keys = parse_keys(&script);
    info!(
        target: "runtime.startup",
        path = ?doc.path,
        crlf = doc.ending == LineEnding::Crlf,
        keys = keys.len(),
        config_override = args.config.is_some(),
        clipboard = config.file.clipboard.enabled,
        "bootstrap_complete"
    );

    let editor = Editor::new(Buffer::from(text.as_str()), options);
    let (mut runtime, tx) = EditorRuntime::new(editor, doc, config.file.clipboard.enabled);
    let feeder = spawn_key_script(keys, tx);
    runtime.run().await?;
    if let Err(e) = feeder.await {
        error!(target: "runtime", error = %e, "key_script_task_failed");
    }

    if args.write {
        let msg = runtime.write(None)?;
        info!(target: "io", %msg, "write_on_exit");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(runtime.editor().buffer_text().as_bytes())?;
    stdout.flush()?;
    if let Some(status) = runtime.editor().status() {
        eprintln!("{status}");
    }
    info!(target: "runtime", modified = runtime.is_modified(), "shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::ffi::OsStr;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn keys_and_keys_file_conflict() {
        let err = Args::try_parse_from(["vedit", "--keys", "x", "--keys-file", "k.txt"]);
        assert!(err.is_err());
    }

    #[test]
    fn key_file_lines_are_joined() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("keys.txt");
        std::fs::write(&script, "dw\nx\n").unwrap();
        let args = Args::try_parse_from([
            OsStr::new("vedit"),
            OsStr::new("--keys-file"),
            script.as_os_str(),
        ])
        .unwrap();
        assert_eq!(read_script(&args).unwrap(), "dwx");
    }

    #[test]
    fn missing_path_starts_named_empty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let (text, doc) = load_document(Some(&path)).unwrap();
        assert_eq!(text, "");
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn crlf_file_loads_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();
        let (text, doc) = load_document(Some(&path)).unwrap();
        assert_eq!(text, "a\nb\n");
        assert_eq!(doc.ending, LineEnding::Crlf);
        assert_eq!(doc.saved, text);
    }
}
