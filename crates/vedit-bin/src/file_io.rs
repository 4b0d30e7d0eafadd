//! Reading and writing the edited file.
//!
//! The engine only ever sees `\n` line breaks. CRLF files are normalized on load and the
//! dominant style is restored on write; a lone `\r` is ordinary text.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub original: LineEnding,
    /// Both `\r\n` and bare `\n` breaks were present.
    pub mixed: bool,
}

pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let crlf = input.matches("\r\n").count();
    let lf = input.matches('\n').count() - crlf;
    let original = if crlf > lf {
        LineEnding::Crlf
    } else {
        LineEnding::Lf
    };
    let text = if crlf > 0 {
        input.replace("\r\n", "\n")
    } else {
        input.to_string()
    };
    NormalizedText {
        text,
        original,
        mixed: crlf > 0 && lf > 0,
    }
}

/// Buffer text with `\n` expanded to `ending`.
pub fn denormalize(text: &str, ending: LineEnding) -> String {
    match ending {
        LineEnding::Lf => text.to_string(),
        LineEnding::Crlf => text.replace('\n', "\r\n"),
    }
}

pub fn read_document(path: &Path) -> Result<NormalizedText> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let norm = normalize_line_endings(&content);
    debug!(
        target: "io",
        file = %path.display(),
        size_bytes = content.len(),
        line_count = norm.text.lines().count(),
        ending = ?norm.original,
        "file_read_ok"
    );
    if norm.mixed {
        warn!(target: "io", file = %path.display(), "mixed_line_endings_detected");
    }
    Ok(norm)
}

pub fn write_document(path: &Path, text: &str, ending: LineEnding) -> Result<usize> {
    let out = denormalize(text, ending);
    std::fs::write(path, &out).with_context(|| format!("writing {}", path.display()))?;
    debug!(target: "io", file = %path.display(), size_bytes = out.len(), "file_write_ok");
    Ok(out.len())
}
