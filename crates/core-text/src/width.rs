//! Display width of grapheme clusters.
//!
//! Vertical motions keep a sticky *display* column so that moving through lines
//! holding wide (CJK) characters lands visually above/below the starting point.
//! Every width decision flows through [`egc_width`].

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Column width of one grapheme cluster. Never zero for a non-empty cluster so
/// that the cursor always advances.
pub fn egc_width(egc: &str) -> usize {
    if egc.is_empty() {
        return 0;
    }
    if egc == "\t" {
        return 1;
    }
    UnicodeWidthStr::width(egc).max(1)
}

/// Width of a single char (control chars count as one column).
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(1).max(1)
}

/// Display column of char column `col` within `line`.
pub fn display_col(line: &str, col: usize) -> usize {
    let mut chars = 0;
    let mut width = 0;
    for g in line.graphemes(true) {
        if chars >= col {
            break;
        }
        chars += g.chars().count();
        width += egc_width(g);
    }
    width
}

/// Char column of the grapheme covering display column `target` (line length when
/// `target` lies past the end).
pub fn col_for_display(line: &str, target: usize) -> usize {
    let mut chars = 0;
    let mut width = 0;
    for g in line.graphemes(true) {
        let w = egc_width(g);
        if width + w > target {
            return chars;
        }
        width += w;
        chars += g.chars().count();
    }
    chars
}
