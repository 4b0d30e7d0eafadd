//! Vim-style key notation (`3dw<Esc>`, `<C-r>`, `<lt>`).
//!
//! Used by tests, key scripts fed to the headless runner, and `:registers`
//! output for recorded macros. Unknown `<...>` groups are taken literally,
//! character by character, so a stray `<` never swallows input.

use crate::{KeyCode, KeyEvent, KeyModifiers};

/// Parse a key-notation string into key events.
pub fn parse_keys(input: &str) -> Vec<KeyEvent> {
    let mut out = Vec::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '<'
            && let Some(close) = chars[i + 1..].iter().position(|&ch| ch == '>')
        {
            let name: String = chars[i + 1..i + 1 + close].iter().collect();
            if let Some(key) = named_key(&name) {
                out.push(key);
                i += close + 2;
                continue;
            }
        }
        out.push(KeyEvent::char(c));
        i += 1;
    }
    out
}

fn named_key(name: &str) -> Option<KeyEvent> {
    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        _ => {
            let rest = lower.strip_prefix("c-")?;
            let mut it = rest.chars();
            let ch = it.next()?;
            if it.next().is_some() {
                return None;
            }
            return Some(match ch {
                '[' => KeyEvent::plain(KeyCode::Esc),
                _ => KeyEvent::ctrl(ch),
            });
        }
    };
    Some(KeyEvent::plain(code))
}

/// Render key events back into notation. `parse_keys(&format_keys(k)) == k` for every
/// sequence produced by `parse_keys`.
pub fn format_keys(keys: &[KeyEvent]) -> String {
    let mut s = String::new();
    for key in keys {
        let ctrl = key.mods.contains(KeyModifiers::CTRL);
        match key.code {
            KeyCode::Char(c) if ctrl => {
                s.push_str("<C-");
                s.push(c);
                s.push('>');
            }
            KeyCode::Char('<') => s.push_str("<lt>"),
            KeyCode::Char(c) => s.push(c),
            KeyCode::Enter => s.push_str("<CR>"),
            KeyCode::Esc => s.push_str("<Esc>"),
            KeyCode::Backspace => s.push_str("<BS>"),
            KeyCode::Delete => s.push_str("<Del>"),
            KeyCode::Tab => s.push_str("<Tab>"),
            KeyCode::Up => s.push_str("<Up>"),
            KeyCode::Down => s.push_str("<Down>"),
            KeyCode::Left => s.push_str("<Left>"),
            KeyCode::Right => s.push_str("<Right>"),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_and_named_keys() {
        let keys = parse_keys("3dw<Esc>");
        assert_eq!(
            keys,
            vec![
                KeyEvent::char('3'),
                KeyEvent::char('d'),
                KeyEvent::char('w'),
                KeyEvent::plain(KeyCode::Esc),
            ]
        );
    }

    #[test]
    fn parses_control_chords_case_insensitively() {
        assert_eq!(parse_keys("<C-r>"), vec![KeyEvent::ctrl('r')]);
        assert_eq!(parse_keys("<c-R>"), vec![KeyEvent::ctrl('r')]);
        assert_eq!(parse_keys("<C-[>"), vec![KeyEvent::plain(KeyCode::Esc)]);
    }

    #[test]
    fn unknown_group_is_literal() {
        let keys = parse_keys("<foo>");
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], KeyEvent::char('<'));
        assert_eq!(parse_keys("a<b"), vec![
            KeyEvent::char('a'),
            KeyEvent::char('<'),
            KeyEvent::char('b')
        ]);
    }

    #[test]
    fn format_round_trips_special_keys() {
        let src = "ihello<CR>x<lt>y<Esc><C-r>";
        let keys = parse_keys(src);
        assert_eq!(parse_keys(&format_keys(&keys)), keys);
        assert_eq!(format_keys(&keys), src);
    }
}
