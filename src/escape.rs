//! Token escaping for TOON text.
//!
//! Six characters carry structure in TOON: backslash, comma, semicolon, the
//! two braces, and newline. [`escape`] prefixes each with a backslash (newline
//! becomes the two characters `\n`) so a token can sit on a single line inside
//! a field list or an element row. [`unescape`] is its exact inverse.
//!
//! Cells of element rows additionally escape parentheses, which delimit
//! nested sub-lists inside a row. When the encoder writes a value, a space or
//! tab at either end of it is escaped as well (`\ `), since surrounding
//! whitespace is otherwise indentation or padding.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{escape, unescape};
//!
//! let raw = "Bo,b {admin}; line\nbreak";
//! let escaped = escape(raw);
//! assert_eq!(escaped, r"Bo\,b \{admin\}\; line\nbreak");
//! assert_eq!(unescape(&escaped), raw);
//! ```

/// Escapes the structural characters of `text`.
///
/// Backslash is handled in the same left-to-right pass as everything else,
/// so no character is ever escaped twice.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

/// Escapes a whole value token for a field line or an element line.
///
/// On top of [`escape`], whitespace at either end of the token is preceded by
/// a backslash, so it is neither read as indentation nor trimmed on decode.
pub(crate) fn escape_token(text: &str) -> String {
    escape_edges(text, false)
}

/// Escapes a value for use as one cell of an element row or sub-list.
pub(crate) fn escape_cell(text: &str) -> String {
    escape_edges(text, true)
}

fn escape_edges(text: &str, cell: bool) -> String {
    let last = text.char_indices().last().map_or(0, |(idx, _)| idx);
    let mut out = String::with_capacity(text.len() + 8);
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' if cell => out.push_str("\\("),
            ')' if cell => out.push_str("\\)"),
            ' ' | '\t' if idx == 0 || idx == last => {
                out.push('\\');
                out.push(ch);
            }
            other => push_escaped(&mut out, other),
        }
    }
    out
}

#[inline]
fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        ',' => out.push_str("\\,"),
        ';' => out.push_str("\\;"),
        '{' => out.push_str("\\{"),
        '}' => out.push_str("\\}"),
        '\n' => out.push_str("\\n"),
        other => out.push(other),
    }
}

/// Reverses [`escape`] (and cell escaping).
///
/// An escaped space or tab yields the character itself. Unknown escape pairs
/// and a trailing lone backslash are kept verbatim.
#[must_use]
pub fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(c @ ('\\' | ',' | ';' | '{' | '}' | '(' | ')' | ' ' | '\t')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Byte offset of the first occurrence of `target` not preceded by an escape.
pub(crate) fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == target {
            return Some(idx);
        }
    }
    None
}

/// Splits on unescaped `delim`, leaving escape sequences in the pieces.
pub(crate) fn split_unescaped(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == delim {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Splits a row into cells on unescaped commas outside parentheses.
///
/// Returns `None` when the parentheses do not balance.
pub(crate) fn split_cells(text: &str) -> Option<Vec<&str>> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                cells.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    cells.push(&text[start..]);
    Some(cells)
}

/// Trims surrounding whitespace, keeping a trailing space or tab that is escaped.
pub(crate) fn trim_token(text: &str) -> &str {
    let text = text.trim_start();
    let kept = text.trim_end();
    match text[kept.len()..].chars().next() {
        Some(ch @ (' ' | '\t')) if ends_with_escape(kept) => &text[..kept.len() + ch.len_utf8()],
        _ => kept,
    }
}

/// Strips one trailing unescaped `;` from an element line.
pub(crate) fn strip_terminator(text: &str) -> &str {
    match text.strip_suffix(';') {
        Some(rest) if !ends_with_escape(rest) => rest,
        _ => text,
    }
}

/// Returns the inside of a `(...)` group whose closing parenthesis is unescaped.
pub(crate) fn strip_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    if ends_with_escape(inner) {
        None
    } else {
        Some(inner)
    }
}

/// True when `text` ends in an odd run of backslashes, i.e. escapes whatever follows.
fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_each_special_character() {
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("a,b"), "a\\,b");
        assert_eq!(escape("a;b"), "a\\;b");
        assert_eq!(escape("{a}"), "\\{a\\}");
        assert_eq!(escape("a\nb"), "a\\nb");
        assert_eq!(escape("plain text: ok (x)"), "plain text: ok (x)");
    }

    #[test]
    fn test_unescape_literal_backslash_n_is_not_newline() {
        // a backslash followed by the letter n, not a newline
        let raw = "C:\\new";
        assert_eq!(escape(raw), "C:\\\\new");
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn test_unescape_backslash_before_comma() {
        let raw = "\\,";
        assert_eq!(escape(raw), "\\\\\\,");
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn test_unescape_keeps_unknown_and_dangling() {
        assert_eq!(unescape("a\\tb"), "a\\tb");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_cell_escape_parentheses() {
        assert_eq!(escape_cell("f(x),y"), "f\\(x\\)\\,y");
        assert_eq!(unescape("f\\(x\\)\\,y"), "f(x),y");
    }

    #[test]
    fn test_token_edges_keep_their_whitespace() {
        assert_eq!(escape_token("  indented"), "\\  indented");
        assert_eq!(escape_token("a b "), "a b\\ ");
        assert_eq!(escape_token(" "), "\\ ");
        assert_eq!(escape_token("\t"), "\\\t");
        assert_eq!(escape_cell(" (x) "), "\\ \\(x\\)\\ ");
        assert_eq!(escape("  indented"), "  indented");

        for raw in ["  indented", "a b ", " ", "\\ ", " \\", "\tx\t"] {
            let token = escape_token(raw);
            let line = format!("  {}  ", token);
            assert_eq!(trim_token(&line), token, "{:?}", raw);
            assert_eq!(unescape(trim_token(&line)), raw);
        }
    }

    #[test]
    fn test_trim_token() {
        assert_eq!(trim_token("  plain  "), "plain");
        assert_eq!(trim_token("x\\  "), "x\\ ");
        assert_eq!(trim_token("x\\\\  "), "x\\\\");
        assert_eq!(trim_token("   "), "");
    }

    #[test]
    fn test_find_unescaped() {
        assert_eq!(find_unescaped("name: Bob", ':'), Some(4));
        assert_eq!(find_unescaped("a\\:b: c", ':'), Some(4));
        assert_eq!(find_unescaped("no colon", ':'), None);
    }

    #[test]
    fn test_split_unescaped() {
        assert_eq!(split_unescaped("1,Bo\\,b", ','), vec!["1", "Bo\\,b"]);
        assert_eq!(split_unescaped("", ','), vec![""]);
    }

    #[test]
    fn test_split_cells_respects_parentheses() {
        assert_eq!(
            split_cells("1,(a,b),(\\),c),x").unwrap(),
            vec!["1", "(a,b)", "(\\),c)", "x"]
        );
        assert!(split_cells("1,(a,b").is_none());
        assert!(split_cells("1,a)").is_none());
    }

    #[test]
    fn test_strip_terminator() {
        assert_eq!(strip_terminator("1,Alice;"), "1,Alice");
        assert_eq!(strip_terminator("a\\;;"), "a\\;");
        assert_eq!(strip_terminator("a\\;"), "a\\;");
        assert_eq!(strip_terminator("a\\\\;"), "a\\\\");
        assert_eq!(strip_terminator("no terminator"), "no terminator");
    }

    #[test]
    fn test_strip_parens() {
        assert_eq!(strip_parens("(a,b)"), Some("a,b"));
        assert_eq!(strip_parens("()"), Some(""));
        assert_eq!(strip_parens("(a\\)"), None);
        assert_eq!(strip_parens("a,b"), None);
    }
}
