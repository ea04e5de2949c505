//! Delimiter-aware line splitter.
//!
//! The upstream bulletins quote a field only when it contains the delimiter,
//! and only ever quote whole fields. The splitter mirrors that exactly: a
//! `"` opens a quoted span only when it is the first character of the
//! current field, the next `"` closes it, and any other `"` is literal text.
//! Quotes are kept in the output field. This is deliberately not RFC 4180;
//! see `classify` for where enclosing quotes are peeled off.

/// Delimiter used by the bulletin feed.
pub const DEFAULT_DELIMITER: char = ',';

/// Split one line into fields.
///
/// Edge cases: an empty line yields one empty field, a trailing delimiter
/// yields a trailing empty field, and an unterminated quote absorbs the rest
/// of the line into the current field.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            if in_quotes {
                in_quotes = false;
            } else if current.is_empty() {
                in_quotes = true;
            }
            // A quote after the first character neither opens nor closes.
            current.push(ch);
        } else if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}
