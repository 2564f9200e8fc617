//! Delimited-text helpers shared by every persisted table.
//!
//! Fields are separated by `,` and list items by `;`. A field containing a
//! separator, a backslash or a line break is written with backslash escapes
//! (`\,` `\;` `\\` `\n` `\r`); any other field is written verbatim, so plain
//! data keeps the historical layout byte for byte.
//!
//! Splitting works on the *raw* (still escaped) text so that nested
//! structures (a `;`-list inside a `,`-row, a message record at the end of a
//! row) can be peeled one level at a time. Only leaf values are unescaped.

use crate::constants::{ESCAPE_CHAR, FIELD_SEPARATOR, LIST_SEPARATOR};
use crate::error::RecordError;

/// Escape a leaf value for storage.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`].
pub fn unescape(raw: &str) -> Result<String, RecordError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE_CHAR {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(RecordError::UnknownEscape(other)),
            None => return Err(RecordError::DanglingEscape),
        }
    }
    Ok(out)
}

/// Split `raw` at unescaped occurrences of `sep`, producing at most `max`
/// pieces. The last piece holds the untouched remainder.
pub fn split_raw(raw: &str, sep: char, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if pieces.len() + 1 == max {
            break;
        }
        if escaped {
            escaped = false;
        } else if c == ESCAPE_CHAR {
            escaped = true;
        } else if c == sep {
            pieces.push(&raw[start..i]);
            start = i + c.len_utf8();
        }
    }
    pieces.push(&raw[start..]);
    pieces
}

/// Split a row into exactly `count` raw fields, the last one being the
/// remainder of the line.
pub fn split_row(raw: &str, count: usize) -> Result<Vec<&str>, RecordError> {
    let fields = split_raw(raw, FIELD_SEPARATOR, count);
    if fields.len() != count {
        return Err(RecordError::FieldCount {
            expected: count,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Join already-escaped fields into one row.
pub fn join_fields<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(field.as_ref());
    }
    out
}

/// Escape and `;`-join a list of leaf values. An empty list is an empty field.
pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(LIST_SEPARATOR);
        }
        out.push_str(&escape(item.as_ref()));
    }
    out
}

/// Parse a `;`-joined list. Empty items are dropped, so an empty field is an
/// empty list.
pub fn split_list(raw: &str) -> Result<Vec<String>, RecordError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    split_raw(raw, LIST_SEPARATOR, usize::MAX)
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(unescape)
        .collect()
}
