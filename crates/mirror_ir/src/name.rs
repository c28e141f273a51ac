//! Type and member name utilities.
//!
//! Member tables are sorted by `(class, name hash)`; hashes only narrow the
//! search, collisions are always resolved by exact string comparison.
//!
//! Custom names registered for a raw type are derived onto its pointer and
//! array variants: registering `"Alias"` for `"Foo"` turns `"const Foo *"`
//! into `"const Alias *"`.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Hash of a type or member name.
pub type NameHash = u64;

/// Hash a name for sorted-table lookup.
#[inline]
pub fn name_hash(name: &str) -> NameHash {
    let mut hasher = FxHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

/// Trim a name and collapse internal whitespace runs to one space.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Whether `part` occurs in `text` and is directly followed by whitespace.
fn space_follows(text: &str, part: &str) -> bool {
    text.find(part)
        .and_then(|pos| text[pos + part.len()..].chars().next())
        .is_some_and(char::is_whitespace)
}

/// Whether the last occurrence of `part` in `text` is directly preceded by
/// whitespace.
fn space_precedes(text: &str, part: &str) -> bool {
    text.rfind(part)
        .and_then(|pos| text[..pos].chars().next_back())
        .is_some_and(char::is_whitespace)
}

/// Replace the raw type name inside `src` with `custom`.
///
/// Whitespace is ignored while searching; a single space is kept around the
/// replaced part where `src` had one. Returns `src` unchanged when it does not
/// contain `raw`.
pub fn derive_name(src: &str, raw: &str, custom: &str) -> String {
    let compact_src = strip_whitespace(src);
    let compact_raw = strip_whitespace(raw);
    if compact_raw.is_empty() {
        return src.to_owned();
    }
    let Some(start) = compact_src.find(&compact_raw) else {
        return src.to_owned();
    };

    let head = &compact_src[..start];
    let tail = &compact_src[start + compact_raw.len()..];

    let mut out = String::with_capacity(head.len() + custom.len() + tail.len() + 2);
    out.push_str(head);
    if !head.is_empty() && space_follows(src, head) {
        out.push(' ');
    }
    out.push_str(custom);
    if !tail.is_empty() && space_precedes(src, tail) {
        out.push(' ');
    }
    out.push_str(tail);
    out
}
