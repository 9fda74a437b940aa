//! Purpose: Resolve and assign segmented paths (`issues.total`, `issues[0].id`) in JSON values.
//! Exports: `resolve_path`, `assign_path`, `split_path`.
//! Role: The only way the projector reads from sources or writes dotted keys into output.
//! Invariants: Both functions are total over every JSON shape; nothing here panics.
//! Invariants: A key that exists verbatim (dots included) wins over segment splitting.
//! Notes: Segments are untyped strings; numeric segments index arrays, any segment keys objects.

use serde_json::{Map, Value};

/// Look up `path` inside `value`. `None` means the path does not resolve.
///
/// A JSON `null` that is present at the path resolves to `Some(&Value::Null)`.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(found) = value.as_object().and_then(|map| map.get(path)) {
        return Some(found);
    }
    split_path(path)
        .iter()
        .try_fold(value, |current, segment| step(current, segment))
}

/// Store `value` at `path` inside `map`, creating intermediate objects.
///
/// Intermediates that exist but are not objects are replaced by objects.
pub fn assign_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    if map.contains_key(path) {
        map.insert(path.to_string(), value);
        return;
    }
    let segments = split_path(path);
    let Some((last, parents)) = segments.split_last() else {
        map.insert(path.to_string(), value);
        return;
    };

    let mut cursor = map;
    for segment in parents {
        let slot = cursor
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(inner) = slot else {
            return;
        };
        cursor = inner;
    }
    cursor.insert(last.clone(), value);
}

/// Split a path into its segments.
///
/// Accepts `a.b`, `a[0]`, `a["b.c"]` and `a['b']`. An unterminated bracket is
/// kept literally as part of the current key.
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut after_bracket = false;
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' if after_bracket => after_bracket = false,
            '.' => segments.push(std::mem::take(&mut current)),
            '[' => {
                let rest: String = chars.clone().collect();
                match parse_bracket(&rest) {
                    Some((inner, consumed)) => {
                        if !current.is_empty() {
                            segments.push(std::mem::take(&mut current));
                        }
                        segments.push(inner);
                        for _ in 0..consumed {
                            chars.next();
                        }
                        after_bracket = true;
                    }
                    None => {
                        current.push(ch);
                        after_bracket = false;
                    }
                }
            }
            other => {
                current.push(other);
                after_bracket = false;
            }
        }
    }

    if !after_bracket {
        segments.push(current);
    }
    segments
}

// Parses the body of a bracket segment (text after `[`). Returns the segment
// and the number of chars consumed, including the closing `]`.
fn parse_bracket(rest: &str) -> Option<(String, usize)> {
    let mut chars = rest.chars();
    let quote = match rest.chars().next() {
        Some(q @ ('"' | '\'')) => {
            chars.next();
            Some(q)
        }
        _ => None,
    };

    let mut inner = String::new();
    let mut consumed = usize::from(quote.is_some());
    while let Some(ch) = chars.next() {
        consumed += 1;
        match quote {
            Some(_) if ch == '\\' => {
                let escaped = chars.next()?;
                consumed += 1;
                inner.push(escaped);
            }
            Some(q) if ch == q => {
                let close = chars.next()?;
                consumed += 1;
                if close != ']' {
                    return None;
                }
                return Some((inner, consumed));
            }
            None if ch == ']' => return Some((inner, consumed)),
            _ => inner.push(ch),
        }
    }
    None
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => array_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

// Only canonical indexes: ASCII digits, no sign, no leading zero except "0".
fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical { segment.parse().ok() } else { None }
}
