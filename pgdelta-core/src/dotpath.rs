//! Dotted-path access into YAML mappings.
//!
//! Paths accept three separators: `a.b.c`, `a_b_c`, and `a:b:c`. A path
//! written with `:` is searched under both the `.` and `_` spellings, so
//! `source:pass_word` finds either `{source: {pass: {word: ..}}}` or
//! `{source: {pass_word: ..}}`. Comma-separated paths are tried in order.

use serde_yaml::{Mapping, Value};

/// Expand a path on `,` and `:`. A `:`-separated path yields both the
/// `.` and `_` variants; empty segments are dropped.
pub fn dotexpand(path: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for p in path.replace(' ', "").split(',') {
        if p.is_empty() {
            continue;
        }
        if p.contains(':') {
            paths.push(p.replace(':', "."));
            paths.push(p.replace(':', "_"));
        } else {
            paths.push(p.to_string());
        }
    }
    paths
}

/// Get an element by dotted path. Returns the first hit across all
/// expansions of `path`, or None if nothing resolves.
pub fn dotget<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    for key in dotexpand(path) {
        let mut current = Some(data);
        for attr in key.split('.') {
            current = current.and_then(|value| value.get(attr));
        }
        if current.is_some() {
            return current;
        }
    }
    None
}

/// First non-None `dotget` across several candidate paths.
pub fn dget<'a>(data: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|path| dotget(data, path))
}

/// True if any of the paths resolves to a value.
pub fn dotexists(data: &Value, paths: &[&str]) -> bool {
    paths.iter().any(|path| dotget(data, path).is_some())
}

/// Set an element by dotted path, creating intermediate mappings as
/// needed. `_` in the path is treated as `.`. Intermediate values that
/// are not mappings are replaced by one.
pub fn dotset(data: &mut Value, path: &str, value: Value) {
    let dotted = path.replace('_', ".");
    let attrs: Vec<&str> = dotted.split('.').collect();

    let mut current = data;
    for attr in &attrs[..attrs.len() - 1] {
        let map = ensure_mapping(current);
        current = map
            .entry(Value::String((*attr).to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }

    let map = ensure_mapping(current);
    map.insert(Value::String(attrs[attrs.len() - 1].to_string()), value);
}

fn ensure_mapping(value: &mut Value) -> &mut Mapping {
    if !matches!(value, Value::Mapping(_)) {
        *value = Value::Mapping(Mapping::new());
    }
    match value {
        Value::Mapping(map) => map,
        _ => unreachable!("just replaced with a mapping"),
    }
}
