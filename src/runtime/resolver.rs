//! Path resolution over a data context
//!
//! Paths mix `.field` and `[index]` segments, e.g. `a.b[0].c`. Resolution
//! is read-only and never fails: any missing, malformed, or out-of-range
//! step yields an empty string.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

use super::value::canonical_index;

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.|\[(\d+)\]").expect("path separator pattern"));

/// Split a path on `.` and numeric `[n]` groups, keeping the digits and
/// dropping empty pieces
pub fn tokenize(path: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in SEPARATOR.captures_iter(path) {
        let Some(separator) = caps.get(0) else {
            continue;
        };
        tokens.push(&path[last..separator.start()]);
        if let Some(index) = caps.get(1) {
            tokens.push(index.as_str());
        }
        last = separator.end();
    }
    tokens.push(&path[last..]);
    tokens.retain(|token| !token.is_empty());
    tokens
}

/// Resolve `path` inside `context`.
///
/// Returns the addressed value unchanged, or an empty string when the path
/// is empty, walks through a non-container, or ends on `null`/nothing.
/// `length` on an array yields its length.
///
/// ```
/// use scriptlet::resolve;
/// use serde_json::json;
///
/// let data = json!({"a": {"b": [{"c": 42}]}});
/// assert_eq!(*resolve(&data, "a.b[0].c"), json!(42));
/// assert_eq!(*resolve(&data, "a.missing.c"), json!(""));
/// ```
pub fn resolve<'a>(context: &'a JsonValue, path: &str) -> Cow<'a, JsonValue> {
    if path.is_empty() {
        return empty();
    }

    let tokens = tokenize(path);
    let mut current = context;
    for (i, token) in tokens.iter().enumerate() {
        current = match current {
            JsonValue::Object(map) => match map.get(*token) {
                Some(value) => value,
                None => return empty(),
            },
            JsonValue::Array(items) if *token == "length" => {
                return if i + 1 == tokens.len() {
                    Cow::Owned(JsonValue::from(items.len()))
                } else {
                    empty()
                };
            }
            JsonValue::Array(items) => match canonical_index(token).and_then(|index| items.get(index)) {
                Some(value) => value,
                None => return empty(),
            },
            _ => return empty(),
        };
    }

    if current.is_null() {
        empty()
    } else {
        Cow::Borrowed(current)
    }
}

fn empty<'a>() -> Cow<'a, JsonValue> {
    Cow::Owned(JsonValue::String(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("a.b[0].c"), vec!["a", "b", "0", "c"]);
        assert_eq!(tokenize("a[0][1]"), vec!["a", "0", "1"]);
        assert_eq!(tokenize(".a..b."), vec!["a", "b"]);
        assert_eq!(tokenize("a[b]"), vec!["a[b]"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_resolve_nested_path() {
        let data = json!({"a": {"b": [{"c": 42}]}});
        assert_eq!(resolve(&data, "a.b[0].c").into_owned(), json!(42));
    }

    #[test]
    fn test_resolve_returns_containers_unchanged() {
        let data = json!({"a": {"b": [1, 2]}});
        assert_eq!(resolve(&data, "a.b").into_owned(), json!([1, 2]));
        assert!(matches!(resolve(&data, "a"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_resolve_empty_path() {
        let data = json!({"": 1});
        assert_eq!(resolve(&data, "").into_owned(), json!(""));
    }

    #[test]
    fn test_resolve_missing_and_malformed() {
        let data = json!({"a": {"b": "text"}, "n": null, "list": [1]});
        assert_eq!(resolve(&data, "missing").into_owned(), json!(""));
        assert_eq!(resolve(&data, "missing.field").into_owned(), json!(""));
        assert_eq!(resolve(&data, "a.b.c").into_owned(), json!(""));
        assert_eq!(resolve(&data, "n").into_owned(), json!(""));
        assert_eq!(resolve(&data, "n.x").into_owned(), json!(""));
        assert_eq!(resolve(&data, "list[3]").into_owned(), json!(""));
        assert_eq!(resolve(&data, "list.x").into_owned(), json!(""));
        assert_eq!(resolve(&data, "a[b]").into_owned(), json!(""));
    }

    #[test]
    fn test_resolve_falsy_values_are_kept() {
        let data = json!({"zero": 0, "no": false, "blank": ""});
        assert_eq!(resolve(&data, "zero").into_owned(), json!(0));
        assert_eq!(resolve(&data, "no").into_owned(), json!(false));
        assert_eq!(resolve(&data, "blank").into_owned(), json!(""));
    }

    #[test]
    fn test_resolve_array_length() {
        let data = json!({"items": ["a", "b", "c"]});
        assert_eq!(resolve(&data, "items.length").into_owned(), json!(3));
        assert_eq!(resolve(&data, "items.length.x").into_owned(), json!(""));
    }

    #[test]
    fn test_resolve_object_numeric_key() {
        let data = json!({"map": {"0": "zero"}, "root": [["x"]]});
        assert_eq!(resolve(&data, "map[0]").into_owned(), json!("zero"));
        assert_eq!(resolve(&data, "root[0][0]").into_owned(), json!("x"));
    }

    #[test]
    fn test_resolve_non_object_context() {
        let data = json!(5);
        assert_eq!(resolve(&data, "a").into_owned(), json!(""));
        let list = json!(["first"]);
        assert_eq!(resolve(&list, "[0]").into_owned(), json!("first"));
    }
}
