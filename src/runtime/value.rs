//! Runtime values
//!
//! Data-context arrays and objects are borrowed, never copied. Coercions
//! follow JavaScript so statement code behaves the way template authors
//! expect from `<% %>` templates.

use std::borrow::Cow;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use crate::core::error::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) enum Value<'a> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Cow<'a, str>),
    /// Array built by template code
    Array(Rc<Vec<Value<'a>>>),
    /// Array or object borrowed from the data context
    Json(&'a JsonValue),
}

impl<'a> Value<'a> {
    pub fn from_json(value: &'a JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(Cow::Borrowed(s)),
            JsonValue::Array(_) | JsonValue::Object(_) => Value::Json(value),
        }
    }

    pub fn str(s: impl Into<Cow<'a, str>>) -> Self {
        Value::String(s.into())
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Undefined | Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => JsonValue::String(s.to_string()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Json(value) => (*value).clone(),
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Null | Value::Array(_) | Value::Json(_) => "object",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    fn is_string_like(&self) -> bool {
        matches!(self, Value::String(_) | Value::Array(_) | Value::Json(_))
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Json(_) => true,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Json(JsonValue::Object(_)) => f64::NAN,
            Value::Array(_) | Value::Json(_) => string_to_number(&self.display()),
        }
    }

    /// String conversion as used by concatenation
    pub fn display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(items) => join(items.iter().cloned(), ","),
            Value::Json(JsonValue::Array(items)) => join(items.iter().map(Value::from_json), ","),
            Value::Json(object) => object.to_string(),
        }
    }

    /// String conversion for template output, where `null` and
    /// `undefined` print nothing
    pub fn to_output(&self) -> String {
        if self.is_nullish() {
            String::new()
        } else {
            self.display()
        }
    }

    /// Elements when the value is an array
    pub fn elements(&self) -> Option<Vec<Value<'a>>> {
        match (self, self.json()) {
            (Value::Array(items), _) => Some(items.to_vec()),
            (_, Some(JsonValue::Array(items))) => Some(items.iter().map(Value::from_json).collect()),
            _ => None,
        }
    }

    pub fn strict_equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Json(a), Value::Json(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    pub fn loose_equals(&self, other: &Value<'a>) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::Number(_) | Value::String(_) | Value::Bool(_),
                Value::Number(_) | Value::String(_) | Value::Bool(_),
            ) => self.to_number() == other.to_number(),
            (Value::Array(_) | Value::Json(_), Value::Array(_) | Value::Json(_)) => {
                self.strict_equals(other)
            }
            (Value::Array(_) | Value::Json(_), _) => Value::str(self.display()).loose_equals(other),
            (_, Value::Array(_) | Value::Json(_)) => other.loose_equals(self),
            _ => self.strict_equals(other),
        }
    }

    /// `+`: concatenation when either side converts to a string
    pub fn add(&self, other: &Value<'a>) -> Value<'a> {
        if self.is_string_like() || other.is_string_like() {
            let mut s = self.display();
            s.push_str(&other.display());
            Value::str(s)
        } else {
            Value::Number(self.to_number() + other.to_number())
        }
    }

    /// Relational comparison; `None` when either side is `NaN`
    pub fn compare(&self, other: &Value<'a>) -> Option<std::cmp::Ordering> {
        if let (Value::String(a), Value::String(b)) = (self, other) {
            return Some(a.cmp(b));
        }
        self.to_number().partial_cmp(&other.to_number())
    }

    /// Property access: `value[key]` or `value.key`
    pub fn get_member(&self, key: &Value<'_>) -> Result<Value<'a>> {
        if self.is_nullish() {
            return Err(Error::type_error(format!(
                "cannot read properties of {} (reading '{}')",
                self.display(),
                key.display()
            )));
        }
        if let Some(JsonValue::Object(map)) = self.json() {
            return Ok(map
                .get(&key.display())
                .map_or(Value::Undefined, Value::from_json));
        }
        let member = match (self, array_key(key)) {
            (Value::String(s), ArrayKey::Length) => Value::Number(s.chars().count() as f64),
            (Value::String(s), ArrayKey::Index(i)) => s
                .chars()
                .nth(i)
                .map_or(Value::Undefined, |c| Value::str(c.to_string())),
            (_, ArrayKey::Length) => self
                .len()
                .map_or(Value::Undefined, |len| Value::Number(len as f64)),
            (_, ArrayKey::Index(i)) => self.index(i).unwrap_or(Value::Undefined),
            (_, ArrayKey::Other) => Value::Undefined,
        };
        Ok(member)
    }

    fn json(&self) -> Option<&'a JsonValue> {
        match self {
            Value::Json(value) => Some(*value),
            _ => None,
        }
    }

    fn len(&self) -> Option<usize> {
        match (self, self.json()) {
            (Value::Array(items), _) => Some(items.len()),
            (_, Some(JsonValue::Array(items))) => Some(items.len()),
            _ => None,
        }
    }

    fn index(&self, i: usize) -> Option<Value<'a>> {
        match (self, self.json()) {
            (Value::Array(items), _) => items.get(i).cloned(),
            (_, Some(JsonValue::Array(items))) => items.get(i).map(Value::from_json),
            _ => None,
        }
    }
}

enum ArrayKey {
    Length,
    Index(usize),
    Other,
}

fn array_key(key: &Value<'_>) -> ArrayKey {
    match key {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => ArrayKey::Index(*n as usize),
        Value::String(s) if s == "length" => ArrayKey::Length,
        Value::String(s) => canonical_index(s).map_or(ArrayKey::Other, ArrayKey::Index),
        _ => ArrayKey::Other,
    }
}

/// Parse an array index written without sign or leading zeros
pub(crate) fn canonical_index(token: &str) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

pub(crate) fn join<'a>(items: impl Iterator<Item = Value<'a>>, separator: &str) -> String {
    items
        .map(|item| item.to_output())
        .collect::<Vec<_>>()
        .join(separator)
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

/// Print a number the way JavaScript does: integral values without a
/// fraction, `NaN`, `Infinity`, and exponent form outside `[1e-6, 1e21)`
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        return format!("{sign}Infinity");
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exponent = format!("{n:e}");
    match exponent.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent,
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
    }
}
