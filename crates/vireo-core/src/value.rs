//! Dynamically typed member values.
//!
//! Component members are exchanged with the runtime as [`Value`]s. Equality
//! follows identity semantics so that change detection only fires when a
//! value is actually replaced: primitives compare by value (with `NaN` never
//! equal to itself) and shared payloads compare by pointer.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::meta::PropType;
use crate::node::NodeId;

/// A member, attribute or event payload value.
#[derive(Clone, Default)]
pub enum Value {
	/// No value has been assigned.
	#[default]
	Undefined,
	/// Explicit absence, produced when an observed attribute is removed.
	Null,
	/// Boolean.
	Bool(bool),
	/// Number.
	Number(f64),
	/// String.
	String(Rc<str>),
	/// Reference to a document node.
	Element(NodeId),
	/// Structured data shared by reference.
	Json(Rc<serde_json::Value>),
	/// Arbitrary host object shared by reference.
	Object(Rc<dyn Any>),
}

impl Value {
	/// Parses a raw attribute string according to the declared property type.
	///
	/// - `Boolean`: `"false"` is false, any other present value is true
	/// - `Number`: the longest leading decimal literal, `NaN` when there is none
	/// - `String` and `Any`: the raw string
	pub fn parse_attribute(prop_type: PropType, raw: &str) -> Value {
		match prop_type {
			PropType::Boolean => Value::Bool(raw != "false"),
			PropType::Number => Value::Number(parse_float_prefix(raw)),
			PropType::String | PropType::Any => Value::String(Rc::from(raw)),
		}
	}

	/// Coerces a value assigned before upgrade to the declared property type.
	///
	/// Only string values are reinterpreted; everything else is kept as is.
	pub fn coerce(self, prop_type: PropType) -> Value {
		match self {
			Value::String(raw) => Value::parse_attribute(prop_type, &raw),
			other => other,
		}
	}

	/// Like `==`, except that two `NaN` numbers count as the same value.
	pub fn is_same(&self, other: &Value) -> bool {
		match (self, other) {
			(Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
			_ => self == other,
		}
	}

	/// Returns `true` for [`Value::Undefined`].
	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	/// Returns `true` for [`Value::Undefined`] and [`Value::Null`].
	pub fn is_nullish(&self) -> bool {
		matches!(self, Value::Undefined | Value::Null)
	}

	/// Truthiness as used for boolean reflection.
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Undefined | Value::Null => false,
			Value::Bool(b) => *b,
			Value::Number(n) => *n != 0.0 && !n.is_nan(),
			Value::String(s) => !s.is_empty(),
			Value::Element(_) | Value::Json(_) | Value::Object(_) => true,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_element(&self) -> Option<NodeId> {
		match self {
			Value::Element(id) => Some(*id),
			_ => None,
		}
	}

	pub fn as_json(&self) -> Option<&serde_json::Value> {
		match self {
			Value::Json(json) => Some(json),
			_ => None,
		}
	}

	/// Borrows the payload of an [`Value::Object`] as a concrete type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Value::Object(obj) => obj.downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Wraps an arbitrary object.
	pub fn object<T: Any>(value: T) -> Value {
		Value::Object(Rc::new(value))
	}

	/// Renders the value the way it would appear as text content.
	pub fn to_text(&self) -> String {
		match self {
			Value::Undefined | Value::Null => String::new(),
			Value::Bool(b) => b.to_string(),
			Value::Number(n) => format_number(*n),
			Value::String(s) => s.to_string(),
			Value::Element(id) => id.to_string(),
			Value::Json(json) => json.to_string(),
			Value::Object(_) => "[object]".to_string(),
		}
	}
}

/// Formats a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
	if n == 0.0 {
		"0".to_string()
	} else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
		format!("{n:.0}")
	} else if n.is_nan() {
		"NaN".to_string()
	} else if n.is_infinite() {
		let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
		text.to_string()
	} else {
		n.to_string()
	}
}

/// Parses the longest leading decimal literal of `input`.
///
/// Leading whitespace is skipped, trailing garbage ignored. Returns `NaN`
/// when no digits are found.
pub fn parse_float_prefix(input: &str) -> f64 {
	let s = input.trim_start();
	let bytes = s.as_bytes();
	let len = bytes.len();
	let mut i = 0;

	if matches!(bytes.first(), Some(b'+' | b'-')) {
		i = 1;
	}
	if s[i..].starts_with("Infinity") {
		return if bytes.first() == Some(&b'-') {
			f64::NEG_INFINITY
		} else {
			f64::INFINITY
		};
	}

	let int_start = i;
	while i < len && bytes[i].is_ascii_digit() {
		i += 1;
	}
	let mut digits = i - int_start;

	if i < len && bytes[i] == b'.' {
		let mut j = i + 1;
		while j < len && bytes[j].is_ascii_digit() {
			j += 1;
		}
		let fraction = j - (i + 1);
		if fraction > 0 {
			i = j;
			digits += fraction;
		}
	}
	if digits == 0 {
		return f64::NAN;
	}

	if i < len && matches!(bytes[i], b'e' | b'E') {
		let mut j = i + 1;
		if j < len && matches!(bytes[j], b'+' | b'-') {
			j += 1;
		}
		let exp_start = j;
		while j < len && bytes[j].is_ascii_digit() {
			j += 1;
		}
		if j > exp_start {
			i = j;
		}
	}

	s[..i].parse().unwrap_or(f64::NAN)
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Number(a), Value::Number(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Element(a), Value::Element(b)) => a == b,
			(Value::Json(a), Value::Json(b)) => Rc::ptr_eq(a, b),
			(Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Undefined => f.write_str("Undefined"),
			Value::Null => f.write_str("Null"),
			Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
			Value::String(s) => f.debug_tuple("String").field(&&**s).finish(),
			Value::Element(id) => f.debug_tuple("Element").field(id).finish(),
			Value::Json(json) => f.debug_tuple("Json").field(json).finish(),
			Value::Object(_) => f.write_str("Object(..)"),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Number(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Number(f64::from(value))
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Value::Number(f64::from(value))
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(Rc::from(value))
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(Rc::from(value))
	}
}

impl From<NodeId> for Value {
	fn from(value: NodeId) -> Self {
		Value::Element(value)
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		Value::Json(Rc::new(value))
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Value::Null, Into::into)
	}
}
