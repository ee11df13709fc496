use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::ApiError;

/// Ordered, dynamically typed parameter bag passed across every dispatch boundary.
///
/// Insertion order is preserved so diagnostics and validated output follow
/// the declaring [`crate::ApiMethod`]'s parameter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiParams {
	values: IndexMap<String, Value>,
}

impl ApiParams {
	/// Creates an empty parameter bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts or replaces a value, returning the previous one.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.values.insert(name.into(), value.into())
	}

	/// Builds a bag from a JSON object. Anything else is rejected as invalid parameters.
	pub fn from_json(value: Value) -> Result<Self, ApiError> {
		match value {
			Value::Object(map) => Ok(Self {
				values: map.into_iter().collect(),
			}),
			Value::Null => Ok(Self::new()),
			other => Err(ApiError::invalid_params(format!("parameters must be an object, got {}", type_name(&other)))),
		}
	}

	/// Returns the raw value for `name`, treating an explicit `null` as absent.
	pub fn get_raw(&self, name: &str) -> Option<&Value> {
		self.values.get(name).filter(|v| !v.is_null())
	}

	/// Deserializes a required parameter.
	pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
		let value = self
			.get_raw(name)
			.ok_or_else(|| ApiError::invalid_params(format!("{name}: missing required parameter")))?;
		T::deserialize(value).map_err(|e| ApiError::invalid_params(format!("{name}: {e}")))
	}

	/// Deserializes an optional parameter. A present but mistyped value is still an error.
	pub fn get_optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
		match self.get_raw(name) {
			None => Ok(None),
			Some(value) => T::deserialize(value)
				.map(Some)
				.map_err(|e| ApiError::invalid_params(format!("{name}: {e}"))),
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get_raw(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Iterates parameters in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Converts the bag into a JSON object, preserving order.
	pub fn to_json(&self) -> Value {
		Value::Object(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ApiParams {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

pub(crate) fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
