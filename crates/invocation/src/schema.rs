//! Method and parameter descriptors plus pre-dispatch validation.
//!
//! Validation runs on the caller's side of the boundary: a call that fails
//! here never reaches the actor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{ApiParams, type_name};
use crate::result::ApiError;

/// Logical type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
	String,
	Number,
	Integer,
	Boolean,
	Object,
	Array,
	Any,
}

impl ParamType {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Number => "number",
			Self::Integer => "integer",
			Self::Boolean => "boolean",
			Self::Object => "object",
			Self::Array => "array",
			Self::Any => "any",
		}
	}

	/// Basic compatibility check. Integers satisfy `Number`; nothing coerces to `String`.
	pub fn accepts(self, value: &Value) -> bool {
		match self {
			Self::String => value.is_string(),
			Self::Number => value.is_number(),
			Self::Integer => value.is_i64() || value.is_u64(),
			Self::Boolean => value.is_boolean(),
			Self::Object => value.is_object(),
			Self::Array => value.is_array(),
			Self::Any => true,
		}
	}
}

/// One declared parameter of an [`ApiMethod`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiParameter {
	pub name: String,
	pub param_type: ParamType,
	#[serde(default)]
	pub description: String,
	pub required: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
}

impl ApiParameter {
	pub fn required(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			param_type,
			description: description.into(),
			required: true,
			default: None,
		}
	}

	pub fn optional(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
		Self {
			required: false,
			..Self::required(name, param_type, description)
		}
	}

	/// Value filled in when an optional parameter is absent.
	pub fn with_default(mut self, value: impl Into<Value>) -> Self {
		self.default = Some(value.into());
		self
	}
}

/// A published, typed operation of an actor.
///
/// `name` is unique within an actor type. Once published for a session the
/// descriptor is immutable; actors supersede it by republishing a new set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMethod {
	pub name: String,
	#[serde(default)]
	pub summary: String,
	#[serde(default)]
	pub parameters: Vec<ApiParameter>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub returns: Option<ParamType>,
	#[serde(default)]
	pub category: String,
}

impl ApiMethod {
	pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			summary: summary.into(),
			parameters: Vec::new(),
			returns: None,
			category: String::new(),
		}
	}

	pub fn param(mut self, parameter: ApiParameter) -> Self {
		self.parameters.push(parameter);
		self
	}

	pub fn returns(mut self, ty: ParamType) -> Self {
		self.returns = Some(ty);
		self
	}

	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = category.into();
		self
	}

	pub fn parameter(&self, name: &str) -> Option<&ApiParameter> {
		self.parameters.iter().find(|p| p.name == name)
	}

	/// Validates `params` and returns them normalized into declaration order,
	/// with defaults filled in and explicit `null`s for optional parameters dropped.
	///
	/// Unknown parameter names are rejected.
	pub fn validate(&self, params: &ApiParams) -> Result<ApiParams, ApiError> {
		if let Some((unknown, _)) = params.iter().find(|(name, _)| self.parameter(name).is_none()) {
			return Err(self.err(unknown, "unknown parameter"));
		}

		let mut out = ApiParams::new();
		for param in &self.parameters {
			match params.get_raw(&param.name) {
				Some(value) => {
					if !param.param_type.accepts(value) {
						return Err(self.err(
							&param.name,
							&format!("expected {}, got {}", param.param_type.as_str(), type_name(value)),
						));
					}
					out.insert(param.name.clone(), value.clone());
				}
				None if param.required => return Err(self.err(&param.name, "missing required parameter")),
				None => {
					if let Some(default) = &param.default {
						out.insert(param.name.clone(), default.clone());
					}
				}
			}
		}
		Ok(out)
	}

	fn err(&self, field: &str, msg: &str) -> ApiError {
		ApiError::invalid_params(format!("{}.{field}: {msg}", self.name))
	}
}
