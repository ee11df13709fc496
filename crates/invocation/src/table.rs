use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::params::ApiParams;
use crate::result::ApiError;
use crate::schema::ApiMethod;

/// Immutable, name-indexed set of published methods.
///
/// Gives actors an O(1) `can_handle_method` and a one-call validation path,
/// and is what the registry publishes for each live actor.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
	methods: Arc<[ApiMethod]>,
	by_name: FxHashMap<String, usize>,
}

impl MethodTable {
	/// Builds a table. On duplicate names the first declaration wins.
	pub fn new(methods: Vec<ApiMethod>) -> Self {
		let mut by_name = FxHashMap::default();
		for (idx, method) in methods.iter().enumerate() {
			by_name.entry(method.name.clone()).or_insert(idx);
		}
		Self {
			methods: methods.into(),
			by_name,
		}
	}

	/// Methods in declaration order.
	pub fn methods(&self) -> &[ApiMethod] {
		&self.methods
	}

	pub fn get(&self, name: &str) -> Option<&ApiMethod> {
		self.by_name.get(name).map(|&idx| &self.methods[idx])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.by_name.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.methods.len()
	}

	pub fn is_empty(&self) -> bool {
		self.methods.is_empty()
	}

	/// Resolves `name` and validates `params` against it.
	pub fn validate(&self, name: &str, params: &ApiParams) -> Result<ApiParams, ApiError> {
		self.get(name).ok_or_else(|| ApiError::unknown_method(name))?.validate(params)
	}
}

impl From<Vec<ApiMethod>> for MethodTable {
	fn from(methods: Vec<ApiMethod>) -> Self {
		Self::new(methods)
	}
}
