//! OIDC scope modeling with the mandatory `openid` token.

// std
use std::{convert::Infallible, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer};
// self
use crate::_prelude::*;

/// Scope token every OIDC request must carry.
pub const REQUIRED_SCOPE: &str = "openid";

/// Space-delimited OIDC scope that always contains [`REQUIRED_SCOPE`] exactly once.
///
/// Tokens keep the caller's order, duplicates are dropped (first occurrence wins), and
/// `openid` is appended when absent. Any casing of `openid` is rewritten to the canonical
/// lowercase token in place.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scope {
	tokens: Arc<[String]>,
}
impl Scope {
	/// Normalizes a raw space-delimited scope string.
	pub fn with_openid(raw: &str) -> Self {
		let mut tokens: Vec<String> = Vec::new();

		for token in raw.split_whitespace() {
			let token =
				if token.eq_ignore_ascii_case(REQUIRED_SCOPE) { REQUIRED_SCOPE } else { token };

			if !tokens.iter().any(|t| t == token) {
				tokens.push(token.to_owned());
			}
		}
		if !tokens.iter().any(|t| t == REQUIRED_SCOPE) {
			tokens.push(REQUIRED_SCOPE.to_owned());
		}

		Self { tokens: Arc::from(tokens) }
	}

	/// Number of distinct tokens, `openid` included.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	/// Always `false`; a normalized scope holds at least `openid`.
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Returns true if the scope contains the provided token.
	pub fn contains(&self, token: &str) -> bool {
		self.tokens.iter().any(|t| t == token)
	}

	/// Iterator over tokens in order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.tokens.iter().map(String::as_str)
	}

	/// Space-delimited wire representation.
	pub fn normalized(&self) -> String {
		self.tokens.join(" ")
	}
}
impl Default for Scope {
	fn default() -> Self {
		Self::with_openid("")
	}
}
impl Display for Scope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for Scope {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::with_openid(s))
	}
}
impl From<Scope> for JsonValue {
	fn from(value: Scope) -> Self {
		JsonValue::String(value.normalized())
	}
}
impl<'a> IntoIterator for &'a Scope {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.tokens.iter() }
	}
}
impl Serialize for Scope {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for Scope {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		Ok(Self::with_openid(&raw))
	}
}

/// Iterator over scope tokens.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(String::as_str)
	}
}

/// Normalizes a scope parameter value of any JSON shape.
///
/// Strings are normalized directly, `null` is treated as empty, and any other value is
/// normalized from its JSON rendering.
pub fn normalize_scope_value(value: JsonValue) -> JsonValue {
	let raw = match value {
		JsonValue::String(s) => s,
		JsonValue::Null => String::new(),
		other => other.to_string(),
	};

	Scope::with_openid(&raw).into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn appends_openid_once() {
		assert_eq!(Scope::with_openid("email profile").normalized(), "email profile openid");
		assert_eq!(Scope::with_openid("profile").normalized(), "profile openid");
		assert_eq!(Scope::with_openid("").normalized(), "openid");
		assert_eq!(Scope::with_openid("   ").normalized(), "openid");
	}

	#[test]
	fn keeps_existing_openid_in_place() {
		assert_eq!(Scope::with_openid("openid email").normalized(), "openid email");
		assert_eq!(Scope::with_openid("openid email openid").normalized(), "openid email");
		assert_eq!(Scope::with_openid("OpenID email").normalized(), "openid email");
		assert_eq!(Scope::with_openid("email OPENID openid").normalized(), "email openid");
	}

	#[test]
	fn renormalizing_is_idempotent() {
		let once = Scope::with_openid("read  write read");
		let twice = Scope::with_openid(&once.normalized());

		assert_eq!(once, twice);
		assert_eq!(twice.normalized(), "read write openid");
		assert_eq!(twice.iter().filter(|t| *t == REQUIRED_SCOPE).count(), 1);
	}

	#[test]
	fn json_values_are_normalized() {
		assert_eq!(normalize_scope_value(JsonValue::Null), JsonValue::from("openid"));
		assert_eq!(normalize_scope_value(JsonValue::from("email")), JsonValue::from("email openid"));
		assert_eq!(normalize_scope_value(JsonValue::from(42)), JsonValue::from("42 openid"));
	}

	#[test]
	fn serde_uses_space_delimited_strings() {
		let scope: Scope = serde_json::from_str("\"email profile\"")
			.expect("Scope string should deserialize successfully.");

		assert!(scope.contains("openid"));
		assert_eq!(
			serde_json::to_string(&scope).expect("Scope should serialize successfully."),
			"\"email profile openid\""
		);
	}
}
