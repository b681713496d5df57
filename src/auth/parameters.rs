//! Fluent builder for authentication request parameters.

// self
use crate::{_prelude::*, auth::scope::normalize_scope_value};

/// `client_id` parameter.
pub const CLIENT_ID_KEY: &str = "client_id";
/// `grant_type` parameter.
pub const GRANT_TYPE_KEY: &str = "grant_type";
/// `connection` parameter.
pub const CONNECTION_KEY: &str = "connection";
/// `realm` parameter.
pub const REALM_KEY: &str = "realm";
/// `scope` parameter.
pub const SCOPE_KEY: &str = crate::request::SCOPE_KEY;
/// `audience` parameter.
pub const AUDIENCE_KEY: &str = "audience";
/// `refresh_token` parameter.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// `send` parameter for passwordless flows.
pub const SEND_KEY: &str = "send";

/// Refresh token grant.
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";
/// Authorization code grant.
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
/// Password grant restricted to a realm (database connection).
pub const GRANT_TYPE_PASSWORD_REALM: &str = "http://authok.cn/oauth/grant-type/password-realm";
/// One-time password grant completing a multi-factor login.
pub const GRANT_TYPE_MFA_OTP: &str = "http://authok.cn/oauth/grant-type/mfa-otp";

/// Scope requested by login helpers when the caller sets none.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Builds a parameter map for authentication requests.
///
/// Values are overwritten per key; `scope` is normalized to carry `openid`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterBuilder {
	parameters: BTreeMap<String, JsonValue>,
}
impl ParameterBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder pre-populated with [`DEFAULT_SCOPE`].
	pub fn authentication() -> Self {
		Self::new().set_scope(DEFAULT_SCOPE)
	}

	/// Sets an arbitrary parameter.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		let key = key.into();
		let value = value.into();
		let value = if key == SCOPE_KEY { normalize_scope_value(value) } else { value };

		self.parameters.insert(key, value);

		self
	}

	/// Removes a parameter.
	pub fn remove(mut self, key: &str) -> Self {
		self.parameters.remove(key);

		self
	}

	/// Sets `client_id`.
	pub fn set_client_id(self, client_id: impl Into<String>) -> Self {
		self.set(CLIENT_ID_KEY, client_id.into())
	}

	/// Sets `grant_type`.
	pub fn set_grant_type(self, grant_type: impl Into<String>) -> Self {
		self.set(GRANT_TYPE_KEY, grant_type.into())
	}

	/// Sets `connection`.
	pub fn set_connection(self, connection: impl Into<String>) -> Self {
		self.set(CONNECTION_KEY, connection.into())
	}

	/// Sets `realm`.
	pub fn set_realm(self, realm: impl Into<String>) -> Self {
		self.set(REALM_KEY, realm.into())
	}

	/// Sets `scope`.
	pub fn set_scope(self, scope: impl Into<String>) -> Self {
		self.set(SCOPE_KEY, scope.into())
	}

	/// Sets `audience`.
	pub fn set_audience(self, audience: impl Into<String>) -> Self {
		self.set(AUDIENCE_KEY, audience.into())
	}

	/// Sets `refresh_token`.
	pub fn set_refresh_token(self, refresh_token: impl Into<String>) -> Self {
		self.set(REFRESH_TOKEN_KEY, refresh_token.into())
	}

	/// Sets `send` (`code` or `link`).
	pub fn set_send(self, send: impl Into<String>) -> Self {
		self.set(SEND_KEY, send.into())
	}

	/// Merges parameters; later values win.
	pub fn add_all<I, K, V>(self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		parameters.into_iter().fold(self, |builder, (key, value)| builder.set(key, value))
	}

	/// Removes every parameter.
	pub fn clear_all(mut self) -> Self {
		self.parameters.clear();

		self
	}

	/// Accumulated parameters.
	pub fn as_dictionary(&self) -> BTreeMap<String, JsonValue> {
		self.parameters.clone()
	}
}
impl IntoIterator for ParameterBuilder {
	type IntoIter = std::collections::btree_map::IntoIter<String, JsonValue>;
	type Item = (String, JsonValue);

	fn into_iter(self) -> Self::IntoIter {
		self.parameters.into_iter()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn setters_overwrite_and_normalize() {
		let params = ParameterBuilder::new()
			.set_client_id("client")
			.set_grant_type(GRANT_TYPE_PASSWORD_REALM)
			.set_grant_type(GRANT_TYPE_REFRESH_TOKEN)
			.set_scope("email profile")
			.set_realm("Username-Password-Authentication")
			.as_dictionary();

		assert_eq!(params.get(GRANT_TYPE_KEY), Some(&JsonValue::from("refresh_token")));
		assert_eq!(params.get(SCOPE_KEY), Some(&JsonValue::from("email profile openid")));
		assert_eq!(params.len(), 4);
	}

	#[test]
	fn authentication_builder_defaults_scope() {
		let params = ParameterBuilder::authentication().as_dictionary();

		assert_eq!(params.get(SCOPE_KEY), Some(&JsonValue::from("openid profile email")));
	}

	#[test]
	fn bulk_helpers() {
		let builder = ParameterBuilder::new()
			.add_all([("audience", "https://api"), ("scope", "read")])
			.set_send("code")
			.remove(AUDIENCE_KEY);

		assert_eq!(builder.as_dictionary().get(SCOPE_KEY), Some(&JsonValue::from("read openid")));
		assert_eq!(builder.as_dictionary().get(AUDIENCE_KEY), None);
		assert!(builder.clear_all().as_dictionary().is_empty());
	}
}
