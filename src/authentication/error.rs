//! Errors raised by the Authentication API.

// self
use crate::{
	_prelude::*,
	error::{ApiError, ErrorDetails, RequestError},
	http::ResponseHeaders,
	request::ErrorAdapter,
};

const INVALID_GRANT: &str = "invalid_grant";
const INVALID_PASSWORD: &str = "invalid_password";

/// Failure reported by (or on the way to) the Authentication API.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct AuthenticationError(ErrorDetails);
impl AuthenticationError {
	/// Wraps details.
	pub fn new(details: ErrorDetails) -> Self {
		Self(details)
	}

	/// Common payload.
	pub fn details(&self) -> &ErrorDetails {
		&self.0
	}

	/// Wrong username/email or password.
	pub fn is_invalid_credentials(&self) -> bool {
		self.has_code("invalid_user_password")
			|| self.is_invalid_grant("Wrong email or password.")
			|| self.is_invalid_grant("Wrong phone number or verification code.")
			|| self.is_invalid_grant("Wrong email or verification code.")
	}

	/// Login needs a second factor; see [`multifactor_token`](Self::multifactor_token).
	pub fn is_multifactor_required(&self) -> bool {
		self.has_code("mfa_required") || self.has_code("a0.mfa_required")
	}

	/// Login needs the user to enroll a second factor first.
	pub fn is_multifactor_enroll_required(&self) -> bool {
		self.has_code("a0.mfa_registration_required") || self.has_code("unsupported_challenge_type")
	}

	/// The one-time password was rejected.
	pub fn is_multifactor_code_invalid(&self) -> bool {
		self.has_code("a0.mfa_invalid_code") || self.is_invalid_grant("Invalid otp_code.")
	}

	/// The MFA token expired or is malformed.
	pub fn is_multifactor_token_invalid(&self) -> bool {
		(self.has_code("expired_token") && self.0.description == "mfa_token is expired")
			|| self.is_invalid_grant("Malformed mfa_token")
	}

	/// Password rejected by the connection's strength policy.
	pub fn is_password_not_strong_enough(&self) -> bool {
		self.has_code(INVALID_PASSWORD) && self.0.str_value("name") == Some("PasswordStrengthError")
	}

	/// Password rejected by the connection's history policy.
	pub fn is_password_already_used(&self) -> bool {
		self.has_code(INVALID_PASSWORD) && self.0.str_value("name") == Some("PasswordHistoryError")
	}

	/// Password found in a breach database.
	pub fn is_password_leaked(&self) -> bool {
		self.has_code("password_leaked")
	}

	/// A rule rejected the login.
	pub fn is_rule_error(&self) -> bool {
		self.has_code("unauthorized")
	}

	/// Access was denied.
	pub fn is_access_denied(&self) -> bool {
		self.has_code("access_denied")
	}

	/// The session requires an interactive login.
	pub fn is_login_required(&self) -> bool {
		self.has_code("login_required")
	}

	/// The refresh token belongs to a deleted user.
	pub fn is_refresh_token_deleted(&self) -> bool {
		self.is_invalid_grant("The refresh_token was generated for a user who doesn't exist anymore.")
	}

	/// The login must be verified (for example after suspicious activity).
	pub fn is_verification_required(&self) -> bool {
		self.has_code("requires_verification")
	}

	/// The account is blocked after too many attempts.
	pub fn is_too_many_attempts(&self) -> bool {
		self.has_code("too_many_attempts")
	}

	/// `mfa_token` to continue a login that requires a second factor.
	pub fn multifactor_token(&self) -> Option<&str> {
		self.0.str_value("mfa_token")
	}

	fn has_code(&self, code: &str) -> bool {
		self.0.code == code
	}

	fn is_invalid_grant(&self, description: &str) -> bool {
		self.has_code(INVALID_GRANT) && self.0.description == description
	}
}
impl ApiError for AuthenticationError {
	fn code(&self) -> &str {
		&self.0.code
	}

	fn description(&self) -> &str {
		&self.0.description
	}

	fn status_code(&self) -> Option<u16> {
		self.0.status
	}

	fn cause(&self) -> Option<&RequestError> {
		self.0.cause.as_ref()
	}

	fn value(&self, key: &str) -> Option<&JsonValue> {
		self.0.values.get(key)
	}
}

/// [`ErrorAdapter`] producing [`AuthenticationError`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthenticationErrorAdapter;
impl ErrorAdapter<AuthenticationError> for AuthenticationErrorAdapter {
	fn from_raw_response(&self, status: u16, body: &str, _: &ResponseHeaders) -> AuthenticationError {
		AuthenticationError(ErrorDetails::from_body(status, body))
	}

	fn from_json_response(
		&self,
		status: u16,
		values: JsonMap<String, JsonValue>,
	) -> AuthenticationError {
		AuthenticationError(ErrorDetails::from_values(status, values))
	}

	fn from_exception(&self, cause: RequestError) -> AuthenticationError {
		AuthenticationError(ErrorDetails::from_cause(cause))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{DecodeError, TransportError, UNKNOWN_ERROR};

	fn json(status: u16, value: JsonValue) -> AuthenticationError {
		let JsonValue::Object(values) = value else {
			panic!("Fixture must be a JSON object.");
		};

		AuthenticationErrorAdapter.from_json_response(status, values)
	}

	#[test]
	fn credential_and_mfa_predicates() {
		let err = json(403, serde_json::json!({
			"error": "invalid_grant",
			"error_description": "Wrong email or password.",
		}));

		assert!(err.is_invalid_credentials());
		assert!(!err.is_multifactor_code_invalid());
		assert_eq!(err.status_code(), Some(403));

		let err = json(403, serde_json::json!({ "error": "mfa_required", "mfa_token": "Fe26.2" }));

		assert!(err.is_multifactor_required());
		assert_eq!(err.multifactor_token(), Some("Fe26.2"));

		let err = json(403, serde_json::json!({
			"error": "invalid_grant",
			"error_description": "Invalid otp_code.",
		}));

		assert!(err.is_multifactor_code_invalid());
		assert!(json(400, serde_json::json!({ "error": "unsupported_challenge_type" })).is_multifactor_enroll_required());
	}

	#[test]
	fn password_policy_predicates_use_the_name_value() {
		let strength = json(400, serde_json::json!({
			"code": "invalid_password",
			"name": "PasswordStrengthError",
			"description": { "rules": [] },
		}));
		let history = json(400, serde_json::json!({
			"code": "invalid_password",
			"name": "PasswordHistoryError",
			"description": "Password has previously been used",
		}));

		assert!(strength.is_password_not_strong_enough());
		assert!(!strength.is_password_already_used());
		assert!(history.is_password_already_used());
		assert_eq!(ApiError::description(&history), "Password has previously been used");
		assert_eq!(ApiError::description(&strength), "Received error with code invalid_password");
	}

	#[test]
	fn simple_code_predicates() {
		assert!(json(401, serde_json::json!({ "error": "unauthorized" })).is_rule_error());
		assert!(json(403, serde_json::json!({ "error": "access_denied" })).is_access_denied());
		assert!(json(400, serde_json::json!({ "error": "login_required" })).is_login_required());
		assert!(json(400, serde_json::json!({ "error": "password_leaked" })).is_password_leaked());
		assert!(json(401, serde_json::json!({ "error": "requires_verification" })).is_verification_required());
		assert!(json(429, serde_json::json!({ "error": "too_many_attempts" })).is_too_many_attempts());
		assert!(
			json(403, serde_json::json!({
				"error": "invalid_grant",
				"error_description": "The refresh_token was generated for a user who doesn't exist anymore.",
			}))
			.is_refresh_token_deleted()
		);
	}

	#[test]
	fn exceptions_keep_their_cause() {
		let err = AuthenticationErrorAdapter.from_exception(RequestError::Transport(TransportError::Io(
			std::io::ErrorKind::TimedOut.into(),
		)));

		assert!(err.is_network_error());
		assert_eq!(err.code(), UNKNOWN_ERROR);
		assert!(StdError::source(&err).is_some());

		let err = AuthenticationErrorAdapter.from_exception(RequestError::Decode {
			status: 200,
			source: DecodeError::invalid("id_token is missing"),
		});

		assert!(!err.is_network_error());
		assert_eq!(err.status_code(), Some(200));
	}

	#[test]
	fn raw_bodies_keep_the_text() {
		let err = AuthenticationErrorAdapter.from_raw_response(503, "Service Unavailable", &ResponseHeaders::new());

		assert_eq!(err.to_string(), "authok.internal_error.plain: Service Unavailable");
		assert!(ApiError::cause(&err).is_none());
	}
}
