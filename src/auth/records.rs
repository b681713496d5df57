//! Small result records returned by the authentication endpoints.

// self
use crate::_prelude::*;

/// User created in a database connection by sign-up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DatabaseUser {
	/// Email address.
	pub email: String,
	/// Username, for connections that require one.
	#[serde(default)]
	pub username: Option<String>,
	/// Whether the email address was verified.
	#[serde(default)]
	pub email_verified: bool,
}

/// Multi-factor challenge issued to the user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Challenge {
	/// Challenge kind (`otp`, `oob`).
	pub challenge_type: String,
	/// Out-of-band code to exchange once the user confirms.
	#[serde(default)]
	pub oob_code: Option<String>,
	/// How the out-of-band challenge is bound (`prompt`).
	#[serde(default)]
	pub binding_method: Option<String>,
}
