//! User profile and linked identity models.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Profile returned by `/userinfo` and the users endpoints.
///
/// The identifier is read from `user_id`, then `sub`, then `id`. Attributes without a
/// dedicated field are kept in [`extra_info`](Self::extra_info).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "UserProfileRecord")]
pub struct UserProfile {
	/// User identifier.
	pub id: Option<String>,
	/// Full name.
	pub name: Option<String>,
	/// Nickname.
	pub nickname: Option<String>,
	/// Avatar URL.
	pub picture: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Whether the email address was verified.
	pub email_verified: Option<bool>,
	/// Given name.
	pub given_name: Option<String>,
	/// Family name.
	pub family_name: Option<String>,
	/// Creation instant.
	pub created_at: Option<OffsetDateTime>,
	/// Identities linked to the user.
	pub identities: Vec<UserIdentity>,
	/// Metadata the user can edit.
	pub user_metadata: JsonMap<String, JsonValue>,
	/// Metadata only the application can edit.
	pub app_metadata: JsonMap<String, JsonValue>,
	/// Remaining profile attributes.
	pub extra_info: JsonMap<String, JsonValue>,
}
impl UserProfile {
	/// Extra attribute by key.
	pub fn extra(&self, key: &str) -> Option<&JsonValue> {
		self.extra_info.get(key)
	}
}
impl From<UserProfileRecord> for UserProfile {
	fn from(record: UserProfileRecord) -> Self {
		Self {
			id: record.user_id.or(record.sub).or(record.id),
			name: record.name,
			nickname: record.nickname,
			picture: record.picture,
			email: record.email,
			email_verified: record.email_verified,
			given_name: record.given_name,
			family_name: record.family_name,
			created_at: record.created_at,
			identities: record.identities.unwrap_or_default(),
			user_metadata: record.user_metadata.unwrap_or_default(),
			app_metadata: record.app_metadata.unwrap_or_default(),
			extra_info: record.extra_info,
		}
	}
}

/// Identity from one connection linked to a user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserIdentity {
	/// Identifier inside the provider, accepted as a JSON string or number.
	#[serde(deserialize_with = "string_or_number")]
	pub user_id: String,
	/// Connection name.
	pub connection: String,
	/// Provider name.
	pub provider: String,
	/// Whether the provider is a social network.
	#[serde(default, rename = "isSocial")]
	pub is_social: bool,
	/// Provider access token.
	#[serde(default)]
	pub access_token: Option<TokenSecret>,
	/// Provider access token secret.
	#[serde(default)]
	pub access_token_secret: Option<TokenSecret>,
	/// Profile attributes reported by the provider.
	#[serde(default, rename = "profileData")]
	pub profile_info: JsonMap<String, JsonValue>,
}

#[derive(Deserialize)]
struct UserProfileRecord {
	user_id: Option<String>,
	sub: Option<String>,
	id: Option<String>,
	name: Option<String>,
	nickname: Option<String>,
	picture: Option<String>,
	email: Option<String>,
	email_verified: Option<bool>,
	given_name: Option<String>,
	family_name: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	created_at: Option<OffsetDateTime>,
	identities: Option<Vec<UserIdentity>>,
	user_metadata: Option<JsonMap<String, JsonValue>>,
	app_metadata: Option<JsonMap<String, JsonValue>>,
	#[serde(flatten)]
	extra_info: JsonMap<String, JsonValue>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match JsonValue::deserialize(deserializer)? {
		JsonValue::String(s) => Ok(s),
		JsonValue::Number(n) => Ok(n.to_string()),
		other => Err(D::Error::custom(format!("expected a string or number, found {other}"))),
	}
}
