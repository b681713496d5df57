//! Token set returned by the token endpoint and its decoder.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, UserProfile},
	error::DecodeError,
	request::{JsonAdapter, SerdeAdapter},
};

/// Time source used to turn relative token lifetimes into instants.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Current instant.
	fn now(&self) -> OffsetDateTime;
}

/// [`Clock`] reading the system time in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Tokens issued by a successful authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// OIDC ID token.
	pub id_token: TokenSecret,
	/// Access token presented as a bearer credential.
	pub access_token: TokenSecret,
	/// Token type, usually `Bearer`.
	pub token_type: String,
	/// Refresh token, when `offline_access` was granted.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the access token expires.
	pub expires_at: OffsetDateTime,
	/// Scope granted by the server, when it differs from the requested one.
	pub scope: Option<String>,
}
impl Credentials {
	/// Returns `true` once `now` reaches the expiry instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}

	/// `Authorization` header value for the access token.
	pub fn bearer(&self) -> String {
		self.access_token.bearer()
	}
}

/// Decodes token endpoint responses into [`Credentials`].
///
/// `access_token`, `id_token`, `token_type`, and a positive `expires_in` are required;
/// `expires_at` is the adapter clock's instant plus `expires_in` seconds.
#[derive(Clone)]
pub struct CredentialsAdapter {
	clock: Arc<dyn Clock>,
}
impl CredentialsAdapter {
	/// Creates an adapter using a custom clock.
	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self { clock }
	}
}
impl Default for CredentialsAdapter {
	fn default() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}
}
impl Debug for CredentialsAdapter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CredentialsAdapter(..)")
	}
}
impl JsonAdapter<Credentials> for CredentialsAdapter {
	fn from_json(&self, reader: &mut dyn Read) -> Result<Credentials, DecodeError> {
		let record = SerdeAdapter::<CredentialsRecord>::new().from_json(reader)?;
		let access_token = required(record.access_token, "access_token")?;
		let id_token = required(record.id_token, "id_token")?;
		let token_type = required(record.token_type, "token_type")?;
		let expires_in = record
			.expires_in
			.filter(|seconds| *seconds > 0)
			.ok_or_else(|| DecodeError::invalid("expires_in must be a positive number of seconds"))?;
		let expires_at = self
			.clock
			.now()
			.checked_add(Duration::seconds(expires_in))
			.ok_or_else(|| DecodeError::invalid("expires_in overflows the expiry instant"))?;

		Ok(Credentials {
			id_token: id_token.into(),
			access_token: access_token.into(),
			token_type,
			refresh_token: record.refresh_token.map(TokenSecret::from),
			expires_at,
			scope: record.scope,
		})
	}
}

/// User profile paired with the credentials that fetched it.
#[derive(Clone, Debug, PartialEq)]
pub struct Authentication {
	/// Profile of the authenticated user.
	pub profile: UserProfile,
	/// Credentials issued by the authentication step.
	pub credentials: Credentials,
}
impl Authentication {
	/// Pairs a profile with credentials.
	pub fn new(profile: UserProfile, credentials: Credentials) -> Self {
		Self { profile, credentials }
	}
}

#[derive(Deserialize)]
struct CredentialsRecord {
	access_token: Option<String>,
	id_token: Option<String>,
	token_type: Option<String>,
	refresh_token: Option<String>,
	expires_in: Option<i64>,
	scope: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, DecodeError> {
	value.filter(|v| !v.is_empty()).ok_or_else(|| DecodeError::invalid(format!("{field} is missing")))
}
