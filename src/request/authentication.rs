//! Token request with dedicated setters for the authentication parameters.

// self
use crate::{
	_prelude::*,
	auth::{
		Credentials,
		parameters::{AUDIENCE_KEY, CONNECTION_KEY, GRANT_TYPE_KEY, REALM_KEY, SCOPE_KEY},
	},
	obs::RequestStage,
	request::{Callback, Request, ThreadSwitcher, TypedRequest},
};

/// Request resolving into [`Credentials`].
///
/// Every setter writes a single-valued parameter; the latest call wins.
pub struct AuthenticationRequest<E> {
	request: TypedRequest<Credentials, E>,
}
impl<E> AuthenticationRequest<E>
where
	E: 'static + Send,
{
	/// Wraps a credentials request.
	pub fn new(request: TypedRequest<Credentials, E>) -> Self {
		Self { request }
	}

	/// Sets `grant_type`.
	pub fn set_grant_type(self, grant_type: impl Into<String>) -> Self {
		self.add_parameter(GRANT_TYPE_KEY, grant_type.into())
	}

	/// Sets `connection`.
	pub fn set_connection(self, connection: impl Into<String>) -> Self {
		self.add_parameter(CONNECTION_KEY, connection.into())
	}

	/// Sets `realm`.
	pub fn set_realm(self, realm: impl Into<String>) -> Self {
		self.add_parameter(REALM_KEY, realm.into())
	}

	/// Sets `scope`; `openid` is always kept exactly once.
	pub fn set_scope(self, scope: impl Into<String>) -> Self {
		self.add_parameter(SCOPE_KEY, scope.into())
	}

	/// Sets `audience`.
	pub fn set_audience(self, audience: impl Into<String>) -> Self {
		self.add_parameter(AUDIENCE_KEY, audience.into())
	}

	/// Wrapped request.
	pub fn request(&self) -> &TypedRequest<Credentials, E> {
		&self.request
	}

	/// Unwraps the credentials request.
	pub fn into_request(self) -> TypedRequest<Credentials, E> {
		self.request
	}

	/// Scheduler used by [`Request::start`].
	pub fn thread_switcher(&self) -> &Arc<dyn ThreadSwitcher> {
		self.request.thread_switcher()
	}

	pub(crate) fn perform(self, stage: RequestStage) -> Result<Credentials, E> {
		self.request.perform(stage)
	}
}
impl<E> Clone for AuthenticationRequest<E> {
	fn clone(&self) -> Self {
		Self { request: self.request.clone() }
	}
}
impl<E> Debug for AuthenticationRequest<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticationRequest").field("request", &self.request).finish()
	}
}
impl<E> Request<Credentials, E> for AuthenticationRequest<E>
where
	E: 'static + Send,
{
	fn add_parameter(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		Self { request: self.request.add_parameter(name, value) }
	}

	fn add_parameters<I, K, V>(self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		Self { request: self.request.add_parameters(parameters) }
	}

	fn add_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { request: self.request.add_header(name, value) }
	}

	fn execute(self) -> Result<Credentials, E> {
		self.request.execute()
	}

	fn start<C>(self, callback: C)
	where
		C: Callback<Credentials, E>,
	{
		self.request.start(callback)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::OfflineNetworkingClient,
		auth::CredentialsAdapter,
		error::RequestError,
		http::ResponseHeaders,
		request::{DefaultThreadSwitcher, ErrorAdapter, HttpMethod},
	};

	struct Describe;
	impl ErrorAdapter<String> for Describe {
		fn from_raw_response(&self, status: u16, _: &str, _: &ResponseHeaders) -> String {
			format!("raw {status}")
		}

		fn from_json_response(&self, status: u16, _: JsonMap<String, JsonValue>) -> String {
			format!("json {status}")
		}

		fn from_exception(&self, cause: RequestError) -> String {
			cause.to_string()
		}
	}

	fn request() -> AuthenticationRequest<String> {
		AuthenticationRequest::new(TypedRequest::new(
			HttpMethod::Post,
			"https://tenant.authok.cn/oauth/token",
			Arc::new(OfflineNetworkingClient),
			Arc::new(CredentialsAdapter::default()),
			Arc::new(Describe),
			Arc::new(DefaultThreadSwitcher::new()),
		))
	}

	#[test]
	fn setters_are_single_valued() {
		let request = request()
			.set_grant_type("password")
			.set_grant_type("refresh_token")
			.set_realm("db")
			.set_connection("db")
			.set_audience("https://api")
			.set_scope("email profile")
			.set_scope("openid email");
		let options = request.request().options();

		assert_eq!(options.parameter(GRANT_TYPE_KEY), Some(&JsonValue::from("refresh_token")));
		assert_eq!(options.parameter(SCOPE_KEY), Some(&JsonValue::from("openid email")));
		assert_eq!(options.parameters().len(), 5);
	}

	#[test]
	fn transport_failures_reach_the_exception_path() {
		let err = request().execute().expect_err("Offline transport should fail.");

		assert_eq!(err, "Request URL is invalid: https://tenant.authok.cn/oauth/token.");
	}
}
