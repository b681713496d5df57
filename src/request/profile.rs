//! Two-step request: authenticate, then fetch the profile with the issued access token.

// self
use crate::{
	_prelude::*,
	auth::{Authentication, UserProfile},
	obs::RequestStage,
	request::{AuthenticationRequest, Callback, Request, TypedRequest},
};

/// `Authorization` header injected into the profile step.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Composite request producing an [`Authentication`].
///
/// Configuration reaches the authentication step only. Execution is sequential: a failed
/// authentication short-circuits without calling the profile endpoint, and a failed profile
/// fetch discards the credentials and surfaces the profile error. [`Request::execute`] and
/// [`Request::start`] share the same sequence.
pub struct ProfileRequest<E> {
	authentication: AuthenticationRequest<E>,
	user_info: TypedRequest<UserProfile, E>,
}
impl<E> ProfileRequest<E>
where
	E: 'static + Send,
{
	/// Chains an authentication request with a profile request.
	pub fn new(
		authentication: AuthenticationRequest<E>,
		user_info: TypedRequest<UserProfile, E>,
	) -> Self {
		Self { authentication, user_info }
	}

	/// Sets the scope used to authenticate.
	pub fn set_scope(self, scope: impl Into<String>) -> Self {
		Self { authentication: self.authentication.set_scope(scope), ..self }
	}

	/// Sets the connection used to authenticate.
	pub fn set_connection(self, connection: impl Into<String>) -> Self {
		Self { authentication: self.authentication.set_connection(connection), ..self }
	}

	/// Authentication step.
	pub fn authentication(&self) -> &AuthenticationRequest<E> {
		&self.authentication
	}

	fn perform(self) -> Result<Authentication, E> {
		let credentials = self.authentication.perform(RequestStage::Authenticate)?;
		let profile = self
			.user_info
			.add_header(AUTHORIZATION_HEADER, credentials.bearer())
			.perform(RequestStage::Profile)?;

		Ok(Authentication::new(profile, credentials))
	}
}
impl<E> Request<Authentication, E> for ProfileRequest<E>
where
	E: 'static + Send,
{
	fn add_parameter(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		Self { authentication: self.authentication.add_parameter(name, value), ..self }
	}

	fn add_parameters<I, K, V>(self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		Self { authentication: self.authentication.add_parameters(parameters), ..self }
	}

	fn add_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { authentication: self.authentication.add_header(name, value), ..self }
	}

	fn execute(self) -> Result<Authentication, E> {
		self.perform()
	}

	fn start<C>(self, callback: C)
	where
		C: Callback<Authentication, E>,
	{
		let switcher = self.authentication.thread_switcher().clone();

		super::dispatch(switcher, move || self.perform(), callback);
	}
}
impl<E> Debug for ProfileRequest<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProfileRequest")
			.field("authentication", &self.authentication)
			.field("user_info", &self.user_info)
			.finish()
	}
}
