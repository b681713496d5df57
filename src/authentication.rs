//! Authentication API client: logins, token exchange, sign-up, and profile retrieval.

pub mod error;

pub use error::*;

// self
use crate::{
	_prelude::*,
	account::Account,
	auth::{
		Challenge, Credentials, CredentialsAdapter, DatabaseUser, ParameterBuilder, UserProfile,
		parameters::{
			GRANT_TYPE_AUTHORIZATION_CODE, GRANT_TYPE_MFA_OTP, GRANT_TYPE_PASSWORD_REALM,
			GRANT_TYPE_REFRESH_TOKEN,
		},
	},
	request::{
		AUTHORIZATION_HEADER, AuthenticationRequest, ProfileRequest, Request, RequestFactory,
		SerdeAdapter, TypedRequest,
	},
};

const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";
const EMAIL_KEY: &str = "email";
const CODE_KEY: &str = "code";
const CODE_VERIFIER_KEY: &str = "code_verifier";
const REDIRECT_URI_KEY: &str = "redirect_uri";
const MFA_TOKEN_KEY: &str = "mfa_token";
const ONE_TIME_PASSWORD_KEY: &str = "otp";
const TOKEN_KEY: &str = "token";
const CHALLENGE_TYPE_KEY: &str = "challenge_type";
const AUTHENTICATOR_ID_KEY: &str = "authenticator_id";

/// Client for the tenant's Authentication API.
///
/// Every request carries the account's telemetry and the runtime `Accept-Language`.
#[derive(Debug)]
pub struct AuthenticationApiClient {
	account: Account,
	factory: RequestFactory<AuthenticationError>,
}
impl AuthenticationApiClient {
	/// Creates a client sharing the account's transport and scheduler.
	pub fn new(account: Account) -> Self {
		let factory = RequestFactory::new(
			account.networking_client().clone(),
			Arc::new(AuthenticationErrorAdapter),
			account.thread_switcher().clone(),
		);

		factory.set_client_info(account.client_info().value());

		Self { account, factory }
	}

	/// Application client identifier.
	pub fn client_id(&self) -> &str {
		self.account.client_id()
	}

	/// Tenant base URL.
	pub fn base_url(&self) -> &str {
		self.account.domain_url().as_str()
	}

	/// Overrides the telemetry header for future requests.
	pub fn set_client_info(&self, value: impl Into<String>) {
		self.factory.set_client_info(value);
	}

	/// Sets a header sent with every future request.
	pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
		self.factory.set_header(name, value);
	}

	/// Logs in with a username or email and password against a database realm.
	///
	/// Requests the `openid profile email` scope unless the caller sets another.
	pub fn login(
		&self,
		username_or_email: &str,
		password: &str,
		realm: &str,
	) -> AuthenticationRequest<AuthenticationError> {
		let parameters = ParameterBuilder::authentication()
			.set_client_id(self.client_id())
			.set_grant_type(GRANT_TYPE_PASSWORD_REALM)
			.set_realm(realm)
			.set(USERNAME_KEY, username_or_email)
			.set(PASSWORD_KEY, password);

		self.token_request(parameters)
	}

	/// Completes a login that required a second factor with a one-time password.
	pub fn login_with_otp(
		&self,
		mfa_token: &str,
		otp: &str,
	) -> AuthenticationRequest<AuthenticationError> {
		let parameters = ParameterBuilder::new()
			.set_client_id(self.client_id())
			.set_grant_type(GRANT_TYPE_MFA_OTP)
			.set(MFA_TOKEN_KEY, mfa_token)
			.set(ONE_TIME_PASSWORD_KEY, otp);

		self.token_request(parameters)
	}

	/// Exchanges an authorization code (with its PKCE verifier) for credentials.
	pub fn token(
		&self,
		code: &str,
		code_verifier: &str,
		redirect_uri: &str,
	) -> TypedRequest<Credentials, AuthenticationError> {
		let parameters = ParameterBuilder::new()
			.set_client_id(self.client_id())
			.set_grant_type(GRANT_TYPE_AUTHORIZATION_CODE)
			.set(CODE_KEY, code)
			.set(CODE_VERIFIER_KEY, code_verifier)
			.set(REDIRECT_URI_KEY, redirect_uri);

		self.token_request(parameters).into_request()
	}

	/// Exchanges a refresh token for new credentials.
	pub fn renew_auth(&self, refresh_token: &str) -> TypedRequest<Credentials, AuthenticationError> {
		let parameters = ParameterBuilder::new()
			.set_client_id(self.client_id())
			.set_grant_type(GRANT_TYPE_REFRESH_TOKEN)
			.set_refresh_token(refresh_token);

		self.token_request(parameters).into_request()
	}

	/// Fetches the profile bound to an access token.
	pub fn user_info(&self, access_token: &str) -> TypedRequest<UserProfile, AuthenticationError> {
		self.profile_request().add_header(AUTHORIZATION_HEADER, format!("Bearer {access_token}"))
	}

	/// Chains `authentication` with a `/userinfo` call using the issued access token.
	pub fn get_profile_after(
		&self,
		authentication: AuthenticationRequest<AuthenticationError>,
	) -> ProfileRequest<AuthenticationError> {
		ProfileRequest::new(authentication, self.profile_request())
	}

	/// Creates a user in a database connection.
	pub fn create_user(
		&self,
		email: &str,
		password: &str,
		username: Option<&str>,
		connection: &str,
	) -> TypedRequest<DatabaseUser, AuthenticationError> {
		let parameters = ParameterBuilder::new()
			.set_client_id(self.client_id())
			.set_connection(connection)
			.set(EMAIL_KEY, email)
			.set(PASSWORD_KEY, password);
		let parameters = match username {
			Some(username) => parameters.set(USERNAME_KEY, username),
			None => parameters,
		};

		let url = self.account.endpoint(&["dbconnections", "signup"]);

		self.factory.post(url, SerdeAdapter::<DatabaseUser>::new()).add_parameters(parameters)
	}

	/// Sends a change-password email to a database user.
	pub fn reset_password(
		&self,
		email: &str,
		connection: &str,
	) -> TypedRequest<(), AuthenticationError> {
		let parameters = ParameterBuilder::new()
			.set_client_id(self.client_id())
			.set_connection(connection)
			.set(EMAIL_KEY, email);

		self.factory
			.post_no_content(self.account.endpoint(&["dbconnections", "change_password"]))
			.add_parameters(parameters)
	}

	/// Revokes a refresh token.
	pub fn revoke_token(&self, refresh_token: &str) -> TypedRequest<(), AuthenticationError> {
		let parameters =
			ParameterBuilder::new().set_client_id(self.client_id()).set(TOKEN_KEY, refresh_token);

		self.factory
			.post_no_content(self.account.endpoint(&["oauth", "revoke"]))
			.add_parameters(parameters)
	}

	/// Requests a multi-factor challenge for a pending login.
	pub fn multifactor_challenge(
		&self,
		mfa_token: &str,
		challenge_type: Option<&str>,
		authenticator_id: Option<&str>,
	) -> TypedRequest<Challenge, AuthenticationError> {
		let mut parameters =
			ParameterBuilder::new().set_client_id(self.client_id()).set(MFA_TOKEN_KEY, mfa_token);

		if let Some(challenge_type) = challenge_type {
			parameters = parameters.set(CHALLENGE_TYPE_KEY, challenge_type);
		}
		if let Some(authenticator_id) = authenticator_id {
			parameters = parameters.set(AUTHENTICATOR_ID_KEY, authenticator_id);
		}

		let url = self.account.endpoint(&["mfa", "challenge"]);

		self.factory.post(url, SerdeAdapter::<Challenge>::new()).add_parameters(parameters)
	}

	fn token_request(&self, parameters: ParameterBuilder) -> AuthenticationRequest<AuthenticationError> {
		let request = self
			.factory
			.post(self.account.endpoint(&["oauth", "token"]), CredentialsAdapter::default())
			.add_parameters(parameters);

		AuthenticationRequest::new(request)
	}

	fn profile_request(&self) -> TypedRequest<UserProfile, AuthenticationError> {
		self.factory.get(self.account.endpoint(&["userinfo"]), SerdeAdapter::<UserProfile>::new())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::offline_account,
		request::{CLIENT_INFO_HEADER, HttpMethod, SCOPE_KEY},
	};

	fn client() -> AuthenticationApiClient {
		AuthenticationApiClient::new(offline_account("CLIENTID"))
	}

	#[test]
	fn login_uses_password_realm_and_default_scope() {
		let client = client();
		let request = client.login("info@authok.cn", "secret", "Username-Password-Authentication");
		let options = request.request().options();

		assert_eq!(request.request().url(), "https://tenant.authok.cn/oauth/token");
		assert_eq!(options.parameter("grant_type"), Some(&JsonValue::from(GRANT_TYPE_PASSWORD_REALM)));
		assert_eq!(options.parameter(SCOPE_KEY), Some(&JsonValue::from("openid profile email")));
		assert_eq!(options.parameter("client_id"), Some(&JsonValue::from("CLIENTID")));
		assert_eq!(options.parameter("username"), Some(&JsonValue::from("info@authok.cn")));
		assert_eq!(options.header(CLIENT_INFO_HEADER), Some(client.account.client_info().value().as_str()));
	}

	#[test]
	fn endpoint_requests_target_the_expected_paths() {
		let client = client();

		assert_eq!(client.user_info("at").url(), "https://tenant.authok.cn/userinfo");
		assert_eq!(client.user_info("at").method(), HttpMethod::Get);
		assert_eq!(client.user_info("at").options().header("authorization"), Some("Bearer at"));
		assert_eq!(
			client.create_user("a@b.c", "p", None, "db").url(),
			"https://tenant.authok.cn/dbconnections/signup"
		);
		assert!(client.create_user("a@b.c", "p", None, "db").options().parameter("username").is_none());
		assert_eq!(
			client.reset_password("a@b.c", "db").url(),
			"https://tenant.authok.cn/dbconnections/change_password"
		);
		assert_eq!(client.revoke_token("rt").options().parameter("token"), Some(&JsonValue::from("rt")));
		assert_eq!(
			client.multifactor_challenge("mfa", Some("oob"), None).url(),
			"https://tenant.authok.cn/mfa/challenge"
		);
		assert_eq!(
			client.renew_auth("rt").options().parameter("grant_type"),
			Some(&JsonValue::from("refresh_token"))
		);
		assert_eq!(
			client.token("code", "verifier", "app://callback").options().parameter("code_verifier"),
			Some(&JsonValue::from("verifier"))
		);
	}

	#[test]
	fn client_info_override_applies_to_new_requests() {
		let client = client();
		let before = client.user_info("at");

		client.set_client_info("custom");

		assert_ne!(before.options().header(CLIENT_INFO_HEADER), Some("custom"));
		assert_eq!(client.user_info("at").options().header(CLIENT_INFO_HEADER), Some("custom"));
	}
}
