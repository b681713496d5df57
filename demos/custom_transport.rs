//! Demonstrates plugging an in-memory [`NetworkingClient`] into an [`Account`] and running a
//! login-then-profile chain through a [`QueuedThreadSwitcher`].
//!
//! 1. Implement [`NetworkingClient::load`] and answer with [`ServerResponse`] values.
//! 2. Hand the transport to [`Account::with_networking_client`].
//! 3. Start the request and drain the switcher on the thread that should see the callback.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
// self
use authok_client::{
	account::Account,
	auth::Authentication,
	authentication::{AuthenticationApiClient, AuthenticationError},
	error::TransportError,
	http::{NetworkingClient, ResponseBody, ResponseHeaders, ServerResponse},
	request::{QueuedThreadSwitcher, Request, RequestOptions},
};

/// Answers the token and userinfo endpoints from memory.
struct FixtureTransport;
impl NetworkingClient for FixtureTransport {
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError> {
		println!("{:?} {url}", options.method);

		let body = if url.ends_with("/oauth/token") {
			"{\"access_token\":\"demo-access\",\"id_token\":\"demo-id\",\"token_type\":\"Bearer\",\"expires_in\":900}"
		} else if url.ends_with("/userinfo") {
			"{\"sub\":\"authok|demo\",\"name\":\"Demo User\",\"email\":\"demo@authok.cn\"}"
		} else {
			return Err(TransportError::InvalidUrl { url: url.to_owned() });
		};

		Ok(ServerResponse::new(200, ResponseHeaders::new(), ResponseBody::from_bytes(body)))
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let switcher = Arc::new(QueuedThreadSwitcher::new());
	let account =
		Account::with_networking_client("demo-client", "demo.authok.cn", Arc::new(FixtureTransport))?
			.with_thread_switcher(switcher.clone());
	let client = AuthenticationApiClient::new(account);
	let request = client.get_profile_after(client.login(
		"demo@authok.cn",
		"correct horse battery staple",
		"Username-Password-Authentication",
	));

	request.start(|result: Result<Authentication, AuthenticationError>| match result {
		Ok(authentication) => println!(
			"Logged in as {:?}; token expires at {}.",
			authentication.profile.name, authentication.credentials.expires_at
		),
		Err(e) => eprintln!("Login failed: {e}."),
	});

	while switcher.run_pending_timeout(Duration::from_secs(5)) == 0 {}

	Ok(())
}
