//! Demonstrates the Management API users client with the default reqwest transport against a
//! local mock tenant.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use authok_client::{
	account::Account,
	error::{ApiError, TransportError},
	http::{NetworkingClient, ReqwestNetworkingClient, ServerResponse},
	management::UsersApiClient,
	request::{Request, RequestOptions},
	serde_json::{Map as JsonMap, Value as JsonValue},
};

/// The mock tenant only speaks plain HTTP.
struct Loopback(ReqwestNetworkingClient);
impl NetworkingClient for Loopback {
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError> {
		self.0.load(&url.replacen("https://", "http://", 1), options)
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start();
	let profile_mock = server.mock(|when, then| {
		when.method(GET).path("/api/v1/users/42");
		then.status(200)
			.header("content-type", "application/json")
			.body("{\"user_id\":\"42\",\"name\":\"Demo User\",\"user_metadata\":{}}");
	});
	let metadata_mock = server.mock(|when, then| {
		when.method(PATCH).path("/api/v1/users/42");
		then.status(200)
			.header("content-type", "application/json")
			.body("{\"user_id\":\"42\",\"user_metadata\":{\"plan\":\"pro\"}}");
	});
	let missing_mock = server.mock(|when, then| {
		when.method(GET).path("/api/v1/users/404");
		then.status(404)
			.header("content-type", "application/json")
			.body("{\"error\":\"not_found\",\"error_description\":\"User not found.\"}");
	});
	let transport = ReqwestNetworkingClient::builder()
		.timeout(Duration::from_secs(5))
		.enable_logging(true)
		.build()?;
	let account = Account::with_networking_client(
		"demo-client",
		&server.address().to_string(),
		Arc::new(Loopback(transport)),
	)?;
	let users = UsersApiClient::new(account, "demo-management-token");
	let profile = users.get_profile("42").execute()?;

	println!("Fetched {:?} ({:?}).", profile.name, profile.id);

	let mut metadata = JsonMap::new();

	metadata.insert("plan".into(), JsonValue::from("pro"));

	let profile = users.update_metadata("42", metadata).execute()?;

	println!("Updated metadata: {:?}.", profile.user_metadata);

	if let Err(e) = users.get_profile("404").execute() {
		println!(
			"Lookup failed with {} ({:?}): {}.",
			e.code(),
			e.status_code(),
			ApiError::description(&e)
		);
	}

	profile_mock.assert();
	metadata_mock.assert();
	missing_mock.assert();

	Ok(())
}
