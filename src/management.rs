//! Management API client for the users resource.

pub mod error;

pub use error::*;

// self
use crate::{
	_prelude::*,
	account::Account,
	auth::{UserIdentity, UserProfile},
	request::{AUTHORIZATION_HEADER, Request, RequestFactory, SerdeAdapter, TypedRequest},
};

const LINK_WITH_KEY: &str = "link_with";
const USER_METADATA_KEY: &str = "user_metadata";

/// Client for `/api/v1/users`, authorized by a Management API token.
#[derive(Debug)]
pub struct UsersApiClient {
	account: Account,
	factory: RequestFactory<ManagementError>,
}
impl UsersApiClient {
	/// Creates a client whose requests carry `Authorization: Bearer <token>`.
	pub fn new(account: Account, token: &str) -> Self {
		let factory = RequestFactory::new(
			account.networking_client().clone(),
			Arc::new(ManagementErrorAdapter),
			account.thread_switcher().clone(),
		);

		factory.set_client_info(account.client_info().value());
		factory.set_header(AUTHORIZATION_HEADER, format!("Bearer {token}"));

		Self { account, factory }
	}

	/// Overrides the telemetry header for future requests.
	pub fn set_client_info(&self, value: impl Into<String>) {
		self.factory.set_client_info(value);
	}

	/// Links the identity behind `secondary_token` to `primary_user_id`.
	pub fn link(
		&self,
		primary_user_id: &str,
		secondary_token: &str,
	) -> TypedRequest<Vec<UserIdentity>, ManagementError> {
		let url = self.user_url(&[primary_user_id, "identities"]);

		self.factory
			.post(url, SerdeAdapter::<Vec<UserIdentity>>::new())
			.add_parameter(LINK_WITH_KEY, secondary_token)
	}

	/// Unlinks a secondary identity; resolves into the identities left on the primary user.
	pub fn unlink(
		&self,
		primary_user_id: &str,
		secondary_user_id: &str,
		secondary_provider: &str,
	) -> TypedRequest<Vec<UserIdentity>, ManagementError> {
		let url = self.user_url(&[
			primary_user_id,
			"identities",
			secondary_provider,
			secondary_user_id,
		]);

		self.factory.delete(url, SerdeAdapter::<Vec<UserIdentity>>::new())
	}

	/// Merges `metadata` into the user's `user_metadata`.
	pub fn update_metadata(
		&self,
		user_id: &str,
		metadata: JsonMap<String, JsonValue>,
	) -> TypedRequest<UserProfile, ManagementError> {
		self.factory
			.patch(self.user_url(&[user_id]), SerdeAdapter::<UserProfile>::new())
			.add_parameter(USER_METADATA_KEY, metadata)
	}

	/// Fetches a user's full profile.
	pub fn get_profile(&self, user_id: &str) -> TypedRequest<UserProfile, ManagementError> {
		self.factory.get(self.user_url(&[user_id]), SerdeAdapter::<UserProfile>::new())
	}

	fn user_url(&self, segments: &[&str]) -> Url {
		let path = ["api", "v1", "users"].iter().chain(segments).copied().collect::<Vec<_>>();

		self.account.endpoint(&path)
	}
}
