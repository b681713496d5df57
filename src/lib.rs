//! Typed request pipeline for the Authok authentication and management APIs: one algorithm
//! behind blocking and callback execution, pluggable JSON decoding, and a uniform error taxonomy.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod account;
pub mod auth;
pub mod authentication;
pub mod error;
pub mod http;
pub mod management;
pub mod obs;
pub mod request;
pub mod telemetry;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		account::Account,
		error::TransportError,
		http::{NetworkingClient, ServerResponse},
		request::RequestOptions,
	};

	/// Tenant domain used by offline fixtures.
	pub const TEST_DOMAIN: &str = "tenant.authok.cn";

	/// Transport failing every request with [`TransportError::InvalidUrl`].
	#[derive(Clone, Copy, Debug, Default)]
	pub struct OfflineNetworkingClient;
	impl NetworkingClient for OfflineNetworkingClient {
		fn load(&self, url: &str, _: &RequestOptions) -> Result<ServerResponse, TransportError> {
			Err(TransportError::InvalidUrl { url: url.to_owned() })
		}
	}

	/// Account on [`TEST_DOMAIN`] backed by [`OfflineNetworkingClient`].
	pub fn offline_account(client_id: &str) -> Account {
		Account::with_networking_client(client_id, TEST_DOMAIN, Arc::new(OfflineNetworkingClient))
			.expect("Test domain should be accepted.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		io::Read,
		marker::PhantomData,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, rand as _};
