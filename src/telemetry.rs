//! Client telemetry sent in the `Authok-Client` header.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE};
// self
use crate::_prelude::*;

/// Environment key carrying the library version.
pub const LIBRARY_VERSION_KEY: &str = "authok.rust";

/// Identifies the calling SDK and platform.
///
/// The header value is the URL-safe base64 encoding of
/// `{"name": .., "env": {..}, "version": ..}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
	name: String,
	version: String,
	env: BTreeMap<String, String>,
	library_version: Option<String>,
}
impl ClientInfo {
	/// Creates telemetry for an SDK, recording the host OS and architecture.
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
		let env = BTreeMap::from([
			("os".to_owned(), std::env::consts::OS.to_owned()),
			("arch".to_owned(), std::env::consts::ARCH.to_owned()),
		]);

		Self { name: name.into(), version: version.into(), env, library_version: None }
	}

	/// Records the version of a wrapping library under [`LIBRARY_VERSION_KEY`].
	pub fn with_library_version(mut self, version: impl Into<String>) -> Self {
		self.library_version = Some(version.into());

		self
	}

	/// Adds an environment entry.
	pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.env.insert(key.into(), value.into());

		self
	}

	/// SDK name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// SDK version.
	pub fn version(&self) -> &str {
		&self.version
	}

	/// Environment entries, library version included.
	pub fn environment(&self) -> BTreeMap<String, String> {
		let mut env = self.env.clone();

		if let Some(version) = &self.library_version {
			env.insert(LIBRARY_VERSION_KEY.to_owned(), version.clone());
		}

		env
	}

	/// Encoded header value.
	pub fn value(&self) -> String {
		let payload = serde_json::json!({
			"name": self.name,
			"env": self.environment(),
			"version": self.version,
		});

		URL_SAFE.encode(payload.to_string())
	}
}
impl Default for ClientInfo {
	fn default() -> Self {
		Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
	}
}
