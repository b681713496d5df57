//! Tenant account: client id, validated domain, and the shared collaborators.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::NetworkingClient,
	request::{DefaultThreadSwitcher, ThreadSwitcher},
	telemetry::ClientInfo,
};

/// Application registered in an Authok tenant.
///
/// Domains are lower-cased and default to `https://` when no scheme is given; `http://`
/// domains are rejected. The configuration domain defaults to the tenant domain.
#[derive(Clone)]
pub struct Account {
	client_id: String,
	domain_url: Url,
	configuration_url: Url,
	client_info: ClientInfo,
	networking_client: Arc<dyn NetworkingClient>,
	thread_switcher: Arc<dyn ThreadSwitcher>,
}
impl Account {
	/// Creates an account backed by the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(client_id: impl Into<String>, domain: &str) -> Result<Self, ConfigError> {
		let client = crate::http::ReqwestNetworkingClient::builder().build()?;

		Self::with_networking_client(client_id, domain, Arc::new(client))
	}

	/// Creates an account backed by a custom transport.
	pub fn with_networking_client(
		client_id: impl Into<String>,
		domain: &str,
		networking_client: Arc<dyn NetworkingClient>,
	) -> Result<Self, ConfigError> {
		let domain_url = parse_domain(domain)?;

		Ok(Self {
			client_id: client_id.into(),
			configuration_url: domain_url.clone(),
			domain_url,
			client_info: ClientInfo::default(),
			networking_client,
			thread_switcher: Arc::new(DefaultThreadSwitcher::new()),
		})
	}

	/// Uses a separate domain for tenant configuration.
	pub fn with_configuration_domain(mut self, domain: &str) -> Result<Self, ConfigError> {
		self.configuration_url = parse_domain(domain)?;

		Ok(self)
	}

	/// Overrides the telemetry sent with every request.
	pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
		self.client_info = client_info;

		self
	}

	/// Overrides the scheduler used by callback execution.
	pub fn with_thread_switcher(mut self, thread_switcher: Arc<dyn ThreadSwitcher>) -> Self {
		self.thread_switcher = thread_switcher;

		self
	}

	/// Replaces the transport.
	pub fn with_networking_client_override(
		mut self,
		networking_client: Arc<dyn NetworkingClient>,
	) -> Self {
		self.networking_client = networking_client;

		self
	}

	/// Application client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Tenant base URL, always ending with `/`.
	pub fn domain_url(&self) -> &Url {
		&self.domain_url
	}

	/// Configuration base URL, always ending with `/`.
	pub fn configuration_url(&self) -> &Url {
		&self.configuration_url
	}

	/// Telemetry sent with every request.
	pub fn client_info(&self) -> &ClientInfo {
		&self.client_info
	}

	/// Shared transport.
	pub fn networking_client(&self) -> &Arc<dyn NetworkingClient> {
		&self.networking_client
	}

	/// Shared scheduler.
	pub fn thread_switcher(&self) -> &Arc<dyn ThreadSwitcher> {
		&self.thread_switcher
	}

	/// `/authorize` endpoint.
	pub fn authorize_url(&self) -> Url {
		self.endpoint(&["authorize"])
	}

	/// `/v1/logout` endpoint.
	pub fn logout_url(&self) -> Url {
		self.endpoint(&["v1", "logout"])
	}

	/// Tenant URL with the provided path segments appended; segments are percent-encoded.
	pub fn endpoint(&self, segments: &[&str]) -> Url {
		let mut url = self.domain_url.clone();

		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}
impl Debug for Account {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Account")
			.field("client_id", &self.client_id)
			.field("domain_url", &self.domain_url.as_str())
			.field("configuration_url", &self.configuration_url.as_str())
			.field("client_info", &self.client_info)
			.finish_non_exhaustive()
	}
}

fn parse_domain(domain: &str) -> Result<Url, ConfigError> {
	let normalized = domain.trim().to_lowercase();

	if normalized.starts_with("http://") {
		return Err(ConfigError::InsecureDomain { domain: domain.to_owned() });
	}

	let with_scheme = if normalized.starts_with("https://") {
		normalized
	} else {
		format!("https://{normalized}")
	};
	let mut url = Url::parse(&with_scheme)
		.map_err(|source| ConfigError::InvalidDomain { domain: domain.to_owned(), source })?;

	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}
