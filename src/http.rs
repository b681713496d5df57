//! Transport capability consumed by the request pipeline.
//!
//! The module exposes [`NetworkingClient`] alongside [`ServerResponse`] so downstream crates
//! can plug in any HTTP stack. The pipeline never inspects transport internals (pooling,
//! HTTP/2, proxies); it only reads the status code, the headers, and the body stream of the
//! returned response. The default implementation, [`ReqwestNetworkingClient`], is built on
//! reqwest's blocking client.

// std
use std::io::Result as IoResult;
#[cfg(feature = "reqwest")] use std::time::Duration as StdDuration;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	Method,
	blocking::{Client as BlockingClient, ClientBuilder as BlockingClientBuilder},
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	request::{HttpMethod, ParseTarget, RequestOptions},
};

/// Response headers, keyed verbatim with every value the server sent.
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// Abstraction over HTTP transports able to perform exactly one request attempt.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by every
/// request minted for an API client, including requests running on background workers.
/// Retries, backoff, and timeouts are the implementation's business; the pipeline treats any
/// returned error as terminal.
pub trait NetworkingClient
where
	Self: 'static + Send + Sync,
{
	/// Performs the request described by `options` against `url`.
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError>;
}

/// Owned body stream of a [`ServerResponse`]; dropping it releases the underlying connection.
pub struct ResponseBody(Box<dyn Read + Send>);
impl ResponseBody {
	/// Wraps any reader.
	pub fn new(reader: impl 'static + Read + Send) -> Self {
		Self(Box::new(reader))
	}

	/// Body backed by an in-memory buffer.
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self::new(std::io::Cursor::new(bytes.into()))
	}

	/// Body with no content.
	pub fn empty() -> Self {
		Self::new(std::io::empty())
	}
}
impl Read for ResponseBody {
	fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
		self.0.read(buf)
	}
}
impl Debug for ResponseBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ResponseBody(..)")
	}
}

/// Outcome of one request attempt as produced by the transport.
#[derive(Debug)]
pub struct ServerResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: ResponseHeaders,
	/// Body stream, consumed and closed by the request that dispatched it.
	pub body: ResponseBody,
}
impl ServerResponse {
	/// Creates a response from its parts.
	pub fn new(status: u16, headers: ResponseHeaders, body: ResponseBody) -> Self {
		Self { status, headers, body }
	}

	/// Returns `true` for `2xx` statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// First value of a header looked up ignoring ASCII case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.and_then(|(_, values)| values.first())
			.map(String::as_str)
	}
}

/// Builder for [`ReqwestNetworkingClient`].
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct ReqwestNetworkingClientBuilder {
	connect_timeout: StdDuration,
	timeout: StdDuration,
	default_headers: BTreeMap<String, String>,
	logging: bool,
}
#[cfg(feature = "reqwest")]
impl ReqwestNetworkingClientBuilder {
	const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Sets the connect timeout (10 seconds by default).
	pub fn connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.connect_timeout = timeout;

		self
	}

	/// Sets the whole-request timeout (10 seconds by default).
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Adds a header sent with every request; a request header of the same name replaces it.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());

		self
	}

	/// Logs request and response lines at `debug` level when the `tracing` feature is enabled.
	pub fn enable_logging(mut self, enabled: bool) -> Self {
		self.logging = enabled;

		self
	}

	/// Builds the client.
	pub fn build(self) -> Result<ReqwestNetworkingClient, crate::error::ConfigError> {
		let client = BlockingClientBuilder::new()
			.connect_timeout(self.connect_timeout)
			.timeout(self.timeout)
			.build()
			.map_err(crate::error::ConfigError::http_client_build)?;

		Ok(ReqwestNetworkingClient {
			client,
			default_headers: self.default_headers,
			logging: self.logging,
		})
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestNetworkingClientBuilder {
	fn default() -> Self {
		Self {
			connect_timeout: Self::DEFAULT_TIMEOUT,
			timeout: Self::DEFAULT_TIMEOUT,
			default_headers: BTreeMap::new(),
			logging: false,
		}
	}
}

/// Blocking reqwest transport.
///
/// `GET` parameters are appended as query pairs; every other verb sends the parameter map
/// as a JSON body. Response bodies are streamed straight from the connection.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestNetworkingClient {
	client: BlockingClient,
	default_headers: BTreeMap<String, String>,
	logging: bool,
}
#[cfg(feature = "reqwest")]
impl ReqwestNetworkingClient {
	/// Returns a builder with 10 second timeouts.
	pub fn builder() -> ReqwestNetworkingClientBuilder {
		ReqwestNetworkingClientBuilder::default()
	}

	/// Wraps an existing blocking client.
	pub fn with_client(client: BlockingClient) -> Self {
		Self { client, default_headers: BTreeMap::new(), logging: false }
	}

	/// Headers sent on the wire: client defaults, then the JSON `Accept`, then the request's
	/// own headers. Names are case-insensitive and a later source replaces an earlier one.
	fn header_map(&self, options: &RequestOptions) -> Result<HeaderMap, TransportError> {
		let json_accept = (options.parse_target == ParseTarget::Json)
			.then_some((ACCEPT.as_str(), "application/json"));
		let defaults =
			self.default_headers.iter().map(|(name, value)| (name.as_str(), value.as_str()));
		let own = options.headers().iter().map(|(name, value)| (name.as_str(), value.as_str()));
		let mut headers = HeaderMap::new();

		for (name, value) in defaults.chain(json_accept).chain(own) {
			let name = HeaderName::from_bytes(name.as_bytes()).map_err(TransportError::network)?;
			let value = HeaderValue::from_str(value).map_err(TransportError::network)?;

			headers.insert(name, value);
		}

		Ok(headers)
	}

	fn log_line(&self, line: impl FnOnce() -> String) {
		#[cfg(feature = "tracing")]
		if self.logging {
			tracing::debug!(target: "authok_client::http", "{}", line());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (self.logging, line);
		}
	}
}
#[cfg(feature = "reqwest")]
impl NetworkingClient for ReqwestNetworkingClient {
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError> {
		let mut target =
			Url::parse(url).map_err(|_| TransportError::InvalidUrl { url: url.to_owned() })?;
		let request = match options.method {
			HttpMethod::Get => {
				if !options.parameters().is_empty() {
					let mut pairs = target.query_pairs_mut();

					for (name, value) in options.parameters() {
						pairs.append_pair(name, &query_value(value));
					}
				}

				self.client.request(Method::GET, target)
			},
			method => {
				let body =
					serde_json::to_vec(options.parameters()).map_err(TransportError::network)?;

				self.client
					.request(reqwest_method(method), target)
					.header(CONTENT_TYPE, "application/json; charset=utf-8")
					.body(body)
			},
		};

		let request = request.headers(self.header_map(options)?);

		self.log_line(|| format!("--> {} {url}", options.method));

		let response = request.send()?;
		let status = response.status().as_u16();
		let mut headers = ResponseHeaders::new();

		for (name, value) in response.headers() {
			headers
				.entry(name.as_str().to_owned())
				.or_default()
				.push(String::from_utf8_lossy(value.as_bytes()).into_owned());
		}

		self.log_line(|| format!("<-- {status} {url}"));

		Ok(ServerResponse::new(status, headers, ResponseBody::new(response)))
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: HttpMethod) -> Method {
	match method {
		HttpMethod::Get => Method::GET,
		HttpMethod::Post => Method::POST,
		HttpMethod::Patch => Method::PATCH,
		HttpMethod::Delete => Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn query_value(value: &JsonValue) -> String {
	match value {
		JsonValue::String(s) => s.clone(),
		other => other.to_string(),
	}
}
