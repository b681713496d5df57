//! Single HTTP operation decoded into `T` or the surface error `E`.

// std
use std::panic::{self, AssertUnwindSafe};
// self
use crate::{
	_prelude::*,
	error::{RequestError, TransportError},
	http::{NetworkingClient, ServerResponse},
	obs::{self, RequestOutcome, RequestSpan, RequestStage},
	request::{
		Callback, ErrorAdapter, HttpMethod, JsonAdapter, ParseTarget, Request, RequestOptions,
		ThreadSwitcher,
	},
};

/// Typed HTTP operation minted by a [`RequestFactory`](crate::request::RequestFactory).
///
/// The request owns its options; the transport, adapters, and switcher are shared. Failure
/// routing is fixed:
///
/// - transport failures and unreadable failure bodies reach
///   [`ErrorAdapter::from_exception`] as [`RequestError::Transport`];
/// - a `2xx` body the [`JsonAdapter`] cannot decode reaches
///   [`ErrorAdapter::from_exception`] as [`RequestError::Decode`];
/// - a non-`2xx` body that is a JSON object reaches [`ErrorAdapter::from_json_response`];
/// - any other non-`2xx` body reaches [`ErrorAdapter::from_raw_response`].
///
/// The [`ServerResponse`] is dropped before the outcome leaves the request, which closes the
/// body stream on every branch.
pub struct TypedRequest<T, E> {
	url: String,
	client: Arc<dyn NetworkingClient>,
	result_adapter: Arc<dyn JsonAdapter<T>>,
	error_adapter: Arc<dyn ErrorAdapter<E>>,
	switcher: Arc<dyn ThreadSwitcher>,
	options: RequestOptions,
}
impl<T, E> TypedRequest<T, E>
where
	T: 'static + Send,
	E: 'static + Send,
{
	/// Creates a request with empty options.
	pub fn new(
		method: HttpMethod,
		url: impl Into<String>,
		client: Arc<dyn NetworkingClient>,
		result_adapter: Arc<dyn JsonAdapter<T>>,
		error_adapter: Arc<dyn ErrorAdapter<E>>,
		switcher: Arc<dyn ThreadSwitcher>,
	) -> Self {
		Self {
			url: url.into(),
			client,
			result_adapter,
			error_adapter,
			switcher,
			options: RequestOptions::new(method),
		}
	}

	/// Target URL.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// HTTP verb.
	pub fn method(&self) -> HttpMethod {
		self.options.method
	}

	/// Options accumulated so far.
	pub fn options(&self) -> &RequestOptions {
		&self.options
	}

	/// Scheduler used by [`Request::start`].
	pub fn thread_switcher(&self) -> &Arc<dyn ThreadSwitcher> {
		&self.switcher
	}

	/// Sets how the success body is consumed.
	pub fn with_parse_target(mut self, parse_target: ParseTarget) -> Self {
		self.options.parse_target = parse_target;

		self
	}

	/// Runs the pipeline once on the current thread.
	///
	/// A panic raised by the transport or an adapter is caught and reaches
	/// [`ErrorAdapter::from_exception`] as [`TransportError::Panicked`].
	pub(crate) fn perform(self, stage: RequestStage) -> Result<T, E> {
		let method = self.options.method;
		let _guard = RequestSpan::new(method, stage).entered();

		obs::record_request_outcome(method, RequestOutcome::Attempt);

		let result = panic::catch_unwind(AssertUnwindSafe(|| self.load_and_decode()))
			.unwrap_or_else(|payload| {
				let cause = TransportError::panicked(payload.as_ref());

				#[cfg(feature = "tracing")]
				tracing::warn!("{cause}");

				Err(self.error_adapter.from_exception(cause.into()))
			});

		match &result {
			Ok(_) => obs::record_request_outcome(method, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(method, RequestOutcome::Failure),
		}

		result
	}

	fn load_and_decode(&self) -> Result<T, E> {
		let response = self
			.client
			.load(&self.url, &self.options)
			.map_err(|e| self.error_adapter.from_exception(e.into()))?;

		if response.is_success() {
			self.decode_success(response)
		} else {
			Err(self.decode_failure(response))
		}
	}

	fn decode_success(&self, mut response: ServerResponse) -> Result<T, E> {
		let status = response.status;

		self.result_adapter
			.from_json(&mut response.body)
			.map_err(|source| self.error_adapter.from_exception(RequestError::Decode { status, source }))
	}

	fn decode_failure(&self, mut response: ServerResponse) -> E {
		let mut body = Vec::new();

		if let Err(e) = response.body.read_to_end(&mut body) {
			return self.error_adapter.from_exception(TransportError::Io(e).into());
		}

		match serde_json::from_slice::<JsonValue>(&body) {
			Ok(JsonValue::Object(values)) =>
				self.error_adapter.from_json_response(response.status, values),
			_ => self.error_adapter.from_raw_response(
				response.status,
				&String::from_utf8_lossy(&body),
				&response.headers,
			),
		}
	}
}
impl<T, E> Request<T, E> for TypedRequest<T, E>
where
	T: 'static + Send,
	E: 'static + Send,
{
	fn add_parameter(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.options.set_parameter(name, value);

		self
	}

	fn add_parameters<I, K, V>(mut self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		self.options.extend_parameters(parameters);

		self
	}

	fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.options.set_header(name, value);

		self
	}

	fn execute(self) -> Result<T, E> {
		self.perform(RequestStage::Execute)
	}

	fn start<C>(self, callback: C)
	where
		C: Callback<T, E>,
	{
		let switcher = self.switcher.clone();

		super::dispatch(switcher, move || self.perform(RequestStage::Start), callback);
	}
}
impl<T, E> Clone for TypedRequest<T, E> {
	fn clone(&self) -> Self {
		Self {
			url: self.url.clone(),
			client: self.client.clone(),
			result_adapter: self.result_adapter.clone(),
			error_adapter: self.error_adapter.clone(),
			switcher: self.switcher.clone(),
			options: self.options.clone(),
		}
	}
}
impl<T, E> Debug for TypedRequest<T, E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TypedRequest")
			.field("url", &self.url)
			.field("options", &self.options)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		http::{ResponseBody, ResponseHeaders},
		request::{DefaultThreadSwitcher, SerdeAdapter},
	};

	#[derive(Debug, PartialEq)]
	enum Routed {
		Raw(u16, String),
		Json(u16, JsonMap<String, JsonValue>),
		Exception(String),
	}

	struct RoutingAdapter;
	impl ErrorAdapter<Routed> for RoutingAdapter {
		fn from_raw_response(&self, status: u16, body: &str, _: &ResponseHeaders) -> Routed {
			Routed::Raw(status, body.to_owned())
		}

		fn from_json_response(&self, status: u16, values: JsonMap<String, JsonValue>) -> Routed {
			Routed::Json(status, values)
		}

		fn from_exception(&self, cause: RequestError) -> Routed {
			Routed::Exception(match cause {
				RequestError::Transport(_) => "transport".into(),
				RequestError::Decode { status, .. } => format!("decode {status}"),
			})
		}
	}

	struct CannedClient {
		status: u16,
		body: &'static str,
		calls: AtomicUsize,
	}
	impl NetworkingClient for CannedClient {
		fn load(&self, _: &str, _: &RequestOptions) -> Result<ServerResponse, TransportError> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if self.status == 0 {
				return Err(TransportError::Io(std::io::ErrorKind::ConnectionRefused.into()));
			}

			Ok(ServerResponse::new(
				self.status,
				ResponseHeaders::new(),
				ResponseBody::from_bytes(self.body),
			))
		}
	}

	fn request(status: u16, body: &'static str) -> TypedRequest<BTreeMap<String, String>, Routed> {
		TypedRequest::new(
			HttpMethod::Get,
			"https://tenant.authok.cn/userinfo",
			Arc::new(CannedClient { status, body, calls: AtomicUsize::new(0) }),
			Arc::new(SerdeAdapter::new()),
			Arc::new(RoutingAdapter),
			Arc::new(DefaultThreadSwitcher::new()),
		)
	}

	#[test]
	fn failures_route_through_exactly_one_adapter_path() {
		assert_eq!(request(0, "").execute(), Err(Routed::Exception("transport".into())));
		assert_eq!(request(200, "{ broken").execute(), Err(Routed::Exception("decode 200".into())));
		assert_eq!(request(502, "Bad Gateway").execute(), Err(Routed::Raw(502, "Bad Gateway".into())));
		assert_eq!(request(500, "[1, 2]").execute(), Err(Routed::Raw(500, "[1, 2]".into())));
		assert_eq!(request(503, "").execute(), Err(Routed::Raw(503, String::new())));

		let Err(Routed::Json(status, values)) = request(404, r#"{"error":"not_found"}"#).execute()
		else {
			panic!("JSON object bodies must use the JSON error path.");
		};

		assert_eq!(status, 404);
		assert_eq!(values.get("error"), Some(&JsonValue::from("not_found")));
	}

	#[test]
	fn success_bodies_decode_into_the_result_type() {
		let value = request(200, r#"{"id":"42"}"#).execute().expect("Body should decode.");

		assert_eq!(value.get("id").map(String::as_str), Some("42"));
	}

	#[test]
	fn builder_methods_accumulate_options() {
		let request = request(200, "{}")
			.add_parameter("grant_type", "password")
			.add_parameters([("grant_type", "refresh_token"), ("scope", "email")])
			.add_header("Authorization", "Bearer a")
			.add_header("authorization", "Bearer b")
			.with_parse_target(ParseTarget::NoContent);

		assert_eq!(request.options().parameter("grant_type"), Some(&JsonValue::from("refresh_token")));
		assert_eq!(request.options().parameter("scope"), Some(&JsonValue::from("email openid")));
		assert_eq!(request.options().headers().len(), 1);
		assert_eq!(request.options().header("Authorization"), Some("Bearer b"));
		assert_eq!(request.options().parse_target, ParseTarget::NoContent);
		assert_eq!(request.method(), HttpMethod::Get);
	}
}
