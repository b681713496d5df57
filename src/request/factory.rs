//! Mints typed requests for one API surface with a shared base header set.

// self
use crate::{
	_prelude::*,
	http::NetworkingClient,
	request::{
		ErrorAdapter, HttpMethod, JsonAdapter, NoContentAdapter, ParseTarget, Request,
		ThreadSwitcher, TypedRequest,
	},
};

/// Header carrying the runtime locale.
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";
/// Header carrying the base64 client telemetry payload.
pub const CLIENT_INFO_HEADER: &str = "Authok-Client";
/// Locale used when the runtime reports none.
pub const DEFAULT_LOCALE: &str = "en_US";

const LOCALE_VARIABLES: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Request factory bound to one transport, one error adapter, and one scheduler.
///
/// Base headers start with `Accept-Language` and can be updated concurrently with minting.
/// Every minted request copies the base headers present at mint time; later changes do not
/// reach requests that already exist.
pub struct RequestFactory<E> {
	client: Arc<dyn NetworkingClient>,
	error_adapter: Arc<dyn ErrorAdapter<E>>,
	switcher: Arc<dyn ThreadSwitcher>,
	base_headers: RwLock<BTreeMap<String, String>>,
}
impl<E> RequestFactory<E>
where
	E: 'static + Send,
{
	/// Creates a factory seeded with the runtime `Accept-Language`.
	pub fn new(
		client: Arc<dyn NetworkingClient>,
		error_adapter: Arc<dyn ErrorAdapter<E>>,
		switcher: Arc<dyn ThreadSwitcher>,
	) -> Self {
		let locale = locale_or_default(runtime_locale().as_deref());
		let base_headers = BTreeMap::from([(ACCEPT_LANGUAGE_HEADER.to_owned(), locale)]);

		Self { client, error_adapter, switcher, base_headers: RwLock::new(base_headers) }
	}

	/// Sets a base header, replacing any header whose name matches ignoring ASCII case.
	pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let mut headers = self.base_headers.write();

		headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
		headers.insert(name, value.into());
	}

	/// Sets the client telemetry header.
	pub fn set_client_info(&self, value: impl Into<String>) {
		self.set_header(CLIENT_INFO_HEADER, value);
	}

	/// Snapshot of the current base headers.
	pub fn headers(&self) -> BTreeMap<String, String> {
		self.base_headers.read().clone()
	}

	/// Mints a `GET` request.
	pub fn get<T>(&self, url: impl Into<String>, adapter: impl JsonAdapter<T>) -> TypedRequest<T, E>
	where
		T: 'static + Send,
	{
		self.create_request(HttpMethod::Get, url, Arc::new(adapter))
	}

	/// Mints a `POST` request.
	pub fn post<T>(&self, url: impl Into<String>, adapter: impl JsonAdapter<T>) -> TypedRequest<T, E>
	where
		T: 'static + Send,
	{
		self.create_request(HttpMethod::Post, url, Arc::new(adapter))
	}

	/// Mints a `POST` request whose success body is ignored.
	pub fn post_no_content(&self, url: impl Into<String>) -> TypedRequest<(), E> {
		self.create_request(HttpMethod::Post, url, Arc::new(NoContentAdapter))
			.with_parse_target(ParseTarget::NoContent)
	}

	/// Mints a `PATCH` request.
	pub fn patch<T>(&self, url: impl Into<String>, adapter: impl JsonAdapter<T>) -> TypedRequest<T, E>
	where
		T: 'static + Send,
	{
		self.create_request(HttpMethod::Patch, url, Arc::new(adapter))
	}

	/// Mints a `DELETE` request.
	pub fn delete<T>(&self, url: impl Into<String>, adapter: impl JsonAdapter<T>) -> TypedRequest<T, E>
	where
		T: 'static + Send,
	{
		self.create_request(HttpMethod::Delete, url, Arc::new(adapter))
	}

	/// Mints a request with an already shared adapter.
	pub fn create_request<T>(
		&self,
		method: HttpMethod,
		url: impl Into<String>,
		adapter: Arc<dyn JsonAdapter<T>>,
	) -> TypedRequest<T, E>
	where
		T: 'static + Send,
	{
		let headers = self.headers();
		let request = TypedRequest::new(
			method,
			url,
			self.client.clone(),
			adapter,
			self.error_adapter.clone(),
			self.switcher.clone(),
		);

		headers.into_iter().fold(request, |request, (name, value)| request.add_header(name, value))
	}
}
impl<E> Debug for RequestFactory<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestFactory")
			.field("base_headers", &*self.base_headers.read())
			.finish_non_exhaustive()
	}
}

/// Normalizes a POSIX locale value into a language tag, falling back to [`DEFAULT_LOCALE`].
///
/// The encoding (`.UTF-8`) and modifier (`@euro`) suffixes are dropped; `C` and `POSIX`
/// count as no locale.
pub fn locale_or_default(raw: Option<&str>) -> String {
	let locale = raw
		.and_then(|raw| raw.split(['.', '@']).next())
		.map(str::trim)
		.unwrap_or_default();

	match locale {
		"" | "C" | "POSIX" => DEFAULT_LOCALE.to_owned(),
		locale => locale.to_owned(),
	}
}

fn runtime_locale() -> Option<String> {
	LOCALE_VARIABLES
		.iter()
		.find_map(|name| std::env::var(name).ok().filter(|value| !value.trim().is_empty()))
}
