//! Request envelope accumulated before dispatch.

// self
use crate::{_prelude::*, auth::scope};

/// Parameter key whose value is always normalized to carry `openid`.
pub const SCOPE_KEY: &str = "scope";

/// HTTP verbs issued by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`; parameters travel as query pairs.
	Get,
	/// `POST`; parameters travel as a JSON body.
	Post,
	/// `PATCH`; parameters travel as a JSON body.
	Patch,
	/// `DELETE`; parameters travel as a JSON body.
	Delete,
}
impl HttpMethod {
	/// Returns the canonical verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How the success body is expected to be consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParseTarget {
	/// Body is decoded as JSON.
	#[default]
	Json,
	/// Body carries no content of interest.
	NoContent,
}

/// Mutable envelope (method, headers, parameters, parse target) built up before dispatch.
///
/// Parameters are single-valued with last-write-wins semantics. Headers override
/// case-insensitively while the most recent caller's casing is what gets stored and forwarded.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestOptions {
	/// HTTP verb.
	pub method: HttpMethod,
	/// How the success body is consumed.
	pub parse_target: ParseTarget,
	parameters: BTreeMap<String, JsonValue>,
	headers: BTreeMap<String, String>,
}
impl RequestOptions {
	/// Creates empty options for the provided verb.
	pub fn new(method: HttpMethod) -> Self {
		Self {
			method,
			parse_target: ParseTarget::default(),
			parameters: BTreeMap::new(),
			headers: BTreeMap::new(),
		}
	}

	/// Sets a parameter, replacing any previous value under the same key.
	pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
		let name = name.into();
		let value = value.into();
		let value = if name == SCOPE_KEY { scope::normalize_scope_value(value) } else { value };

		self.parameters.insert(name, value);
	}

	/// Merges parameters in iteration order; later entries win.
	pub fn extend_parameters<I, K, V>(&mut self, parameters: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>,
	{
		for (name, value) in parameters {
			self.set_parameter(name, value);
		}
	}

	/// Sets a header, replacing any existing header whose name matches ignoring ASCII case.
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();

		self.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
		self.headers.insert(name, value.into());
	}

	/// Accumulated parameters.
	pub fn parameters(&self) -> &BTreeMap<String, JsonValue> {
		&self.parameters
	}

	/// Parameter value by exact key.
	pub fn parameter(&self, name: &str) -> Option<&JsonValue> {
		self.parameters.get(name)
	}

	/// Accumulated headers.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Header value looked up ignoring ASCII case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}
