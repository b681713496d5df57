//! Error taxonomy shared by the request pipeline and every API surface.
//!
//! Failures are resolved into a single typed error per API surface. The pipeline itself
//! only produces a [`RequestError`] (the "cause") which the surface's
//! [`ErrorAdapter`](crate::request::ErrorAdapter) turns into its own error type, next to
//! the two HTTP-failure paths that decode server payloads.

// std
use std::any::Any;
// self
use crate::_prelude::*;

/// Result type alias returning [`RequestError`] by default.
pub type Result<T, E = RequestError> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error code used when the server did not report one.
pub const UNKNOWN_ERROR: &str = "authok.internal_error.unknown";
/// Error code used when a failure response carried a non-JSON body.
pub const NON_JSON_ERROR: &str = "authok.internal_error.plain";
/// Error code used when a failure response carried no body at all.
pub const EMPTY_BODY_ERROR: &str = "authok.internal_error.empty";
/// Description paired with [`EMPTY_BODY_ERROR`].
pub const EMPTY_RESPONSE_BODY_DESCRIPTION: &str = "Empty response body";

const NETWORK_ERROR_DESCRIPTION: &str = "Failed to execute the network request";
const DECODE_ERROR_DESCRIPTION: &str = "Failed to decode the response body";

/// Transport-level failures (network, IO) raised before any HTTP response exists.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport or while reading the body.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// The request URL could not be used by the transport.
	#[error("Request URL is invalid: {url}.")]
	InvalidUrl {
		/// Offending URL.
		url: String,
	},
	/// The transport or an adapter panicked while the request was running.
	#[error("Request execution panicked: {message}.")]
	Panicked {
		/// Panic message, when the payload was a string.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a [`TransportError::Panicked`] from a caught panic payload.
	pub fn panicked(payload: &(dyn Any + Send)) -> Self {
		let message = payload
			.downcast_ref::<&str>()
			.map(|message| (*message).to_owned())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "non-string panic payload".to_owned());

		Self::Panicked { message }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}

/// Failures raised while decoding a successful response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON for the expected type.
	#[error("Response body is not valid JSON for the expected type.")]
	Json(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Body held trailing data or was cut short after the decoded value.
	#[error("Response body is not well-formed JSON.")]
	Syntax(#[from] serde_json::Error),
	/// Body was valid JSON but failed a semantic check.
	#[error("Response body is invalid: {reason}.")]
	Invalid {
		/// Human-readable reason.
		reason: String,
	},
}
impl DecodeError {
	/// Builds a [`DecodeError::Invalid`] from any displayable reason.
	pub fn invalid(reason: impl Into<String>) -> Self {
		Self::Invalid { reason: reason.into() }
	}

	/// JSON path of the failing field, when the failure came from the JSON decoder.
	pub fn path(&self) -> Option<String> {
		match self {
			Self::Json(e) => Some(e.path().to_string()),
			Self::Syntax(_) | Self::Invalid { .. } => None,
		}
	}
}

/// Cause handed to [`ErrorAdapter::from_exception`](crate::request::ErrorAdapter::from_exception).
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The transport failed before an HTTP response was available.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A 2xx response body could not be decoded into the success type.
	#[error("Response with status {status} could not be decoded.")]
	Decode {
		/// HTTP status of the undecodable response.
		status: u16,
		/// Underlying decoding failure.
		#[source]
		source: DecodeError,
	},
}
impl RequestError {
	/// Returns `true` when the failure originated from the network/transport layer.
	pub fn is_network_error(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// Returns `true` when a success body failed to decode.
	pub fn is_decode_error(&self) -> bool {
		matches!(self, Self::Decode { .. })
	}

	/// HTTP status associated with the failure, if a response existed.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(_) => None,
			Self::Decode { status, .. } => Some(*status),
		}
	}

	fn description(&self) -> &'static str {
		match self {
			Self::Transport(_) => NETWORK_ERROR_DESCRIPTION,
			Self::Decode { .. } => DECODE_ERROR_DESCRIPTION,
		}
	}
}

/// Configuration and validation failures raised when building accounts and clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Domain cannot be parsed into a URL.
	#[error("Invalid domain url: '{domain}'.")]
	InvalidDomain {
		/// Domain as supplied by the caller.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Domain uses plain HTTP.
	#[error(
		"Invalid domain url: '{domain}'. Only HTTPS domain URLs are supported. If no scheme is passed, HTTPS will be used."
	)]
	InsecureDomain {
		/// Domain as supplied by the caller.
		domain: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Capability shared by every API surface's error type.
///
/// Surfaces model their failures as tagged data rather than a hierarchy; this trait is the
/// common predicate surface callers can rely on regardless of which API produced the error.
pub trait ApiError
where
	Self: 'static + Send + Sync + StdError,
{
	/// Server-reported (or internal) error code.
	fn code(&self) -> &str;

	/// Human-readable description.
	fn description(&self) -> &str;

	/// HTTP status of the failing response, when one exists.
	fn status_code(&self) -> Option<u16>;

	/// Pipeline cause, present for transport and decode failures.
	fn cause(&self) -> Option<&RequestError>;

	/// Raw value from the server's JSON error payload.
	fn value(&self, key: &str) -> Option<&JsonValue>;

	/// Returns `true` when the failure happened before a response was received.
	fn is_network_error(&self) -> bool {
		ApiError::cause(self).is_some_and(RequestError::is_network_error)
	}
}

/// Common payload carried by surface errors.
#[derive(Debug, ThisError)]
#[error("{code}: {description}")]
pub struct ErrorDetails {
	/// Error code (`error` or `code` field, or one of the internal codes).
	pub code: String,
	/// Description (`description` or `error_description` field, or the raw body).
	pub description: String,
	/// HTTP status of the failing response.
	pub status: Option<u16>,
	/// Full JSON payload for server-reported failures.
	pub values: JsonMap<String, JsonValue>,
	/// Pipeline cause for transport/decode failures.
	#[source]
	pub cause: Option<RequestError>,
}
impl ErrorDetails {
	/// Builds details from a structured JSON error payload.
	pub fn from_values(status: u16, values: JsonMap<String, JsonValue>) -> Self {
		let code = values
			.get("error")
			.or_else(|| values.get("code"))
			.and_then(JsonValue::as_str)
			.unwrap_or(UNKNOWN_ERROR)
			.to_owned();
		let description = values
			.get("description")
			.and_then(JsonValue::as_str)
			.or_else(|| values.get("error_description").and_then(JsonValue::as_str))
			.map(ToOwned::to_owned)
			.unwrap_or_else(|| fallback_description(&code));

		Self { code, description, status: Some(status), values, cause: None }
	}

	/// Builds details from an unstructured (non-JSON or empty) body.
	pub fn from_body(status: u16, body: &str) -> Self {
		let (code, description) = if body.trim().is_empty() {
			(EMPTY_BODY_ERROR, EMPTY_RESPONSE_BODY_DESCRIPTION.to_owned())
		} else {
			(NON_JSON_ERROR, body.to_owned())
		};

		Self {
			code: code.to_owned(),
			description,
			status: Some(status),
			values: JsonMap::new(),
			cause: None,
		}
	}

	/// Builds details from a pipeline cause.
	pub fn from_cause(cause: RequestError) -> Self {
		Self {
			code: UNKNOWN_ERROR.to_owned(),
			description: cause.description().to_owned(),
			status: cause.status(),
			values: JsonMap::new(),
			cause: Some(cause),
		}
	}

	/// Returns the payload value stored under `key` as a string slice.
	pub fn str_value(&self, key: &str) -> Option<&str> {
		self.values.get(key).and_then(JsonValue::as_str)
	}
}
fn fallback_description(code: &str) -> String {
	if code == UNKNOWN_ERROR {
		"Failed with unknown error".into()
	} else {
		format!("Received error with code {code}")
	}
}
