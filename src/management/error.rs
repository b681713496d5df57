//! Errors raised by the Management API.

// self
use crate::{
	_prelude::*,
	error::{ApiError, ErrorDetails, RequestError},
	http::ResponseHeaders,
	request::ErrorAdapter,
};

/// Failure reported by (or on the way to) the Management API.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct ManagementError(ErrorDetails);
impl ManagementError {
	/// Wraps details.
	pub fn new(details: ErrorDetails) -> Self {
		Self(details)
	}

	/// Common payload.
	pub fn details(&self) -> &ErrorDetails {
		&self.0
	}
}
impl ApiError for ManagementError {
	fn code(&self) -> &str {
		&self.0.code
	}

	fn description(&self) -> &str {
		&self.0.description
	}

	fn status_code(&self) -> Option<u16> {
		self.0.status
	}

	fn cause(&self) -> Option<&RequestError> {
		self.0.cause.as_ref()
	}

	fn value(&self, key: &str) -> Option<&JsonValue> {
		self.0.values.get(key)
	}
}

/// [`ErrorAdapter`] producing [`ManagementError`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ManagementErrorAdapter;
impl ErrorAdapter<ManagementError> for ManagementErrorAdapter {
	fn from_raw_response(&self, status: u16, body: &str, _: &ResponseHeaders) -> ManagementError {
		ManagementError(ErrorDetails::from_body(status, body))
	}

	fn from_json_response(&self, status: u16, values: JsonMap<String, JsonValue>) -> ManagementError {
		ManagementError(ErrorDetails::from_values(status, values))
	}

	fn from_exception(&self, cause: RequestError) -> ManagementError {
		ManagementError(ErrorDetails::from_cause(cause))
	}
}
