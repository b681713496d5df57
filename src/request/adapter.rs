//! Pluggable decoders turning response bodies into typed values and typed errors.

// std
use std::io::BufReader;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::DecodeError, http::ResponseHeaders};

/// Decodes a successful response body into `T`.
pub trait JsonAdapter<T>
where
	Self: 'static + Send + Sync,
{
	/// Reads the body and produces the success value, or a [`DecodeError`] when the
	/// content is malformed or incomplete.
	fn from_json(&self, reader: &mut dyn Read) -> Result<T, DecodeError>;
}

/// Maps every failure path of a request into the surface error type `E`.
///
/// Each failure reaches exactly one of the three methods:
/// transport and decode failures reach [`from_exception`](ErrorAdapter::from_exception),
/// non-2xx responses with a JSON object body reach
/// [`from_json_response`](ErrorAdapter::from_json_response), and every other non-2xx
/// response reaches [`from_raw_response`](ErrorAdapter::from_raw_response).
pub trait ErrorAdapter<E>
where
	Self: 'static + Send + Sync,
{
	/// Builds an error from an unstructured (non-JSON or empty) failure body.
	fn from_raw_response(&self, status: u16, body: &str, headers: &ResponseHeaders) -> E;

	/// Builds an error from a JSON object failure body.
	fn from_json_response(&self, status: u16, values: JsonMap<String, JsonValue>) -> E;

	/// Builds an error from a pipeline cause raised before a usable response existed.
	fn from_exception(&self, cause: crate::error::RequestError) -> E;
}

/// [`JsonAdapter`] backed by `serde`, reporting the failing path on decode errors.
pub struct SerdeAdapter<T>(PhantomData<fn() -> T>);
impl<T> SerdeAdapter<T> {
	/// Creates the adapter.
	pub const fn new() -> Self {
		Self(PhantomData)
	}
}
impl<T> Clone for SerdeAdapter<T> {
	fn clone(&self) -> Self {
		Self::new()
	}
}
impl<T> Copy for SerdeAdapter<T> {}
impl<T> Debug for SerdeAdapter<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SerdeAdapter<{}>", std::any::type_name::<T>())
	}
}
impl<T> Default for SerdeAdapter<T> {
	fn default() -> Self {
		Self::new()
	}
}
impl<T> JsonAdapter<T> for SerdeAdapter<T>
where
	T: 'static + DeserializeOwned,
{
	fn from_json(&self, reader: &mut dyn Read) -> Result<T, DecodeError> {
		let mut de = serde_json::Deserializer::from_reader(BufReader::new(reader));
		let value = serde_path_to_error::deserialize(&mut de)?;

		de.end()?;

		Ok(value)
	}
}

/// [`JsonAdapter`] for endpoints whose success body carries nothing of interest.
///
/// The body is never read; it is closed when the response is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContentAdapter;
impl JsonAdapter<()> for NoContentAdapter {
	fn from_json(&self, _: &mut dyn Read) -> Result<(), DecodeError> {
		Ok(())
	}
}
