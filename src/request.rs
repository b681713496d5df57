//! Typed request pipeline: one execution algorithm behind a blocking and a callback front end.
//!
//! A [`TypedRequest`] is configured through consuming builder methods and dispatched exactly
//! once. [`Request::execute`] runs the pipeline on the calling thread; [`Request::start`]
//! runs the identical pipeline on a background worker and relays the `Result` to the
//! [`ThreadSwitcher`]'s caller-facing thread, where exactly one [`Callback`] method fires.
//!
//! Because dispatch consumes the request, mutating a request after dispatch does not
//! compile.

pub mod adapter;
pub mod authentication;
pub mod factory;
pub mod options;
pub mod profile;
pub mod switcher;
pub mod typed;

pub use adapter::*;
pub use authentication::*;
pub use factory::*;
pub use options::*;
pub use profile::*;
pub use switcher::*;
pub use typed::*;

// self
use crate::_prelude::*;

/// Receiver of a request's terminal outcome.
///
/// Both methods consume the callback, so at most one of them can ever run. Any
/// `FnOnce(Result<T, E>) + Send + 'static` closure is a callback.
pub trait Callback<T, E>
where
	Self: 'static + Send + Sized,
{
	/// Receives the success value.
	fn on_success(self, value: T);

	/// Receives the typed error.
	fn on_failure(self, error: E);

	/// Routes a result to [`on_success`](Self::on_success) or
	/// [`on_failure`](Self::on_failure).
	fn deliver(self, result: Result<T, E>) {
		match result {
			Ok(value) => self.on_success(value),
			Err(error) => self.on_failure(error),
		}
	}
}
impl<T, E, F> Callback<T, E> for F
where
	F: 'static + Send + FnOnce(Result<T, E>),
{
	fn on_success(self, value: T) {
		self(Ok(value))
	}

	fn on_failure(self, error: E) {
		self(Err(error))
	}
}

/// Operation producing `T` or the surface error `E`, executable blocking or with a callback.
pub trait Request<T, E>
where
	Self: 'static + Send + Sized,
	T: 'static + Send,
	E: 'static + Send,
{
	/// Sets one parameter; the latest value for a key wins.
	fn add_parameter(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self;

	/// Merges parameters in iteration order; the latest value for a key wins.
	fn add_parameters<I, K, V>(self, parameters: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<JsonValue>;

	/// Sets one header, overriding an existing header whose name matches ignoring case.
	fn add_header(self, name: impl Into<String>, value: impl Into<String>) -> Self;

	/// Runs the request on the calling thread.
	fn execute(self) -> Result<T, E>;

	/// Runs the request in the background and delivers the outcome to `callback` on the
	/// caller-facing thread.
	///
	/// The background stage uses the switcher's workers. [`DefaultThreadSwitcher`] and
	/// [`QueuedThreadSwitcher`] spawn one thread per call and fall back to running the request
	/// inline, blocking this call, when the OS cannot spawn a thread.
	fn start<C>(self, callback: C)
	where
		C: Callback<T, E>;
}

/// Runs `work` through the switcher: background first, then delivery of its result.
pub(crate) fn dispatch<T, E, W, C>(switcher: Arc<dyn ThreadSwitcher>, work: W, callback: C)
where
	T: 'static + Send,
	E: 'static + Send,
	W: 'static + Send + FnOnce() -> Result<T, E>,
	C: Callback<T, E>,
{
	let delivery = switcher.clone();

	switcher.run_in_background(Box::new(move || {
		let result = work();

		delivery.run_on_caller_thread(Box::new(move || callback.deliver(result)));
	}));
}
