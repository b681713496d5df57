//! Optional observability helpers for request execution.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `authok_client.request` with the
//!   `method` (HTTP verb) and `stage` ([`RequestStage`]) fields.
//! - Enable `metrics` to increment the `authok_client_request_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each request execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// A request was dispatched to the transport.
	Attempt,
	/// The request produced its success value.
	Success,
	/// The request resolved into a typed error.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Execution stage recorded on request spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStage {
	/// Blocking execution on the calling thread.
	Execute,
	/// Background execution started through a thread switcher.
	Start,
	/// Authentication step of a composite request.
	Authenticate,
	/// Profile step of a composite request.
	Profile,
}
impl RequestStage {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestStage::Execute => "execute",
			RequestStage::Start => "start",
			RequestStage::Authenticate => "authenticate",
			RequestStage::Profile => "profile",
		}
	}
}
impl Display for RequestStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn stage_labels_name_the_call_site() {
		let labels = [
			RequestStage::Execute,
			RequestStage::Start,
			RequestStage::Authenticate,
			RequestStage::Profile,
		]
		.map(RequestStage::as_str);

		assert_eq!(labels, ["execute", "start", "authenticate", "profile"]);
		assert_eq!(RequestOutcome::Failure.to_string(), "failure");
	}
}
