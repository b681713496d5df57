#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	io::{Cursor, Error as IoError, ErrorKind, Read, Result as IoResult},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::{Duration, Instant},
};
// crates.io
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
// self
#[cfg(feature = "reqwest")]
use authok_client::{account::Account, http::ReqwestNetworkingClient};
use authok_client::{
	error::{RequestError, TransportError},
	http::{NetworkingClient, ResponseBody, ResponseHeaders, ServerResponse},
	request::{
		ErrorAdapter, HttpMethod, QueuedThreadSwitcher, RequestOptions, SerdeAdapter,
		ThreadSwitcher, TypedRequest,
	},
	serde_json::{Map as JsonMap, Value as JsonValue},
};

pub const TEST_URL: &str = "https://tenant.authok.cn/api/v1/things";

/// Body stream that flags its own drop.
struct TrackedBody {
	inner: Cursor<Vec<u8>>,
	closed: Arc<AtomicBool>,
}
impl Read for TrackedBody {
	fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
		self.inner.read(buf)
	}
}
impl Drop for TrackedBody {
	fn drop(&mut self) {
		self.closed.store(true, Ordering::SeqCst);
	}
}

/// Body stream that fails on the first read.
struct BrokenBody {
	closed: Arc<AtomicBool>,
}
impl Read for BrokenBody {
	fn read(&mut self, _: &mut [u8]) -> IoResult<usize> {
		Err(IoError::new(ErrorKind::ConnectionReset, "Connection reset mid-body."))
	}
}
impl Drop for BrokenBody {
	fn drop(&mut self) {
		self.closed.store(true, Ordering::SeqCst);
	}
}

#[derive(Clone, Debug)]
pub enum Reply {
	Body { status: u16, body: Vec<u8> },
	BrokenBody { status: u16 },
	Unreachable,
	Panic,
}

/// Transport replaying scripted replies and recording every call.
#[derive(Default)]
pub struct ScriptedClient {
	replies: Mutex<VecDeque<Reply>>,
	calls: Mutex<Vec<(String, RequestOptions)>>,
	bodies: Mutex<Vec<Arc<AtomicBool>>>,
}
impl ScriptedClient {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn push(&self, reply: Reply) {
		self.replies.lock().push_back(reply);
	}

	pub fn push_json(&self, status: u16, value: JsonValue) {
		self.push(Reply::Body { status, body: value.to_string().into_bytes() });
	}

	pub fn push_text(&self, status: u16, text: &str) {
		self.push(Reply::Body { status, body: text.as_bytes().to_vec() });
	}

	pub fn calls(&self) -> Vec<(String, RequestOptions)> {
		self.calls.lock().clone()
	}

	pub fn bodies_handed_out(&self) -> usize {
		self.bodies.lock().len()
	}

	pub fn all_bodies_closed(&self) -> bool {
		self.bodies.lock().iter().all(|closed| closed.load(Ordering::SeqCst))
	}

	fn track(&self) -> Arc<AtomicBool> {
		let closed = Arc::new(AtomicBool::new(false));

		self.bodies.lock().push(closed.clone());

		closed
	}
}
impl NetworkingClient for ScriptedClient {
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError> {
		self.calls.lock().push((url.to_owned(), options.clone()));

		let reply = self.replies.lock().pop_front().unwrap_or(Reply::Unreachable);

		match reply {
			Reply::Body { status, body } => {
				let body = TrackedBody { inner: Cursor::new(body), closed: self.track() };

				Ok(ServerResponse::new(status, ResponseHeaders::new(), ResponseBody::new(body)))
			},
			Reply::BrokenBody { status } => {
				let body = BrokenBody { closed: self.track() };

				Ok(ServerResponse::new(status, ResponseHeaders::new(), ResponseBody::new(body)))
			},
			Reply::Unreachable => Err(TransportError::Io(IoError::new(
				ErrorKind::ConnectionRefused,
				"Scripted host is unreachable.",
			))),
			Reply::Panic => panic!("Scripted transport crashed."),
		}
	}
}

/// Error surface recording which adapter path produced it.
#[derive(Debug)]
pub enum TestError {
	Raw { status: u16, body: String },
	Json { status: u16, values: JsonMap<String, JsonValue> },
	Exception(RequestError),
}
impl TestError {
	/// Stable label used to compare outcomes across execution modes.
	pub fn label(&self) -> String {
		match self {
			Self::Raw { status, body } => format!("raw {status} {body}"),
			Self::Json { status, values } =>
				format!("json {status} {}", JsonValue::from(values.clone())),
			Self::Exception(RequestError::Transport(_)) => "transport".into(),
			Self::Exception(RequestError::Decode { status, .. }) => format!("decode {status}"),
		}
	}
}

pub struct TestErrorAdapter;
impl ErrorAdapter<TestError> for TestErrorAdapter {
	fn from_raw_response(&self, status: u16, body: &str, _: &ResponseHeaders) -> TestError {
		TestError::Raw { status, body: body.to_owned() }
	}

	fn from_json_response(&self, status: u16, values: JsonMap<String, JsonValue>) -> TestError {
		TestError::Json { status, values }
	}

	fn from_exception(&self, cause: RequestError) -> TestError {
		TestError::Exception(cause)
	}
}

pub fn request<T>(
	client: &Arc<ScriptedClient>,
	switcher: Arc<dyn ThreadSwitcher>,
) -> TypedRequest<T, TestError>
where
	T: 'static + Send + DeserializeOwned,
{
	TypedRequest::new(
		HttpMethod::Post,
		TEST_URL,
		client.clone(),
		Arc::new(SerdeAdapter::<T>::new()),
		Arc::new(TestErrorAdapter),
		switcher,
	)
}

/// Drains `switcher` until `done` holds or five seconds pass.
pub fn drain_until(switcher: &QueuedThreadSwitcher, mut done: impl FnMut() -> bool) {
	let deadline = Instant::now() + Duration::from_secs(5);

	while !done() {
		assert!(Instant::now() < deadline, "Callbacks should be delivered within five seconds.");

		switcher.run_pending_timeout(Duration::from_millis(50));
	}
}

/// Transport downgrading `https://` targets to plain HTTP so requests reach `httpmock`.
#[cfg(feature = "reqwest")]
pub struct PlaintextClient(ReqwestNetworkingClient);
#[cfg(feature = "reqwest")]
impl NetworkingClient for PlaintextClient {
	fn load(&self, url: &str, options: &RequestOptions) -> Result<ServerResponse, TransportError> {
		self.0.load(&url.replacen("https://", "http://", 1), options)
	}
}

/// Account whose domain is the mock server's address.
#[cfg(feature = "reqwest")]
pub fn mock_account(server: &httpmock::MockServer) -> Account {
	let transport = ReqwestNetworkingClient::builder()
		.timeout(Duration::from_secs(5))
		.build()
		.expect("Reqwest transport should build for tests.");

	Account::with_networking_client(
		"CLIENTID",
		&server.address().to_string(),
		Arc::new(PlaintextClient(transport)),
	)
	.expect("Mock server address should be a valid domain.")
}
