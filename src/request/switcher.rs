//! Scheduling seam separating background work from caller-facing delivery.

// std
use std::{
	panic::{self, AssertUnwindSafe},
	sync::mpsc::{self, Receiver, RecvTimeoutError, SendError, Sender},
	thread,
	time::Duration as StdDuration,
};
// self
use crate::_prelude::*;

/// Unit of work handed to a [`ThreadSwitcher`].
pub type Task = Box<dyn FnOnce() + Send>;

/// Two-operation scheduler used by [`Request::start`](crate::request::Request::start).
///
/// Background tasks may run on any worker in any order. Caller-facing tasks must never be
/// dropped: implementations either deliver them on a designated thread, buffer them until
/// one is available, or run them inline.
pub trait ThreadSwitcher
where
	Self: 'static + Send + Sync,
{
	/// Runs the task off the calling thread.
	fn run_in_background(&self, task: Task);

	/// Runs the task on the caller-facing thread.
	fn run_on_caller_thread(&self, task: Task);
}

/// Worker thread per background task plus one lazily spawned delivery thread.
///
/// Caller-facing tasks are delivered in FIFO order; a panicking callback does not stop the
/// delivery thread. When a thread cannot be spawned the task runs inline on the current
/// thread.
///
/// Workers are not pooled: every background task gets its own OS thread, so the number of
/// concurrent threads equals the number of requests in flight. Callers that start large
/// batches should bound them, or supply their own [`ThreadSwitcher`] backed by a pool. If
/// the OS refuses a new worker, the request (network I/O included) runs on the thread that
/// called [`Request::start`](crate::request::Request::start).
#[derive(Debug, Default)]
pub struct DefaultThreadSwitcher {
	delivery: Mutex<Option<Sender<Task>>>,
}
impl DefaultThreadSwitcher {
	const DELIVERY_THREAD_NAME: &'static str = "authok-delivery";

	/// Creates a switcher; no thread is spawned until the first task arrives.
	pub fn new() -> Self {
		Self::default()
	}

	fn spawn_delivery_thread() -> Option<Sender<Task>> {
		let (tx, rx) = mpsc::channel::<Task>();

		thread::Builder::new()
			.name(Self::DELIVERY_THREAD_NAME.into())
			.spawn(move || {
				for task in rx {
					if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
						#[cfg(feature = "tracing")]
						tracing::warn!("Callback panicked on the delivery thread.");
					}
				}
			})
			.ok()
			.map(|_| tx)
	}
}
impl ThreadSwitcher for DefaultThreadSwitcher {
	fn run_in_background(&self, task: Task) {
		spawn_worker(task);
	}

	fn run_on_caller_thread(&self, task: Task) {
		let sender = {
			let mut delivery = self.delivery.lock();

			if delivery.is_none() {
				*delivery = Self::spawn_delivery_thread();
			}

			delivery.clone()
		};
		let task = match sender {
			Some(sender) => match sender.send(task) {
				Ok(()) => return,
				Err(SendError(task)) => {
					self.delivery.lock().take();

					task
				},
			},
			None => task,
		};

		#[cfg(feature = "tracing")]
		tracing::warn!("Delivery thread is unavailable, running the callback inline.");

		task();
	}
}

/// Switcher whose caller-facing tasks wait in a queue until the owner drains it.
///
/// Suited to event loops: the loop calls [`run_pending`](Self::run_pending) (or
/// [`run_pending_timeout`](Self::run_pending_timeout)) on its own thread, and callbacks run
/// there. Background tasks run on worker threads like [`DefaultThreadSwitcher`].
#[derive(Debug)]
pub struct QueuedThreadSwitcher {
	sender: Sender<Task>,
	receiver: Mutex<Receiver<Task>>,
}
impl QueuedThreadSwitcher {
	/// Creates an empty queue.
	pub fn new() -> Self {
		let (sender, receiver) = mpsc::channel();

		Self { sender, receiver: Mutex::new(receiver) }
	}

	/// Runs every queued task on the current thread and returns how many ran.
	///
	/// The queue lock is released before each task runs, so a task may drain this switcher
	/// again.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;

		while let Some(task) = self.try_take() {
			task();

			ran += 1;
		}

		ran
	}

	/// Waits up to `timeout` for the first task, then drains the queue like
	/// [`run_pending`](Self::run_pending).
	pub fn run_pending_timeout(&self, timeout: StdDuration) -> usize {
		let first = {
			let receiver = self.receiver.lock();

			match receiver.recv_timeout(timeout) {
				Ok(task) => task,
				Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return 0,
			}
		};

		first();

		1 + self.run_pending()
	}

	fn try_take(&self) -> Option<Task> {
		self.receiver.lock().try_recv().ok()
	}
}
impl Default for QueuedThreadSwitcher {
	fn default() -> Self {
		Self::new()
	}
}
impl ThreadSwitcher for QueuedThreadSwitcher {
	fn run_in_background(&self, task: Task) {
		spawn_worker(task);
	}

	fn run_on_caller_thread(&self, task: Task) {
		if let Err(SendError(task)) = self.sender.send(task) {
			task();
		}
	}
}

fn spawn_worker(task: Task) {
	const WORKER_THREAD_NAME: &str = "authok-request";

	let slot = Arc::new(Mutex::new(Some(task)));
	let worker_slot = slot.clone();
	let spawned = thread::Builder::new().name(WORKER_THREAD_NAME.into()).spawn(move || {
		if let Some(task) = worker_slot.lock().take() {
			task();
		}
	});

	if spawned.is_err() {
		#[cfg(feature = "tracing")]
		tracing::warn!("Worker thread could not be spawned, running the request inline.");

		if let Some(task) = slot.lock().take() {
			task();
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::mpsc;
	// self
	use super::*;

	#[test]
	fn default_switcher_moves_work_off_the_caller_and_delivers_in_order() {
		let switcher = Arc::new(DefaultThreadSwitcher::new());
		let (tx, rx) = mpsc::channel();
		let caller = thread::current().id();

		for i in 0..5 {
			let tx = tx.clone();

			switcher.run_on_caller_thread(Box::new(move || {
				tx.send((i, thread::current().name().map(ToOwned::to_owned)))
					.expect("Test receiver should be alive.");
			}));
		}

		let delivered = (0..5)
			.map(|_| rx.recv_timeout(StdDuration::from_secs(5)).expect("Delivery should happen."))
			.collect::<Vec<_>>();

		assert_eq!(delivered.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
		assert!(delivered.iter().all(|(_, name)| name.as_deref() == Some("authok-delivery")));

		let (bg_tx, bg_rx) = mpsc::channel();

		switcher.run_in_background(Box::new(move || {
			bg_tx.send(thread::current().id()).expect("Test receiver should be alive.");
		}));

		let worker = bg_rx
			.recv_timeout(StdDuration::from_secs(5))
			.expect("Background task should run.");

		assert_ne!(worker, caller);
	}

	#[test]
	fn default_switcher_survives_a_panicking_callback() {
		let switcher = DefaultThreadSwitcher::new();
		let (tx, rx) = mpsc::channel();

		switcher.run_on_caller_thread(Box::new(|| panic!("Callback failure.")));
		switcher.run_on_caller_thread(Box::new(move || {
			tx.send(()).expect("Test receiver should be alive.");
		}));

		assert!(rx.recv_timeout(StdDuration::from_secs(5)).is_ok());
	}

	#[test]
	fn queued_switcher_holds_tasks_until_drained() {
		let switcher = QueuedThreadSwitcher::new();
		let hits = Arc::new(Mutex::new(Vec::new()));

		for i in 0..3 {
			let hits = hits.clone();

			switcher.run_on_caller_thread(Box::new(move || hits.lock().push(i)));
		}

		assert!(hits.lock().is_empty());
		assert_eq!(switcher.run_pending(), 3);
		assert_eq!(*hits.lock(), vec![0, 1, 2]);
		assert_eq!(switcher.run_pending(), 0);
		assert_eq!(switcher.run_pending_timeout(StdDuration::from_millis(10)), 0);
	}

	#[test]
	fn queued_callbacks_may_drain_their_own_switcher() {
		let switcher = Arc::new(QueuedThreadSwitcher::new());
		let hits = Arc::new(Mutex::new(Vec::new()));
		let (nested, outer_hits, inner_hits) = (switcher.clone(), hits.clone(), hits.clone());

		switcher.run_on_caller_thread(Box::new(move || {
			outer_hits.lock().push("outer");
			nested.run_pending();
		}));
		switcher.run_on_caller_thread(Box::new(move || inner_hits.lock().push("inner")));

		assert_eq!(switcher.run_pending(), 1);
		assert_eq!(*hits.lock(), vec!["outer", "inner"]);
		assert_eq!(switcher.run_pending(), 0);
	}

	#[test]
	fn queued_switcher_waits_for_background_delivery() {
		let switcher = Arc::new(QueuedThreadSwitcher::new());
		let hit = Arc::new(Mutex::new(false));
		let (background, flag) = (switcher.clone(), hit.clone());

		switcher.run_in_background(Box::new(move || {
			background.run_on_caller_thread(Box::new(move || *flag.lock() = true));
		}));

		assert_eq!(switcher.run_pending_timeout(StdDuration::from_secs(5)), 1);
		assert!(*hit.lock());
	}
}
