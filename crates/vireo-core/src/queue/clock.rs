//! Time sources for the scheduler's frame budgets.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
	/// Time elapsed since an arbitrary fixed origin.
	fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
	origin: Instant,
}

impl SystemClock {
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
		}
	}
}

impl Default for SystemClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for SystemClock {
	fn now(&self) -> Duration {
		self.origin.elapsed()
	}
}

/// Clock that only moves when told to.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vireo_core::queue::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(5));
/// assert_eq!(clock.now(), Duration::from_millis(5));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
	now: Cell<Duration>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn advance(&self, by: Duration) {
		self.now.set(self.now.get() + by);
	}

	pub fn set(&self, to: Duration) {
		self.now.set(to);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Duration {
		self.now.get()
	}
}
