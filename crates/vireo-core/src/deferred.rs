//! Single-threaded completion signal.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Waiter = Box<dyn FnOnce()>;

#[derive(Default)]
struct DeferredState {
	settled: bool,
	waiters: Vec<Waiter>,
}

/// A one-shot signal a `will_load` hook returns to postpone the first render.
///
/// Clones share the same state. Waiters registered before the signal settles
/// run once, in registration order, when [`Deferred::resolve`] is called;
/// waiters registered afterwards run immediately.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use vireo_core::Deferred;
///
/// let ready = Deferred::new();
/// let fired = Rc::new(Cell::new(false));
/// let f = fired.clone();
/// ready.on_settled(move || f.set(true));
///
/// assert!(!fired.get());
/// ready.resolve();
/// assert!(fired.get());
/// ```
#[derive(Clone, Default)]
pub struct Deferred {
	state: Rc<RefCell<DeferredState>>,
}

impl Deferred {
	pub fn new() -> Self {
		Self::default()
	}

	/// Settles the signal and runs pending waiters. Later calls are no-ops.
	pub fn resolve(&self) {
		let waiters = {
			let mut state = self.state.borrow_mut();
			if state.settled {
				return;
			}
			state.settled = true;
			std::mem::take(&mut state.waiters)
		};
		for waiter in waiters {
			waiter();
		}
	}

	pub fn is_settled(&self) -> bool {
		self.state.borrow().settled
	}

	/// Runs `waiter` once the signal settles.
	pub fn on_settled(&self, waiter: impl FnOnce() + 'static) {
		if self.is_settled() {
			waiter();
		} else {
			self.state.borrow_mut().waiters.push(Box::new(waiter));
		}
	}
}

impl fmt::Debug for Deferred {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("Deferred")
			.field("settled", &state.settled)
			.field("waiters", &state.waiters.len())
			.finish()
	}
}
