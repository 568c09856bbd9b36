//! Priority Task Scheduler
//!
//! Cooperative, single-threaded scheduling of runtime work in three FIFO
//! queues.
//!
//! ## Scheduling points
//!
//! The scheduler never runs work by itself. The embedder drives it through
//! two suspension points that mirror the browser event loop:
//!
//! 1. **Tick** ([`Scheduler::run_tick`]): the microtask-equivalent. Drains the
//!    high queue until empty, including work enqueued while draining.
//! 2. **Frame** ([`Scheduler::run_frame`]): the animation-frame-equivalent.
//!    Runs whichever frame handler is armed:
//!    - *work*: high queue fully, medium queue under the frame budget, then the
//!      low queue with the remaining budget if the medium queue emptied
//!    - *cooldown* ([`Scheduler::flush`]): high queue fully, medium queue under
//!      the short cooldown budget
//!
//! After a frame pass, another frame is armed only if medium or low work
//! remains, alternating between the two handlers. At most one frame request
//! and one tick request are pending at any time.
//!
//! ## Failure semantics
//!
//! A panicking task is not caught. The panic unwinds out of the scheduling
//! call, the remaining tasks stay queued, and the pending flags are left as
//! they were when the pass started.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Default medium-queue budget of a work frame.
pub const DEFAULT_FRAME_BUDGET: Duration = Duration::from_millis(40);

/// Default medium-queue budget of a cooldown frame.
pub const DEFAULT_COOLDOWN_BUDGET: Duration = Duration::from_millis(4);

/// A queued callback receiving the scheduling context.
pub type Task<C> = Box<dyn FnOnce(&C)>;

/// Priority class of a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
	/// Runs at the next tick.
	High,
	/// Runs in frames under the frame budget.
	Medium,
	/// Runs in frames once the medium queue is empty.
	Low,
}

/// Frame handler armed for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHandler {
	Work,
	Cooldown,
}

/// Three-queue cooperative scheduler.
pub struct Scheduler<C> {
	high: RefCell<VecDeque<Task<C>>>,
	medium: RefCell<VecDeque<Task<C>>>,
	low: RefCell<VecDeque<Task<C>>>,
	tick_pending: Cell<bool>,
	frame_pending: Cell<Option<FrameHandler>>,
	clock: Rc<dyn Clock>,
	frame_budget: Duration,
	cooldown_budget: Duration,
}

impl<C> Scheduler<C> {
	/// Creates a scheduler measuring budgets against `clock`.
	pub fn new(clock: Rc<dyn Clock>, frame_budget: Duration, cooldown_budget: Duration) -> Self {
		Self {
			high: RefCell::new(VecDeque::new()),
			medium: RefCell::new(VecDeque::new()),
			low: RefCell::new(VecDeque::new()),
			tick_pending: Cell::new(false),
			frame_pending: Cell::new(None),
			clock,
			frame_budget,
			cooldown_budget,
		}
	}

	/// Queues `task` and requests the matching scheduling point.
	pub fn enqueue(&self, task: impl FnOnce(&C) + 'static, priority: Priority) {
		let task: Task<C> = Box::new(task);
		match priority {
			Priority::High => {
				self.high.borrow_mut().push_back(task);
				if !self.tick_pending.replace(true) {
					tracing::trace!("scheduler: tick requested");
				}
			}
			Priority::Medium => {
				self.medium.borrow_mut().push_back(task);
				self.request_frame();
			}
			Priority::Low => {
				self.low.borrow_mut().push_back(task);
				self.request_frame();
			}
		}
	}

	/// Runs the microtask-equivalent: drains the high queue until empty.
	pub fn run_tick(&self, ctx: &C) {
		self.drain_high(ctx);
	}

	/// Runs the armed frame handler. Returns `false` when no frame was pending.
	pub fn run_frame(&self, ctx: &C) -> bool {
		match self.frame_pending.take() {
			Some(FrameHandler::Work) => {
				self.do_work(ctx);
				true
			}
			Some(FrameHandler::Cooldown) => {
				self.flush(ctx);
				true
			}
			None => false,
		}
	}

	/// Cooldown pass: high queue fully, then medium work under the short budget.
	///
	/// The short budget starts after the high queue is drained.
	pub fn flush(&self, ctx: &C) {
		self.drain_high(ctx);
		let start = self.clock.now();
		drain_within(&self.medium, &*self.clock, start, self.cooldown_budget, ctx);

		self.rearm(FrameHandler::Work);
	}

	fn do_work(&self, ctx: &C) {
		let start = self.clock.now();
		self.drain_high(ctx);
		drain_within(&self.medium, &*self.clock, start, self.frame_budget, ctx);
		if self.medium.borrow().is_empty() {
			drain_within(&self.low, &*self.clock, start, self.frame_budget, ctx);
		}

		self.rearm(FrameHandler::Cooldown);
	}

	fn drain_high(&self, ctx: &C) {
		loop {
			let next = self.high.borrow_mut().pop_front();
			match next {
				Some(task) => task(ctx),
				None => break,
			}
		}
		self.tick_pending.set(false);
	}

	fn request_frame(&self) {
		if self.frame_pending.get().is_none() {
			tracing::trace!("scheduler: frame requested");
			self.frame_pending.set(Some(FrameHandler::Work));
		}
	}

	fn rearm(&self, handler: FrameHandler) {
		if self.has_frame_work() {
			tracing::debug!(?handler, "scheduler: frame budget exhausted, re-arming");
			self.frame_pending.set(Some(handler));
		} else {
			self.frame_pending.set(None);
		}
	}

	fn has_frame_work(&self) -> bool {
		!self.medium.borrow().is_empty() || !self.low.borrow().is_empty()
	}

	/// Whether a tick has been requested and not yet run.
	pub fn tick_pending(&self) -> bool {
		self.tick_pending.get()
	}

	/// The frame handler armed for the next frame, if any.
	pub fn frame_pending(&self) -> Option<FrameHandler> {
		self.frame_pending.get()
	}

	/// Whether every queue is empty.
	pub fn is_idle(&self) -> bool {
		self.high.borrow().is_empty() && !self.has_frame_work()
	}

	/// Number of tasks waiting in one queue.
	pub fn len(&self, priority: Priority) -> usize {
		match priority {
			Priority::High => self.high.borrow().len(),
			Priority::Medium => self.medium.borrow().len(),
			Priority::Low => self.low.borrow().len(),
		}
	}
}

fn drain_within<C>(
	queue: &RefCell<VecDeque<Task<C>>>,
	clock: &dyn Clock,
	start: Duration,
	budget: Duration,
	ctx: &C,
) {
	while clock.now().saturating_sub(start) < budget {
		let next = queue.borrow_mut().pop_front();
		match next {
			Some(task) => task(ctx),
			None => break,
		}
	}
}

impl<C> Default for Scheduler<C> {
	fn default() -> Self {
		Self::new(
			Rc::new(SystemClock::new()),
			DEFAULT_FRAME_BUDGET,
			DEFAULT_COOLDOWN_BUDGET,
		)
	}
}

impl<C> fmt::Debug for Scheduler<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scheduler")
			.field("high", &self.len(Priority::High))
			.field("medium", &self.len(Priority::Medium))
			.field("low", &self.len(Priority::Low))
			.field("tick_pending", &self.tick_pending.get())
			.field("frame_pending", &self.frame_pending.get())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::panic::{AssertUnwindSafe, catch_unwind};

	type Log = Rc<RefCell<Vec<&'static str>>>;

	struct Harness {
		clock: Rc<ManualClock>,
		scheduler: Rc<Scheduler<()>>,
		log: Log,
	}

	impl Harness {
		fn push(&self, label: &'static str, priority: Priority) {
			let log = self.log.clone();
			self.scheduler
				.enqueue(move |_| log.borrow_mut().push(label), priority);
		}

		/// Queues a task that advances the clock by `ms` when it runs.
		fn push_slow(&self, label: &'static str, ms: u64, priority: Priority) {
			let log = self.log.clone();
			let clock = self.clock.clone();
			self.scheduler.enqueue(
				move |_| {
					clock.advance(Duration::from_millis(ms));
					log.borrow_mut().push(label);
				},
				priority,
			);
		}

		fn entries(&self) -> Vec<&'static str> {
			self.log.borrow().clone()
		}
	}

	#[fixture]
	fn harness() -> Harness {
		let clock = Rc::new(ManualClock::new());
		let scheduler = Rc::new(Scheduler::new(
			clock.clone(),
			DEFAULT_FRAME_BUDGET,
			DEFAULT_COOLDOWN_BUDGET,
		));
		Harness {
			clock,
			scheduler,
			log: Rc::default(),
		}
	}

	#[rstest]
	fn test_high_runs_on_tick_in_fifo_order(harness: Harness) {
		harness.push("a", Priority::High);
		harness.push("b", Priority::High);
		assert!(harness.scheduler.tick_pending());

		harness.scheduler.run_tick(&());

		assert_eq!(harness.entries(), vec!["a", "b"]);
		assert!(!harness.scheduler.tick_pending());
		assert_eq!(harness.scheduler.frame_pending(), None);
	}

	#[rstest]
	fn test_high_reentrant_additions_drain_in_same_tick(harness: Harness) {
		let log = harness.log.clone();
		let scheduler = Rc::downgrade(&harness.scheduler);
		harness.scheduler.enqueue(
			move |_| {
				log.borrow_mut().push("outer");
				let log = log.clone();
				if let Some(scheduler) = scheduler.upgrade() {
					scheduler.enqueue(move |_| log.borrow_mut().push("inner"), Priority::High);
				}
			},
			Priority::High,
		);

		harness.scheduler.run_tick(&());

		assert_eq!(harness.entries(), vec!["outer", "inner"]);
		assert!(harness.scheduler.is_idle());
	}

	#[rstest]
	fn test_frame_drains_high_before_medium_and_low(harness: Harness) {
		harness.push("low", Priority::Low);
		harness.push("medium", Priority::Medium);
		harness.push("high", Priority::High);

		assert!(harness.scheduler.run_frame(&()));

		assert_eq!(harness.entries(), vec!["high", "medium", "low"]);
		assert_eq!(harness.scheduler.frame_pending(), None);
		assert!(!harness.scheduler.run_frame(&()));
	}

	#[rstest]
	fn test_frame_requests_are_coalesced(harness: Harness) {
		harness.push("a", Priority::Medium);
		harness.push("b", Priority::Low);
		harness.push("c", Priority::Medium);

		assert_eq!(harness.scheduler.frame_pending(), Some(FrameHandler::Work));
		harness.scheduler.run_frame(&());
		assert_eq!(harness.entries(), vec!["a", "c", "b"]);
		assert!(!harness.scheduler.run_frame(&()));
	}

	#[rstest]
	fn test_budget_exhaustion_rearms_cooldown_then_work(harness: Harness) {
		harness.push_slow("m1", 30, Priority::Medium);
		harness.push_slow("m2", 15, Priority::Medium);
		harness.push_slow("m3", 1, Priority::Medium);
		harness.push("low", Priority::Low);

		harness.scheduler.run_frame(&());
		assert_eq!(harness.entries(), vec!["m1", "m2"]);
		assert_eq!(
			harness.scheduler.frame_pending(),
			Some(FrameHandler::Cooldown)
		);

		// cooldown never touches the low queue
		harness.scheduler.run_frame(&());
		assert_eq!(harness.entries(), vec!["m1", "m2", "m3"]);
		assert_eq!(harness.scheduler.frame_pending(), Some(FrameHandler::Work));

		harness.scheduler.run_frame(&());
		assert_eq!(harness.entries(), vec!["m1", "m2", "m3", "low"]);
		assert!(harness.scheduler.is_idle());
		assert_eq!(harness.scheduler.frame_pending(), None);
	}

	#[rstest]
	fn test_cooldown_budget_is_short(harness: Harness) {
		harness.push_slow("m1", 50, Priority::Medium);
		harness.push_slow("m2", 5, Priority::Medium);
		harness.push_slow("m3", 1, Priority::Medium);

		harness.scheduler.run_frame(&());
		assert_eq!(harness.entries(), vec!["m1"]);

		harness.scheduler.flush(&());
		assert_eq!(harness.entries(), vec!["m1", "m2"]);
		assert_eq!(harness.scheduler.len(Priority::Medium), 1);
	}

	#[rstest]
	fn test_cooldown_budget_starts_after_high_work(harness: Harness) {
		harness.push_slow("high", 10, Priority::High);
		harness.push_slow("m1", 1, Priority::Medium);
		harness.push_slow("m2", 5, Priority::Medium);

		harness.scheduler.flush(&());

		assert_eq!(harness.entries(), vec!["high", "m1", "m2"]);
	}

	#[rstest]
	fn test_low_waits_while_medium_remains(harness: Harness) {
		harness.push_slow("m1", 40, Priority::Medium);
		harness.push("m2", Priority::Medium);
		harness.push("low", Priority::Low);

		harness.scheduler.run_frame(&());

		assert_eq!(harness.entries(), vec!["m1"]);
		assert_eq!(harness.scheduler.len(Priority::Low), 1);
	}

	#[rstest]
	fn test_panicking_task_propagates_and_leaves_queue(harness: Harness) {
		harness
			.scheduler
			.enqueue(|_| panic!("task failed"), Priority::High);
		harness.push("after", Priority::High);

		let result = catch_unwind(AssertUnwindSafe(|| harness.scheduler.run_tick(&())));

		assert!(result.is_err());
		assert!(harness.entries().is_empty());
		assert_eq!(harness.scheduler.len(Priority::High), 1);
		assert!(harness.scheduler.tick_pending());

		harness.scheduler.run_tick(&());
		assert_eq!(harness.entries(), vec!["after"]);
	}

	#[rstest]
	fn test_tasks_receive_context() {
		let scheduler: Scheduler<Cell<u32>> = Scheduler::default();
		scheduler.enqueue(|n| n.set(n.get() + 1), Priority::Medium);
		scheduler.enqueue(|n| n.set(n.get() * 10), Priority::Low);

		let ctx = Cell::new(1);
		scheduler.run_frame(&ctx);

		assert_eq!(ctx.get(), 20);
	}
}
