//! # Vireo Core
//!
//! Target-independent building blocks of the Vireo custom element runtime.
//!
//! Nothing in this crate touches a document. It provides the pieces the
//! element runtime composes:
//!
//! - [`queue`]: the three-priority cooperative scheduler with frame budgets
//! - [`value`]: dynamically typed member values and attribute parsing
//! - [`meta`]: component registry metadata and its JSON wire format
//! - [`deferred`]: a single-threaded completion signal for `will_load` hooks
//! - [`config`]: runtime configuration loaded from TOML and the environment
//! - [`error`]: the runtime error type and lifecycle error kinds
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vireo_core::queue::{Priority, Scheduler};
//!
//! let scheduler: Scheduler<()> = Scheduler::default();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let l = log.clone();
//! scheduler.enqueue(move |_| l.borrow_mut().push("medium"), Priority::Medium);
//! let l = log.clone();
//! scheduler.enqueue(move |_| l.borrow_mut().push("high"), Priority::High);
//!
//! scheduler.run_tick(&());
//! scheduler.run_frame(&());
//! assert_eq!(*log.borrow(), vec!["high", "medium"]);
//! ```

pub mod config;
pub mod deferred;
pub mod error;
pub mod meta;
pub mod node;
pub mod queue;
pub mod value;

pub use config::{ReadonlyPropPolicy, RuntimeConfig};
pub use deferred::Deferred;
pub use error::{ErrorKind, RuntimeError, RuntimeResult};
pub use meta::{
	ComponentMeta, LifecycleFlags, ListenMeta, MemberKind, MemberMeta, PropType, RegistryEntry,
	SlotMeta,
};
pub use node::NodeId;
pub use queue::{Clock, ManualClock, Priority, Scheduler, SystemClock};
pub use value::Value;
