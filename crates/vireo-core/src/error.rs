//! Runtime error types.
//!
//! [`RuntimeError`] covers failures the runtime itself detects. Failures raised
//! by user lifecycle hooks travel as [`anyhow::Error`] values in the runtime
//! crate and are tagged with an [`ErrorKind`] before reaching the error handler.

use std::fmt;

use thiserror::Error;

use crate::node::NodeId;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
	/// No registry entry exists for the tag.
	#[error("component not registered: <{0}>")]
	UnknownComponent(String),

	/// The component module was announced without code for the tag.
	#[error("module '{module_id}' did not provide a definition for <{tag}>")]
	MissingDefinition {
		/// Module identifier.
		module_id: String,
		/// Lower-cased tag name.
		tag: String,
	},

	/// The member is not declared on the component.
	#[error("member '{member}' is not declared on <{tag}>")]
	UnknownMember {
		/// Lower-cased tag name.
		tag: String,
		/// Member name.
		member: String,
	},

	/// An instance-side write targeted a read-only member.
	#[error("prop \"{member}\" of <{tag}> is read-only inside the component")]
	ReadOnlyProp {
		/// Lower-cased tag name.
		tag: String,
		/// Member name.
		member: String,
	},

	/// The node is not a connected host element.
	#[error("node {0} is not a host element")]
	NotAHost(NodeId),

	/// The host exists but its instance has not been created yet.
	#[error("<{0}> has not been instantiated yet")]
	NotInstantiated(String),

	/// A module script reported a load failure.
	#[error("module request failed: {url}")]
	ModuleLoad {
		/// Script URL.
		url: String,
	},

	/// A module script did not complete within the configured timeout.
	#[error("module request timed out after {elapsed_ms}ms: {url}")]
	ModuleTimeout {
		/// Script URL.
		url: String,
		/// Milliseconds since the request was issued.
		elapsed_ms: u64,
	},

	/// A registry entry could not be decoded.
	#[error("invalid registry entry: {0}")]
	Registry(#[from] serde_json::Error),

	/// Configuration could not be decoded.
	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),

	/// An environment override held an unparsable value.
	#[error("invalid value for {key}: {value}")]
	InvalidEnvValue {
		/// Environment variable name.
		key: String,
		/// Raw value.
		value: String,
	},
}

/// Lifecycle phase in which a user hook or module request failed.
///
/// Every failure passed to the platform error handler carries one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
	/// Creating the component instance failed.
	InitInstance,
	/// Replaying a listener event buffered before instantiation failed.
	QueueEvents,
	/// A live declared listener failed.
	Listener,
	/// The `will_load` hook failed.
	WillLoad,
	/// The `did_load` hook failed.
	DidLoad,
	/// The `will_update` hook failed.
	WillUpdate,
	/// The `did_update` hook failed.
	DidUpdate,
	/// `render` failed; the DOM was left untouched.
	Render,
	/// A module script failed or timed out.
	ModuleLoad,
}

impl ErrorKind {
	/// Stable identifier used in log output.
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::InitInstance => "INIT_INSTANCE_ERROR",
			ErrorKind::QueueEvents => "QUEUE_EVENTS_ERROR",
			ErrorKind::Listener => "LISTENER_ERROR",
			ErrorKind::WillLoad => "WILL_LOAD_ERROR",
			ErrorKind::DidLoad => "DID_LOAD_ERROR",
			ErrorKind::WillUpdate => "WILL_UPDATE_ERROR",
			ErrorKind::DidUpdate => "DID_UPDATE_ERROR",
			ErrorKind::Render => "RENDER_ERROR",
			ErrorKind::ModuleLoad => "LOAD_BUNDLE_ERROR",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
