//! Document node handles.

use std::fmt;

/// Opaque handle to a node owned by a document implementation.
///
/// Handles are plain indices; the document that issued a handle is the only
/// one that can resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Creates a handle from an arena index.
	pub const fn from_index(index: usize) -> Self {
		Self(index)
	}

	/// Returns the arena index behind this handle.
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}
