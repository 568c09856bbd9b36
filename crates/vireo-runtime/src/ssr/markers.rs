//! Attributes linking server-rendered markup back to its hosts.

/// Set on a host rendered on the server; its value is the host's SSR id.
pub const SSR_VNODE_ID: &str = "data-ssrv";

/// Set on each element child rendered by a host, as `<host id>.<index>`.
pub const SSR_CHILD_ID: &str = "data-ssrc";

/// Whether `name` is one of the SSR marker attributes.
pub fn is_marker(name: &str) -> bool {
	name == SSR_VNODE_ID || name == SSR_CHILD_ID
}

pub(crate) fn child_id(host_id: usize, index: usize) -> String {
	format!("{host_id}.{index}")
}
