//! HTML serialisation of document subtrees.

use std::borrow::Cow;

use vireo_core::NodeId;

use crate::dom::{DomApi, NodeKind};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
	"track", "wbr",
];

/// Escapes text for use in HTML content and attribute values.
pub fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

/// Serialises `node` and its descendants.
pub fn to_html(dom: &dyn DomApi, node: NodeId) -> String {
	let mut out = String::new();
	write_node(dom, node, &mut out);
	out
}

fn write_node(dom: &dyn DomApi, node: NodeId, out: &mut String) {
	match dom.node_kind(node) {
		NodeKind::Text => out.push_str(&html_escape(&dom.text_content(node).unwrap_or_default())),
		NodeKind::Comment => {
			out.push_str("<!--");
			out.push_str(&dom.text_content(node).unwrap_or_default());
			out.push_str("-->");
		}
		NodeKind::Element => {
			let tag = dom.tag_name(node).unwrap_or_default();
			out.push('<');
			out.push_str(&tag);
			for (name, value) in dom.attributes(node) {
				out.push(' ');
				out.push_str(&name);
				if !value.is_empty() {
					out.push_str("=\"");
					out.push_str(&html_escape(&value));
					out.push('"');
				}
			}
			out.push('>');
			if VOID_ELEMENTS.contains(&tag.as_str()) {
				return;
			}
			for child in dom.child_nodes(node) {
				write_node(dom, child, out);
			}
			out.push_str("</");
			out.push_str(&tag);
			out.push('>');
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::MemoryDom;
	use rstest::rstest;

	#[rstest]
	#[case("plain", "plain")]
	#[case("<b>", "&lt;b&gt;")]
	#[case("a & 'b' \"c\"", "a &amp; &#x27;b&#x27; &quot;c&quot;")]
	fn test_html_escape(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(html_escape(input), expected);
	}

	#[rstest]
	fn test_plain_text_is_borrowed() {
		assert!(matches!(html_escape("plain"), Cow::Borrowed(_)));
	}

	#[rstest]
	fn test_serialises_attributes_text_and_void_elements() {
		let dom = MemoryDom::new();
		let div = dom.create_element("div");
		dom.set_attribute(div, "title", "x\"y");
		dom.set_attribute(div, "hidden", "");
		let text = dom.create_text_node("1 < 2");
		let br = dom.create_element("br");
		dom.append_child(div, text);
		dom.append_child(div, br);

		assert_eq!(
			to_html(&dom, div),
			"<div title=\"x&quot;y\" hidden>1 &lt; 2<br></div>"
		);
	}
}
