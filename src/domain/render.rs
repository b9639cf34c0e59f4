//! Compact markup rendering for logs and assertions.
//!
//! This is a diagnostic view of a subtree, not a serializer: there is no
//! declaration, no namespace handling and no pretty printing.

use itertools::Itertools;

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::TreeResult;

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

impl Document {
    /// Renders `node` and its subtree, without the node's own tail.
    pub fn to_markup(&self, node: NodeId) -> TreeResult<String> {
        let mut out = String::new();
        self.write_markup(node, 0, &mut out)?;
        Ok(out)
    }

    fn write_markup(&self, node: NodeId, depth: usize, out: &mut String) -> TreeResult<()> {
        self.check_depth(depth)?;
        let element = self.element(node)?;
        let attributes = element
            .attributes
            .iter()
            .map(|(k, v)| format!(" {k}=\"{}\"", escape_attribute(v)))
            .join("");
        out.push('<');
        out.push_str(&element.tag);
        out.push_str(&attributes);
        if element.is_empty() {
            out.push_str("/>");
            return Ok(());
        }
        out.push('>');
        out.push_str(&escape_text(element.text()));
        for &child in element.children() {
            self.write_markup(child, depth + 1, out)?;
            out.push_str(&escape_text(self.element(child)?.tail()));
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
        Ok(())
    }
}
