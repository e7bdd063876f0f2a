use crate::editing::document::{Document, NodeData, NodeId};

use super::tags;

impl Document {
    /// Serializes the whole document.
    ///
    /// The output is always well-formed: every non-void element is closed
    /// and text/attribute values are escaped.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            write_node(self, child, &mut out);
        }
        out
    }

    /// Serializes a single node and its subtree.
    pub fn node_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        write_node(self, id, &mut out);
        out
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Root => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeData::Text(text) => {
            let raw_parent = doc
                .parent(id)
                .and_then(|p| doc.tag(p))
                .is_some_and(tags::is_raw_text);
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&html_escape::encode_text(text));
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
            }
            out.push('>');
            if tags::is_void(&el.tag) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::document::{Document, Element};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut doc = Document::new();
        let a = doc.create_element(Element::new("a").with_attr("href", "/q?a=1&b=\"2\""));
        let text = doc.create_text("1 < 2 & 3");
        doc.append_child(doc.root(), a);
        doc.append_child(a, text);
        assert_eq!(
            doc.to_markup(),
            "<a href=\"/q?a=1&amp;b=&quot;2&quot;\">1 &lt; 2 &amp; 3</a>"
        );
    }

    #[test]
    fn test_void_and_boolean_attributes() {
        let mut doc = Document::new();
        let frame = doc.create_element(
            Element::new("iframe")
                .with_attr("src", "https://v.example/x")
                .with_attr("allowfullscreen", ""),
        );
        let br = doc.create_element(Element::new("br"));
        doc.append_child(doc.root(), frame);
        doc.append_child(doc.root(), br);
        assert_eq!(
            doc.to_markup(),
            "<iframe src=\"https://v.example/x\" allowfullscreen></iframe><br>"
        );
    }

    #[test]
    fn test_node_markup() {
        let doc = Document::from_markup("<p>a<b>b</b></p>");
        let p = doc.child(doc.root(), 0).unwrap();
        let b = doc.child(p, 1).unwrap();
        assert_eq!(doc.node_markup(b), "<b>b</b>");
    }

    #[test]
    fn test_raw_text_not_escaped() {
        let doc = Document::from_markup("<style>p > b { color: red }</style>");
        assert_eq!(doc.to_markup(), "<style>p > b { color: red }</style>");
    }
}
