use crate::editing::document::{Document, Element, NodeId};

use super::{cursor::Cursor, tags};

impl Document {
    /// Parses markup into a fresh document. Never fails: malformed input is
    /// repaired the way a browser would treat it (unclosed elements are
    /// closed at the end, stray end tags are ignored).
    pub fn from_markup(source: &str) -> Self {
        parse_markup(source)
    }
}

/// Lenient HTML fragment parser.
///
/// Handles the subset of HTML produced by a rich-text surface: elements with
/// quoted/unquoted/boolean attributes, void elements, comments, raw-text
/// elements and entity-encoded text. Implied end tags are applied for
/// paragraphs, list items, table rows/cells and headings so that sloppy
/// markup still produces a sane tree.
pub fn parse_markup(source: &str) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];
    let mut cur = Cursor::new(source);
    let mut text_start = 0;

    while !cur.eof() {
        if cur.peek() != Some(b'<') {
            cur.bump();
            continue;
        }
        let at = cur.pos();
        let next = cur.peek_at(1);

        if cur.starts_with(b"<!--") {
            flush_text(&mut doc, &stack, cur.slice(text_start, at));
            parse_comment(&mut doc, &stack, &mut cur);
        } else if next == Some(b'/') && cur.peek_at(2).is_some_and(|b| b.is_ascii_alphabetic()) {
            flush_text(&mut doc, &stack, cur.slice(text_start, at));
            parse_end_tag(&doc, &mut stack, &mut cur);
        } else if matches!(next, Some(b'!') | Some(b'?')) {
            // Doctype and processing instructions carry nothing editable
            flush_text(&mut doc, &stack, cur.slice(text_start, at));
            skip_past(&mut cur, b'>');
        } else if next.is_some_and(|b| b.is_ascii_alphabetic()) {
            flush_text(&mut doc, &stack, cur.slice(text_start, at));
            parse_start_tag(&mut doc, &mut stack, &mut cur);
        } else {
            cur.bump();
            continue;
        }
        text_start = cur.pos();
    }

    flush_text(&mut doc, &stack, cur.slice(text_start, cur.pos()));
    doc
}

fn current(stack: &[NodeId]) -> NodeId {
    // The root is pushed first and never popped
    stack[stack.len() - 1]
}

fn flush_text(doc: &mut Document, stack: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let parent = current(stack);
    let in_structure = doc.tag(parent).is_some_and(tags::is_table_structure);
    if in_structure && raw.trim().is_empty() {
        return;
    }
    let text = html_escape::decode_html_entities(raw);
    let node = doc.create_text(text.into_owned());
    doc.append_child(parent, node);
}

fn skip_past(cur: &mut Cursor<'_>, delim: u8) {
    while let Some(b) = cur.bump() {
        if b == delim {
            break;
        }
    }
}

fn parse_comment(doc: &mut Document, stack: &[NodeId], cur: &mut Cursor<'_>) {
    cur.bump_n(4); // <!--
    let start = cur.pos();
    let (body, resume) = match cur.find("-->") {
        Some(end) => (cur.slice(start, end), end + 3),
        None => (cur.slice(start, cur.s.len()), cur.s.len()),
    };
    let node = doc.create_comment(body);
    doc.append_child(current(stack), node);
    cur.i = resume;
}

fn tag_name(cur: &mut Cursor<'_>) -> String {
    cur.eat_while(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b':')
        .to_ascii_lowercase()
}

fn parse_end_tag(doc: &Document, stack: &mut Vec<NodeId>, cur: &mut Cursor<'_>) {
    cur.bump_n(2); // </
    let name = tag_name(cur);
    skip_past(cur, b'>');

    if let Some(idx) = stack.iter().rposition(|&n| doc.tag(n) == Some(name.as_str()))
        && idx > 0
    {
        stack.truncate(idx);
    }
}

fn parse_start_tag(doc: &mut Document, stack: &mut Vec<NodeId>, cur: &mut Cursor<'_>) {
    cur.bump(); // <
    let name = tag_name(cur);
    let mut element = Element::new(name.clone());
    let mut self_closing = false;

    loop {
        cur.skip_whitespace();
        match cur.peek() {
            None => break,
            Some(b'>') => {
                cur.bump();
                break;
            }
            Some(b'/') => {
                cur.bump();
                if cur.peek() == Some(b'>') {
                    cur.bump();
                    self_closing = true;
                    break;
                }
            }
            Some(_) => {
                let attr = cur
                    .eat_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
                    .to_ascii_lowercase();
                if attr.is_empty() {
                    cur.bump();
                    continue;
                }
                cur.skip_whitespace();
                let value = if cur.peek() == Some(b'=') {
                    cur.bump();
                    cur.skip_whitespace();
                    attr_value(cur)
                } else {
                    String::new()
                };
                // First occurrence wins, as in browsers
                if element.attr(&attr).is_none() {
                    element.attrs.push((attr, value));
                }
            }
        }
    }

    close_implied(doc, stack, &name);

    let node = doc.create_element(element);
    doc.append_child(current(stack), node);

    if tags::is_void(&name) || self_closing {
        return;
    }
    if tags::is_raw_text(&name) {
        let start = cur.pos();
        let end = cur.find_ignore_case(&format!("</{name}")).unwrap_or(cur.s.len());
        let body = cur.slice(start, end);
        if !body.is_empty() {
            let text = doc.create_text(body);
            doc.append_child(node, text);
        }
        cur.i = end;
        if !cur.eof() {
            skip_past(cur, b'>');
        }
        return;
    }
    stack.push(node);
}

fn attr_value(cur: &mut Cursor<'_>) -> String {
    let raw = match cur.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cur.bump();
            let start = cur.pos();
            let end = cur.find(if quote == b'"' { "\"" } else { "'" });
            let end = end.unwrap_or(cur.s.len());
            let raw = cur.slice(start, end);
            cur.i = (end + 1).min(cur.s.len());
            raw
        }
        _ => cur.eat_while(|b| !b.is_ascii_whitespace() && b != b'>'),
    };
    html_escape::decode_html_entities(raw).into_owned()
}

/// Pops elements that the opening of `tag` implicitly closes.
fn close_implied(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    if tags::is_block(tag) {
        close_up_to(doc, stack, &["p"], &["td", "th", "table", "caption", "button"]);
    }
    match tag {
        "li" => close_up_to(doc, stack, &["li"], &["ul", "ol", "td", "th", "table"]),
        "dt" | "dd" => close_up_to(doc, stack, &["dt", "dd"], &["dl", "td", "th", "table"]),
        "td" | "th" => close_up_to(doc, stack, &["td", "th"], &["tr", "table"]),
        "tr" => close_up_to(
            doc,
            stack,
            &["tr"],
            &["thead", "tbody", "tfoot", "table"],
        ),
        "thead" | "tbody" | "tfoot" => close_up_to(
            doc,
            stack,
            &["thead", "tbody", "tfoot"],
            &["table"],
        ),
        _ if tags::heading_level(tag).is_some() => {
            let top = current(stack);
            if doc.tag(top).and_then(tags::heading_level).is_some() {
                stack.pop();
            }
        }
        _ => {}
    }
}

/// Searches the open elements top-down for one of `targets`, giving up at
/// the first `boundary`. When found, it and everything above it are closed.
fn close_up_to(doc: &Document, stack: &mut Vec<NodeId>, targets: &[&str], boundary: &[&str]) {
    for idx in (1..stack.len()).rev() {
        let Some(tag) = doc.tag(stack[idx]) else {
            continue;
        };
        if targets.contains(&tag) {
            stack.truncate(idx);
            return;
        }
        if boundary.contains(&tag) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::document::NodeData;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn roundtrip(input: &str) -> String {
        parse_markup(input).to_markup()
    }

    #[rstest]
    #[case("<p>Hello</p>")]
    #[case("<p>Hello <b>World</b></p>")]
    #[case("<ul><li>one</li><li>two</li></ul>")]
    #[case("<p>a<br>b</p>")]
    #[case("<table><tbody><tr><td>1</td><td>2</td></tr></tbody></table>")]
    #[case("<p><a href=\"https://example.com\">x</a></p>")]
    #[case("<!-- note --><p>x</p>")]
    fn test_roundtrip_is_exact(#[case] input: &str) {
        assert_eq!(roundtrip(input), input);
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        assert_eq!(roundtrip("<p>Hello <b>World"), "<p>Hello <b>World</b></p>");
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        assert_eq!(roundtrip("<p>a</span>b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_paragraph_closed_by_block() {
        assert_eq!(roundtrip("<p>one<p>two"), "<p>one</p><p>two</p>");
        assert_eq!(
            roundtrip("<p>x<ul><li>a</ul>"),
            "<p>x</p><ul><li>a</li></ul>"
        );
    }

    #[test]
    fn test_implied_list_item_close() {
        assert_eq!(
            roundtrip("<ul><li>a<li>b</ul>"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn test_implied_cell_and_row_close() {
        assert_eq!(
            roundtrip("<table><tr><td>a<td>b<tr><td>c</table>"),
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>"
        );
    }

    #[test]
    fn test_whitespace_dropped_inside_table_structure() {
        let input = "<table>\n  <tr>\n    <td> a </td>\n  </tr>\n</table>";
        assert_eq!(roundtrip(input), "<table><tr><td> a </td></tr></table>");
    }

    #[test]
    fn test_attributes() {
        let doc = parse_markup("<img SRC='a.png' alt=\"A &amp; B\" data-x=1 hidden>");
        let img = doc.child(doc.root(), 0).unwrap();
        let el = doc.element(img).unwrap();
        assert_eq!(el.attr("src"), Some("a.png"));
        assert_eq!(el.attr("alt"), Some("A & B"));
        assert_eq!(el.attr("data-x"), Some("1"));
        assert_eq!(el.attr("hidden"), Some(""));
        assert!(doc.children(img).is_empty());
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let doc = parse_markup("<p>a &lt; b &amp;&nbsp;c</p>");
        assert_eq!(doc.text_content(doc.root()), "a < b &\u{a0}c");
    }

    #[test]
    fn test_self_closing_non_void() {
        assert_eq!(roundtrip("<span/>x"), "<span></span>x");
    }

    #[test]
    fn test_raw_text_element() {
        let doc = parse_markup("<script>if (a < b) {}</SCRIPT><p>x</p>");
        let script = doc.child(doc.root(), 0).unwrap();
        assert_eq!(doc.text_content(script), "if (a < b) {}");
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_doctype_is_skipped() {
        assert_eq!(roundtrip("<!DOCTYPE html><p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = parse_markup("<p>1 < 2</p>");
        assert_eq!(doc.text_content(doc.root()), "1 < 2");
    }

    #[test]
    fn test_comment_node() {
        let doc = parse_markup("<!--hi-->");
        let node = doc.child(doc.root(), 0).unwrap();
        assert_eq!(doc.data(node), &NodeData::Comment("hi".to_string()));
    }

    #[test]
    fn test_malformed_markup_is_accepted() {
        // Garbage in still yields a well-formed tree
        let out = roundtrip("<div><p>x</div></p><b>y");
        assert_eq!(out, "<div><p>x</p></div><b>y</b>");
    }
}
