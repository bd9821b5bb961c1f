//! Serialization of the DOM tree back to markup.
//!
//! `inner_html` produces compact markup meant to be parsed again.
//! `prettify` produces the indented output returned to callers: one node per
//! line, one space of indentation per nesting level, text trimmed, and
//! attributes sorted by name.

use crate::dom::dom_tree::{Doctype, Document, ElementNode, Handle, Node};
use crate::parser::html::{is_raw_text, is_void};
use std::rc::Rc;

/// Elements whose content is emitted verbatim, without re-indentation.
const PRESERVE_WHITESPACE_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Pending work for the serializer. The tree is walked with an explicit stack
/// so nesting depth is bounded by memory, not by the call stack.
enum Step {
    Node {
        node: Handle,
        depth: usize,
        raw_text: bool,
        compact: bool,
    },
    /// End tag of an element whose children have been written. `indent` is
    /// `None` inside compact output.
    Close {
        tag: String,
        indent: Option<usize>,
        newline: bool,
    },
}

/// Serializes the children of `node` without any added whitespace.
pub fn inner_html(node: &Handle) -> String {
    let mut out = String::new();
    let raw_text = node
        .borrow()
        .as_element()
        .is_some_and(|elem| is_raw_text(&elem.tag));
    let children = node.borrow().children().map(<[Handle]>::to_vec);
    let steps = children
        .unwrap_or_default()
        .into_iter()
        .rev()
        .map(|child| Step::Node {
            node: child,
            depth: 0,
            raw_text,
            compact: true,
        })
        .collect();
    write_steps(steps, &mut out);
    out
}

/// Serializes a whole document as indented markup.
///
/// Text is escaped for `&`, `<` and `>` only (plus `"` in attribute values).
/// Every other character, including non-ASCII ones such as `\u{a0}` or `é`,
/// is written as is rather than as a named entity.
pub fn prettify(document: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &document.doctype {
        write_doctype(doctype, &mut out);
        out.push('\n');
    }
    let root = Step::Node {
        node: Rc::clone(&document.root),
        depth: 0,
        raw_text: false,
        compact: false,
    };
    write_steps(vec![root], &mut out);
    out
}

fn write_steps(mut stack: Vec<Step>, out: &mut String) {
    while let Some(step) = stack.pop() {
        match step {
            Step::Node {
                node,
                depth,
                raw_text,
                compact,
            } => write_node(&node, depth, raw_text, compact, &mut stack, out),
            Step::Close {
                tag,
                indent,
                newline,
            } => {
                if let Some(depth) = indent {
                    push_indent(depth, out);
                }
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
                if newline {
                    out.push('\n');
                }
            }
        }
    }
}

/// Writes what comes before the children of `node` and schedules the
/// children followed by the end tag.
fn write_node(
    node: &Handle,
    depth: usize,
    raw_text: bool,
    compact: bool,
    stack: &mut Vec<Step>,
    out: &mut String,
) {
    match &*node.borrow() {
        Node::DocumentRoot(root) => {
            push_children(&root.children, depth, false, compact, stack);
        }
        Node::Text(text) if compact => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Node::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return;
            }
            push_indent(depth, out);
            if raw_text {
                out.push_str(trimmed);
            } else {
                escape_text(trimmed, out);
            }
            out.push('\n');
        }
        Node::Comment(text) => {
            if !compact {
                push_indent(depth, out);
            }
            write_comment(text, out);
            if !compact {
                out.push('\n');
            }
        }
        Node::Element(elem) => {
            if !compact {
                push_indent(depth, out);
            }
            write_start_tag(elem, !compact, out);
            if is_void(&elem.tag) {
                if !compact {
                    out.push('\n');
                }
                return;
            }

            let raw = is_raw_text(&elem.tag);
            let preserve = !compact && PRESERVE_WHITESPACE_ELEMENTS.contains(&elem.tag.as_str());
            let pretty_children = !compact && !preserve;
            stack.push(Step::Close {
                tag: elem.tag.clone(),
                indent: pretty_children.then_some(depth),
                newline: !compact,
            });
            if pretty_children {
                out.push('\n');
            }
            push_children(&elem.children, depth + 1, raw, !pretty_children, stack);
        }
    }
}

/// Schedules `children` so they pop off the stack in document order.
fn push_children(
    children: &[Handle],
    depth: usize,
    raw_text: bool,
    compact: bool,
    stack: &mut Vec<Step>,
) {
    stack.extend(children.iter().rev().map(|child| Step::Node {
        node: Rc::clone(child),
        depth,
        raw_text,
        compact,
    }));
}

fn push_indent(depth: usize, out: &mut String) {
    out.extend(std::iter::repeat(' ').take(depth));
}

fn write_start_tag(elem: &ElementNode, sort_attributes: bool, out: &mut String) {
    out.push('<');
    out.push_str(&elem.tag);

    let mut attributes: Vec<&(String, String)> = elem.attributes.iter().collect();
    if sort_attributes {
        attributes.sort_by(|a, b| a.0.cmp(&b.0));
    }
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attribute(value, out);
        out.push('"');
    }

    if is_void(&elem.tag) {
        out.push_str("/>");
    } else {
        out.push('>');
    }
}

fn write_comment(text: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}

fn write_doctype(doctype: &Doctype, out: &mut String) {
    out.push_str("<!DOCTYPE ");
    out.push_str(&doctype.name);
    match (&doctype.public_id, &doctype.system_id) {
        (Some(public_id), Some(system_id)) => {
            out.push_str(&format!(" PUBLIC \"{}\" \"{}\"", public_id, system_id));
        }
        (Some(public_id), None) => out.push_str(&format!(" PUBLIC \"{}\"", public_id)),
        (None, Some(system_id)) => out.push_str(&format!(" SYSTEM \"{}\"", system_id)),
        (None, None) => {}
    }
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
