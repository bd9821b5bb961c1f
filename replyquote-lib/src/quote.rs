//! Builds the HTML body of a reply: new content on top, the received message
//! below it inside a wrapper `div` that its styles are retargeted to.

use crate::dom::dom_tree::{self, Document, Handle};
use crate::error::QuoteError;
use crate::parser::{html, pretty};
use crate::style::body_selector;
use log::debug;

pub const WRAPPER_TAG: &str = "div";
pub const DEFAULT_WRAPPER_ID: &str = "quoted_email";

/// Template used when the received markup has no `<body>` of its own.
const FULL_HTML_START: &str = "\n<html>\n<head>\n</head>\n<body>\n    ";
const FULL_HTML_END: &str = "\n</body>\n</html>\n";

/// The element the quoted message is moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSpec {
    id: String,
}

impl WrapperSpec {
    pub fn new(id: impl Into<String>) -> Self {
        WrapperSpec { id: id.into() }
    }

    pub fn tag(&self) -> &str {
        WRAPPER_TAG
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// CSS selector matching the wrapper, e.g. `div#quoted_email`.
    pub fn selector(&self) -> String {
        format!("{}#{}", self.tag(), self.id)
    }
}

impl Default for WrapperSpec {
    fn default() -> Self {
        WrapperSpec::new(DEFAULT_WRAPPER_ID)
    }
}

/// Quotes `received` below `added` using the default `div#quoted_email`
/// wrapper. See [`quote_html_with`].
pub fn quote_html(received: &str, added: &str) -> Result<String, QuoteError> {
    quote_html_with(received, added, &WrapperSpec::default())
}

/// Builds the HTML for a message that adds content above a quoted email,
/// such that the quoted email's styles cannot reach the new content.
///
/// # Arguments
///
/// * `received` - Complete HTML of the email being quoted. Fragments are
///   accepted and placed in a full document first.
/// * `added` - HTML snippet inserted at the top of the body.
/// * `wrapper` - The element the original body content moves into.
///
/// # Returns
///
/// Pretty-printed markup rooted wherever the received markup was rooted:
/// `<html>` for documents, `<body>` for bare bodies.
pub fn quote_html_with(
    received: &str,
    added: &str,
    wrapper: &WrapperSpec,
) -> Result<String, QuoteError> {
    let (document, body) = parse_with_body(received)?;

    if let Some(head) = dom_tree::find_element(&document.root, "head") {
        retarget_head_styles(&head, wrapper);
    }

    let (body_style, body_class) = strip_body_attributes(&body);
    let quoted = pretty::inner_html(&body);
    dom_tree::take_children(&body);

    let wrapper_element = build_wrapper(wrapper, body_style, body_class, &quoted);
    for node in html::parse_fragment(added) {
        dom_tree::append_child(&body, node);
    }
    dom_tree::append_child(&body, wrapper_element);

    Ok(pretty::prettify(&document))
}

/// Parses `received`, falling back to the full document template when the
/// markup has no `<body>`.
fn parse_with_body(received: &str) -> Result<(Document, Handle), QuoteError> {
    let document = html::parse_document(received);
    if let Some(body) = dom_tree::find_element(&document.root, "body") {
        return Ok((document, body));
    }

    debug!("no <body> in received html, wrapping it in a full document");
    let full = format!("{}{}{}", FULL_HTML_START, received, FULL_HTML_END);
    let document = html::parse_document(&full);
    let body = dom_tree::find_element(&document.root, "body").ok_or(QuoteError::MissingBody)?;
    Ok((document, body))
}

/// Replaces every `<style>` in the head with a single one whose `body`
/// selectors point at the wrapper.
fn retarget_head_styles(head: &Handle, wrapper: &WrapperSpec) {
    let styles = dom_tree::take_elements(head, "style");
    let css = styles
        .iter()
        .map(dom_tree::text_content)
        .collect::<Vec<_>>()
        .join("\n");
    let rewritten = body_selector::rewrite_body_selectors(&css, wrapper.tag(), wrapper.id());
    debug!(
        "moved {} style block(s) onto {}",
        styles.len(),
        wrapper.selector()
    );

    let style = dom_tree::new_element("style", vec![]);
    dom_tree::append_child(&style, dom_tree::new_text(&rewritten));
    dom_tree::append_child(head, style);
}

/// Removes `style`, `class` and `id` from the body, returning the non-empty
/// `style` and `class` values.
fn strip_body_attributes(body: &Handle) -> (Option<String>, Option<String>) {
    let mut body = body.borrow_mut();
    let Some(elem) = body.as_element_mut() else {
        return (None, None);
    };
    let style = elem.remove_attr("style").filter(|value| !value.is_empty());
    let class = elem.remove_attr("class").filter(|value| !value.is_empty());
    elem.remove_attr("id");
    (style, class)
}

fn build_wrapper(
    wrapper: &WrapperSpec,
    style: Option<String>,
    class: Option<String>,
    quoted: &str,
) -> Handle {
    let mut attributes = vec![("id".to_string(), wrapper.id().to_string())];
    if let Some(style) = style {
        attributes.push(("style".to_string(), style));
    }
    if let Some(class) = class {
        attributes.push(("class".to_string(), class));
    }

    let element = dom_tree::new_element(wrapper.tag(), attributes);
    for node in html::parse_fragment(quoted) {
        dom_tree::append_child(&element, node);
    }
    element
}
