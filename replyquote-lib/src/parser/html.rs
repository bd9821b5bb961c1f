//! Lenient HTML parsing into the tree defined in `crate::dom::dom_tree`.
//!
//! Only the html5ever tokenizer is used. Tree construction is done here with
//! tag-soup rules: the tree mirrors whatever root the markup actually has, so
//! `<body>...</body>` parses to a `body` at the top level and a bare
//! `<p>` stays a bare `p`. Nothing is synthesized.

use crate::dom::dom_tree::{self, Document, Handle, Node};
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// Void (self-closing) elements in HTML.
pub const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Start tags that implicitly close an open `<p>`.
const P_CLOSERS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

/// Elements whose text is tokenized without entity decoding, and therefore
/// serialized without escaping.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Parses a complete document, keeping its doctype.
///
/// # Arguments
///
/// * `html_content` - The markup to parse. Malformed input never fails.
///
/// # Returns
///
/// A `dom_tree::Document` whose root children are exactly the top-level
/// nodes of the markup.
pub fn parse_document(html_content: &str) -> Document {
    run_tokenizer(html_content).finish()
}

/// Parses `html_content` as a list of sibling nodes.
pub fn parse_fragment(html_content: &str) -> Vec<Handle> {
    let document = run_tokenizer(html_content).finish();
    dom_tree::take_children(&document.root)
}

fn run_tokenizer(html_content: &str) -> QuoteTreeSink {
    let input = BufferQueue::default();
    input.push_back(StrTendril::from(html_content));
    let tokenizer = Tokenizer::new(QuoteTreeSink::new(), TokenizerOpts::default());
    // The sink never asks to pause for a script, so one feed drains the
    // queue. Feeding again after a pause would resume where it stopped.
    while let TokenizerResult::Script(_) = tokenizer.feed(&input) {}
    tokenizer.end();
    tokenizer.sink
}

/// A `TokenSink` that builds the DOM tree from raw tokens.
///
/// It holds the document being built and the stack of open elements.
pub struct QuoteTreeSink {
    document: RefCell<Document>,
    stack: RefCell<Vec<Handle>>,
}

impl QuoteTreeSink {
    pub fn new() -> Self {
        Self {
            document: RefCell::new(dom_tree::new_document()),
            stack: RefCell::new(Vec::new()),
        }
    }

    /// Finalizes and returns the constructed Document.
    pub fn finish(self) -> Document {
        self.document.into_inner()
    }

    /// The node new content is appended to: the innermost open element, or
    /// the document root when nothing is open.
    fn current(&self) -> Handle {
        match self.stack.borrow().last() {
            Some(open) => Rc::clone(open),
            None => Rc::clone(&self.document.borrow().root),
        }
    }

    fn append_text(&self, text: &str) {
        let parent = self.current();
        let mut parent = parent.borrow_mut();
        let Some(children) = parent.children_mut() else {
            return;
        };
        // Adjacent character tokens merge into one text node.
        if let Some(last) = children.last() {
            if let Node::Text(existing) = &mut *last.borrow_mut() {
                existing.push_str(text);
                return;
            }
        }
        children.push(dom_tree::new_text(text));
    }

    fn start_tag(&self, tag: Tag) -> TokenSinkResult<Handle> {
        let name = tag.name.to_string();
        self.close_implied(&name);

        let attributes = tag
            .attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect::<Vec<_>>();
        let element = dom_tree::new_element(&name, attributes);
        dom_tree::append_child(&self.current(), Rc::clone(&element));

        if tag.self_closing || is_void(&name) {
            return TokenSinkResult::Continue;
        }
        self.stack.borrow_mut().push(element);

        match name.as_str() {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            raw if is_raw_text(raw) => TokenSinkResult::RawData(RawKind::Rawtext),
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            _ => TokenSinkResult::Continue,
        }
    }

    /// Pops open elements whose end tag is optional and implied by `incoming`.
    fn close_implied(&self, incoming: &str) {
        let mut stack = self.stack.borrow_mut();
        while let Some(open) = stack.last() {
            let closes = match open.borrow().as_element() {
                Some(elem) => implicitly_closed_by(&elem.tag, incoming),
                None => false,
            };
            if !closes {
                break;
            }
            stack.pop();
        }
    }

    /// Closes the innermost open element named `name` and everything opened
    /// inside it. Stray end tags are ignored.
    fn end_tag(&self, name: &str) {
        let mut stack = self.stack.borrow_mut();
        let position = stack
            .iter()
            .rposition(|open| open.borrow().is_element(name));
        if let Some(position) = position {
            stack.truncate(position);
        }
    }
}

fn implicitly_closed_by(open: &str, incoming: &str) -> bool {
    match open {
        "p" => P_CLOSERS.contains(&incoming),
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "option" => matches!(incoming, "option" | "optgroup"),
        "tr" => matches!(incoming, "tr" | "tbody" | "thead" | "tfoot"),
        "td" | "th" => matches!(incoming, "td" | "th" | "tr" | "tbody" | "thead" | "tfoot"),
        "head" => incoming == "body",
        _ => false,
    }
}

impl Default for QuoteTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSink for QuoteTreeSink {
    type Handle = Handle;

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<Self::Handle> {
        match token {
            Token::TagToken(tag) => {
                if tag.kind == TagKind::StartTag {
                    return self.start_tag(tag);
                }
                self.end_tag(&tag.name);
            }
            Token::CharacterTokens(text) => self.append_text(&text),
            Token::CommentToken(text) => {
                dom_tree::append_child(
                    &self.current(),
                    Rc::new(RefCell::new(Node::Comment(text.to_string()))),
                );
            }
            Token::DoctypeToken(doctype) => {
                let mut document = self.document.borrow_mut();
                if document.doctype.is_none() {
                    document.doctype = Some(dom_tree::Doctype {
                        name: doctype.name.map(|n| n.to_string()).unwrap_or_default(),
                        public_id: doctype.public_id.map(|id| id.to_string()),
                        system_id: doctype.system_id.map(|id| id.to_string()),
                    });
                }
            }
            Token::ParseError(msg) => trace!("html parse error: {}", msg),
            Token::NullCharacterToken | Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }

    fn end(&self) {
        self.stack.borrow_mut().clear();
    }
}
