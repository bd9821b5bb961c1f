//! Reply composition for HTML email: quote a received message below new
//! content without letting the quoted message's CSS leak onto it.

pub mod dom;
pub mod error;
pub mod parser;
pub mod quote;
pub mod reply;
pub mod style;

pub use error::{CssError, QuoteError};
pub use quote::{quote_html, quote_html_with, WrapperSpec, DEFAULT_WRAPPER_ID, WRAPPER_TAG};
pub use reply::{quote_plain, reply_subject};
pub use style::body_selector::rewrite_body_selectors;
