use thiserror::Error;

/// Errors surfaced by the HTML quoting pipeline.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// No `<body>` could be found even after placing the input inside a
    /// full document template.
    #[error("no <body> element after wrapping the input in a full document")]
    MissingBody,
}

/// Stylesheet failures. These never leave the selector rewriter, which falls
/// back to the unmodified stylesheet text.
#[derive(Debug, Error)]
pub enum CssError {
    #[error("failed to parse stylesheet at {line}:{column}")]
    Parse { line: u32, column: u32 },
    #[error("failed to serialize stylesheet")]
    Serialize(#[from] std::fmt::Error),
}
