/// Subject line for a reply: unchanged if it already starts with `re:` or
/// `re ` (any case), otherwise prefixed with `Re: `.
pub fn reply_subject(subject: &str) -> String {
    let lower = subject.to_lowercase();
    if lower.starts_with("re:") || lower.starts_with("re ") {
        return subject.to_string();
    }
    format!("Re: {}", subject)
}

/// Plain-text counterpart of `quote_html`: `added`, a blank line, then every
/// line of `received` prefixed with `> `.
pub fn quote_plain(received: &str, added: &str) -> String {
    std::iter::once(format!("{}\n\n", added))
        .chain(received.split('\n').map(|line| format!("> {}", line)))
        .collect::<Vec<_>>()
        .join("\n")
}
