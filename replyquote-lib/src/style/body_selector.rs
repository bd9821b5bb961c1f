use crate::error::CssError;
use crate::style::owned_css::{ComponentValue, OwnedStylesheet, Rule};
use log::debug;

/// At-rules whose blocks hold style rules that get rewritten.
const REWRITTEN_AT_RULES: &[&str] = &["media", "supports"];

/// Makes rules that applied to `body` apply to `wrapper_tag#wrapper_id`
/// instead.
///
/// `body` is replaced in qualified rule preludes and in the flat content of
/// `@media`/`@supports` blocks that contain no nested at-rule. Anything else
/// is left alone. On any parse or serialization failure the input comes back
/// unchanged.
pub fn rewrite_body_selectors(css_text: &str, wrapper_tag: &str, wrapper_id: &str) -> String {
    match try_rewrite(css_text, wrapper_tag, wrapper_id) {
        Ok(rewritten) => rewritten,
        Err(err) => {
            debug!("leaving stylesheet untouched: {}", err);
            css_text.to_string()
        }
    }
}

fn try_rewrite(css_text: &str, wrapper_tag: &str, wrapper_id: &str) -> Result<String, CssError> {
    let mut sheet = OwnedStylesheet::parse(css_text)?;
    for rule in &mut sheet.rules {
        let terms = match rule {
            Rule::Qualified(rule) => &mut rule.prelude,
            Rule::At(rule) if rewrites_block(rule.lower_name().as_str(), rule.content()) => {
                match rule.content_mut() {
                    Some(content) => content,
                    None => continue,
                }
            }
            _ => continue,
        };
        if terms.is_empty() {
            continue;
        }
        *terms = retarget_terms(terms, wrapper_tag, wrapper_id);
    }
    sheet.serialize()
}

/// Only single-level blocks are rewritten: a block holding any at-keyword is
/// assumed to wrap further at-rules and is skipped entirely.
fn rewrites_block(lower_name: &str, content: Option<&[ComponentValue]>) -> bool {
    let Some(content) = content else {
        return false;
    };
    REWRITTEN_AT_RULES.contains(&lower_name)
        && !content
            .iter()
            .any(|value| matches!(value, ComponentValue::AtKeyword { .. }))
}

/// Replaces every `body` ident with `wrapper_tag#wrapper_id`. A hash directly
/// after `body`, ignoring comments, is dropped together with those comments.
/// Any other suffix (class, attribute, pseudo-class) stays attached to the
/// new compound.
pub fn retarget_terms(
    terms: &[ComponentValue],
    wrapper_tag: &str,
    wrapper_id: &str,
) -> Vec<ComponentValue> {
    let mut retargeted = Vec::with_capacity(terms.len() + 1);
    let mut i = 0;
    while i < terms.len() {
        match &terms[i] {
            ComponentValue::Ident { value, .. } if value.eq_ignore_ascii_case("body") => {
                retargeted.push(ComponentValue::ident(wrapper_tag));
                retargeted.push(ComponentValue::id_hash(wrapper_id));
                let next = i + 1 + terms[i + 1..]
                    .iter()
                    .take_while(|value| matches!(value, ComponentValue::Comment(_)))
                    .count();
                if matches!(terms.get(next), Some(ComponentValue::Hash { .. })) {
                    i = next;
                }
            }
            other => retargeted.push(other.clone()),
        }
        i += 1;
    }
    retargeted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(css: &str) -> String {
        rewrite_body_selectors(css, "div", "quoted_email")
    }

    #[test]
    fn test_uppercase_body_is_matched() {
        assert_eq!(rewrite("BODY { a: b }"), "div#quoted_email { a: b }");
    }

    #[test]
    fn test_descendant_body_and_selector_lists() {
        assert_eq!(
            rewrite("html body p, body:hover, h1 { a: b }"),
            "html div#quoted_email p, div#quoted_email:hover, h1 { a: b }"
        );
    }

    #[test]
    fn test_attribute_suffix_is_kept() {
        assert_eq!(
            rewrite(r#"body[id="foo"] { a: b }"#),
            r#"div#quoted_email[id="foo"] { a: b }"#
        );
    }

    #[test]
    fn test_only_the_first_hash_is_consumed() {
        assert_eq!(
            rewrite("body#a#b { a: b }"),
            "div#quoted_email#b { a: b }"
        );
    }

    #[test]
    fn test_hash_after_comment_is_consumed() {
        assert_eq!(rewrite("body/**/#x{a:b}"), "div#quoted_email{a:b}");
        assert_eq!(
            rewrite("body/* a */#x, body/* b */.y { a: b }"),
            "div#quoted_email, div#quoted_email/* b */.y { a: b }"
        );
    }

    #[test]
    fn test_body_inside_declarations_is_left_alone() {
        assert_eq!(
            rewrite("p { font-family: body; }"),
            "p { font-family: body; }"
        );
    }

    #[test]
    fn test_other_at_rules_are_untouched() {
        let css = "@font-face { body { x: y } } @page body { margin: 0 }";
        assert_eq!(rewrite(css), css);
    }

    #[test]
    fn test_at_rule_prelude_is_not_rewritten() {
        // Only the block content counts, not the condition before it.
        assert_eq!(
            rewrite("@media body { body { a: b } }"),
            "@media body { div#quoted_email { a: b } }"
        );
    }

    #[test]
    fn test_custom_wrapper() {
        assert_eq!(
            rewrite_body_selectors("body.x { a: b }", "section", "1st"),
            r"section#\31 st.x { a: b }"
        );
    }

    #[test]
    fn test_retarget_terms_leaves_input_intact() {
        let terms = vec![
            ComponentValue::Ident {
                value: "body".to_string(),
                source: Some("body".to_string()),
            },
            ComponentValue::Hash {
                value: "x".to_string(),
                is_identifier: true,
                source: Some("#x".to_string()),
            },
        ];
        let retargeted = retarget_terms(&terms, "div", "q");
        assert_eq!(
            retargeted,
            vec![ComponentValue::ident("div"), ComponentValue::id_hash("q")]
        );
        assert_eq!(terms.len(), 2);
    }
}
