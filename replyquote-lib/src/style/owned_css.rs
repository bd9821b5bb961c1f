//! A fully-owned, source-preserving stylesheet.
//!
//! Parsing is done with cssparser's tokenizer. Every token keeps the exact
//! text it was read from, so a stylesheet serializes back byte for byte
//! unless a token was replaced. Replacement tokens carry no source and are
//! serialized from their value.

use crate::error::CssError;
use cssparser::{
    serialize_identifier, serialize_name, ParseError, Parser, ParserInput, SourcePosition, ToCss,
    Token,
};
use std::fmt::{self, Write};

type RuleParseError<'i> = ParseError<'i, ()>;

/// One top-level component value of a prelude or block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentValue {
    /// `value` is unescaped, e.g. `b\6f dy` has the value `body`.
    Ident {
        value: String,
        source: Option<String>,
    },
    /// `#name`. `is_identifier` is set when the name is a valid identifier,
    /// which is what an id selector needs.
    Hash {
        value: String,
        is_identifier: bool,
        source: Option<String>,
    },
    AtKeyword {
        value: String,
        source: Option<String>,
    },
    /// `/* ... */`, delimiters included.
    Comment(String),
    /// Anything else (whitespace, delimiters, strings, whole nested blocks
    /// and functions), kept as its source text.
    Other(String),
}

impl ComponentValue {
    pub fn ident(value: &str) -> Self {
        ComponentValue::Ident {
            value: value.to_string(),
            source: None,
        }
    }

    /// An identifier-style hash, rendered as `#value`.
    pub fn id_hash(value: &str) -> Self {
        ComponentValue::Hash {
            value: value.to_string(),
            is_identifier: true,
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRule {
    pub prelude: Vec<ComponentValue>,
    /// The declaration block, braces included, exactly as written.
    pub block: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Unescaped keyword without the `@`.
    pub name: String,
    keyword_source: String,
    pub prelude: Vec<ComponentValue>,
    pub body: AtRuleBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtRuleBody {
    /// `{ ... }`. `closed` is false when the input ended inside the block.
    Block {
        content: Vec<ComponentValue>,
        closed: bool,
    },
    Semicolon,
    /// The input ended before a block or `;`.
    Unterminated,
}

impl AtRule {
    pub fn lower_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn content(&self) -> Option<&[ComponentValue]> {
        match &self.body {
            AtRuleBody::Block { content, .. } => Some(content),
            AtRuleBody::Semicolon | AtRuleBody::Unterminated => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut Vec<ComponentValue>> {
        match &mut self.body {
            AtRuleBody::Block { content, .. } => Some(content),
            AtRuleBody::Semicolon | AtRuleBody::Unterminated => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
    Whitespace(String),
    Comment(String),
    /// Top-level text that is not a rule, such as `<!--` or a prelude cut off
    /// by the end of input.
    Verbatim(String),
}

/// Ordered top-level rules of a stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedStylesheet {
    pub rules: Vec<Rule>,
}

impl OwnedStylesheet {
    pub fn parse(css_text: &str) -> Result<Self, CssError> {
        let mut input = ParserInput::new(css_text);
        let mut parser = Parser::new(&mut input);
        let rules = parse_rule_list(&mut parser).map_err(|e| CssError::Parse {
            line: e.location.line,
            column: e.location.column,
        })?;
        Ok(OwnedStylesheet { rules })
    }

    pub fn serialize(&self) -> Result<String, CssError> {
        let mut out = String::new();
        self.to_css(&mut out)?;
        Ok(out)
    }
}

fn parse_rule_list<'i, 't>(input: &mut Parser<'i, 't>) -> Result<Vec<Rule>, RuleParseError<'i>> {
    let mut rules = Vec::new();
    loop {
        let start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        let rule = match token {
            Token::WhiteSpace(_) => Rule::Whitespace(input.slice_from(start).to_owned()),
            Token::Comment(_) => Rule::Comment(input.slice_from(start).to_owned()),
            Token::CDO | Token::CDC => Rule::Verbatim(input.slice_from(start).to_owned()),
            Token::AtKeyword(name) => Rule::At(consume_at_rule(input, start, name.to_string())?),
            token => consume_qualified_rule(input, start, token)?,
        };
        rules.push(rule);
    }
    Ok(rules)
}

fn consume_at_rule<'i, 't>(
    input: &mut Parser<'i, 't>,
    start: SourcePosition,
    name: String,
) -> Result<AtRule, RuleParseError<'i>> {
    let keyword_source = input.slice_from(start).to_owned();
    let mut prelude = Vec::new();
    let body = loop {
        let token_start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break AtRuleBody::Unterminated,
        };
        match token {
            Token::Semicolon => break AtRuleBody::Semicolon,
            Token::CurlyBracketBlock => {
                let (content, content_len) = input.parse_nested_block(
                    |nested| -> Result<_, RuleParseError<'i>> {
                        let content_start = nested.position();
                        let content = consume_component_values(nested)?;
                        Ok((content, nested.slice_from(content_start).len()))
                    },
                )?;
                let closed = input.slice_from(token_start).len() > content_len + 1;
                break AtRuleBody::Block { content, closed };
            }
            token => prelude.push(consume_component_value(input, token_start, token)?),
        }
    };
    Ok(AtRule {
        name,
        keyword_source,
        prelude,
        body,
    })
}

fn consume_qualified_rule<'i, 't>(
    input: &mut Parser<'i, 't>,
    start: SourcePosition,
    first: Token<'i>,
) -> Result<Rule, RuleParseError<'i>> {
    let mut prelude = Vec::new();
    let mut token_start = start;
    let mut token = first;
    loop {
        if token == Token::CurlyBracketBlock {
            input.parse_nested_block(|nested| -> Result<(), RuleParseError<'i>> {
                skip_remaining(nested);
                Ok(())
            })?;
            let block = input.slice_from(token_start).to_owned();
            return Ok(Rule::Qualified(QualifiedRule { prelude, block }));
        }
        prelude.push(consume_component_value(input, token_start, token)?);

        token_start = input.position();
        token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return Ok(Rule::Verbatim(input.slice_from(start).to_owned())),
        };
    }
}

fn consume_component_values<'i, 't>(
    input: &mut Parser<'i, 't>,
) -> Result<Vec<ComponentValue>, RuleParseError<'i>> {
    let mut values = Vec::new();
    loop {
        let start = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        values.push(consume_component_value(input, start, token)?);
    }
    Ok(values)
}

/// Turns `token`, read at `start`, into a component value. Blocks and
/// functions are consumed whole.
fn consume_component_value<'i, 't>(
    input: &mut Parser<'i, 't>,
    start: SourcePosition,
    token: Token<'i>,
) -> Result<ComponentValue, RuleParseError<'i>> {
    let opens_block = matches!(
        token,
        Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock
    );
    if opens_block {
        input.parse_nested_block(|nested| -> Result<(), RuleParseError<'i>> {
            skip_remaining(nested);
            Ok(())
        })?;
    }

    let source = Some(input.slice_from(start).to_owned());
    Ok(match token {
        Token::Ident(value) => ComponentValue::Ident {
            value: value.to_string(),
            source,
        },
        Token::IDHash(value) => ComponentValue::Hash {
            value: value.to_string(),
            is_identifier: true,
            source,
        },
        Token::Hash(value) => ComponentValue::Hash {
            value: value.to_string(),
            is_identifier: false,
            source,
        },
        Token::AtKeyword(value) => ComponentValue::AtKeyword {
            value: value.to_string(),
            source,
        },
        Token::Comment(_) => ComponentValue::Comment(input.slice_from(start).to_owned()),
        _ => ComponentValue::Other(input.slice_from(start).to_owned()),
    })
}

fn skip_remaining(input: &mut Parser<'_, '_>) {
    while input.next_including_whitespace_and_comments().is_ok() {}
}

impl ToCss for ComponentValue {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        match self {
            ComponentValue::Ident {
                source: Some(source),
                ..
            }
            | ComponentValue::Hash {
                source: Some(source),
                ..
            }
            | ComponentValue::AtKeyword {
                source: Some(source),
                ..
            }
            | ComponentValue::Comment(source)
            | ComponentValue::Other(source) => dest.write_str(source),
            ComponentValue::Ident {
                value,
                source: None,
            } => serialize_identifier(value, dest),
            ComponentValue::Hash {
                value,
                is_identifier,
                source: None,
            } => {
                dest.write_char('#')?;
                if *is_identifier {
                    serialize_identifier(value, dest)
                } else {
                    serialize_name(value, dest)
                }
            }
            ComponentValue::AtKeyword {
                value,
                source: None,
            } => {
                dest.write_char('@')?;
                serialize_identifier(value, dest)
            }
        }
    }
}

fn values_to_css<W: Write>(values: &[ComponentValue], dest: &mut W) -> fmt::Result {
    for value in values {
        value.to_css(dest)?;
    }
    Ok(())
}

impl ToCss for Rule {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        match self {
            Rule::Qualified(rule) => {
                values_to_css(&rule.prelude, dest)?;
                dest.write_str(&rule.block)
            }
            Rule::At(rule) => {
                dest.write_str(&rule.keyword_source)?;
                values_to_css(&rule.prelude, dest)?;
                match &rule.body {
                    AtRuleBody::Block { content, closed } => {
                        dest.write_char('{')?;
                        values_to_css(content, dest)?;
                        if *closed {
                            dest.write_char('}')?;
                        }
                        Ok(())
                    }
                    AtRuleBody::Semicolon => dest.write_char(';'),
                    AtRuleBody::Unterminated => Ok(()),
                }
            }
            Rule::Whitespace(text) | Rule::Comment(text) | Rule::Verbatim(text) => {
                dest.write_str(text)
            }
        }
    }
}

impl ToCss for OwnedStylesheet {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: Write,
    {
        for rule in &self.rules {
            rule.to_css(dest)?;
        }
        Ok(())
    }
}
