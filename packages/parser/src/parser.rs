use crate::ast::{Attributes, ElementNode};
use crate::error::{ParseError, ParseResult};
use crate::rules::RuleTable;
use crate::tokenizer::{ContentToken, TagToken};
use logos::Logos;
use std::ops::Range;
use std::sync::Arc;

type Spanned<T> = (T, Range<usize>);

/// Recursive-descent parser for template markup
///
/// Content between tags and the inside of tags are lexed by two different
/// token sets; the parser restarts the matching lexer at its current byte
/// offset whenever it switches context.
pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
    rules: &'static RuleTable,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_rules(source, RuleTable::standard())
    }

    pub fn with_rules(source: &'src str, rules: &'static RuleTable) -> Self {
        Self { source, pos: 0, rules }
    }

    /// Parse every top-level element
    pub fn parse_document(&mut self) -> ParseResult<Vec<ElementNode>> {
        let mut nodes = Vec::new();

        while let Some(token) = self.next_content()? {
            match token {
                (ContentToken::Comment, _) => {}
                (ContentToken::OpenStart, _) => nodes.push(self.parse_element()?),
                (ContentToken::Text(text), range) => {
                    if !text.trim().is_empty() {
                        return Err(ParseError::invalid_syntax(
                            range.start,
                            "Text outside of an element",
                        ));
                    }
                }
                (ContentToken::CloseStart, range) => {
                    return Err(ParseError::unexpected_token(range.start, "element", "closing tag"));
                }
            }
        }

        if nodes.is_empty() {
            return Err(ParseError::invalid_syntax(0, "Document contains no elements"));
        }

        Ok(nodes)
    }

    /// Parse one element; the opening `<` has been consumed
    fn parse_element(&mut self) -> ParseResult<ElementNode> {
        let start = self.pos;
        let tokens = self.read_tag()?;
        let mut iter = tokens.into_iter().peekable();

        let tag = match iter.next() {
            Some((TagToken::Name(name), _)) => name,
            Some((other, range)) => {
                return Err(ParseError::unexpected_token(range.start, "tag name", other.describe()))
            }
            None => return Err(ParseError::unexpected_eof(start, "tag name")),
        };

        let mut attributes = Attributes::new();
        let mut self_closing = false;

        while let Some((token, range)) = iter.next() {
            match token {
                TagToken::Name(key) => {
                    if matches!(iter.peek(), Some((TagToken::Equals, _))) {
                        iter.next();
                        let value = match iter.next() {
                            Some((TagToken::Quoted(v), _))
                            | Some((TagToken::Name(v), _))
                            | Some((TagToken::Bare(v), _)) => unescape_attribute(v),
                            Some((other, range)) => {
                                return Err(ParseError::unexpected_token(
                                    range.start,
                                    "attribute value",
                                    other.describe(),
                                ))
                            }
                            None => return Err(ParseError::unexpected_eof(range.end, "attribute value")),
                        };
                        attributes.insert(key, value);
                    } else {
                        // Boolean attribute
                        attributes.insert(key, "");
                    }
                }
                TagToken::End => break,
                TagToken::SelfClose => {
                    self_closing = true;
                    break;
                }
                other => {
                    return Err(ParseError::unexpected_token(
                        range.start,
                        "attribute name or '>'",
                        other.describe(),
                    ))
                }
            }
        }

        let node = ElementNode::new(tag).with_attributes(attributes);
        if self_closing {
            return Ok(node);
        }

        if self.rules.is_ending(tag) {
            return self.parse_ending_body(node, tag);
        }

        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            match self.next_content()? {
                Some((ContentToken::Comment, _)) => {}
                Some((ContentToken::OpenStart, _)) => {
                    children.push(Arc::new(self.parse_element()?));
                }
                Some((ContentToken::Text(chunk), _)) => text.push_str(chunk),
                Some((ContentToken::CloseStart, range)) => {
                    self.parse_close(tag, range.start)?;
                    break;
                }
                None => {
                    return Err(ParseError::unexpected_eof(self.source.len(), format!("</{}>", tag)));
                }
            }
        }

        let trimmed = text.trim();
        let node = if children.is_empty() && !trimmed.is_empty() {
            node.with_content(trimmed)
        } else {
            if !trimmed.is_empty() {
                tracing::debug!(tag, "dropping text mixed with child elements");
            }
            node.with_children(children)
        };

        Ok(node)
    }

    /// Capture raw inner markup of a content tag verbatim
    fn parse_ending_body(&mut self, node: ElementNode, tag: &str) -> ParseResult<ElementNode> {
        let source: &'src str = self.source;
        let rest = &source[self.pos..];
        let closing = format!("</{}", tag);
        let offset = rest
            .find(&closing)
            .ok_or_else(|| ParseError::unexpected_eof(self.source.len(), format!("</{}>", tag)))?;

        let raw = rest[..offset].trim();
        let close_start = self.pos + offset;
        self.pos = close_start + 2;
        self.parse_close(tag, close_start)?;

        if raw.is_empty() {
            Ok(node)
        } else {
            Ok(node.with_content(raw))
        }
    }

    /// Parse `name>` after a `</`
    fn parse_close(&mut self, expected: &str, pos: usize) -> ParseResult<()> {
        let tokens = self.read_tag()?;
        match tokens.as_slice() {
            [(TagToken::Name(name), _), (TagToken::End, _)] if *name == expected => Ok(()),
            [(TagToken::Name(name), _), (TagToken::End, _)] => {
                Err(ParseError::mismatched_close(pos, expected, *name))
            }
            _ => Err(ParseError::invalid_syntax(pos, format!("Malformed closing tag for <{}>", expected))),
        }
    }

    fn next_content(&mut self) -> ParseResult<Option<Spanned<ContentToken<'src>>>> {
        let source: &'src str = self.source;
        let base = self.pos;
        let mut lexer = ContentToken::lexer(&source[base..]);

        match lexer.next() {
            None => {
                self.pos = source.len();
                Ok(None)
            }
            Some(token) => {
                let span = lexer.span();
                let range = (base + span.start)..(base + span.end);
                self.pos = range.end;
                let token = token.map_err(|_| ParseError::lexer_error(range.start))?;
                Ok(Some((token, range)))
            }
        }
    }

    /// Read tag tokens up to and including `>` or `/>`
    fn read_tag(&mut self) -> ParseResult<Vec<Spanned<TagToken<'src>>>> {
        let source: &'src str = self.source;
        let base = self.pos;
        let mut lexer = TagToken::lexer(&source[base..]);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next() {
            let span = lexer.span();
            let range = (base + span.start)..(base + span.end);
            let token = token.map_err(|_| ParseError::lexer_error(range.start))?;
            let done = matches!(token, TagToken::End | TagToken::SelfClose);
            tokens.push((token, range));
            if done {
                self.pos = base + span.end;
                return Ok(tokens);
            }
        }

        Err(ParseError::unexpected_eof(source.len(), "'>'"))
    }
}

/// Decode the entities the serializer writes into attribute values
pub fn unescape_attribute(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Parse template markup into element nodes with fresh ids
pub fn parse(source: &str) -> ParseResult<Vec<ElementNode>> {
    Parser::new(source).parse_document()
}

/// Outcome of a parse that never fails
#[derive(Debug, Clone)]
pub struct Parsed {
    pub nodes: Vec<ElementNode>,
    /// Set when the markup was malformed and the default document was used
    pub warning: Option<ParseError>,
}

impl Parsed {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Parse markup, falling back to the default document on malformed input
pub fn parse_or_default(source: &str) -> Parsed {
    match parse(source) {
        Ok(nodes) => Parsed { nodes, warning: None },
        Err(error) => {
            tracing::warn!(%error, "malformed markup, using default document");
            Parsed {
                nodes: vec![ElementNode::default_document()],
                warning: Some(error),
            }
        }
    }
}
