use logos::{Lexer, Logos};

/// Tokens between tags (element content context)
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"<\?[^?]*\?>")]
pub enum ContentToken<'src> {
    /// `<!-- ... -->`, up to the first `-->`; unterminated comments are errors
    #[token("<!--", close_comment)]
    Comment,

    #[token("</")]
    CloseStart,

    #[token("<")]
    OpenStart,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens inside a start or end tag
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum TagToken<'src> {
    #[regex(r"[A-Za-z_][A-Za-z0-9_:.\-]*", |lex| lex.slice())]
    Name(&'src str),

    // Unquoted values that start with a digit, e.g. width=600px
    #[regex(r"[0-9][A-Za-z0-9_%.\-]*", |lex| lex.slice())]
    Bare(&'src str),

    #[regex(r#""[^"]*""#, |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); &s[1..s.len() - 1] })]
    Quoted(&'src str),

    #[token("=")]
    Equals,

    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,
}

fn close_comment<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

/// True when `key` reads back as a single attribute name token
pub fn is_attribute_name(key: &str) -> bool {
    let mut lexer = TagToken::lexer(key);
    matches!(lexer.next(), Some(Ok(TagToken::Name(name))) if name == key) && lexer.next().is_none()
}

impl<'src> TagToken<'src> {
    pub fn describe(&self) -> String {
        match self {
            TagToken::Name(name) => format!("name '{}'", name),
            TagToken::Bare(value) => format!("value '{}'", value),
            TagToken::Quoted(value) => format!("string \"{}\"", value),
            TagToken::Equals => "'='".to_string(),
            TagToken::End => "'>'".to_string(),
            TagToken::SelfClose => "'/>'".to_string(),
        }
    }
}

/// Tokenize the inside of a tag, for diagnostics and tests
pub fn tokenize_tag(source: &str) -> Vec<(TagToken<'_>, std::ops::Range<usize>)> {
    let mut lexer = TagToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        if let Ok(token) = token {
            tokens.push((token, lexer.span()));
        }
    }
    tokens
}
