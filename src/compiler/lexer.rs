//! Tokenizer for statement and expression code inside directives

use std::fmt;

use super::ast::Echo;

/// Reserved words of the statement language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Var,
    Let,
    Const,
    If,
    Else,
    For,
    While,
    In,
    Break,
    Continue,
    True,
    False,
    Null,
    Undefined,
    TypeOf,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Self> {
        let keyword = match ident {
            "var" => Keyword::Var,
            "let" => Keyword::Let,
            "const" => Keyword::Const,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "for" => Keyword::For,
            "while" => Keyword::While,
            "in" => Keyword::In,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "undefined" => Keyword::Undefined,
            "typeof" => Keyword::TypeOf,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Operators and punctuation, longest spellings first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Punct {
    StrictEq,
    StrictNotEq,
    Eq,
    NotEq,
    Le,
    Ge,
    AndAnd,
    OrOr,
    PlusPlus,
    MinusMinus,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Lt,
    Gt,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Question,
    Colon,
    Comma,
    Semi,
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

const PUNCTS: &[(&str, Punct)] = &[
    ("===", Punct::StrictEq),
    ("!==", Punct::StrictNotEq),
    ("==", Punct::Eq),
    ("!=", Punct::NotEq),
    ("<=", Punct::Le),
    (">=", Punct::Ge),
    ("&&", Punct::AndAnd),
    ("||", Punct::OrOr),
    ("++", Punct::PlusPlus),
    ("--", Punct::MinusMinus),
    ("+=", Punct::PlusAssign),
    ("-=", Punct::MinusAssign),
    ("*=", Punct::StarAssign),
    ("/=", Punct::SlashAssign),
    ("%=", Punct::PercentAssign),
    ("<", Punct::Lt),
    (">", Punct::Gt),
    ("=", Punct::Assign),
    ("+", Punct::Plus),
    ("-", Punct::Minus),
    ("*", Punct::Star),
    ("/", Punct::Slash),
    ("%", Punct::Percent),
    ("!", Punct::Bang),
    ("?", Punct::Question),
    (":", Punct::Colon),
    (",", Punct::Comma),
    (";", Punct::Semi),
    (".", Punct::Dot),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    ("[", Punct::LBracket),
    ("]", Punct::RBracket),
];

impl Punct {
    pub fn as_str(self) -> &'static str {
        PUNCTS
            .iter()
            .find(|(_, p)| *p == self)
            .map_or("?", |(s, _)| *s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Keyword(Keyword),
    Punct(Punct),
    /// Literal template text between directives
    Text(String),
    /// A pre-parsed echo directive
    Echo(Echo),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier `{name}`"),
            TokenKind::Number(n) => write!(f, "number `{n}`"),
            TokenKind::Str(_) => write!(f, "string literal"),
            TokenKind::Keyword(k) => write!(f, "keyword `{}`", format!("{k:?}").to_lowercase()),
            TokenKind::Punct(p) => write!(f, "`{}`", p.as_str()),
            TokenKind::Text(_) => write!(f, "template text"),
            TokenKind::Echo(_) => write!(f, "echo directive"),
            TokenKind::Eof => write!(f, "end of template"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset in the template source
    pub offset: usize,
    /// First token of a directive, or a text/echo token
    pub at_boundary: bool,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize, at_boundary: bool) -> Self {
        Self {
            kind,
            offset,
            at_boundary,
        }
    }
}

/// A compile error located by byte offset; turned into a line and column
/// once the full source is at hand
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyntaxError {
    pub message: String,
    pub offset: usize,
    /// Nesting went past the parser's depth limit
    pub too_deep: bool,
}

impl SyntaxError {
    pub fn new<S: Into<String>>(message: S, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
            too_deep: false,
        }
    }

    pub fn too_deep(limit: usize, offset: usize) -> Self {
        Self {
            message: format!("nesting exceeds {limit} levels"),
            offset,
            too_deep: true,
        }
    }
}

/// Tokenize directive code that starts at byte `base` of the template source
pub(crate) fn tokenize(code: &str, base: usize) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer {
        code,
        pos: 0,
        base,
        tokens: Vec::new(),
    };
    lexer.run()?;
    if let Some(first) = lexer.tokens.first_mut() {
        first.at_boundary = true;
    }
    Ok(lexer.tokens)
}

struct Lexer<'c> {
    code: &'c str,
    pos: usize,
    base: usize,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), SyntaxError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() {
                self.bump();
            } else if self.rest().starts_with("//") {
                self.pos = self.code.len();
            } else if self.rest().starts_with("/*") {
                let end = self.rest()[2..]
                    .find("*/")
                    .ok_or_else(|| self.error("unterminated comment", start))?;
                self.pos += end + 4;
            } else if is_ident_start(c) {
                self.ident();
            } else if c.is_ascii_digit()
                || (c == '.' && self.rest()[1..].starts_with(|d: char| d.is_ascii_digit()))
            {
                self.number()?;
            } else if c == '"' || c == '\'' {
                self.string(c)?;
            } else {
                self.punct()?;
            }
        }
        Ok(())
    }

    fn rest(&self) -> &str {
        &self.code[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, self.base + start, false));
    }

    fn error(&self, message: &str, at: usize) -> SyntaxError {
        SyntaxError::new(message, self.base + at)
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let word = &self.code[start..self.pos];
        let kind = match Keyword::from_ident(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(word.to_string()),
        };
        self.push(kind, start);
    }

    fn number(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.digits();
        if self.peek() == Some('.') {
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.digits();
            } else {
                self.pos = mark;
            }
        }
        if self.peek().is_some_and(is_ident_start) {
            return Err(self.error("identifier starts immediately after number", self.pos));
        }
        let text = &self.code[start..self.pos];
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error("invalid number literal", start))?;
        self.push(TokenKind::Number(value), start);
        Ok(())
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn string(&mut self, quote: char) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.bump();
        let mut value = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal", start))?;
            if c == quote {
                break;
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            let escaped = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal", start))?;
            match escaped {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => value.push('\r'),
                '0' => value.push('\0'),
                'u' => {
                    let at = self.pos;
                    let hex = self.code.get(at..at + 4).unwrap_or_default();
                    let ch = u32::from_str_radix(hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 4)
                        .and_then(char::from_u32)
                        .ok_or_else(|| self.error("invalid unicode escape", at))?;
                    self.pos += 4;
                    value.push(ch);
                }
                other => value.push(other),
            }
        }
        self.push(TokenKind::Str(value), start);
        Ok(())
    }

    fn punct(&mut self) -> Result<(), SyntaxError> {
        let start = self.pos;
        let (text, punct) = PUNCTS
            .iter()
            .find(|(text, _)| self.rest().starts_with(text))
            .copied()
            .ok_or_else(|| {
                let c = self.peek().unwrap_or_default();
                self.error(&format!("unexpected character `{c}`"), start)
            })?;
        self.pos += text.len();
        self.push(TokenKind::Punct(punct), start);
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str) -> Vec<TokenKind> {
        tokenize(code, 0)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_for_header() {
        let tokens = kinds("for (var i = 0; i < items.length; i++) {");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::For),
                TokenKind::Punct(Punct::LParen),
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Ident("i".into()),
                TokenKind::Punct(Punct::Assign),
                TokenKind::Number(0.0),
                TokenKind::Punct(Punct::Semi),
                TokenKind::Ident("i".into()),
                TokenKind::Punct(Punct::Lt),
                TokenKind::Ident("items".into()),
                TokenKind::Punct(Punct::Dot),
                TokenKind::Ident("length".into()),
                TokenKind::Punct(Punct::Semi),
                TokenKind::Ident("i".into()),
                TokenKind::Punct(Punct::PlusPlus),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::LBrace),
            ]
        );
    }

    #[test]
    fn test_tokenize_longest_operator_wins() {
        assert_eq!(
            kinds("a !== b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Punct(Punct::StrictNotEq),
                TokenKind::Ident("b".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "a\nb" "A""#),
            vec![
                TokenKind::Str("it's".into()),
                TokenKind::Str("a\nb".into()),
                TokenKind::Str("A".into()),
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds("3 .5 1.25e2"),
            vec![
                TokenKind::Number(3.0),
                TokenKind::Number(0.5),
                TokenKind::Number(125.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_comments() {
        assert_eq!(
            kinds("x /* note */ + 1 // rest"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Punct(Punct::Plus),
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_marks_boundary_and_offsets() {
        let tokens = tokenize("a + b", 10).unwrap();
        assert!(tokens[0].at_boundary);
        assert!(!tokens[1].at_boundary);
        assert_eq!(tokens[2].offset, 14);
    }

    #[test]
    fn test_tokenize_errors() {
        let err = tokenize("'open", 3).unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!(err.offset, 3);

        let err = tokenize("a # b", 0).unwrap_err();
        assert!(err.message.contains("unexpected character"));
        assert_eq!(err.offset, 2);
    }
}
