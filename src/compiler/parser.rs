//! Recursive-descent parser over the merged token stream
//!
//! Literal text and echo directives arrive as single tokens between the
//! tokens of statement directives, so a block opened in one directive and
//! closed in a later one parses as a single statement.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::{
    AssignOp, BinaryOp, Callee, DeclKind, Echo, Expr, IterMode, LogicalOp, Program, Stmt, UnaryOp,
};
use super::lexer::{Keyword, Punct, SyntaxError, Token, TokenKind, tokenize};

static STATIC_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w$-]*(?:\.[\w$-]+|\[\d+\])*$").expect("static path pattern"));

/// Deepest nesting of blocks, statements, and sub-expressions
const MAX_NESTING: usize = 64;

type ParseResult<T> = Result<T, SyntaxError>;

/// Parse an echo body. Paths stay as text for lenient resolution. Anything
/// else is parsed as an expression, and a body that is not a valid
/// expression either falls back to path resolution.
pub(crate) fn parse_echo(body: &str, offset: usize) -> ParseResult<Echo> {
    if STATIC_PATH.is_match(body) {
        return Ok(path_echo(body));
    }
    match parse_echo_expression(body, offset) {
        Ok(expr) => Ok(Echo::Expr(expr)),
        Err(err) if err.too_deep => Err(err),
        Err(_) => Ok(path_echo(body)),
    }
}

fn path_echo(body: &str) -> Echo {
    let split = body.find(['.', '[']).unwrap_or(body.len());
    Echo::Path {
        root: body[..split].to_string(),
        rest: body[split..].to_string(),
    }
}

fn parse_echo_expression(body: &str, offset: usize) -> ParseResult<Expr> {
    let mut tokens = tokenize(body, offset)?;
    tokens.push(Token::new(TokenKind::Eof, offset + body.len(), true));
    let mut parser = Parser::new(tokens);
    let expr = parser.expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    loop_depth: usize,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with an `Eof` token
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            loop_depth: 0,
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.at_eof() {
            if self.check_punct(Punct::RBrace) {
                return Err(self.error_here("unexpected `}` without a matching `{`"));
            }
            body.push(self.statement()?);
        }
        Ok(Program { body })
    }

    // token cursor

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_nth_kind(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn check_punct(&self, punct: Punct) -> bool {
        matches!(self.peek_kind(), TokenKind::Punct(p) if *p == punct)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punct) -> ParseResult<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", punct.as_str())))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_eof(&self) -> ParseResult<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of expression"))
        }
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        SyntaxError::new(message, self.peek().offset)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        self.error_here(&format!("expected {expected}, found {}", self.peek_kind()))
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(SyntaxError::too_deep(MAX_NESTING, self.peek().offset));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// `;`, or an implied end at a directive boundary, `}`, or end of input
    fn terminator(&mut self) -> ParseResult<()> {
        if self.eat_punct(Punct::Semi) {
            return Ok(());
        }
        if self.at_eof() || self.check_punct(Punct::RBrace) || self.peek().at_boundary {
            return Ok(());
        }
        Err(self.unexpected("`;`"))
    }

    // statements

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_inner)
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        match self.peek_kind().clone() {
            TokenKind::Text(text) => {
                self.advance();
                Ok(Stmt::Text(text))
            }
            TokenKind::Echo(echo) => {
                self.advance();
                Ok(Stmt::Echo(echo))
            }
            TokenKind::Eof => Err(self.error_here("unexpected end of template")),
            TokenKind::Punct(Punct::LBrace) => self.block(),
            TokenKind::Punct(Punct::Semi) => {
                self.advance();
                Ok(Stmt::Empty)
            }
            TokenKind::Keyword(Keyword::Var) => self.declaration(DeclKind::Var),
            TokenKind::Keyword(Keyword::Let) => self.declaration(DeclKind::Let),
            TokenKind::Keyword(Keyword::Const) => self.declaration(DeclKind::Const),
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::For) => self.for_statement(),
            TokenKind::Keyword(Keyword::Break) => self.jump(Stmt::Break, "break"),
            TokenKind::Keyword(Keyword::Continue) => self.jump(Stmt::Continue, "continue"),
            TokenKind::Keyword(Keyword::Else) => Err(self.error_here("`else` without `if`")),
            _ => {
                let expr = self.expression()?;
                self.terminator()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        let open = self.advance();
        let mut body = Vec::new();
        loop {
            if self.eat_punct(Punct::RBrace) {
                return Ok(Stmt::Block(body));
            }
            if self.at_eof() {
                return Err(SyntaxError::new("unclosed `{`", open.offset));
            }
            body.push(self.statement()?);
        }
    }

    fn jump(&mut self, stmt: Stmt, word: &str) -> ParseResult<Stmt> {
        if self.loop_depth == 0 {
            return Err(self.error_here(&format!("`{word}` outside of a loop")));
        }
        self.advance();
        self.terminator()?;
        Ok(stmt)
    }

    fn declaration(&mut self, kind: DeclKind) -> ParseResult<Stmt> {
        self.advance();
        let bindings = self.declarators(kind)?;
        self.terminator()?;
        Ok(Stmt::Declare { kind, bindings })
    }

    fn declarators(&mut self, kind: DeclKind) -> ParseResult<Vec<(String, Option<Expr>)>> {
        let mut bindings = Vec::new();
        loop {
            let at = self.peek().offset;
            let name = self.expect_ident()?;
            let init = if self.eat_punct(Punct::Assign) {
                Some(self.assignment()?)
            } else if kind == DeclKind::Const {
                return Err(SyntaxError::new(
                    format!("missing initializer in const declaration of `{name}`"),
                    at,
                ));
            } else {
                None
            };
            bindings.push((name, init));
            if !self.eat_punct(Punct::Comma) {
                return Ok(bindings);
            }
        }
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.advance();
        let cond = self.condition()?;
        let then = Box::new(self.statement()?);
        let otherwise = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.advance();
        let cond = self.condition()?;
        let body = Box::new(self.loop_body()?);
        Ok(Stmt::While { cond, body })
    }

    fn condition(&mut self) -> ParseResult<Expr> {
        self.expect_punct(Punct::LParen)?;
        let cond = self.expression()?;
        self.expect_punct(Punct::RParen)?;
        Ok(cond)
    }

    fn loop_body(&mut self) -> ParseResult<Stmt> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.advance();
        self.expect_punct(Punct::LParen)?;

        let kind = match self.peek_kind() {
            TokenKind::Keyword(Keyword::Var) => Some(DeclKind::Var),
            TokenKind::Keyword(Keyword::Let) => Some(DeclKind::Let),
            TokenKind::Keyword(Keyword::Const) => Some(DeclKind::Const),
            _ => None,
        };
        let skip = usize::from(kind.is_some());
        let each_mode = match (self.peek_nth_kind(skip), self.peek_nth_kind(skip + 1)) {
            (TokenKind::Ident(_), TokenKind::Ident(word)) if word == "of" => Some(IterMode::Of),
            (TokenKind::Ident(_), TokenKind::Keyword(Keyword::In)) => Some(IterMode::In),
            _ => None,
        };

        if let Some(mode) = each_mode {
            if kind.is_some() {
                self.advance();
            }
            let name = self.expect_ident()?;
            self.advance();
            let iterable = self.expression()?;
            self.expect_punct(Punct::RParen)?;
            let body = Box::new(self.loop_body()?);
            return Ok(Stmt::ForEach {
                kind,
                name,
                mode,
                iterable,
                body,
            });
        }

        let init = match kind {
            Some(kind) => {
                self.advance();
                let bindings = self.declarators(kind)?;
                Some(Box::new(Stmt::Declare { kind, bindings }))
            }
            None if self.check_punct(Punct::Semi) => None,
            None => Some(Box::new(Stmt::Expr(self.expression()?))),
        };
        self.expect_punct(Punct::Semi)?;

        let cond = if self.check_punct(Punct::Semi) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(Punct::Semi)?;

        let update = if self.check_punct(Punct::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(Punct::RParen)?;

        let body = Box::new(self.loop_body()?);
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    // expressions, lowest precedence first

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment_inner)
    }

    fn assignment_inner(&mut self) -> ParseResult<Expr> {
        let at = self.peek().offset;
        let left = self.conditional()?;

        let op: AssignOp = match self.peek_kind() {
            TokenKind::Punct(Punct::Assign) => None,
            TokenKind::Punct(Punct::PlusAssign) => Some(BinaryOp::Add),
            TokenKind::Punct(Punct::MinusAssign) => Some(BinaryOp::Sub),
            TokenKind::Punct(Punct::StarAssign) => Some(BinaryOp::Mul),
            TokenKind::Punct(Punct::SlashAssign) => Some(BinaryOp::Div),
            TokenKind::Punct(Punct::PercentAssign) => Some(BinaryOp::Rem),
            _ => return Ok(left),
        };
        let Expr::Ident(target) = left else {
            return Err(SyntaxError::new("invalid assignment target", at));
        };
        self.advance();
        let value = Box::new(self.assignment()?);
        Ok(Expr::Assign { op, target, value })
    }

    fn conditional(&mut self) -> ParseResult<Expr> {
        let test = self.logical_or()?;
        if !self.eat_punct(Punct::Question) {
            return Ok(test);
        }
        let consequent = self.assignment()?;
        self.expect_punct(Punct::Colon)?;
        let alternate = self.assignment()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn logical_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.logical_and()?;
        while self.eat_punct(Punct::OrOr) {
            let right = self.logical_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.equality()?;
        while self.eat_punct(Punct::AndAnd) {
            let right = self.equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn binary_level(
        &mut self,
        ops: &[(Punct, BinaryOp)],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = next(self)?;
        loop {
            let op = ops.iter().find_map(|(punct, op)| match self.peek_kind() {
                TokenKind::Punct(p) if p == punct => Some(*op),
                _ => None,
            });
            let Some(op) = op else {
                return Ok(left);
            };
            self.advance();
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                (Punct::StrictEq, BinaryOp::StrictEq),
                (Punct::StrictNotEq, BinaryOp::StrictNotEq),
                (Punct::Eq, BinaryOp::Eq),
                (Punct::NotEq, BinaryOp::NotEq),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                (Punct::Lt, BinaryOp::Lt),
                (Punct::Le, BinaryOp::Le),
                (Punct::Gt, BinaryOp::Gt),
                (Punct::Ge, BinaryOp::Ge),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[(Punct::Plus, BinaryOp::Add), (Punct::Minus, BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                (Punct::Star, BinaryOp::Mul),
                (Punct::Slash, BinaryOp::Div),
                (Punct::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Punct(Punct::Bang) => UnaryOp::Not,
            TokenKind::Punct(Punct::Minus) => UnaryOp::Neg,
            TokenKind::Punct(Punct::Plus) => UnaryOp::Plus,
            TokenKind::Keyword(Keyword::TypeOf) => UnaryOp::TypeOf,
            TokenKind::Punct(Punct::PlusPlus | Punct::MinusMinus) => {
                let increment = self.check_punct(Punct::PlusPlus);
                self.advance();
                let target = self.update_target()?;
                return Ok(Expr::Update {
                    increment,
                    prefix: true,
                    target,
                });
            }
            _ => return self.postfix(),
        };
        self.advance();
        let operand = Box::new(self.nested(Self::unary)?);
        Ok(Expr::Unary { op, operand })
    }

    fn update_target(&mut self) -> ParseResult<String> {
        let at = self.peek().offset;
        match self.call_member()? {
            Expr::Ident(name) => Ok(name),
            _ => Err(SyntaxError::new("invalid update target", at)),
        }
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let at = self.peek().offset;
        let expr = self.call_member()?;
        let increment = match self.peek_kind() {
            _ if self.peek().at_boundary => return Ok(expr),
            TokenKind::Punct(Punct::PlusPlus) => true,
            TokenKind::Punct(Punct::MinusMinus) => false,
            _ => return Ok(expr),
        };
        let Expr::Ident(target) = expr else {
            return Err(SyntaxError::new("invalid update target", at));
        };
        self.advance();
        Ok(Expr::Update {
            increment,
            prefix: false,
            target,
        })
    }

    fn call_member(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.peek().at_boundary {
                return Ok(expr);
            }
            if self.eat_punct(Punct::Dot) {
                let name = self.expect_ident()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Str(name)),
                };
            } else if self.eat_punct(Punct::LBracket) {
                let property = self.expression()?;
                self.expect_punct(Punct::RBracket)?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(property),
                };
            } else if self.check_punct(Punct::LParen) {
                let at = self.peek().offset;
                self.advance();
                let args = self.arguments(Punct::RParen)?;
                let callee = match expr {
                    Expr::Ident(name) => Callee::Function(name),
                    Expr::Member { object, property } => match *property {
                        Expr::Str(name) => Callee::Method { object, name },
                        _ => return Err(SyntaxError::new("computed method calls are not supported", at)),
                    },
                    _ => return Err(SyntaxError::new("expression is not callable", at)),
                };
                expr = Expr::Call { callee, args };
            } else {
                return Ok(expr);
            }
        }
    }

    fn arguments(&mut self, close: Punct) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat_punct(close) {
            return Ok(args);
        }
        loop {
            args.push(self.assignment()?);
            if self.eat_punct(close) {
                return Ok(args);
            }
            self.expect_punct(Punct::Comma)?;
            if self.eat_punct(close) {
                return Ok(args);
            }
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::Number(n) => Expr::Number(n),
            TokenKind::Str(s) => Expr::Str(s),
            TokenKind::Ident(name) => Expr::Ident(name),
            TokenKind::Keyword(Keyword::True) => Expr::Bool(true),
            TokenKind::Keyword(Keyword::False) => Expr::Bool(false),
            TokenKind::Keyword(Keyword::Null) => Expr::Null,
            TokenKind::Keyword(Keyword::Undefined) => Expr::Undefined,
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.expression()?;
                self.expect_punct(Punct::RParen)?;
                return Ok(inner);
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.advance();
                return Ok(Expr::Array(self.arguments(Punct::RBracket)?));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> ParseResult<Program> {
        let mut tokens = tokenize(code, 0)?;
        tokens.push(Token::new(TokenKind::Eof, code.len(), true));
        Parser::new(tokens).parse_program()
    }

    fn parse_expr(code: &str) -> Expr {
        match parse_echo(code, 0).unwrap() {
            Echo::Expr(expr) => expr,
            other => panic!("expected expression echo, got {other:?}"),
        }
    }

    #[test]
    fn test_echo_static_path_split() {
        assert_eq!(
            parse_echo("a.b[0].c", 0).unwrap(),
            Echo::Path {
                root: "a".into(),
                rest: ".b[0].c".into()
            }
        );
        assert_eq!(
            parse_echo("", 0).unwrap(),
            Echo::Path {
                root: String::new(),
                rest: String::new()
            }
        );
    }

    fn path(root: &str, rest: &str) -> Echo {
        Echo::Path {
            root: root.into(),
            rest: rest.into(),
        }
    }

    #[test]
    fn test_echo_resolver_shaped_paths() {
        assert_eq!(parse_echo("first-name", 0).unwrap(), path("first-name", ""));
        assert_eq!(parse_echo("a.1", 0).unwrap(), path("a", ".1"));
        assert_eq!(parse_echo(".a[0]", 0).unwrap(), path("", ".a[0]"));
        assert_eq!(parse_echo("[0]", 0).unwrap(), path("", "[0]"));
    }

    #[test]
    fn test_echo_invalid_expression_becomes_path() {
        assert_eq!(parse_echo("a[b", 0).unwrap(), path("a", "[b"));
        assert_eq!(parse_echo("'open", 0).unwrap(), path("'open", ""));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "[".repeat(MAX_NESTING + 1), "]".repeat(MAX_NESTING + 1));
        let err = parse_echo(&deep, 0).unwrap_err();
        assert!(err.too_deep);

        let err = parse(&"{".repeat(MAX_NESTING + 1)).unwrap_err();
        assert!(err.too_deep);
        assert!(!parse("if (a) {").unwrap_err().too_deep);
    }

    #[test]
    fn test_echo_dynamic_index_is_expression() {
        assert_eq!(
            parse_expr("items[i]"),
            Expr::Member {
                object: Box::new(Expr::Ident("items".into())),
                property: Box::new(Expr::Ident("i".into())),
            }
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_expr("1 + 2 * 3"),
            Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Number(1.0)),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: Box::new(Expr::Number(2.0)),
                    right: Box::new(Expr::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn test_method_call() {
        assert_eq!(
            parse_expr("names.join(', ')"),
            Expr::Call {
                callee: Callee::Method {
                    object: Box::new(Expr::Ident("names".into())),
                    name: "join".into(),
                },
                args: vec![Expr::Str(", ".into())],
            }
        );
    }

    #[test]
    fn test_for_classic_header() {
        let program = parse("for (var i = 0; i < 3; i++) { }").unwrap();
        let Stmt::For {
            init,
            cond,
            update,
            ..
        } = &program.body[0]
        else {
            panic!("expected for loop");
        };
        assert!(matches!(
            init.as_deref(),
            Some(Stmt::Declare {
                kind: DeclKind::Var,
                ..
            })
        ));
        assert!(cond.is_some());
        assert_eq!(
            update,
            &Some(Expr::Update {
                increment: true,
                prefix: false,
                target: "i".into()
            })
        );
    }

    #[test]
    fn test_for_of_and_in() {
        let program = parse("for (const item of items) {} for (k in obj) {}").unwrap();
        assert!(matches!(
            &program.body[0],
            Stmt::ForEach {
                kind: Some(DeclKind::Const),
                mode: IterMode::Of,
                ..
            }
        ));
        assert!(matches!(
            &program.body[1],
            Stmt::ForEach {
                kind: None,
                mode: IterMode::In,
                ..
            }
        ));
    }

    #[test]
    fn test_if_else_chain() {
        let program = parse("if (a) { x = 1 } else if (b) { x = 2 } else { x = 3 }").unwrap();
        let Stmt::If { otherwise, .. } = &program.body[0] else {
            panic!("expected if");
        };
        assert!(matches!(otherwise.as_deref(), Some(Stmt::If { .. })));
    }

    #[test]
    fn test_missing_semicolon_inside_directive() {
        let err = parse("var a = 1 var b = 2").unwrap_err();
        assert!(err.message.contains("expected `;`"), "{}", err.message);
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(parse("if (a) {").unwrap_err().message, "unclosed `{`");
        assert!(parse("}").unwrap_err().message.contains("unexpected `}`"));
    }

    #[test]
    fn test_break_outside_loop() {
        let err = parse("break").unwrap_err();
        assert_eq!(err.message, "`break` outside of a loop");
        assert!(parse("while (true) { break }").is_ok());
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("a.b = 1").unwrap_err();
        assert_eq!(err.message, "invalid assignment target");
    }

    #[test]
    fn test_const_requires_initializer() {
        let err = parse("const x").unwrap_err();
        assert!(err.message.contains("missing initializer"));
    }
}
