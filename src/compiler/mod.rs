//! Template compiler
//!
//! Compilation is a single linear pass: the scanner splits the source into
//! [`Instruction`]s, statement directives are tokenized, and the parser
//! turns the merged stream into a statement tree that a [`Renderer`]
//! interprets at render time. No host code is generated.

pub(crate) mod ast;
mod lexer;
mod parser;
mod scanner;

use tracing::debug;

use self::ast::Program;
use self::lexer::{SyntaxError, Token, TokenKind, tokenize};
use self::parser::{Parser, parse_echo};
use self::scanner::{Located, line_col, scan_located};
use crate::core::error::{Error, Result};
use crate::template::Renderer;

pub use scanner::{Instruction, scan};

/// Turns template source into a renderer.
///
/// [`Template`](crate::Template) compiles through this trait, so callers can
/// wrap or replace the default [`Compiler`].
pub trait Compile: Send + Sync {
    fn compile(&self, source: &str) -> Result<Renderer>;
}

/// The default compiler for `<% %>` templates
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// The positional instruction sequence for `source`
    pub fn scan(&self, source: &str) -> Vec<Instruction> {
        scan(source)
    }
}

impl Compile for Compiler {
    fn compile(&self, source: &str) -> Result<Renderer> {
        let (program, instructions) = lower(source).map_err(|err| {
            let (line, column) = line_col(source, err.offset);
            Error::syntax(err.message, line, column)
        })?;
        debug!(
            instructions,
            statements = program.body.len(),
            "Compiled template"
        );
        Ok(Renderer::new(program))
    }
}

/// Lower scanned instructions into one token stream and parse it
fn lower(source: &str) -> std::result::Result<(Program, usize), SyntaxError> {
    let located = scan_located(source);
    let instructions = located.len();

    let mut tokens = Vec::new();
    for Located {
        instruction,
        offset,
    } in located
    {
        match instruction {
            Instruction::Literal(text) => {
                tokens.push(Token::new(TokenKind::Text(text), offset, true));
            }
            Instruction::Expression(body) => {
                let echo = parse_echo(&body, offset)?;
                tokens.push(Token::new(TokenKind::Echo(echo), offset, true));
            }
            Instruction::Statement(code) => tokens.extend(tokenize(&code, offset)?),
        }
    }
    tokens.push(Token::new(TokenKind::Eof, source.len(), true));

    let program = Parser::new(tokens).parse_program()?;
    Ok((program, instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{Echo, Stmt};

    fn program(source: &str) -> Program {
        lower(source).unwrap().0
    }

    #[test]
    fn test_literal_only_program() {
        assert_eq!(program("plain").body, vec![Stmt::Text("plain".into())]);
        assert!(program("").body.is_empty());
    }

    #[test]
    fn test_block_spans_directives() {
        let body = program("<% if (ok) { %>yes<%= name %><% } %>!").body;
        assert_eq!(body.len(), 2);
        let Stmt::If { then, .. } = &body[0] else {
            panic!("expected if statement");
        };
        assert_eq!(
            **then,
            Stmt::Block(vec![
                Stmt::Text("yes".into()),
                Stmt::Echo(Echo::Path {
                    root: "name".into(),
                    rest: String::new()
                }),
            ])
        );
        assert_eq!(body[1], Stmt::Text("!".into()));
    }

    #[test]
    fn test_syntax_error_position() {
        let err = Compiler::new().compile("line one\n<% if (a { %>").unwrap_err();
        match err {
            Error::Syntax { line, column, .. } => assert_eq!((line, column), (2, 10)),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_block_is_compile_error() {
        let err = Compiler::new().compile("<% for (var x of xs) { %>x").unwrap_err();
        assert!(err.is_compile_error());
        assert!(err.to_string().contains("unclosed `{`"));
    }

    #[test]
    fn test_unparseable_echo_falls_back_to_path() {
        assert_eq!(
            program("<%= a + %>").body,
            vec![Stmt::Echo(Echo::Path {
                root: "a +".into(),
                rest: String::new()
            })]
        );
    }

    #[test]
    fn test_deep_nesting_is_compile_error() {
        let parens = format!("<%= {}1{} %>", "(".repeat(20_000), ")".repeat(20_000));
        let blocks = format!("<% {} %>", "{".repeat(20_000));
        let negations = format!("<%= {}x %>", "!".repeat(20_000));

        for source in [parens, blocks, negations] {
            let err = Compiler::new().compile(&source).unwrap_err();
            assert!(err.to_string().contains("nesting exceeds"), "{err}");
        }
    }

    #[test]
    fn test_moderate_nesting_compiles() {
        let source = format!("<%= {}1{} %>", "(".repeat(40), ")".repeat(40));
        assert!(Compiler::new().compile(&source).is_ok());
    }

    #[test]
    fn test_scan_through_compiler() {
        let instructions = Compiler::new().scan("a<%= b %>");
        assert_eq!(
            instructions,
            vec![
                Instruction::Literal("a".into()),
                Instruction::Expression("b".into())
            ]
        );
    }
}
