use crate::ast::{Span, Stmt};
use crate::lexer::Token;
use logos::{Lexer, Logos};
use lox_source::{Source, SyntaxError};
use std::mem;

mod expr;
mod stmt;

/// Marker for a hard parse error. The error message is already recorded in
/// [`Source::errors`] by the time this is returned; the value only unwinds
/// parsing up to the nearest declaration, which resynchronizes.
pub(crate) struct ParseError;

pub(crate) type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    /// Cached token for peeking.
    current_token: Token,
    lexer: Lexer<'a, Token>,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        let lexer = Token::lexer(source.content);
        let mut parser = Self {
            current_token: Token::Eof,
            lexer,
            source,
        };
        parser.next(); // prime the first token
        parser
    }

    /// Parses a whole program (a sequence of declarations terminated by EOF).
    ///
    /// Statements that fail to parse are reported, resynchronized past and
    /// dropped; the returned list never contains placeholders for them.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut program = Vec::new();
        while self.current_token != Token::Eof {
            match self.parse_declaration() {
                Ok(stmt) => program.push(stmt),
                Err(ParseError) => self.synchronize(),
            }
        }
        program
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn next(&mut self) -> Token {
        let token = loop {
            match self.lexer.next().unwrap_or(Token::Eof) {
                Token::Error => {
                    // Lexical error. Report it and keep scanning; a bad
                    // character never aborts the lexer.
                    let message = if self.lexer.slice().starts_with('"') {
                        "Unterminated string."
                    } else {
                        "Unexpected character."
                    };
                    self.source
                        .errors
                        .add_error(SyntaxError::new(message, self.lexer.span()));
                }
                token => break token,
            }
        };
        self.current_token = token.clone();
        token
    }

    /// Span of the current token.
    fn span(&self) -> Span {
        self.lexer.span()
    }

    /// Predicate that tests whether the next token has the same discriminant and eats the next token if yes as a side effect.
    fn eat(&mut self, tok: Token) -> bool {
        if mem::discriminant(&self.current_token) == mem::discriminant(&tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token, message: &str) -> ParseResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn expect_identifier(&mut self, message: &str) -> ParseResult<String> {
        if let Token::Identifier(ref ident) = self.current_token {
            let ident = ident.clone();
            self.next();
            Ok(ident)
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Reports an error at the current token and returns a [`ParseError`] for unwinding.
    fn error_at_current(&mut self, message: impl ToString) -> ParseError {
        self.source
            .errors
            .add_error(SyntaxError::new(message, self.span()));
        ParseError
    }

    /// Panic mode error recovery: discard tokens until just past a `;` or
    /// just before a token that starts a new statement.
    fn synchronize(&mut self) {
        loop {
            match self.current_token {
                Token::Semi => {
                    self.next();
                    return;
                }
                Token::Eof
                | Token::Class
                | Token::Fun
                | Token::Var
                | Token::For
                | Token::If
                | Token::While
                | Token::Print
                | Token::Return => return,
                _ => {
                    self.next();
                }
            }
        }
    }
}
