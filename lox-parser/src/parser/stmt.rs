use crate::ast::{Expr, Stmt};
use std::rc::Rc;

use super::*;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement).
    pub(crate) fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        match self.current_token {
            Token::Var => self.parse_var_declaration(),
            Token::Fun => self.parse_fun_declaration(),
            _ => self.parse_stmt(),
        }
    }

    /// Parses a statement.
    pub(crate) fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current_token {
            Token::Print => self.parse_print_stmt(),
            Token::Return => self.parse_return_stmt(),
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::For => self.parse_for_stmt(),
            Token::OpenBrace => self.parse_block_stmt(),
            _ => {
                // expression statement
                let expr = self.parse_expr()?;
                self.expect(Token::Semi, "Expect ';' after expression.")?;
                Ok(Stmt::ExprStmt(expr))
            }
        }
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Var, "Expect 'var'.")?;
        let ident = self.expect_identifier("Expect variable name.")?;
        let initializer = if self.eat(Token::Equals) {
            Some(self.parse_expr()?)
        } else {
            None // defaults to nil
        };
        self.expect(Token::Semi, "Expect ';' after variable declaration.")?;
        Ok(Stmt::VarDeclaration { ident, initializer })
    }

    fn parse_fun_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Fun, "Expect 'fun'.")?;
        let ident = self.expect_identifier("Expect function name.")?;

        self.expect(Token::OpenParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.eat(Token::CloseParen) {
            loop {
                if params.len() >= 255 {
                    // soft limit, parsing continues
                    let span = self.span();
                    self.source.errors.add_error(SyntaxError::new(
                        "Can't have more than 255 parameters.",
                        span,
                    ));
                }
                params.push(self.expect_identifier("Expect parameter name.")?);

                if self.eat(Token::CloseParen) {
                    break;
                }
                self.expect(Token::Comma, "Expect ',' between parameters.")?;
            }
        }

        self.expect(Token::OpenBrace, "Expect '{' before function body.")?;
        let body = self.parse_block_body()?;

        Ok(Stmt::FunDeclaration {
            ident,
            params,
            body: Rc::new(body),
        })
    }

    fn parse_print_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Print, "Expect 'print'.")?;
        let expr = self.parse_expr()?;
        self.expect(Token::Semi, "Expect ';' after value.")?;
        Ok(Stmt::PrintStmt(expr))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.span();
        self.expect(Token::Return, "Expect 'return'.")?;
        let value = if self.current_token == Token::Semi {
            None // defaults to nil
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::Semi, "Expect ';' after return value.")?;
        Ok(Stmt::ReturnStmt { span, value })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::If, "Expect 'if'.")?;
        self.expect(Token::OpenParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.expect(Token::CloseParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.eat(Token::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::While, "Expect 'while'.")?;
        self.expect(Token::OpenParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.expect(Token::CloseParen, "Expect ')' after while condition.")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::While { condition, body })
    }

    /// Parses a `for` statement by desugaring it into
    /// `{ init; while (cond) { body; increment; } }`.
    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::For, "Expect 'for'.")?;
        self.expect(Token::OpenParen, "Expect '(' after 'for'.")?;

        let initializer = if self.eat(Token::Semi) {
            None
        } else if self.current_token == Token::Var {
            Some(self.parse_var_declaration()?)
        } else {
            let expr = self.parse_expr()?;
            self.expect(Token::Semi, "Expect ';' after loop initializer.")?;
            Some(Stmt::ExprStmt(expr))
        };

        let condition = if self.current_token == Token::Semi {
            None // defaults to true
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::Semi, "Expect ';' after loop condition.")?;

        let increment = if self.current_token == Token::CloseParen {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(Token::CloseParen, "Expect ')' after for clauses.")?;

        let mut body = self.parse_stmt()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::ExprStmt(increment)]);
        }
        body = Stmt::While {
            condition: condition.unwrap_or(Expr::BoolLit(true)),
            body: Box::new(body),
        };
        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    pub(crate) fn parse_block_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::OpenBrace, "Expect '{'.")?;
        Ok(Stmt::Block(self.parse_block_body()?))
    }

    /// Parses declarations up to and including the closing `}`.
    /// The opening `{` must already be consumed.
    fn parse_block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        while !self.eat(Token::CloseBrace) {
            if self.current_token == Token::Eof {
                return Err(self.error_at_current("Expect '}' after block."));
            }
            body.push(self.parse_declaration()?);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn program(source: &str) -> Vec<Stmt> {
        let source = source.into();
        let program = Parser::new(&source).parse_program();
        assert!(source.has_no_errors(), "{}", source);
        program
    }

    #[test]
    fn var_declaration() {
        assert_eq!(
            program("var x = 1;"),
            vec![Stmt::VarDeclaration {
                ident: "x".to_string(),
                initializer: Some(Expr::NumberLit(1.0)),
            }]
        );
        assert_eq!(
            program("var x;"),
            vec![Stmt::VarDeclaration {
                ident: "x".to_string(),
                initializer: None,
            }]
        );
    }

    #[test]
    fn fun_declaration() {
        match &program("fun add(a, b) { return a + b; }")[0] {
            Stmt::FunDeclaration {
                ident,
                params,
                body,
            } => {
                assert_eq!(ident, "add");
                assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
                assert!(matches!(body[0], Stmt::ReturnStmt { .. }));
            }
            other => panic!("expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn if_else() {
        match &program("if (true) print 1; else print 2;")[0] {
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                assert_eq!(*condition, Expr::BoolLit(true));
                assert!(matches!(**then_branch, Stmt::PrintStmt(_)));
                assert!(else_branch.is_some());
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn while_stmt() {
        match &program("while (x < 4) x = x + 1;")[0] {
            Stmt::While { condition, body } => {
                assert!(matches!(
                    condition,
                    Expr::Binary {
                        op: Token::LessThan,
                        ..
                    }
                ));
                assert!(matches!(**body, Stmt::ExprStmt(Expr::Assign { .. })));
            }
            other => panic!("expected while statement, got {:?}", other),
        }
    }

    #[test]
    fn for_desugars_to_while() {
        // for (var i = 0; i < 4; i = i + 1) print i;
        // => { var i = 0; while (i < 4) { print i; i = i + 1; } }
        match &program("for (var i = 0; i < 4; i = i + 1) print i;")[0] {
            Stmt::Block(outer) => {
                assert!(matches!(outer[0], Stmt::VarDeclaration { .. }));
                match &outer[1] {
                    Stmt::While { body, .. } => match &**body {
                        Stmt::Block(inner) => {
                            assert!(matches!(inner[0], Stmt::PrintStmt(_)));
                            assert!(matches!(inner[1], Stmt::ExprStmt(Expr::Assign { .. })));
                        }
                        other => panic!("expected block body, got {:?}", other),
                    },
                    other => panic!("expected while statement, got {:?}", other),
                }
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn for_without_condition_defaults_to_true() {
        match &program("for (;;) print 1;")[0] {
            Stmt::While { condition, .. } => assert_eq!(*condition, Expr::BoolLit(true)),
            other => panic!("expected while statement, got {:?}", other),
        }
    }

    #[test]
    fn block_scoping_syntax() {
        assert_eq!(
            program("{ var a = 2; print a; }"),
            vec![Stmt::Block(vec![
                Stmt::VarDeclaration {
                    ident: "a".to_string(),
                    initializer: Some(Expr::NumberLit(2.0)),
                },
                Stmt::PrintStmt(Expr::Identifier {
                    ident: "a".to_string(),
                    span: 19..20,
                }),
            ])]
        );
    }

    #[test]
    fn failed_statement_is_dropped_and_parsing_continues() {
        let source = "1 + ;\nprint 2;".into();
        let program = Parser::new(&source).parse_program();
        assert!(!source.has_no_errors());
        // the failed statement is dropped, the rest of the program is kept
        assert_eq!(program.len(), 1);
        assert!(matches!(program[0], Stmt::PrintStmt(_)));
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let source = "var x = 1".into();
        Parser::new(&source).parse_program();
        assert!(!source.has_no_errors());
    }

    #[test]
    fn unterminated_string_is_reported() {
        let source = "var s = \"abc".into();
        Parser::new(&source).parse_program();
        assert!(!source.has_no_errors());
    }
}
