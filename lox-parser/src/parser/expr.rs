use crate::ast::Expr;

use super::*;

/// Binding power of the unary operators `!` and `-`.
/// Binds tighter than every binary operator so that `-1 + 2` parses as `(-1) + 2`.
const UNARY_BP: u8 = 16;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(0) // 0 to accept any expression
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression, use [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_primary_expr()?;

        loop {
            let (l_bp, r_bp) = match self.current_token.binop_bp() {
                Some(bp) => bp,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            // self.current_token is a valid binop
            let binop = self.current_token.clone();
            let op_span = self.span();
            self.next();

            let rhs = self.parse_expr_bp(r_bp)?;

            lhs = match binop {
                Token::Equals => match lhs {
                    Expr::Identifier { ident, span } => Expr::Assign {
                        ident,
                        span,
                        value: Box::new(rhs),
                    },
                    _ => {
                        // Only a bare variable is a valid assignment target.
                        // Report and keep going with the already parsed value.
                        self.source
                            .errors
                            .add_error(SyntaxError::new("Invalid assignment target.", op_span));
                        rhs
                    }
                },
                Token::And | Token::Or => Expr::Logical {
                    lhs: Box::new(lhs),
                    op: binop,
                    rhs: Box::new(rhs),
                },
                _ => Expr::Binary {
                    lhs: Box::new(lhs),
                    op: binop,
                    span: op_span,
                    rhs: Box::new(rhs),
                },
            };
        }

        Ok(lhs)
    }

    /// Parses a primary (atom) expression, including any postfix call chains
    /// (e.g. `foo(1)(2)`).
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        // NOTE: prefix operators are handled here
        let mut expr = match self.current_token.clone() {
            Token::NumberLit(val) => {
                self.next();
                Expr::NumberLit(val)
            }
            Token::BoolLit(val) => {
                self.next();
                Expr::BoolLit(val)
            }
            Token::StringLit(val) => {
                self.next();
                Expr::StringLit(val)
            }
            Token::Nil => {
                self.next();
                Expr::NilLit
            }
            Token::Identifier(ident) => {
                let span = self.span();
                self.next();
                Expr::Identifier { ident, span }
            }
            Token::LogicalNot | Token::Minus => {
                let op = self.current_token.clone();
                let span = self.span();
                self.next();
                Expr::Unary {
                    op,
                    span,
                    arg: Box::new(self.parse_expr_bp(UNARY_BP)?),
                }
            }
            Token::OpenParen => {
                self.next();
                let inner = self.parse_expr()?;
                self.expect(Token::CloseParen, "Expect ')' after expression.")?;
                Expr::Grouping(Box::new(inner))
            }
            _ => return Err(self.error_at_current("Expect expression.")),
        };

        while self.current_token == Token::OpenParen {
            let span = self.span();
            self.next();
            let args = self.parse_call_args()?;
            expr = Expr::Call {
                callee: Box::new(expr),
                span,
                args,
            };
        }

        Ok(expr)
    }

    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.eat(Token::CloseParen) {
            loop {
                if args.len() >= 255 {
                    // soft limit, parsing continues
                    let span = self.span();
                    self.source
                        .errors
                        .add_error(SyntaxError::new("Can't have more than 255 arguments.", span));
                }
                args.push(self.parse_expr()?);

                if self.eat(Token::CloseParen) {
                    break;
                }
                self.expect(Token::Comma, "Expect ',' between arguments.")?;
            }
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn expr(source: &str) -> Expr {
        let source = source.into();
        let ast = Parser::new(&source).parse_expr();
        assert!(source.has_no_errors(), "{}", source);
        match ast {
            Ok(expr) => expr,
            Err(_) => unreachable!("no errors were reported"),
        }
    }

    #[test]
    fn literals() {
        assert_eq!(expr("1"), Expr::NumberLit(1.0));
        assert_eq!(expr("2.5"), Expr::NumberLit(2.5));
        assert_eq!(expr("true"), Expr::BoolLit(true));
        assert_eq!(expr("false"), Expr::BoolLit(false));
        assert_eq!(expr("nil"), Expr::NilLit);
        assert_eq!(expr(r#""hello""#), Expr::StringLit("hello".to_string()));
    }

    #[test]
    fn binary_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        match expr("1 + 2 * 3") {
            Expr::Binary {
                lhs,
                op: Token::Plus,
                rhs,
                ..
            } => {
                assert_eq!(*lhs, Expr::NumberLit(1.0));
                assert!(matches!(
                    *rhs,
                    Expr::Binary {
                        op: Token::Asterisk,
                        ..
                    }
                ));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn binary_left_associativity() {
        // 2 - 1 - 1 should parse as (2 - 1) - 1
        match expr("2 - 1 - 1") {
            Expr::Binary {
                lhs,
                op: Token::Minus,
                rhs,
                ..
            } => {
                assert!(matches!(
                    *lhs,
                    Expr::Binary {
                        op: Token::Minus,
                        ..
                    }
                ));
                assert_eq!(*rhs, Expr::NumberLit(1.0));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        // -1 + 2 should parse as (-1) + 2
        match expr("-1 + 2") {
            Expr::Binary {
                lhs,
                op: Token::Plus,
                rhs,
                ..
            } => {
                assert!(matches!(*lhs, Expr::Unary { op: Token::Minus, .. }));
                assert_eq!(*rhs, Expr::NumberLit(2.0));
            }
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn grouping_overrides_precedence() {
        // (1 + 2) * 3
        match expr("(1 + 2) * 3") {
            Expr::Binary {
                lhs,
                op: Token::Asterisk,
                ..
            } => assert!(matches!(*lhs, Expr::Grouping(_))),
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        // a = b = 1 should parse as a = (b = 1)
        match expr("a = b = 1") {
            Expr::Assign { ident, value, .. } => {
                assert_eq!(ident, "a");
                assert!(matches!(*value, Expr::Assign { .. }));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn logical_or_binds_looser_than_and() {
        // a or b and c should parse as a or (b and c)
        match expr("a or b and c") {
            Expr::Logical {
                op: Token::Or, rhs, ..
            } => assert!(matches!(
                *rhs,
                Expr::Logical { op: Token::And, .. }
            )),
            other => panic!("expected logical expression, got {:?}", other),
        }
    }

    #[test]
    fn call_chains() {
        // f(1)(2) should parse as (f(1))(2)
        match expr("f(1)(2)") {
            Expr::Call { callee, args, .. } => {
                assert_eq!(args, vec![Expr::NumberLit(2.0)]);
                assert!(matches!(*callee, Expr::Call { .. }));
            }
            other => panic!("expected call expression, got {:?}", other),
        }
    }

    #[test]
    fn call_with_no_args() {
        match expr("clock()") {
            Expr::Call { callee, args, .. } => {
                assert!(args.is_empty());
                assert!(matches!(*callee, Expr::Identifier { .. }));
            }
            other => panic!("expected call expression, got {:?}", other),
        }
    }

    #[test]
    fn invalid_assignment_target_is_reported_but_recovered() {
        let source = "1 = 2".into();
        let ast = Parser::new(&source).parse_expr();
        assert!(!source.has_no_errors());
        // parsing continues with the right-hand side
        assert_eq!(ast.ok(), Some(Expr::NumberLit(2.0)));
    }

    #[test]
    fn missing_operand_is_an_error() {
        let source = "1 +".into();
        let ast = Parser::new(&source).parse_expr();
        assert!(ast.is_err());
        assert!(!source.has_no_errors());
    }
}
