use super::*;
use crate::ast::ExprId;
use crate::token::Literal;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    /// Assignment is right associative and only valid when the target is a variable.
    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_or()?;

        if self.eat(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.parse_assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assign {
                    id: ExprId::fresh(),
                    name,
                    value: Box::new(value),
                }),
                _ => {
                    // Reported, but not worth unwinding for.
                    self.error(&equals, "Invalid assignment target.");
                    Ok(value)
                }
            };
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_and()?;

        while self.eat(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.parse_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_equality()?;

        while self.eat(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.parse_equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// Parses a left associative chain of binary operators in `operators`,
    /// with operands parsed by `operand`.
    fn parse_binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while self.eat(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&[TokenKind::Minus, TokenKind::Plus], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        self.parse_binary(&[TokenKind::Slash, TokenKind::Star], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.eat(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.parse_unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.parse_call()
    }

    /// Parses a primary expression followed by any number of call suffixes (e.g. `f()()`).
    fn parse_call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        while self.eat(&[TokenKind::LeftParen]) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.parse_expr()?);

                if !self.eat(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.expect(TokenKind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    /* Expressions.Literals */
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let expr = match token.kind {
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::Nil => Expr::Literal(Literal::Nil),
            TokenKind::Number | TokenKind::String => {
                Expr::Literal(token.literal.clone().unwrap_or(Literal::Nil))
            }
            TokenKind::Identifier => Expr::Variable {
                id: ExprId::fresh(),
                name: token,
            },
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(inner)));
            }
            _ => return Err(self.error_at_current("Expect expression.")),
        };
        self.advance(); // eat parsed token
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_expr;
    use insta::assert_snapshot;

    fn expr(source: &str) -> String {
        let source = source.into();
        let ast = Parser::from_source(&source).parse_expr();
        assert!(source.has_no_errors(), "{}", source.errors);
        print_expr(&ast.expect("expression should parse"))
    }

    fn first_error(source: &str) -> String {
        let source = source.into();
        let _ = Parser::from_source(&source).parse_expr();
        source.errors.to_vec()[0].to_string()
    }

    #[test]
    fn test_literal() {
        assert_snapshot!(expr("true"), @"true");
        assert_snapshot!(expr("false"), @"false");
        assert_snapshot!(expr("nil"), @"nil");
        assert_snapshot!(expr("1"), @"1");
        assert_snapshot!(expr("2.5"), @"2.5");
        assert_snapshot!(expr("\"hello\""), @"hello");
    }

    #[test]
    fn test_grouped_unary_binary() {
        assert_snapshot!(expr("-123 * (45.67)"), @"(* (- 123) (group 45.67))");
    }

    #[test]
    fn test_binary_expr() {
        assert_snapshot!(expr("1 + 1"), @"(+ 1 1)");
        assert_snapshot!(expr("1 == 2 - 1"), @"(== 1 (- 2 1))");
        assert_snapshot!(expr("2 * 2 * 2"), @"(* (* 2 2) 2)");
        assert_snapshot!(expr("1 + 2 * 3 < 4 != !false"), @"(!= (< (+ 1 (* 2 3)) 4) (! false))");
        assert_snapshot!(expr("--1"), @"(- (- 1))");
    }

    #[test]
    fn test_logical_expr() {
        assert_snapshot!(expr("a or b and c"), @"(or a (and b c))");
        assert_snapshot!(expr("a and b or c"), @"(or (and a b) c)");
    }

    #[test]
    fn test_assignment() {
        assert_snapshot!(expr("a = b = c"), @"(= a (= b c))");
        assert_snapshot!(expr("a = 1 + 2"), @"(= a (+ 1 2))");
    }

    #[test]
    fn test_invalid_assignment_target() {
        let source = "a + b = c".into();
        let ast = Parser::from_source(&source).parse_expr();
        assert_eq!(
            source.errors.to_vec()[0].to_string(),
            "[line 1] Error at '=': Invalid assignment target."
        );
        // The right hand side is still returned.
        assert_snapshot!(print_expr(&ast.unwrap()), @"c");
    }

    #[test]
    fn test_fn_call() {
        assert_snapshot!(expr("foo()"), @"(call foo)");
        assert_snapshot!(expr("foo(1, bar)"), @"(call foo 1 bar)");
        assert_snapshot!(expr("foo(1, bar, baz())"), @"(call foo 1 bar (call baz))");
        assert_snapshot!(expr("f()()"), @"(call (call f))");
    }

    #[test]
    fn test_argument_cap() {
        let args = vec!["1"; 256].join(", ");
        let source = format!("f({})", args);
        assert_eq!(
            first_error(&source),
            "[line 1] Error at '1': Can't have more than 255 arguments."
        );

        let args = vec!["1"; 255].join(", ");
        let source = format!("f({})", args);
        let source = source.as_str().into();
        let _ = Parser::from_source(&source).parse_expr();
        assert!(source.has_no_errors());
    }

    #[test]
    fn test_expect_expression() {
        assert_eq!(first_error(")"), "[line 1] Error at ')': Expect expression.");
        assert_eq!(first_error("(1"), "[line 1] Error at end: Expect ')' after expression.");
        assert_eq!(first_error("f(1"), "[line 1] Error at end: Expect ')' after arguments.");
    }
}
