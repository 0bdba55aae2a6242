use super::*;
use crate::ast::FunctionDecl;
use crate::token::Literal;
use std::rc::Rc;

impl<'a> Parser<'a> {
    /// Parses a declaration (or statement).
    /// On a syntax error, skips to the next statement boundary and returns `None`.
    pub fn parse_declaration(&mut self) -> Option<Stmt> {
        let result = match self.peek().kind {
            TokenKind::Var => self.parse_var_declaration(),
            TokenKind::Fun => self.parse_fn_declaration(),
            _ => self.parse_stmt(),
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Print => self.parse_print_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => {
                // expression statement
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// Parses `{ ... }` and returns the declarations inside.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LeftBrace, "Expect '{' before block.")?;

        let mut body = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                body.push(stmt);
            }
        }

        self.expect(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Var, "Expect 'var'.")?;
        let name = self.expect(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.eat(&[TokenKind::Equal]) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn parse_fn_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Fun, "Expect 'fun'.")?;
        let name = self.expect(TokenKind::Identifier, "Expect function name.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after function name.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    let token = self.peek().clone();
                    self.error(&token, "Can't have more than 255 parameters.");
                }
                params.push(self.expect(TokenKind::Identifier, "Expect parameter name.")?);

                if !self.eat(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "Expect ')' after parameters.")?;

        if !self.check(TokenKind::LeftBrace) {
            return Err(self.error_at_current("Expect '{' before function body."));
        }
        let body = self.parse_block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn parse_print_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Print, "Expect 'print'.")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Return, "Expect 'return'.")?;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::If, "Expect 'if'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.parse_stmt()?);
        // `else` binds to the nearest `if`.
        let else_branch = if self.eat(&[TokenKind::Else]) {
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
        self.expect(TokenKind::While, "Expect 'while'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::While { condition, body })
    }

    /// Desugars `for (init; cond; incr) body` into
    /// `{ init; while (cond) { body; incr; } }`.
    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::For, "Expect 'for'.")?;
        self.expect(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Var => Some(self.parse_var_declaration()?),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "Expect ';' after expression.")?;
                Some(Stmt::Expression(expr))
            }
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.parse_stmt()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        body = Stmt::While {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_stmt;
    use insta::assert_snapshot;

    fn stmt(source: &str) -> String {
        let source = source.into();
        let stmt = Parser::from_source(&source).parse_declaration();
        assert!(source.has_no_errors(), "{}", source.errors);
        print_stmt(&stmt.expect("statement should parse"))
    }

    fn first_error(source: &str) -> String {
        let source = source.into();
        Parser::from_source(&source).parse_program();
        source.errors.to_vec()[0].to_string()
    }

    #[test]
    fn test_var_declaration() {
        assert_snapshot!(stmt("var a = 1;"), @"(var a 1)");
        assert_snapshot!(stmt("var a;"), @"(var a)");
    }

    #[test]
    fn test_simple_statements() {
        assert_snapshot!(stmt("print 1 + 2;"), @"(print (+ 1 2))");
        assert_snapshot!(stmt("foo(1);"), @"(; (call foo 1))");
        assert_snapshot!(stmt("{ var a = 1; print a; }"), @"(block (var a 1) (print a))");
        assert_snapshot!(stmt("{}"), @"(block)");
    }

    #[test]
    fn test_fn_declaration() {
        assert_snapshot!(
            stmt("fun add(a, b) { return a + b; }"),
            @"(fun add(a b) (return (+ a b)))"
        );
        assert_snapshot!(stmt("fun noop() { return; }"), @"(fun noop() (return))");
    }

    #[test]
    fn test_if_else() {
        assert_snapshot!(stmt("if (a) print 1; else print 2;"), @"(if a (print 1) (print 2))");
        // dangling else goes to the inner if
        assert_snapshot!(
            stmt("if (a) if (b) print 1; else print 2;"),
            @"(if a (if b (print 1) (print 2)))"
        );
    }

    #[test]
    fn test_while() {
        assert_snapshot!(stmt("while (a < 3) a = a + 1;"), @"(while (< a 3) (; (= a (+ a 1))))");
    }

    #[test]
    fn test_for_desugaring() {
        assert_snapshot!(
            stmt("for (var i = 0; i < 3; i = i + 1) print i;"),
            @"(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))"
        );
        assert_snapshot!(stmt("for (;;) print 1;"), @"(while true (print 1))");
        assert_snapshot!(
            stmt("for (i = 0; i < 1;) {}"),
            @"(block (; (= i 0)) (while (< i 1) (block)))"
        );
    }

    #[test]
    fn test_parameter_cap() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));
        assert_eq!(
            first_error(&source),
            "[line 1] Error at 'p255': Can't have more than 255 parameters."
        );
    }

    #[test]
    fn test_statement_errors() {
        assert_eq!(
            first_error("var a = 1"),
            "[line 1] Error at end: Expect ';' after variable declaration."
        );
        assert_eq!(
            first_error("fun f() print 1;"),
            "[line 1] Error at 'print': Expect '{' before function body."
        );
        assert_eq!(
            first_error("{ print 1;"),
            "[line 1] Error at end: Expect '}' after block."
        );
        assert_eq!(
            first_error("if a) print 1;"),
            "[line 1] Error at 'a': Expect '(' after 'if'."
        );
    }
}
