//! Variable resolution pass.

use std::collections::HashMap;

use lox_parser::ast::{Expr, ExprId, FunctionDecl, Stmt};
use lox_parser::token::Token;
use lox_source::{ErrorKind, Location, Source, SyntaxError};
use tracing::{debug, trace};

/// Maps every locally resolved [`Expr::Variable`] / [`Expr::Assign`] to its hop count:
/// the number of enclosing scopes between the use and its declaration (`0` is innermost).
/// Accesses missing from the table are globals.
pub type ResolvedLocals = HashMap<ExprId, usize>;

/// A lexical scope. The value is `true` once the variable's initializer has been resolved.
type Scope = HashMap<String, bool>;

/// Variable resolution pass.
pub struct Resolver<'a> {
    /// Scopes that are currently in (lexical) scope. The global scope is not tracked.
    scopes: Vec<Scope>,
    resolved_locals: ResolvedLocals,
    source: &'a Source<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            scopes: Vec::new(),
            resolved_locals: ResolvedLocals::new(),
            source,
        }
    }

    /// Returns a [`HashMap`] mapping all resolved variable accesses to hop counts.
    pub fn resolved_locals(&self) -> &ResolvedLocals {
        &self.resolved_locals
    }

    #[must_use]
    pub fn into_resolved_locals(self) -> ResolvedLocals {
        self.resolved_locals
    }

    pub fn resolve_program(&mut self, program: &[Stmt]) {
        self.resolve_stmts(program);
        debug!(locals = self.resolved_locals.len(), "resolved program");
    }

    fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks `name` as declared but not yet usable in the innermost scope.
    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(&name.lexeme) {
                let hops = self.scopes.len() - 1 - i;
                trace!(name = %name.lexeme, line = name.line, hops, "resolved local");
                self.resolved_locals.insert(id, hops);
                return;
            }
        }
        // Not found. Assume it is global.
    }

    fn resolve_function(&mut self, decl: &FunctionDecl) {
        self.enter_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.exit_scope();
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::Function(decl) => {
                // Define the name first to allow for recursion.
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl);
            }
            Stmt::Block(body) => {
                self.enter_scope();
                self.resolve_stmts(body);
                self.exit_scope();
            }
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { id, name } => {
                let uninitialized = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    .map_or(false, |initialized| !initialized);
                if uninitialized {
                    self.source.errors.add_error(SyntaxError::new(
                        ErrorKind::Resolve,
                        "Can't read local variable in its own initializer.",
                        name.line,
                        Location::AtLexeme(name.lexeme.clone()),
                    ));
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Literal(_) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lox_parser::parser::Parser;

    /// Returns the hop counts of variable accesses, in source order, keyed by name.
    fn hops(source: &str) -> Vec<(String, Option<usize>)> {
        let source = source.into();
        let program = Parser::from_source(&source).parse_program();
        let mut resolver = Resolver::new(&source);
        resolver.resolve_program(&program);
        assert!(source.has_no_errors(), "{}", source.errors);

        let mut accesses = Vec::new();
        collect_stmts(&program, &mut accesses);
        accesses
            .into_iter()
            .map(|(id, name)| (name, resolver.resolved_locals().get(&id).copied()))
            .collect()
    }

    fn collect_stmts(stmts: &[Stmt], out: &mut Vec<(ExprId, String)>) {
        for stmt in stmts {
            match stmt {
                Stmt::Expression(expr) | Stmt::Print(expr) => collect_expr(expr, out),
                Stmt::Var { initializer, .. } => {
                    if let Some(expr) = initializer {
                        collect_expr(expr, out);
                    }
                }
                Stmt::Block(body) => collect_stmts(body, out),
                Stmt::Function(decl) => collect_stmts(&decl.body, out),
                Stmt::Return { value, .. } => {
                    if let Some(expr) = value {
                        collect_expr(expr, out);
                    }
                }
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    collect_expr(condition, out);
                    collect_stmts(std::slice::from_ref(then_branch), out);
                    if let Some(else_branch) = else_branch {
                        collect_stmts(std::slice::from_ref(else_branch), out);
                    }
                }
                Stmt::While { condition, body } => {
                    collect_expr(condition, out);
                    collect_stmts(std::slice::from_ref(body), out);
                }
            }
        }
    }

    fn collect_expr(expr: &Expr, out: &mut Vec<(ExprId, String)>) {
        match expr {
            Expr::Variable { id, name } => out.push((*id, name.lexeme.clone())),
            Expr::Assign { id, name, value } => {
                collect_expr(value, out);
                out.push((*id, name.lexeme.clone()));
            }
            Expr::Literal(_) => {}
            Expr::Grouping(inner) | Expr::Unary { right: inner, .. } => collect_expr(inner, out),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                collect_expr(left, out);
                collect_expr(right, out);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                collect_expr(callee, out);
                for arg in arguments {
                    collect_expr(arg, out);
                }
            }
        }
    }

    fn access(name: &str, hops: Option<usize>) -> (String, Option<usize>) {
        (name.to_string(), hops)
    }

    #[test]
    fn test_globals_are_unresolved() {
        assert_eq!(
            hops("var a = 1; print a; a = 2;"),
            vec![access("a", None), access("a", None)]
        );
    }

    #[test]
    fn test_block_scopes() {
        assert_eq!(
            hops("{ var a = 1; { var b = a; print b; a = b; } }"),
            vec![
                access("a", Some(1)),
                access("b", Some(0)),
                access("b", Some(0)),
                access("a", Some(1)),
            ]
        );
    }

    #[test]
    fn test_shadowing() {
        assert_eq!(
            hops("{ var a = 1; { var a = 2; print a; } print a; }"),
            vec![access("a", Some(0)), access("a", Some(0))]
        );
    }

    #[test]
    fn test_function_scopes() {
        assert_eq!(
            hops(
                "fun outer(x) {
                    var count = 0;
                    fun inner() { count = count + x; return count; }
                    return inner;
                }"
            ),
            vec![
                access("count", Some(1)),
                access("x", Some(1)),
                access("count", Some(1)),
                access("count", Some(1)),
                access("inner", Some(0)),
            ]
        );
    }

    #[test]
    fn test_recursion_resolves_to_enclosing_scope() {
        assert_eq!(
            hops("{ fun f(n) { return f(n); } }"),
            vec![access("f", Some(1)), access("n", Some(0))]
        );
    }

    #[test]
    fn test_own_initializer_is_rejected() {
        let source = "{ var a = a; }".into();
        let program = Parser::from_source(&source).parse_program();
        Resolver::new(&source).resolve_program(&program);
        let errors = source.errors.to_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Resolve);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at 'a': Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn test_own_initializer_at_global_scope_is_allowed() {
        let source = "var a = a;".into();
        let program = Parser::from_source(&source).parse_program();
        Resolver::new(&source).resolve_program(&program);
        assert!(source.has_no_errors());
    }
}
