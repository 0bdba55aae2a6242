//! Prints AST nodes in a parenthesized prefix form (e.g. `(* (- 123) (group 45.67))`).

use crate::ast::{Expr, Stmt};

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(literal) => literal.to_string(),
        Expr::Grouping(inner) => parenthesize("group", &[&**inner]),
        Expr::Unary { operator, right } => parenthesize(&operator.lexeme, &[&**right]),
        Expr::Binary {
            left,
            operator,
            right,
        }
        | Expr::Logical {
            left,
            operator,
            right,
        } => parenthesize(&operator.lexeme, &[&**left, &**right]),
        Expr::Variable { name, .. } => name.lexeme.clone(),
        Expr::Assign { name, value, .. } => format!("(= {} {})", name.lexeme, print_expr(value)),
        Expr::Call {
            callee, arguments, ..
        } => {
            let mut out = format!("(call {}", print_expr(callee));
            for arg in arguments {
                out.push(' ');
                out.push_str(&print_expr(arg));
            }
            out.push(')');
            out
        }
    }
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Expression(expr) => parenthesize(";", &[expr]),
        Stmt::Print(expr) => parenthesize("print", &[expr]),
        Stmt::Var { name, initializer } => match initializer {
            Some(initializer) => format!("(var {} {})", name.lexeme, print_expr(initializer)),
            None => format!("(var {})", name.lexeme),
        },
        Stmt::Block(body) => with_body("(block".to_string(), body),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let mut out = format!("(if {} {}", print_expr(condition), print_stmt(then_branch));
            if let Some(else_branch) = else_branch {
                out.push(' ');
                out.push_str(&print_stmt(else_branch));
            }
            out.push(')');
            out
        }
        Stmt::While { condition, body } => {
            format!("(while {} {})", print_expr(condition), print_stmt(body))
        }
        Stmt::Function(decl) => {
            let params: Vec<&str> = decl.params.iter().map(|p| p.lexeme.as_str()).collect();
            let head = format!("(fun {}({})", decl.name.lexeme, params.join(" "));
            with_body(head, &decl.body)
        }
        Stmt::Return { value, .. } => match value {
            Some(value) => parenthesize("return", &[value]),
            None => "(return)".to_string(),
        },
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut out = format!("({}", name);
    for expr in exprs {
        out.push(' ');
        out.push_str(&print_expr(expr));
    }
    out.push(')');
    out
}

fn with_body(mut head: String, body: &[Stmt]) -> String {
    for stmt in body {
        head.push(' ');
        head.push_str(&print_stmt(stmt));
    }
    head.push(')');
    head
}
