use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use lox_parser::ast::{Expr, ExprId, Stmt};
use lox_parser::token::{Token, TokenKind};
use lox_passes::resolve::ResolvedLocals;
use lox_value::object::{Function, Obj};
use lox_value::{EnvRef, Environment, RuntimeError, Value};
use tracing::{debug, trace};

use crate::builtin_functions::define_builtin_functions;

/// How a statement finished executing.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    /// A `return` statement is unwinding to the nearest call boundary.
    Return(Value),
}

pub type ExecResult = Result<Completion, RuntimeError>;
pub type EvalResult = Result<Value, RuntimeError>;

pub struct Interpreter<W: Write = io::Stdout> {
    globals: EnvRef,
    /// Innermost active scope.
    environment: EnvRef,
    resolved_locals: ResolvedLocals,
    /// Destination of `print` statements.
    out: W,
}

impl Interpreter<io::Stdout> {
    /// Create an interpreter printing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let globals = Environment::new_global();
        define_builtin_functions(&mut globals.borrow_mut());
        Self {
            environment: Rc::clone(&globals),
            globals,
            resolved_locals: ResolvedLocals::new(),
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consumes `self` and returns the `print` destination.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Adds the hop counts computed by the resolver.
    /// Tables from previous programs are kept, as their functions may still be called.
    pub fn resolve(&mut self, resolved_locals: ResolvedLocals) {
        self.resolved_locals.extend(resolved_locals);
    }

    /// Executes `program`. The first runtime error stops the run and is returned.
    pub fn interpret(&mut self, program: &[Stmt], resolved_locals: ResolvedLocals) -> Result<(), RuntimeError> {
        self.resolve(resolved_locals);
        debug!(statements = program.len(), "interpreting program");

        for stmt in program {
            if let Completion::Return(value) = self.execute(stmt)? {
                debug!(%value, "top level return, stopping");
                break;
            }
        }
        self.out
            .flush()
            .map_err(|source| RuntimeError::Output {
                keyword: Token::new(TokenKind::Eof, "", None, 0),
                source,
            })?;
        Ok(())
    }

    /* Statements */
    pub fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(|source| RuntimeError::Output {
                    keyword: print_keyword(expr),
                    source,
                })?;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.lexeme.as_str(), value);
            }
            Stmt::Block(body) => {
                let environment = Environment::new_enclosed(&self.environment);
                return self.execute_block(body, environment);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
            }
            Stmt::Function(declaration) => {
                let function = Function {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                };
                self.environment.borrow_mut().define(
                    declaration.name.lexeme.as_str(),
                    Value::Object(Rc::new(Obj::Fn(function))),
                );
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal)
    }

    /// Executes `body` inside `environment`, then restores the current scope,
    /// whether the body completed, returned or failed.
    pub fn execute_block(&mut self, body: &[Stmt], environment: EnvRef) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.execute_stmts(body);
        self.environment = previous;
        result
    }

    fn execute_stmts(&mut self, body: &[Stmt]) -> ExecResult {
        for stmt in body {
            if let Completion::Return(value) = self.execute(stmt)? {
                return Ok(Completion::Return(value));
            }
        }
        Ok(Completion::Normal)
    }

    /* Expressions */
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.kind {
                    TokenKind::Minus => match right {
                        Value::Number(val) => Ok(Value::Number(-val)),
                        _ => Err(RuntimeError::OperandMustBeNumber {
                            operator: operator.clone(),
                        }),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!("invalid unary operator {:?}", operator.kind),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_op(left, operator, right)
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuits = match operator.kind {
                    TokenKind::Or => left.is_truthy(),
                    _ => !left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.resolved_locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;
                let arguments = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(callee, paren, arguments)
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> EvalResult {
        match self.resolved_locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn call(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> EvalResult {
        let obj = match callee {
            Value::Object(obj) => obj,
            _ => return Err(RuntimeError::NotCallable { paren: paren.clone() }),
        };

        match &*obj {
            Obj::Fn(function) => {
                check_arity(function.arity(), &arguments, paren)?;
                trace!(function = function.ident(), line = paren.line, "calling function");

                // Parent is the closure, not the caller's scope.
                let environment = Environment::new_enclosed(&function.closure);
                {
                    let mut frame = environment.borrow_mut();
                    for (param, arg) in function.declaration.params.iter().zip(arguments) {
                        frame.define(param.lexeme.as_str(), arg);
                    }
                }

                match self.execute_block(&function.declaration.body, environment)? {
                    Completion::Return(value) => Ok(value),
                    Completion::Normal => Ok(Value::Nil),
                }
            }
            Obj::NativeFn(native) => {
                check_arity(native.arity, &arguments, paren)?;
                trace!(function = native.ident, "calling native function");
                Ok((native.func)(&arguments))
            }
            Obj::Str(_) => Err(RuntimeError::NotCallable { paren: paren.clone() }),
        }
    }
}

fn check_arity(expected: usize, arguments: &[Value], paren: &Token) -> Result<(), RuntimeError> {
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            paren: paren.clone(),
            expected,
            got: arguments.len(),
        })
    }
}

/// Finds a token of the printed expression to blame an output failure on.
fn print_keyword(expr: &Expr) -> Token {
    match expr {
        Expr::Unary { operator, .. }
        | Expr::Binary { operator, .. }
        | Expr::Logical { operator, .. } => operator.clone(),
        Expr::Variable { name, .. } | Expr::Assign { name, .. } => name.clone(),
        Expr::Call { paren, .. } => paren.clone(),
        Expr::Grouping(inner) => print_keyword(inner),
        Expr::Literal(_) => Token::new(TokenKind::Print, "print", None, 0),
    }
}

fn binary_op(left: Value, operator: &Token, right: Value) -> EvalResult {
    /// Generates a numeric binary operation.
    macro_rules! num_binary_op {
        ($op: tt, $result: path) => {
            match (left.cast_to_number(), right.cast_to_number()) {
                (Some(a), Some(b)) => Ok($result(a $op b)),
                _ => Err(RuntimeError::OperandsMustBeNumbers {
                    operator: operator.clone(),
                }),
            }
        };

        ($op: tt) => {
            num_binary_op!($op, Value::Number)
        };
    }

    match operator.kind {
        TokenKind::Plus => {
            if let (Some(a), Some(b)) = (left.cast_to_number(), right.cast_to_number()) {
                return Ok(Value::Number(a + b));
            }
            match (left.cast_to_str(), right.cast_to_str()) {
                // handle string concatenation
                (Some(a), Some(b)) => Ok(Value::new_string(format!("{}{}", a, b))),
                _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings {
                    operator: operator.clone(),
                }),
            }
        }
        TokenKind::Minus => num_binary_op!(-),
        TokenKind::Star => num_binary_op!(*),
        TokenKind::Slash => num_binary_op!(/),
        TokenKind::Greater => num_binary_op!(>, Value::Bool),
        TokenKind::GreaterEqual => num_binary_op!(>=, Value::Bool),
        TokenKind::Less => num_binary_op!(<, Value::Bool),
        TokenKind::LessEqual => num_binary_op!(<=, Value::Bool),
        TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
        TokenKind::BangEqual => Ok(Value::Bool(left != right)),
        _ => unreachable!("invalid binary operator {:?}", operator.kind),
    }
}
