//! Tree-walking interpreter. Executes a `Program` against a single global
//! environment and a `RuntimeState` holding the print buffer and canvas.
//! Builtin calls are dispatched through `builtins::call`.

use std::collections::HashMap;

use crate::config::EvalConfig;
use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::builtins::{self, RuntimeState};
use crate::runtime::value::Value;
use crate::syntax::ast::{BinOp, Expr, Program, Span, Stmt, UnOp};

// ─── Environment ──────────────────────────────────────────────────────────────

/// Variables live for the whole run. Blocks do not open new scopes.
#[derive(Debug, Default, Clone)]
struct Env {
    vars: HashMap<String, Value>,
}

impl Env {
    fn get(&self, name: &str) -> Option<Value> {
        self.vars.get(name).copied()
    }

    fn set(&mut self, name: &str, val: Value) {
        match self.vars.get_mut(name) {
            Some(slot) => *slot = val,
            None => { self.vars.insert(name.to_string(), val); }
        }
    }
}

// ─── Interpreter ──────────────────────────────────────────────────────────────

pub struct Interpreter {
    config: EvalConfig,
    env: Env,
    state: RuntimeState,
    steps: u64,
}

impl Interpreter {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            env: Env::default(),
            state: RuntimeState::new(&config),
            config,
            steps: 0,
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.exec_block(&program.body)?;
        tracing::debug!(steps = self.steps, "program finished");
        Ok(())
    }

    /// Current value of a variable.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.env.get(name)
    }

    pub fn steps(&self) -> u64 { self.steps }

    pub fn state(&self) -> &RuntimeState { &self.state }

    pub fn into_state(self) -> RuntimeState { self.state }

    // ─── Step budget ──────────────────────────────────────────────────────────

    fn tick(&mut self, span: Span) -> Result<(), RuntimeError> {
        self.charge(1, span)
    }

    fn charge(&mut self, cost: u64, span: Span) -> Result<(), RuntimeError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.config.max_steps {
            tracing::warn!(limit = self.config.max_steps, line = span.line, "step limit exceeded");
            return Err(RuntimeError::new(
                RuntimeErrorKind::ExecutionLimitExceeded { limit: self.config.max_steps },
                span.line, span.column,
            ));
        }
        Ok(())
    }

    // ─── Statement executor ───────────────────────────────────────────────────

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for s in stmts {
            self.exec_stmt(s)?;
        }
        Ok(())
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        self.tick(stmt.span())?;
        match stmt {
            Stmt::Assign(a) => {
                let val = self.eval_expr(&a.value)?;
                self.env.set(&a.name, val);
            }

            Stmt::If(i) => {
                if self.eval_condition(&i.condition)? {
                    self.exec_block(&i.then_block)?;
                } else if let Some(block) = &i.else_block {
                    self.exec_block(block)?;
                }
            }

            Stmt::While(w) => {
                while self.eval_condition(&w.condition)? {
                    self.exec_block(&w.body)?;
                    // An empty body would otherwise spin without charging.
                    self.tick(w.span)?;
                }
            }

            Stmt::Block(body, _) => self.exec_block(body)?,

            Stmt::Expr(e) => { self.eval_expr(e)?; }
        }
        Ok(())
    }

    fn eval_condition(&mut self, cond: &Expr) -> Result<bool, RuntimeError> {
        let span = cond.span();
        truthy(self.eval_expr(cond)?, span)
    }

    // ─── Expression evaluator ─────────────────────────────────────────────────

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.tick(expr.span())?;
        match expr {
            Expr::Number(v, _) => Ok(Value::Number(*v)),

            Expr::Ident(name, span) => self.env.get(name).ok_or_else(|| RuntimeError::new(
                RuntimeErrorKind::UnboundVariable { name: name.clone() },
                span.line, span.column,
            )),

            Expr::BinOp { .. } => self.eval_chain(expr),

            Expr::UnOp { op, operand, span } => {
                let v = self.eval_expr(operand)?;
                eval_unop(*op, v, *span)
            }

            Expr::Call { builtin, args, span } => {
                let arg_vals: Vec<Value> = args.iter()
                    .map(|a| self.eval_expr(a))
                    .collect::<Result<_, _>>()?;
                self.charge(builtins::cost(*builtin, &arg_vals, &self.state), *span)?;
                builtins::call(*builtin, &arg_vals, &mut self.state, *span)
            }
        }
    }

    /// Evaluates a left-associative operator chain by walking its left spine,
    /// so long chains like `1 + 1 + ... + 1` do not recurse per operator.
    /// The root was already charged by `eval_expr`.
    fn eval_chain(&mut self, root: &Expr) -> Result<Value, RuntimeError> {
        let mut spine = Vec::new();
        let mut node = root;
        while let Expr::BinOp { left, op, right, span } = node {
            if !spine.is_empty() {
                self.tick(*span)?;
            }
            spine.push((*op, &**right, *span));
            node = &**left;
        }

        let mut acc = self.eval_expr(node)?;
        for (op, right, span) in spine.into_iter().rev() {
            let r = self.eval_expr(right)?;
            acc = eval_binop(op, acc, r, span)?;
        }
        Ok(acc)
    }
}

// ─── Binary / unary operators ─────────────────────────────────────────────────

fn eval_binop(op: BinOp, l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Eq    => return Ok(Value::Bool(values_equal(&l, &r))),
        BinOp::NotEq => return Ok(Value::Bool(!values_equal(&l, &r))),
        _ => {}
    }

    let a = builtins::as_number(&l, span)?;
    let b = builtins::as_number(&r, span)?;
    Ok(match op {
        BinOp::Add => Value::Number(a + b),
        BinOp::Sub => Value::Number(a - b),
        BinOp::Mul => Value::Number(a * b),
        BinOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::new(RuntimeErrorKind::DivisionByZero, span.line, span.column));
            }
            Value::Number(a / b)
        }
        BinOp::Lt   => Value::Bool(a < b),
        BinOp::LtEq => Value::Bool(a <= b),
        BinOp::Gt   => Value::Bool(a > b),
        BinOp::GtEq => Value::Bool(a >= b),
        BinOp::Eq | BinOp::NotEq => unreachable!(),
    })
}

fn eval_unop(op: UnOp, v: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Neg => Ok(Value::Number(-builtins::as_number(&v, span)?)),
    }
}

// ─── Utilities ────────────────────────────────────────────────────────────────

/// Non-zero numbers and `true` are truthy. Unit has no truth value.
fn truthy(v: Value, span: Span) -> Result<bool, RuntimeError> {
    match v {
        Value::Number(n) => Ok(n != 0.0),
        Value::Bool(b)   => Ok(b),
        Value::Unit => Err(RuntimeError::new(
            RuntimeErrorKind::TypeMismatch { expected: "number or bool", found: "unit" },
            span.line, span.column,
        )),
    }
}

/// Structural equality. Values of different kinds are never equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x),   Value::Bool(y))   => x == y,
        (Value::Unit,      Value::Unit)      => true,
        _ => false,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
