//! Metered tree-walking evaluator for the tiny contract language, and the
//! [`ContractExecutor`] port `deploy`/`invoke` transactions run against.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::ExecutorError;
use super::lexer::tokenize;
use super::parser::{parse, BinOp, Expr, Program, Stmt, UnOp};

/// Gas charged per executed statement and evaluated expression, mirroring
/// the reference's per-line tracer. Execution aborts once the budget for
/// a single `run` call is exhausted.
pub const GAS_LIMIT: u64 = 10_000;

/// Result of running a contract function: the resulting state and the
/// gas it cost to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub state: Value,
    pub gas_used: u64,
}

/// Port implemented by anything that can run `deploy`/`invoke` contract
/// code against a state snapshot.
pub trait ContractExecutor {
    fn run(&self, code: &str, func: &str, args: &Value, state: &Value) -> Result<ExecutionOutcome, ExecutorError>;
}

/// The provided tiny-language interpreter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeteredInterpreter;

impl ContractExecutor for MeteredInterpreter {
    fn run(&self, code: &str, func: &str, args: &Value, state: &Value) -> Result<ExecutionOutcome, ExecutorError> {
        let tokens = tokenize(code)?;
        let program = parse(tokens)?;
        run_function(&program, func, args, state)
    }
}

struct Gas(u64);

impl Gas {
    fn charge(&mut self) -> Result<(), ExecutorError> {
        self.0 += 1;
        if self.0 > GAS_LIMIT {
            return Err(ExecutorError::OutOfGas);
        }
        Ok(())
    }
}

enum Flow {
    Normal,
    Returned(Value),
}

fn run_function(program: &Program, func: &str, args: &Value, state: &Value) -> Result<ExecutionOutcome, ExecutorError> {
    let function = program
        .functions
        .get(func)
        .ok_or_else(|| ExecutorError::FunctionNotFound(func.to_string()))?;

    let call_args: Vec<Value> = match args {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    };

    // The final positional parameter is conventionally `state`; every
    // function receives the running state snapshot bound to it whether
    // or not the caller supplied one explicitly.
    let mut env: HashMap<String, Value> = HashMap::new();
    let positional = if function.params.last().map(String::as_str) == Some("state") {
        &function.params[..function.params.len().saturating_sub(1)]
    } else {
        &function.params[..]
    };
    if call_args.len() != positional.len() {
        return Err(ExecutorError::ArgumentMismatch {
            function: func.to_string(),
            expected: positional.len(),
            got: call_args.len(),
        });
    }
    for (name, value) in positional.iter().zip(call_args.iter()) {
        env.insert(name.clone(), value.clone());
    }
    env.insert("state".to_string(), state.clone());

    let mut gas = Gas(0);
    match exec_block(&function.body, &mut env, &mut gas)? {
        Flow::Returned(value) => Ok(ExecutionOutcome { state: value, gas_used: gas.0 }),
        Flow::Normal => {
            let final_state = env.get("state").cloned().unwrap_or(Value::Null);
            Ok(ExecutionOutcome { state: final_state, gas_used: gas.0 })
        }
    }
}

fn exec_block(stmts: &[Stmt], env: &mut HashMap<String, Value>, gas: &mut Gas) -> Result<Flow, ExecutorError> {
    for stmt in stmts {
        match exec_stmt(stmt, env, gas)? {
            Flow::Normal => continue,
            returned => return Ok(returned),
        }
    }
    Ok(Flow::Normal)
}

fn exec_stmt(stmt: &Stmt, env: &mut HashMap<String, Value>, gas: &mut Gas) -> Result<Flow, ExecutorError> {
    gas.charge()?;
    match stmt {
        Stmt::Let(name, expr) | Stmt::Assign(name, expr) => {
            let value = eval(expr, env, gas)?;
            env.insert(name.clone(), value);
            Ok(Flow::Normal)
        }
        Stmt::IndexAssign(base, key, value_expr) => {
            let key = eval(key, env, gas)?;
            let value = eval(value_expr, env, gas)?;
            assign_index(base, &key, value, env, gas)?;
            Ok(Flow::Normal)
        }
        Stmt::Return(expr) => Ok(Flow::Returned(eval(expr, env, gas)?)),
        Stmt::If(cond, then_branch, else_branch) => {
            if truthy(&eval(cond, env, gas)?) {
                exec_block(then_branch, env, gas)
            } else {
                exec_block(else_branch, env, gas)
            }
        }
        Stmt::While(cond, body) => {
            while truthy(&eval(cond, env, gas)?) {
                gas.charge()?;
                match exec_block(body, env, gas)? {
                    Flow::Normal => continue,
                    returned => return Ok(returned),
                }
            }
            Ok(Flow::Normal)
        }
        Stmt::Expr(expr) => {
            eval(expr, env, gas)?;
            Ok(Flow::Normal)
        }
    }
}

/// Assigns into `state.field` or `state[key]`. Only `state` may be
/// mutated through indexing; it is the one structured, shared value a
/// contract is given.
fn assign_index(base: &Expr, key: &Value, value: Value, env: &mut HashMap<String, Value>, gas: &mut Gas) -> Result<(), ExecutorError> {
    let Expr::Var(name) = base else {
        return Err(ExecutorError::Type("only a named variable can be indexed for assignment".into()));
    };
    let target = env
        .get_mut(name)
        .ok_or_else(|| ExecutorError::UndefinedVariable(name.clone()))?;
    let field = key
        .as_str()
        .map(str::to_string)
        .or_else(|| key.as_u64().map(|n| n.to_string()));
    let Some(field) = field else {
        return Err(ExecutorError::Type("index key must be a string or non-negative integer".into()));
    };
    if !target.is_object() {
        *target = Value::Object(Default::default());
    }
    if let Value::Object(map) = target {
        map.insert(field, value);
    }
    let _ = gas;
    Ok(())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn as_number(value: &Value) -> Result<f64, ExecutorError> {
    value
        .as_f64()
        .ok_or_else(|| ExecutorError::Type(format!("expected a number, got {value}")))
}

fn eval(expr: &Expr, env: &mut HashMap<String, Value>, gas: &mut Gas) -> Result<Value, ExecutorError> {
    gas.charge()?;
    match expr {
        Expr::Number(n) => Ok(Value::from(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Var(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| ExecutorError::UndefinedVariable(name.clone())),
        Expr::Index(base, key) => {
            let base_val = eval(base, env, gas)?;
            let key_val = eval(key, env, gas)?;
            index_into(&base_val, &key_val)
        }
        Expr::Unary(op, inner) => {
            let value = eval(inner, env, gas)?;
            match op {
                UnOp::Neg => Ok(Value::from(-as_number(&value)?)),
                UnOp::Not => Ok(Value::Bool(!truthy(&value))),
            }
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, env, gas),
        Expr::Call(name, arg_exprs) => {
            let args: Result<Vec<Value>, ExecutorError> = arg_exprs.iter().map(|e| eval(e, env, gas)).collect();
            call_builtin(name, &args?)
        }
    }
}

fn index_into(base: &Value, key: &Value) -> Result<Value, ExecutorError> {
    match (base, key) {
        (Value::Object(map), Value::String(field)) => Ok(map.get(field).cloned().unwrap_or(Value::Null)),
        (Value::Array(items), key) => {
            let idx = key.as_u64().ok_or_else(|| ExecutorError::Type("array index must be a non-negative integer".into()))? as usize;
            Ok(items.get(idx).cloned().unwrap_or(Value::Null))
        }
        _ => Err(ExecutorError::Type(format!("cannot index {base} with {key}"))),
    }
}

fn eval_binary(op: BinOp, lhs: &Expr, rhs: &Expr, env: &mut HashMap<String, Value>, gas: &mut Gas) -> Result<Value, ExecutorError> {
    if op == BinOp::And {
        let l = eval(lhs, env, gas)?;
        return if !truthy(&l) { Ok(Value::Bool(false)) } else { Ok(Value::Bool(truthy(&eval(rhs, env, gas)?))) };
    }
    if op == BinOp::Or {
        let l = eval(lhs, env, gas)?;
        return if truthy(&l) { Ok(Value::Bool(true)) } else { Ok(Value::Bool(truthy(&eval(rhs, env, gas)?))) };
    }

    let l = eval(lhs, env, gas)?;
    let r = eval(rhs, env, gas)?;
    match op {
        BinOp::Add if l.is_string() || r.is_string() => {
            let mut s = l.as_str().map(str::to_string).unwrap_or_else(|| l.to_string());
            s.push_str(&r.as_str().map(str::to_string).unwrap_or_else(|| r.to_string()));
            Ok(Value::String(s))
        }
        BinOp::Add => Ok(Value::from(as_number(&l)? + as_number(&r)?)),
        BinOp::Sub => Ok(Value::from(as_number(&l)? - as_number(&r)?)),
        BinOp::Mul => Ok(Value::from(as_number(&l)? * as_number(&r)?)),
        BinOp::Div => Ok(Value::from(as_number(&l)? / as_number(&r)?)),
        BinOp::Mod => Ok(Value::from(as_number(&l)? % as_number(&r)?)),
        BinOp::Eq => Ok(Value::Bool(l == r)),
        BinOp::NotEq => Ok(Value::Bool(l != r)),
        BinOp::Lt => Ok(Value::Bool(as_number(&l)? < as_number(&r)?)),
        BinOp::LtEq => Ok(Value::Bool(as_number(&l)? <= as_number(&r)?)),
        BinOp::Gt => Ok(Value::Bool(as_number(&l)? > as_number(&r)?)),
        BinOp::GtEq => Ok(Value::Bool(as_number(&l)? >= as_number(&r)?)),
        BinOp::And | BinOp::Or => unreachable!("short-circuited above"),
    }
}

fn call_builtin(name: &str, args: &[Value]) -> Result<Value, ExecutorError> {
    match name {
        "abs" => Ok(Value::from(as_number(args.first().unwrap_or(&Value::Null))?.abs())),
        "min" => args
            .iter()
            .map(as_number)
            .try_fold(f64::INFINITY, |acc, n| n.map(|n| acc.min(n)))
            .map(Value::from),
        "max" => args
            .iter()
            .map(as_number)
            .try_fold(f64::NEG_INFINITY, |acc, n| n.map(|n| acc.max(n)))
            .map(Value::from),
        "sqrt" => Ok(Value::from(as_number(args.first().unwrap_or(&Value::Null))?.sqrt())),
        "len" => match args.first() {
            Some(Value::Array(items)) => Ok(Value::from(items.len() as f64)),
            Some(Value::String(s)) => Ok(Value::from(s.chars().count() as f64)),
            Some(Value::Object(map)) => Ok(Value::from(map.len() as f64)),
            _ => Err(ExecutorError::Type("len() expects an array, string, or object".into())),
        },
        other => Err(ExecutorError::FunctionNotFound(other.to_string())),
    }
}
