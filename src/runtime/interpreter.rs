//! Tree-walking evaluator for compiled templates

use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::Value as JsonValue;

use super::resolver::resolve;
use super::scope::Scope;
use super::value::{Value, join};
use crate::compiler::ast::{
    BinaryOp, Callee, DeclKind, Echo, Expr, IterMode, LogicalOp, Program, Stmt, UnaryOp,
};
use crate::core::error::{Error, Result};

/// Result of executing a statement
enum Flow {
    Normal,
    Break,
    Continue,
}

/// Executes one render of a program against one data context
pub(crate) struct Interpreter<'a> {
    data: &'a JsonValue,
    scope: Scope<'a>,
    out: String,
}

impl<'a> Interpreter<'a> {
    pub fn new(data: &'a JsonValue) -> Self {
        Self {
            data,
            scope: Scope::new(),
            out: String::new(),
        }
    }

    /// Run `program` and return the accumulated output
    pub fn run(mut self, program: &'a Program) -> Result<String> {
        self.exec_all(&program.body)?;
        Ok(self.out)
    }

    fn exec_all(&mut self, stmts: &'a [Stmt]) -> Result<Flow> {
        for stmt in stmts {
            match self.exec(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_scoped(&mut self, stmt: &'a Stmt) -> Result<Flow> {
        self.scope.push();
        let flow = self.exec(stmt);
        self.scope.pop();
        flow
    }

    fn exec(&mut self, stmt: &'a Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Text(text) => self.out.push_str(text),
            Stmt::Echo(echo) => {
                let text = self.echo(echo)?;
                self.out.push_str(&text);
            }
            Stmt::Declare { kind, bindings } => {
                for (name, init) in bindings {
                    let value = match init {
                        Some(expr) => self.eval(expr)?,
                        None => Value::Undefined,
                    };
                    self.scope.declare(*kind, name, value);
                }
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Block(stmts) => {
                self.scope.push();
                let flow = self.exec_all(stmts);
                self.scope.pop();
                return flow;
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.truthy() {
                    return self.exec_scoped(then);
                }
                if let Some(otherwise) = otherwise {
                    return self.exec_scoped(otherwise);
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond)?.truthy() {
                    if let Flow::Break = self.exec_scoped(body)? {
                        break;
                    }
                }
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scope.push();
                let result = self.exec_for(init.as_deref(), cond.as_ref(), update.as_ref(), body);
                self.scope.pop();
                result?;
            }
            Stmt::ForEach {
                kind,
                name,
                mode,
                iterable,
                body,
            } => {
                let collection = self.eval(iterable)?;
                let items = match mode {
                    IterMode::Of => iterate_values(collection)?,
                    IterMode::In => iterate_keys(&collection),
                };
                for item in items {
                    self.scope.push();
                    let flow = self.bind_loop_variable(*kind, name, item).and_then(|()| self.exec(body));
                    self.scope.pop();
                    if let Flow::Break = flow? {
                        break;
                    }
                }
            }
            Stmt::Break => return Ok(Flow::Break),
            Stmt::Continue => return Ok(Flow::Continue),
            Stmt::Empty => {}
        }
        Ok(Flow::Normal)
    }

    fn exec_for(
        &mut self,
        init: Option<&'a Stmt>,
        cond: Option<&'a Expr>,
        update: Option<&'a Expr>,
        body: &'a Stmt,
    ) -> Result<()> {
        if let Some(init) = init {
            self.exec(init)?;
        }
        loop {
            if let Some(cond) = cond {
                if !self.eval(cond)?.truthy() {
                    return Ok(());
                }
            }
            if let Flow::Break = self.exec_scoped(body)? {
                return Ok(());
            }
            if let Some(update) = update {
                self.eval(update)?;
            }
        }
    }

    fn bind_loop_variable(
        &mut self,
        kind: Option<DeclKind>,
        name: &str,
        value: Value<'a>,
    ) -> Result<()> {
        match kind {
            Some(kind) => {
                self.scope.declare(kind, name, value);
                Ok(())
            }
            None => self.scope.assign(name, value),
        }
    }

    fn echo(&mut self, echo: &'a Echo) -> Result<String> {
        match echo {
            Echo::Expr(expr) => Ok(self.eval(expr)?.to_output()),
            Echo::Path { root, rest } => {
                let local = if root.is_empty() {
                    None
                } else {
                    self.scope.lookup(root)
                };
                let text = match local {
                    Some(value) if rest.is_empty() => value.to_output(),
                    Some(Value::Json(json)) => Value::from_json(&resolve(json, rest)).to_output(),
                    Some(other) => Value::from_json(&resolve(&other.to_json(), rest)).to_output(),
                    None => {
                        let path = format!("{root}{rest}");
                        Value::from_json(&resolve(self.data, &path)).to_output()
                    }
                };
                Ok(text)
            }
        }
    }

    /// Local bindings first, then fields of the data context
    fn lookup(&self, name: &str) -> Option<Value<'a>> {
        if let Some(value) = self.scope.lookup(name) {
            return Some(value.clone());
        }
        match self.data {
            JsonValue::Object(map) => map.get(name).map(Value::from_json),
            _ => None,
        }
    }

    fn lookup_strict(&self, name: &str) -> Result<Value<'a>> {
        self.lookup(name)
            .ok_or_else(|| Error::undefined_variable(name))
    }

    fn eval(&mut self, expr: &'a Expr) -> Result<Value<'a>> {
        let value = match expr {
            Expr::Undefined => Value::Undefined,
            Expr::Null => Value::Null,
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Number(n) => Value::Number(*n),
            Expr::Str(s) => Value::str(s.as_str()),
            Expr::Array(items) => Value::Array(Rc::new(self.eval_all(items)?)),
            Expr::Ident(name) => self.lookup_strict(name)?,
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                let key = self.eval(property)?;
                object.get_member(&key)?
            }
            Expr::Call { callee, args } => match callee {
                Callee::Function(name) => {
                    let args = self.eval_all(args)?;
                    self.call_function(name, &args)?
                }
                Callee::Method { object, name } => {
                    let object = self.eval(object)?;
                    let args = self.eval_all(args)?;
                    call_method(&object, name, &args)?
                }
            },
            Expr::Unary { op, operand } => self.unary(*op, operand)?,
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                match (op, left.truthy()) {
                    (LogicalOp::And, true) | (LogicalOp::Or, false) => self.eval(right)?,
                    _ => left,
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.truthy() {
                    self.eval(consequent)?
                } else {
                    self.eval(alternate)?
                }
            }
            Expr::Assign { op, target, value } => {
                let mut value = self.eval(value)?;
                if let Some(op) = op {
                    let current = self.lookup_strict(target)?;
                    value = binary(*op, &current, &value);
                }
                self.scope.assign(target, value.clone())?;
                value
            }
            Expr::Update {
                increment,
                prefix,
                target,
            } => {
                let old = self.lookup_strict(target)?.to_number();
                let new = if *increment { old + 1.0 } else { old - 1.0 };
                self.scope.assign(target, Value::Number(new))?;
                Value::Number(if *prefix { new } else { old })
            }
        };
        Ok(value)
    }

    fn eval_all(&mut self, exprs: &'a [Expr]) -> Result<Vec<Value<'a>>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn unary(&mut self, op: UnaryOp, operand: &'a Expr) -> Result<Value<'a>> {
        if let (UnaryOp::TypeOf, Expr::Ident(name)) = (op, operand) {
            let kind = self.lookup(name).map_or("undefined", |value| value.type_of());
            return Ok(Value::str(kind));
        }
        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!value.truthy()),
            UnaryOp::Neg => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::TypeOf => Value::str(value.type_of()),
        })
    }

    fn call_function(&mut self, name: &str, args: &[Value<'a>]) -> Result<Value<'a>> {
        match name {
            "print" => {
                for arg in args {
                    self.out.push_str(&arg.to_output());
                }
                Ok(Value::Undefined)
            }
            _ => Err(Error::UnknownFunction(name.to_string())),
        }
    }
}

fn binary<'a>(op: BinaryOp, left: &Value<'a>, right: &Value<'a>) -> Value<'a> {
    let ordered = |accept: fn(Ordering) -> bool| {
        Value::Bool(left.compare(right).is_some_and(accept))
    };
    match op {
        BinaryOp::Add => left.add(right),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Lt => ordered(Ordering::is_lt),
        BinaryOp::Le => ordered(Ordering::is_le),
        BinaryOp::Gt => ordered(Ordering::is_gt),
        BinaryOp::Ge => ordered(Ordering::is_ge),
        BinaryOp::Eq => Value::Bool(left.loose_equals(right)),
        BinaryOp::NotEq => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNotEq => Value::Bool(!left.strict_equals(right)),
    }
}

fn call_method<'a>(object: &Value<'a>, name: &str, args: &[Value<'a>]) -> Result<Value<'a>> {
    if object.is_nullish() {
        return Err(Error::type_error(format!(
            "cannot read properties of {} (reading '{name}')",
            object.display()
        )));
    }
    let arg = |i: usize| args.get(i).cloned().unwrap_or(Value::Undefined);

    if name == "toString" {
        return Ok(Value::str(object.display()));
    }

    if let Some(elements) = object.elements() {
        return match name {
            "join" => {
                let separator = match arg(0) {
                    Value::Undefined => ",".to_string(),
                    sep => sep.display(),
                };
                Ok(Value::str(join(elements.into_iter(), &separator)))
            }
            "includes" => Ok(Value::Bool(
                elements.iter().any(|item| same_value_zero(item, &arg(0))),
            )),
            "indexOf" => {
                let needle = arg(0);
                let position = elements.iter().position(|item| item.strict_equals(&needle));
                Ok(Value::Number(position.map_or(-1.0, |p| p as f64)))
            }
            _ => Err(Error::UnknownFunction(format!("Array.{name}"))),
        };
    }

    if let Value::String(s) = object {
        return match name {
            "toUpperCase" => Ok(Value::str(s.to_uppercase())),
            "toLowerCase" => Ok(Value::str(s.to_lowercase())),
            "trim" => Ok(Value::str(s.trim().to_string())),
            "includes" => Ok(Value::Bool(s.contains(arg(0).display().as_str()))),
            "indexOf" => {
                let needle = arg(0).display();
                let position = s
                    .find(needle.as_str())
                    .map_or(-1.0, |byte| s[..byte].chars().count() as f64);
                Ok(Value::Number(position))
            }
            _ => Err(Error::UnknownFunction(format!("String.{name}"))),
        };
    }

    Err(Error::UnknownFunction(format!("{}.{name}", object.type_of())))
}

fn same_value_zero(a: &Value<'_>, b: &Value<'_>) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_equals(b),
    }
}

fn iterate_values(collection: Value<'_>) -> Result<Vec<Value<'_>>> {
    if let Some(elements) = collection.elements() {
        return Ok(elements);
    }
    match collection {
        Value::String(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
        other => Err(Error::type_error(format!("{} is not iterable", other.display()))),
    }
}

fn iterate_keys<'a>(collection: &Value<'a>) -> Vec<Value<'a>> {
    let indices = |len: usize| -> Vec<Value<'a>> {
        (0..len).map(|i| Value::str(i.to_string())).collect()
    };
    match collection {
        Value::Json(JsonValue::Object(map)) => map.keys().map(|k| Value::str(k.clone())).collect(),
        Value::String(s) => indices(s.chars().count()),
        other => other
            .elements()
            .map_or_else(Vec::new, |elements| indices(elements.len())),
    }
}
