pub mod builtins;
mod environment;
mod error;
pub mod value;

pub use environment::Environment;
pub use error::RuntimeError;
pub use value::Value;

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::parser::ast::{
    BinaryOp, Block, CollectionKind, CollectionMethod, DeclaredType, ElseBranch, Expr, Program,
    Stmt, TopLevel, UnaryOp,
};

/// Safeguard against runaway loops.
const MAX_LOOP_ITERATIONS: u64 = 1_000_000;

/// Walks a parsed program against a lexically nested environment stack,
/// writing program output to `stdout` and reading `write(...)` prompts from
/// `stdin`. Both are injected so the CLI driver and the test harness can wire
/// up real streams or in-memory buffers identically.
pub struct Interpreter<'a, W: Write, R: BufRead> {
    stdout: &'a mut W,
    stdin: &'a mut R,
}

impl<'a, W: Write, R: BufRead> Interpreter<'a, W, R> {
    pub fn new(stdout: &'a mut W, stdin: &'a mut R) -> Self {
        Self { stdout, stdin }
    }

    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.emit_header(program)?;
        let global = Environment::new_global();
        for top_level in &program.body {
            match top_level {
                TopLevel::Main { body } => self.exec_block(body, &global.child())?,
            }
        }
        self.emit_footer()?;
        Ok(())
    }

    fn emit_header(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let banner = match &program.style {
            Some(style) => format!("═══ {} ({style}) ═══", program.app_name),
            None => format!("═══ {} ═══", program.app_name),
        };
        self.write_line(&banner.green().to_string())
    }

    fn emit_footer(&mut self) -> Result<(), RuntimeError> {
        self.write_line(&"═══ Конец ═══".cyan().to_string())
    }

    fn write_line(&mut self, line: &str) -> Result<(), RuntimeError> {
        writeln!(self.stdout, "{line}").map_err(io_error)
    }

    // ---- statements ---------------------------------------------------

    fn exec_block(&mut self, block: &Block, env: &Environment) -> Result<(), RuntimeError> {
        for stmt in block {
            self.exec_stmt(stmt, env)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt, env: &Environment) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Echo(exprs) => self.exec_echo(exprs, env),
            Stmt::CreateVar {
                declared_type,
                name,
                init,
            } => {
                let value = self.eval(init, env)?;
                let value = declare_value(*declared_type, value)?;
                env.define(name, *declared_type, value)
            }
            Stmt::AssignVar { name, value } => {
                let declared = env.declared_type(name)?;
                let value = self.eval(value, env)?;
                let value = declare_value(declared, value)?;
                env.set(name, value)
            }
            Stmt::IndexAssign {
                object,
                index,
                value,
            } => self.exec_index_assign(object, index, value, env),
            Stmt::If {
                cond,
                then_block,
                else_branch,
            } => {
                if self.eval(cond, env)?.truthy() {
                    self.exec_block(then_block, &env.child())
                } else {
                    match else_branch {
                        Some(ElseBranch::Block(block)) => self.exec_block(block, &env.child()),
                        Some(ElseBranch::If(stmt)) => self.exec_stmt(stmt, env),
                        None => Ok(()),
                    }
                }
            }
            Stmt::While { cond, body } => self.exec_while(cond, body, env),
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.exec_for(init, cond, update, body, env),
            Stmt::MethodCall {
                object,
                method,
                collection,
                args,
            } => self.exec_method_call(object, *method, *collection, args, env),
            Stmt::ExprStmt(expr) => self.eval(expr, env).map(|_| ()),
        }
    }

    fn exec_echo(&mut self, exprs: &[Expr], env: &Environment) -> Result<(), RuntimeError> {
        let mut parts = Vec::with_capacity(exprs.len());
        for expr in exprs {
            parts.push(self.eval(expr, env)?.stringify());
        }
        self.write_line(&parts.join(" "))
    }

    fn exec_while(
        &mut self,
        cond: &Expr,
        body: &Block,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        let mut iterations = 0u64;
        while self.eval(cond, env)?.truthy() {
            check_iteration_ceiling(&mut iterations)?;
            self.exec_block(body, &env.child())?;
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        cond: &Option<Expr>,
        update: &Option<Box<Stmt>>,
        body: &Block,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        let for_scope = env.child();
        if let Some(init) = init {
            self.exec_stmt(init, &for_scope)?;
        }
        let mut iterations = 0u64;
        loop {
            let keep_going = match cond {
                Some(cond) => self.eval(cond, &for_scope)?.truthy(),
                None => true,
            };
            if !keep_going {
                break;
            }
            check_iteration_ceiling(&mut iterations)?;
            self.exec_block(body, &for_scope.child())?;
            if let Some(update) = update {
                self.exec_stmt(update, &for_scope)?;
            }
        }
        Ok(())
    }

    fn exec_index_assign(
        &mut self,
        object: &Expr,
        index: &Expr,
        value: &Expr,
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        let target = self.eval(object, env)?;
        let index = self.eval(index, env)?;
        let value = self.eval(value, env)?;
        match &target {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let real_index = resolve_index(&index, items.len())?;
                items[real_index] = value;
                Ok(())
            }
            Value::Dict(entries) => {
                let mut entries = entries.borrow_mut();
                upsert_dict_entry(&mut entries, index, value);
                Ok(())
            }
            Value::Str(_) => Err(RuntimeError::new(
                "cannot assign into a string; strings are immutable",
            )),
            other => Err(RuntimeError::new(format!(
                "cannot index-assign into a {}",
                other.type_name()
            ))),
        }
    }

    fn exec_method_call(
        &mut self,
        object: &str,
        method: CollectionMethod,
        collection: CollectionKind,
        args: &[Expr],
        env: &Environment,
    ) -> Result<(), RuntimeError> {
        let target = env.get(object)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, env)?);
        }
        match (collection, &target) {
            (CollectionKind::List, Value::List(items)) => {
                let mut items = items.borrow_mut();
                match method {
                    CollectionMethod::Add => {
                        items.push(require_arg(&values, 0, "add:list")?.clone());
                    }
                    CollectionMethod::Delete => {
                        let idx = require_arg(&values, 0, "delete:list")?;
                        let real_index = resolve_index(idx, items.len())?;
                        items.remove(real_index);
                    }
                    CollectionMethod::Clear => items.clear(),
                }
                Ok(())
            }
            (CollectionKind::Dict, Value::Dict(entries)) => {
                let mut entries = entries.borrow_mut();
                match method {
                    CollectionMethod::Add => {
                        let key = require_arg(&values, 0, "add:dict")?.clone();
                        let value = require_arg(&values, 1, "add:dict")?.clone();
                        upsert_dict_entry(&mut entries, key, value);
                    }
                    CollectionMethod::Delete => {
                        let key = require_arg(&values, 0, "delete:dict")?;
                        let pos = entries.iter().position(|(k, _)| k.equals(key));
                        match pos {
                            Some(pos) => {
                                entries.remove(pos);
                            }
                            None => {
                                return Err(RuntimeError::new(format!(
                                    "delete:dict: no entry for key '{}'",
                                    key.stringify()
                                )))
                            }
                        }
                    }
                    CollectionMethod::Clear => entries.clear(),
                }
                Ok(())
            }
            _ => Err(RuntimeError::new(format!(
                "'{object}' is not a {}",
                match collection {
                    CollectionKind::List => "list",
                    CollectionKind::Dict => "dict",
                }
            ))),
        }
    }

    // ---- expressions ----------------------------------------------------

    fn eval(&mut self, expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Identifier(name) => env.get(name),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                eval_binary(*op, left, right)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand, env)?;
                eval_unary(*op, operand)
            }
            Expr::FunctionCall { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, env)?);
                }
                builtins::call_builtin(name, &values)
            }
            Expr::RandCall { min, max } => {
                let min = self.eval(min, env)?;
                let max = self.eval(max, env)?;
                builtins::rand_int(&[min, max])
            }
            Expr::ListLiteral(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for elem in elems {
                    values.push(self.eval(elem, env)?);
                }
                Ok(Value::new_list(values))
            }
            Expr::DictLiteral(entries) => {
                let mut built: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.eval(key, env)?;
                    let value = self.eval(value, env)?;
                    upsert_dict_entry(&mut built, key, value);
                }
                Ok(Value::new_dict(built))
            }
            Expr::IndexAccess { object, index } => {
                let object = self.eval(object, env)?;
                let index = self.eval(index, env)?;
                index_value(&object, &index)
            }
            Expr::Write(prompt) => self.eval_write(prompt, env),
        }
    }

    fn eval_write(&mut self, prompt: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
        let prompt = self.eval(prompt, env)?.stringify();
        write!(self.stdout, "{prompt}").map_err(io_error)?;
        self.stdout.flush().map_err(io_error)?;
        let mut line = String::new();
        self.stdin.read_line(&mut line).map_err(io_error)?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Value::Str(line))
    }
}

fn io_error(e: std::io::Error) -> RuntimeError {
    RuntimeError::new(format!("I/O error: {e}"))
}

fn check_iteration_ceiling(iterations: &mut u64) -> Result<(), RuntimeError> {
    *iterations += 1;
    if *iterations > MAX_LOOP_ITERATIONS {
        return Err(RuntimeError::new(format!(
            "loop exceeded the {MAX_LOOP_ITERATIONS}-iteration ceiling"
        )));
    }
    Ok(())
}

fn require_arg<'a>(values: &'a [Value], index: usize, what: &str) -> Result<&'a Value, RuntimeError> {
    values
        .get(index)
        .ok_or_else(|| RuntimeError::new(format!("'{what}' is missing an argument")))
}

/// Applies declare/assign coercion rules: scalar bindings cast `value`,
/// `list`/`dict` bindings require an exact shape match and never coerce.
fn declare_value(declared: DeclaredType, value: Value) -> Result<Value, RuntimeError> {
    if !value.matches_declared(declared) {
        return Err(RuntimeError::new(format!(
            "cannot assign a {} to a {:?} binding",
            value.type_name(),
            declared
        )));
    }
    value.coerce_to(declared)
}

/// `add:dict`-style upsert: replaces the value in place if `key` already
/// matches an entry, preserving its position; otherwise appends.
fn upsert_dict_entry(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(k, _)| k.equals(&key)) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// Resolves a list/string index, allowing negative indices to count from the
/// end, and returns a fatal error if the result is out of range.
fn resolve_index(index: &Value, len: usize) -> Result<usize, RuntimeError> {
    let raw = index
        .to_number()
        .map_err(|_| RuntimeError::new("index must be numeric"))? as i64;
    let resolved = if raw < 0 { raw + len as i64 } else { raw };
    if resolved < 0 || resolved as usize >= len {
        return Err(RuntimeError::new(format!("index {raw} is out of range")));
    }
    Ok(resolved as usize)
}

fn index_value(object: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let real_index = resolve_index(index, items.len())?;
            Ok(items[real_index].clone())
        }
        Value::Dict(entries) => entries
            .borrow()
            .iter()
            .find(|(k, _)| k.equals(index))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RuntimeError::new(format!("no entry for key '{}'", index.stringify()))),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let real_index = resolve_index(index, chars.len())?;
            Ok(Value::Str(chars[real_index].to_string()))
        }
        other => Err(RuntimeError::new(format!(
            "cannot index into a {}",
            other.type_name()
        ))),
    }
}

fn eval_unary(op: UnaryOp, operand: Value) -> Result<Value, RuntimeError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.truthy())),
        UnaryOp::Neg => match operand {
            Value::Int(i) => Ok(Value::Int(-i)),
            other => Ok(Value::Float(-other.to_number()?)),
        },
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    use BinaryOp::*;
    match op {
        Add => eval_add(left, right),
        Sub => numeric_binop(left, right, i64::checked_sub, |a, b| a - b),
        Mul => numeric_binop(left, right, i64::checked_mul, |a, b| a * b),
        Div => eval_div(left, right),
        Mod => eval_mod(left, right),
        Pow => eval_pow(left, right),
        Eq => Ok(Value::Bool(left.equals(&right))),
        NotEq => Ok(Value::Bool(!left.equals(&right))),
        Lt => eval_order(left, right, |a, b| a < b),
        Gt => eval_order(left, right, |a, b| a > b),
        LtEq => eval_order(left, right, |a, b| a <= b),
        GtEq => eval_order(left, right, |a, b| a >= b),
        And => Ok(Value::Bool(left.truthy() && right.truthy())),
        Or => Ok(Value::Bool(left.truthy() || right.truthy())),
    }
}

fn eval_add(left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => {
            Ok(Value::Str(format!("{}{}", left.stringify(), right.stringify())))
        }
        (Value::Int(a), Value::Int(b)) => Ok(match a.checked_add(*b) {
            Some(sum) => Value::Int(sum),
            None => Value::Float(*a as f64 + *b as f64),
        }),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(left.to_number()? + right.to_number()?))
        }
        (Value::List(a), Value::List(b)) => {
            let mut combined = a.borrow().clone();
            combined.extend(b.borrow().iter().cloned());
            Ok(Value::new_list(combined))
        }
        _ => Err(RuntimeError::new(format!(
            "cannot add a {} and a {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn numeric_binop(
    left: Value,
    right: Value,
    checked_int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        if let Some(result) = checked_int_op(*a, *b) {
            return Ok(Value::Int(result));
        }
    }
    Ok(Value::Float(float_op(left.to_number()?, right.to_number()?)))
}

fn eval_div(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        if *b == 0 {
            return Err(RuntimeError::new("division by zero"));
        }
        return Ok(Value::Float(*a as f64 / *b as f64));
    }
    let (a, b) = (left.to_number()?, right.to_number()?);
    if b == 0.0 {
        return Err(RuntimeError::new("division by zero"));
    }
    Ok(Value::Float(a / b))
}

fn eval_mod(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        if *b == 0 {
            return Err(RuntimeError::new("modulo by zero"));
        }
        return Ok(Value::Int(a % b));
    }
    let (a, b) = (left.to_number()?, right.to_number()?);
    if b == 0.0 {
        return Err(RuntimeError::new("modulo by zero"));
    }
    Ok(Value::Float(a % b))
}

fn eval_pow(left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        if let Ok(exp) = u32::try_from(*b) {
            if let Some(result) = a.checked_pow(exp) {
                return Ok(Value::Int(result));
            }
        }
    }
    Ok(Value::Float(left.to_number()?.powf(right.to_number()?)))
}

fn eval_order(
    left: Value,
    right: Value,
    cmp: impl Fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(cmp(left.to_number()?, right.to_number()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use std::io::Cursor;

    fn run(src: &str, input: &str) -> (String, Result<(), RuntimeError>) {
        let tokens = Lexer::new(src).lex().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        let mut out = Vec::new();
        let mut stdin = Cursor::new(input.as_bytes().to_vec());
        let result = Interpreter::new(&mut out, &mut stdin).run(&program);
        (String::from_utf8(out).unwrap(), result)
    }

    fn body_lines(src: &str) -> Vec<String> {
        let (out, result) = run(src, "");
        result.unwrap();
        let lines: Vec<String> = out.lines().map(str::to_string).collect();
        lines[1..lines.len() - 1].to_vec()
    }

    #[test]
    fn hello_world() {
        let lines = body_lines(r#"@VoidApp "H"; main(){ echo("Hello"); }"#);
        assert_eq!(lines, vec!["Hello"]);
    }

    #[test]
    fn arithmetic_precedence() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                echo(1 + 2 * 3);
                echo(2 ** 3 ** 2);
                echo((1+2)*3);
            }"#,
        );
        assert_eq!(lines, vec!["7", "512", "9"]);
    }

    #[test]
    fn for_loop_sum() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                create:int s = 0;
                for(create:int i = 1; i <= 5; i = i + 1){ s = s + i; }
                echo(s);
            }"#,
        );
        assert_eq!(lines, vec!["15"]);
    }

    #[test]
    fn list_and_dict_methods() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                create:list L = [1,2,3];
                L.add:list(4);
                L.delete:list(0);
                echo(L);
                echo(length(L));
                create:dict D = {"a":1};
                D.add:dict("b":2);
                D.add:dict("a":9);
                echo(D);
                echo(D["a"]);
            }"#,
        );
        assert_eq!(lines, vec!["[2, 3, 4]", "3", "{a:9, b:2}", "9"]);
    }

    #[test]
    fn string_negative_indexing() {
        let lines = body_lines(r#"@VoidApp "H"; main(){ create:string s = "abc"; echo(s[-1]); }"#);
        assert_eq!(lines, vec!["c"]);
    }

    #[test]
    fn divide_by_zero_is_fatal_and_skips_footer() {
        let (out, result) = run(r#"@VoidApp "H"; main(){ create:int x = 1/0; }"#, "");
        assert!(result.is_err());
        assert!(!out.contains("Конец"));
    }

    #[test]
    fn redefinition_of_an_existing_alias_fails() {
        let (_, result) = run(
            r#"@VoidApp "H"; main(){
                create:list a = [1];
                create:list b = a;
                b.add:list(2);
                create:list b = [9];
            }"#,
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn aliased_lists_share_mutations() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                create:list a = [1];
                create:list b = a;
                b.add:list(2);
                echo(a);
            }"#,
        );
        assert_eq!(lines, vec!["[1, 2]"]);
    }

    #[test]
    fn write_reads_one_line_of_input() {
        let (out, result) = run(
            r#"@VoidApp "H"; main(){ create:string name = write("Name? "); echo(name); }"#,
            "Ada\n",
        );
        result.unwrap();
        assert!(out.contains("Name? Ada"));
    }

    #[test]
    fn while_loop_ceiling_is_fatal() {
        let (_, result) = run(
            r#"@VoidApp "H"; main(){ create:int i = 0; while(true){ i = i + 1; } }"#,
            "",
        );
        assert!(result.is_err());
    }

    #[test]
    fn index_assignment_round_trips() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                create:list L = [1,2,3];
                L[1] = 9;
                echo(L[1]);
            }"#,
        );
        assert_eq!(lines, vec!["9"]);
    }

    #[test]
    fn no_short_circuit_both_sides_evaluate() {
        let lines = body_lines(
            r#"@VoidApp "H"; main(){
                create:int calls = 0;
                create:bool r = false && true;
                echo(r);
            }"#,
        );
        assert_eq!(lines, vec!["false"]);
    }
}
