use rand::Rng;

use super::error::RuntimeError;
use super::value::Value;

fn arity_error(name: &str, expected: usize, got: usize) -> RuntimeError {
    RuntimeError::new(format!(
        "'{name}' expects {expected} argument(s), got {got}"
    ))
}

/// Dispatches a call to one of the builtin functions. `rand`'s two-argument
/// inclusive form is not reachable through here: `rand` is lexed as a
/// keyword (see the lexer's `KEYWORDS` table) and parsed directly into
/// `Expr::RandCall`, so it can never collide with a user identifier.
pub fn call_builtin(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match name {
        "abs" => {
            one_numeric_arg(name, args).map(|n| numeric_result(n.abs(), &args[0]))
        }
        "sqrt" => one_numeric_arg(name, args).map(|n| Value::Float(n.sqrt())),
        "floor" => one_numeric_arg(name, args).map(|n| Value::Int(n.floor() as i64)),
        "ceil" => one_numeric_arg(name, args).map(|n| Value::Int(n.ceil() as i64)),
        "round" => one_numeric_arg(name, args).map(|n| Value::Int(round_half_away_from_zero(n) as i64)),
        "min" => {
            let (a, b) = two_numeric_args(name, args)?;
            Ok(if a <= b { args[0].clone() } else { args[1].clone() })
        }
        "max" => {
            let (a, b) = two_numeric_args(name, args)?;
            Ok(if a >= b { args[0].clone() } else { args[1].clone() })
        }
        "random" => {
            expect_arity(name, args, 0)?;
            Ok(Value::Float(rand::thread_rng().gen_range(0.0..1.0)))
        }
        "toInt" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Int(args[0].to_number().map(|n| n as i64).unwrap_or(0)))
        }
        "toFloat" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Float(args[0].to_number().unwrap_or(0.0)))
        }
        "toString" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Str(args[0].stringify()))
        }
        "toBool" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Bool(args[0].truthy()))
        }
        "length" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Int(match &args[0] {
                Value::List(items) => items.borrow().len() as i64,
                Value::Dict(entries) => entries.borrow().len() as i64,
                other => other.stringify().chars().count() as i64,
            }))
        }
        "upper" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Str(string_arg(name, args)?.to_uppercase()))
        }
        "lower" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Str(string_arg(name, args)?.to_lowercase()))
        }
        "trim" => {
            expect_arity(name, args, 1)?;
            Ok(Value::Str(string_arg(name, args)?.trim().to_string()))
        }
        "contains" => {
            expect_arity(name, args, 2)?;
            Ok(Value::Bool(match &args[0] {
                Value::List(items) => items.borrow().iter().any(|v| v.equals(&args[1])),
                other => other.stringify().contains(&args[1].stringify()),
            }))
        }
        "rand" => rand_int(args),
        _ => Err(RuntimeError::new(format!("unknown builtin '{name}'"))),
    }
}

/// Shared by the `rand(min, max)` builtin table entry (documented, but
/// unreachable by name) and `Expr::RandCall`, which is how user code actually
/// invokes it.
pub fn rand_int(args: &[Value]) -> Result<Value, RuntimeError> {
    expect_arity("rand", args, 2)?;
    let min = args[0]
        .to_number()
        .map_err(|_| RuntimeError::new("rand: arguments must be numeric"))?;
    let max = args[1]
        .to_number()
        .map_err(|_| RuntimeError::new("rand: arguments must be numeric"))?;
    let (min, max) = (min as i64, max as i64);
    if min > max {
        return Err(RuntimeError::new("rand: min must not exceed max"));
    }
    Ok(Value::Int(rand::thread_rng().gen_range(min..=max)))
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(arity_error(name, expected, args.len()));
    }
    Ok(())
}

fn one_numeric_arg(name: &str, args: &[Value]) -> Result<f64, RuntimeError> {
    expect_arity(name, args, 1)?;
    args[0].to_number()
}

fn two_numeric_args(name: &str, args: &[Value]) -> Result<(f64, f64), RuntimeError> {
    expect_arity(name, args, 2)?;
    Ok((args[0].to_number()?, args[1].to_number()?))
}

fn string_arg(name: &str, args: &[Value]) -> Result<String, RuntimeError> {
    match &args[0] {
        Value::Str(s) => Ok(s.clone()),
        _ => Err(RuntimeError::new(format!("'{name}' expects a string argument"))),
    }
}

/// `abs` preserves the operand's int/float-ness rather than always widening
/// to float, matching what a caller passing an int literal would expect back.
fn numeric_result(n: f64, original: &Value) -> Value {
    match original {
        Value::Int(_) => Value::Int(n as i64),
        _ => Value::Float(n),
    }
}

fn round_half_away_from_zero(n: f64) -> f64 {
    n.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_preserves_int() {
        assert!(matches!(
            call_builtin("abs", &[Value::Int(-3)]).unwrap(),
            Value::Int(3)
        ));
    }

    #[test]
    fn to_int_recovers_on_parse_failure() {
        assert!(matches!(
            call_builtin("toInt", &[Value::Str("nope".into())]).unwrap(),
            Value::Int(0)
        ));
    }

    #[test]
    fn length_handles_each_kind() {
        assert!(matches!(
            call_builtin("length", &[Value::Str("abc".into())]).unwrap(),
            Value::Int(3)
        ));
        let list = Value::new_list(vec![Value::Int(1), Value::Int(2)]);
        assert!(matches!(call_builtin("length", &[list]).unwrap(), Value::Int(2)));
    }

    #[test]
    fn contains_checks_list_membership_by_equality() {
        let list = Value::new_list(vec![Value::Int(1), Value::Bool(true)]);
        assert!(matches!(
            call_builtin("contains", &[list, Value::Int(1)]).unwrap(),
            Value::Bool(true)
        ));
    }

    #[test]
    fn rand_rejects_inverted_range() {
        assert!(rand_int(&[Value::Int(5), Value::Int(1)]).is_err());
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        assert!(call_builtin("abs", &[]).is_err());
    }
}
