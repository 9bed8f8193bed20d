use std::cell::RefCell;
use std::rc::Rc;

use super::error::RuntimeError;
use crate::parser::ast::DeclaredType;

/// A Void list: an ordered, mutable, reference-counted sequence of values.
pub type ListRef = Rc<RefCell<Vec<Value>>>;

/// A Void dict: parallel key/value vectors rather than a hash map, so
/// insertion order survives into `stringify`. Lookups use `Value::equals`,
/// not `PartialEq`, so numeric/bool keys compare the way the language
/// defines equality.
pub type DictRef = Rc<RefCell<Vec<(Value, Value)>>>;

/// A runtime value. Scalars have value semantics; `List` and `Dict` carry a
/// shared handle, so assigning one binding to another aliases the same
/// underlying container.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListRef),
    Dict(DictRef),
}

impl Value {
    pub fn new_list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn new_dict(entries: Vec<(Value, Value)>) -> Value {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }

    /// `List`/`Dict` bindings reject any value whose shape doesn't match
    /// exactly; scalar bindings instead rely on `coerce_to` to fail when the
    /// value can't be made sense of (e.g. a list can't become an int).
    pub fn matches_declared(&self, declared: DeclaredType) -> bool {
        match declared {
            DeclaredType::List => matches!(self, Value::List(_)),
            DeclaredType::Dict => matches!(self, Value::Dict(_)),
            _ => true,
        }
    }

    /// `null` is false, numbers are `!= 0`, strings and collections are
    /// non-empty.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(entries) => !entries.borrow().is_empty(),
        }
    }

    /// Numeric coercion shared by casts, arithmetic, and ordering. Strings are
    /// parsed as decimal integers or floats; `bool` maps to `{0,1}`.
    pub fn to_number(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RuntimeError::new(format!("cannot coerce '{s}' to a number"))),
            other => Err(RuntimeError::new(format!(
                "cannot coerce {} to a number",
                other.type_name()
            ))),
        }
    }

    /// Casts `self` into the scalar representation demanded by `declared`.
    /// Collections are not coerced; callers must check `matches_declared`
    /// for those first.
    pub fn coerce_to(&self, declared: DeclaredType) -> Result<Value, RuntimeError> {
        match declared {
            DeclaredType::String => Ok(Value::Str(self.stringify())),
            DeclaredType::Bool => Ok(Value::Bool(self.truthy())),
            DeclaredType::Float => {
                let n = self.to_number()?;
                if n.is_nan() {
                    return Err(RuntimeError::new("cannot coerce NaN to float"));
                }
                Ok(Value::Float(n))
            }
            DeclaredType::Int => {
                let n = self.to_number()?;
                if n.is_nan() {
                    return Err(RuntimeError::new("cannot coerce NaN to int"));
                }
                Ok(Value::Int(n.floor() as i64))
            }
            DeclaredType::List | DeclaredType::Dict => Ok(self.clone()),
        }
    }

    /// Cross-type equality used by `==`, `!=`, and dict-key matching: same
    /// tag compares by payload/identity; bool/number pairs coerce to number;
    /// everything else falls back to `stringify`.
    pub fn equals(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => Rc::ptr_eq(a, b),
            (Dict(a), Dict(b)) => Rc::ptr_eq(a, b),
            _ => {
                let both_numericish = matches!(self, Bool(_) | Int(_) | Float(_))
                    && matches!(other, Bool(_) | Int(_) | Float(_));
                if both_numericish {
                    self.to_number().ok() == other.to_number().ok()
                } else {
                    self.stringify() == other.stringify()
                }
            }
        }
    }

    /// Canonical value-to-string rendering, used by `+` on strings, `echo`,
    /// `toString`, and recursively by nested containers.
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(items) => {
                let rendered: Vec<String> =
                    items.borrow().iter().map(Value::stringify).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Dict(entries) => {
                let rendered: Vec<String> = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k.stringify(), v.stringify()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_rules() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Int(0).truthy());
        assert!(Value::Int(1).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(Value::Str("x".into()).truthy());
    }

    #[test]
    fn equality_crosses_numeric_types() {
        assert!(Value::Int(1).equals(&Value::Bool(true)));
        assert!(Value::Int(1).equals(&Value::Float(1.0)));
        assert!(!Value::Int(2).equals(&Value::Float(1.0)));
    }

    #[test]
    fn equality_falls_back_to_stringify() {
        assert!(Value::Str("5".into()).equals(&Value::Int(5)));
        assert!(!Value::Str("5x".into()).equals(&Value::Int(5)));
    }

    #[test]
    fn stringify_nested_containers() {
        let list = Value::new_list(vec![Value::Int(1), Value::Str("a".into())]);
        assert_eq!(list.stringify(), "[1, a]");
        let dict = Value::new_dict(vec![(Value::Str("k".into()), Value::Int(2))]);
        assert_eq!(dict.stringify(), "{k:2}");
    }

    #[test]
    fn lists_are_reference_semantics() {
        let a = Value::new_list(vec![Value::Int(1)]);
        let b = a.clone();
        if let Value::List(items) = &a {
            items.borrow_mut().push(Value::Int(2));
        }
        assert_eq!(b.stringify(), "[1, 2]");
    }

    #[test]
    fn int_coercion_floors_toward_negative_infinity() {
        assert_eq!(
            Value::Float(-1.5).coerce_to(DeclaredType::Int).unwrap().stringify(),
            "-2"
        );
    }
}
