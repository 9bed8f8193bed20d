use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::RuntimeError;
use super::value::Value;
use crate::parser::ast::DeclaredType;

#[derive(Debug, Clone)]
struct Binding {
    declared_type: DeclaredType,
    value: Value,
}

#[derive(Debug, Default)]
struct ScopeData {
    bindings: HashMap<String, Binding>,
    parent: Option<Environment>,
}

/// A lexical scope: a name-unique map to `(declaredType, value)` bindings
/// plus an optional parent. Cloning an `Environment` clones the handle, not
/// the scope — every `Block` gets a fresh child via `Environment::child`,
/// released implicitly when the caller drops it.
#[derive(Debug, Clone)]
pub struct Environment(Rc<RefCell<ScopeData>>);

impl Environment {
    pub fn new_global() -> Self {
        Environment(Rc::new(RefCell::new(ScopeData::default())))
    }

    pub fn child(&self) -> Self {
        Environment(Rc::new(RefCell::new(ScopeData {
            bindings: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Defines `name` in *this* scope. Shadowing an outer scope is allowed;
    /// redefining within the same scope is always rejected.
    pub fn define(
        &self,
        name: &str,
        declared_type: DeclaredType,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(RuntimeError::new(format!(
                "'{name}' is already defined in this scope"
            )));
        }
        scope.bindings.insert(
            name.to_string(),
            Binding {
                declared_type,
                value,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        let scope = self.0.borrow();
        if let Some(binding) = scope.bindings.get(name) {
            return Ok(binding.value.clone());
        }
        match &scope.parent {
            Some(parent) => parent.get(name),
            None => Err(RuntimeError::new(format!("unknown identifier '{name}'"))),
        }
    }

    pub fn declared_type(&self, name: &str) -> Result<DeclaredType, RuntimeError> {
        let scope = self.0.borrow();
        if let Some(binding) = scope.bindings.get(name) {
            return Ok(binding.declared_type);
        }
        match &scope.parent {
            Some(parent) => parent.declared_type(name),
            None => Err(RuntimeError::new(format!("unknown identifier '{name}'"))),
        }
    }

    /// Mutates the nearest binding found on the chain. Fails if no binding
    /// for `name` exists anywhere on the chain.
    pub fn set(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut scope = self.0.borrow_mut();
        if let Some(binding) = scope.bindings.get_mut(name) {
            binding.value = value;
            return Ok(());
        }
        let parent = scope.parent.clone();
        drop(scope);
        match parent {
            Some(parent) => parent.set(name, value),
            None => Err(RuntimeError::new(format!("unknown identifier '{name}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_in_same_scope_fails() {
        let env = Environment::new_global();
        env.define("x", DeclaredType::Int, Value::Int(1)).unwrap();
        assert!(env.define("x", DeclaredType::Int, Value::Int(2)).is_err());
    }

    #[test]
    fn child_scope_can_shadow_but_does_not_clobber_parent() {
        let parent = Environment::new_global();
        parent.define("x", DeclaredType::Int, Value::Int(1)).unwrap();
        let child = parent.child();
        child.define("x", DeclaredType::Int, Value::Int(2)).unwrap();
        assert_eq!(child.get("x").unwrap().stringify(), "2");
        assert_eq!(parent.get("x").unwrap().stringify(), "1");
    }

    #[test]
    fn set_mutates_the_nearest_ancestor_binding() {
        let parent = Environment::new_global();
        parent.define("x", DeclaredType::Int, Value::Int(1)).unwrap();
        let child = parent.child();
        child.set("x", Value::Int(9)).unwrap();
        assert_eq!(parent.get("x").unwrap().stringify(), "9");
    }

    #[test]
    fn get_on_unbound_name_fails() {
        let env = Environment::new_global();
        assert!(env.get("missing").is_err());
    }

    #[test]
    fn names_defined_inside_a_block_are_unresolvable_after_it_ends() {
        let parent = Environment::new_global();
        {
            let child = parent.child();
            child.define("x", DeclaredType::Int, Value::Int(1)).unwrap();
        }
        assert!(parent.get("x").is_err());
    }
}
