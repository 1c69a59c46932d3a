//! Explicit environment for template-local bindings

use std::collections::HashMap;

use super::value::Value;
use crate::compiler::ast::DeclKind;
use crate::core::error::{Error, Result};

#[derive(Debug, Clone)]
struct Binding<'a> {
    value: Value<'a>,
    constant: bool,
}

/// Stack of binding frames. Frame 0 is the render's function scope and is
/// never popped.
#[derive(Debug)]
pub(crate) struct Scope<'a> {
    frames: Vec<HashMap<String, Binding<'a>>>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind `name` according to its declaration kind
    pub fn declare(&mut self, kind: DeclKind, name: &str, value: Value<'a>) {
        let frame = match kind {
            DeclKind::Var => self.frames.first_mut(),
            DeclKind::Let | DeclKind::Const => self.frames.last_mut(),
        };
        if let Some(frame) = frame {
            frame.insert(
                name.to_string(),
                Binding {
                    value,
                    constant: kind == DeclKind::Const,
                },
            );
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value<'a>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(|binding| &binding.value)
    }

    /// Update the innermost binding of `name`, or create one in the
    /// function scope when none exists
    pub fn assign(&mut self, name: &str, value: Value<'a>) -> Result<()> {
        let existing = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name));
        match existing {
            Some(binding) if binding.constant => Err(Error::ConstAssignment(name.to_string())),
            Some(binding) => {
                binding.value = value;
                Ok(())
            }
            None => {
                self.declare(DeclKind::Var, name, value);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(scope: &Scope<'_>, name: &str) -> Option<String> {
        scope.lookup(name).map(Value::display)
    }

    #[test]
    fn test_let_is_block_scoped() {
        let mut scope = Scope::new();
        scope.push();
        scope.declare(DeclKind::Let, "x", Value::Number(1.0));
        assert_eq!(shown(&scope, "x").as_deref(), Some("1"));
        scope.pop();
        assert_eq!(shown(&scope, "x"), None);
    }

    #[test]
    fn test_var_is_function_scoped() {
        let mut scope = Scope::new();
        scope.push();
        scope.declare(DeclKind::Var, "i", Value::Number(0.0));
        scope.pop();
        assert_eq!(shown(&scope, "i").as_deref(), Some("0"));
    }

    #[test]
    fn test_inner_binding_shadows_outer() {
        let mut scope = Scope::new();
        scope.declare(DeclKind::Let, "x", Value::str("outer"));
        scope.push();
        scope.declare(DeclKind::Let, "x", Value::str("inner"));
        scope.assign("x", Value::str("changed")).unwrap();
        assert_eq!(shown(&scope, "x").as_deref(), Some("changed"));
        scope.pop();
        assert_eq!(shown(&scope, "x").as_deref(), Some("outer"));
    }

    #[test]
    fn test_assign_undeclared_creates_function_binding() {
        let mut scope = Scope::new();
        scope.push();
        scope.assign("total", Value::Number(3.0)).unwrap();
        scope.pop();
        assert_eq!(shown(&scope, "total").as_deref(), Some("3"));
    }

    #[test]
    fn test_const_cannot_be_reassigned() {
        let mut scope = Scope::new();
        scope.declare(DeclKind::Const, "limit", Value::Number(2.0));
        let err = scope.assign("limit", Value::Number(3.0)).unwrap_err();
        assert!(matches!(err, Error::ConstAssignment(name) if name == "limit"));
    }

    #[test]
    fn test_root_frame_is_never_popped() {
        let mut scope = Scope::new();
        scope.declare(DeclKind::Var, "kept", Value::Bool(true));
        scope.pop();
        assert_eq!(shown(&scope, "kept").as_deref(), Some("true"));
    }
}
