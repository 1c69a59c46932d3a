//! Render-time machinery: the value model, the path resolver, the binding
//! environment, and the interpreter that walks compiled programs.

mod interpreter;
pub mod resolver;
mod scope;
pub(crate) mod value;

pub(crate) use interpreter::Interpreter;
pub use resolver::resolve;
