//! Scriptlet: a small `<% %>` template engine.
//!
//! Templates mix literal text with two kinds of directives:
//!
//! - `<%= path %>` echoes a value from the data context. Paths use `.field`
//!   and `[index]` segments (`a.b[0].c`); anything missing prints as an
//!   empty string.
//! - `<% code %>` runs statement code (`if`, `for`, `while`, `var`/`let`/
//!   `const`, assignments, `print(...)`). A block may open in one directive
//!   and close in a later one, with literal text and echoes in between.
//!
//! Output is not escaped. Callers are responsible for encoding interpolated
//! values for their target format.
//!
//! # Examples
//!
//! ```
//! use scriptlet::Template;
//! use serde_json::json;
//!
//! let template = Template::new(
//!     "<% for (var i = 0; i < items.length; i++) { %>Item: <%= items[i] %>\n<% } %>",
//! );
//! let out = template.render(&json!({"items": ["a", "b"]})).unwrap();
//! assert_eq!(out, "Item: a\nItem: b\n");
//! ```
//!
//! # Errors
//!
//! Statement code runs with the full failure modes of ordinary code:
//! malformed code fails compilation with a [`Error::Syntax`], and runtime
//! problems such as an undefined variable fail the render. Path echoes
//! never fail.
#![deny(unsafe_code)]

pub mod compiler;
pub mod core;
pub mod runtime;
pub mod template;

pub use compiler::{Compile, Compiler, Instruction};
pub use crate::core::error::{Error, Result};
pub use runtime::resolve;
pub use template::{Renderer, Template};
