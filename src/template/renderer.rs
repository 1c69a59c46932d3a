//! The compiled, reusable render procedure

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::compiler::ast::Program;
use crate::core::error::Result;
use crate::runtime::Interpreter;

static EMPTY_CONTEXT: JsonValue = JsonValue::Null;

/// Maps a data context to output text. Cloning is cheap; clones share the
/// compiled program.
#[derive(Debug, Clone)]
pub struct Renderer {
    program: Arc<Program>,
}

impl Renderer {
    pub(crate) fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
        }
    }

    /// Render against `data`. `None` and `null` behave as an empty context.
    pub fn render<'d>(&self, data: impl Into<Option<&'d JsonValue>>) -> Result<String> {
        let data = data.into().unwrap_or(&EMPTY_CONTEXT);
        trace!(statements = self.program.body.len(), "Rendering template");
        Interpreter::new(data).run(&self.program)
    }

    /// Render against any serializable value
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let data = serde_json::to_value(data)?;
        self.render(&data)
    }
}
