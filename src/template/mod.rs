//! The template entity
//!
//! A [`Template`] owns its source text and compiles it lazily, exactly once,
//! on the first [`render`](Template::render). The cached [`Renderer`] is
//! reused for every later call on the same instance.
//!
//! # Examples
//!
//! ```
//! use scriptlet::Template;
//! use serde_json::json;
//!
//! let template = Template::new("Hello, <%= name %>!");
//! assert_eq!(template.render(&json!({"name": "World"})).unwrap(), "Hello, World!");
//! ```

mod renderer;

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::compiler::{Compile, Compiler};
use crate::core::error::Result;

pub use renderer::Renderer;

/// Template source plus its lazily compiled renderer
#[derive(Debug, Clone)]
pub struct Template<C = Compiler> {
    source: String,
    compiler: C,
    renderer: OnceCell<Renderer>,
}

impl Template {
    /// Create a template compiled by the default [`Compiler`]
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_compiler(source, Compiler::new())
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl<C: Compile> Template<C> {
    /// Create a template compiled by `compiler`
    pub fn with_compiler(source: impl Into<String>, compiler: C) -> Self {
        Self {
            source: source.into(),
            compiler,
            renderer: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether a renderer has been cached
    pub fn is_compiled(&self) -> bool {
        self.renderer.get().is_some()
    }

    /// Compile the source into a fresh renderer. Nothing is cached.
    pub fn compile(&self) -> Result<Renderer> {
        self.compiler.compile(&self.source)
    }

    /// Render against `data`, compiling on first use.
    ///
    /// Concurrent first calls wait on a single compilation. A failed
    /// compilation is not cached, so the next call tries again.
    pub fn render<'d>(&self, data: impl Into<Option<&'d JsonValue>>) -> Result<String> {
        self.renderer()?.render(data)
    }

    /// Render against any serializable value
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        self.renderer()?.render_serialize(data)
    }

    fn renderer(&self) -> Result<&Renderer> {
        self.renderer.get_or_try_init(|| {
            let renderer = self.compile()?;
            debug!(bytes = self.source.len(), "Cached compiled renderer");
            Ok(renderer)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    #[derive(Debug, Default)]
    struct CountingCompiler {
        calls: AtomicUsize,
    }

    impl Compile for CountingCompiler {
        fn compile(&self, source: &str) -> Result<Renderer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Compiler::new().compile(source)
        }
    }

    #[test]
    fn test_render_compiles_once() {
        let template = Template::with_compiler("Hi <%= name %>", CountingCompiler::default());
        assert!(!template.is_compiled());

        assert_eq!(template.render(&json!({"name": "Ann"})).unwrap(), "Hi Ann");
        assert_eq!(template.render(&json!({"name": "Bo"})).unwrap(), "Hi Bo");
        assert_eq!(template.render(None).unwrap(), "Hi ");

        assert!(template.is_compiled());
        assert_eq!(template.compiler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_compile_does_not_cache() {
        let template = Template::with_compiler("x", CountingCompiler::default());
        template.compile().unwrap();
        template.compile().unwrap();
        assert!(!template.is_compiled());
        assert_eq!(template.compiler.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_compile_is_retried() {
        let template = Template::with_compiler("<% if ( %>", CountingCompiler::default());
        assert!(matches!(template.render(None), Err(Error::Syntax { .. })));
        assert!(template.render(None).is_err());
        assert!(!template.is_compiled());
        assert_eq!(template.compiler.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_and_conversions() {
        assert_eq!(Template::default().render(None).unwrap(), "");
        assert_eq!(Template::from("a").source(), "a");
        assert_eq!(Template::from(String::from("b")).render(None).unwrap(), "b");
    }

    #[test]
    fn test_render_serialize() {
        #[derive(Serialize)]
        struct Page<'a> {
            title: &'a str,
            tags: Vec<&'a str>,
        }

        let template = Template::new("<%= title %>: <%= tags.join(' ') %>");
        let page = Page {
            title: "Notes",
            tags: vec!["a", "b"],
        };
        assert_eq!(template.render_serialize(&page).unwrap(), "Notes: a b");
    }

    #[test]
    fn test_null_context_is_empty() {
        let template = Template::new("[<%= a %>][<%= b.c %>]");
        assert_eq!(template.render(&JsonValue::Null).unwrap(), "[][]");
    }

    #[test]
    #[traced_test]
    fn test_first_render_logs_compilation() {
        let template = Template::new("<%= x %>");
        template.render(None).unwrap();
        assert!(logs_contain("Compiled template"));
        assert!(logs_contain("Cached compiled renderer"));
    }
}
