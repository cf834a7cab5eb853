//! Render sink abstraction.

use std::io::{self, Write};

use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use portable_atomic_util::Arc;
#[cfg(any(test, feature = "testing"))]
use spin::Mutex;

/// Failure to write a view to its sink.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the sink failed.
    #[error("failed to write view: {0}")]
    Io(#[from] io::Error),

    /// The sink could not be acquired at all.
    #[error("render sink unavailable: {0}")]
    Unavailable(String),
}

/// Render sink abstraction.
///
/// Implement this trait to integrate your terminal layer. The program calls
/// [`render`](Self::render) synchronously on the loop thread, once for the
/// initial model and once after every processed message. Output therefore
/// follows message processing order.
///
/// # Example
///
/// ```rust
/// use mvu_program::{RenderError, Renderer};
///
/// struct ConsoleRenderer;
///
/// impl Renderer for ConsoleRenderer {
///     fn render(&mut self, view: &str) -> Result<(), RenderError> {
///         println!("{view}");
///         Ok(())
///     }
/// }
/// ```
pub trait Renderer {
    /// Write the view produced from the current model.
    fn render(&mut self, view: &str) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, view: &str) -> Result<(), RenderError> {
        (**self).render(view)
    }
}

/// Writes each view as a line to any [`io::Write`] and flushes it.
///
/// Cursor control and styling are left to the caller's view text.
pub struct WriterRenderer<W> {
    writer: W,
}

impl WriterRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> WriterRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for WriterRenderer<W> {
    fn render(&mut self, view: &str) -> Result<(), RenderError> {
        writeln!(self.writer, "{view}")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test renderer that captures every rendered view for assertions.
///
/// Only available with the `testing` feature.
///
/// Clones share the same capture storage, so pass one clone to the program
/// and keep another for inspection.
///
/// # Example
///
/// ```rust
/// use mvu_program::{create_test_spawner, from_fns, Message, TestProgram, TestRenderer};
///
/// let renderer = TestRenderer::new();
/// let logic = from_fns(
///     || (7u8, None),
///     |model: u8, _msg: Message<()>| (model, None),
///     |model: &u8| format!("model {model}"),
/// );
///
/// let _driver = TestProgram::new(logic, renderer.clone(), create_test_spawner())
///     .run()
///     .unwrap();
///
/// renderer.with_renders(|renders| {
///     assert_eq!(renders[0], "model 7");
/// });
/// ```
pub struct TestRenderer {
    renders: Arc<Mutex<Vec<String>>>,
}

#[cfg(any(test, feature = "testing"))]
impl Clone for TestRenderer {
    fn clone(&self) -> Self {
        Self {
            renders: self.renders.clone(),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl Renderer for TestRenderer {
    fn render(&mut self, view: &str) -> Result<(), RenderError> {
        self.renders.lock().push(view.to_owned());
        Ok(())
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for TestRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl TestRenderer {
    pub fn new() -> Self {
        Self {
            renders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a boxed renderer sharing this renderer's capture storage.
    pub fn boxed(&self) -> Box<dyn Renderer + Send> {
        Box::new(self.clone())
    }

    /// Get the number of renders that have occurred.
    pub fn count(&self) -> usize {
        self.renders.lock().len()
    }

    /// The most recent view, if anything was rendered.
    pub fn last(&self) -> Option<String> {
        self.renders.lock().last().cloned()
    }

    /// Access the captured views with a closure.
    pub fn with_renders<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<String>) -> R,
    {
        let renders = self.renders.lock();
        f(&renders)
    }
}
