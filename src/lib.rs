//! A Model-Update-View (MVU) program loop for terminal applications.
//!
//! The loop owns the application model, serializes every state transition
//! through a single `update` function and renders the view after each one.
//! Side effects are described as [`Command`]s. The loop runs them
//! concurrently on a [`Spawner`] and feeds their results back to itself as
//! [`Message`]s.
//!
//! ## Example
//!
//! ```rust
//! use mvu_program::{Command, Message, Program, ProgramLogic, TestRenderer, ThreadPoolSpawner};
//!
//! #[derive(Debug, Clone)]
//! enum StatusMsg { Received(u16) }
//!
//! #[derive(Debug, Default)]
//! struct Model { status: u16, error: Option<String> }
//!
//! struct StatusCheck { url: String }
//!
//! impl ProgramLogic<StatusMsg, Model> for StatusCheck {
//!     fn init(&self) -> (Model, Option<Command<StatusMsg>>) {
//!         let url = self.url.clone();
//!         let fetch = Command::perform(async move {
//!             // A real program performs the request here.
//!             let _ = url;
//!             StatusMsg::Received(200)
//!         });
//!         (Model::default(), Some(fetch))
//!     }
//!
//!     fn update(&self, model: Model, msg: Message<StatusMsg>) -> (Model, Option<Command<StatusMsg>>) {
//!         match msg {
//!             Message::App(StatusMsg::Received(status)) => {
//!                 (Model { status, ..model }, Some(Command::quit()))
//!             }
//!             Message::Error(error) => {
//!                 (Model { error: Some(error.to_string()), ..model }, Some(Command::quit()))
//!             }
//!             Message::Key(key) if key.is_interrupt() => (model, Some(Command::quit())),
//!             _ => (model, None),
//!         }
//!     }
//!
//!     fn view(&self, model: &Model) -> String {
//!         match &model.error {
//!             Some(error) => format!("something went wrong: {error}"),
//!             None => format!("status: {}", model.status),
//!         }
//!     }
//! }
//!
//! let renderer = TestRenderer::new();
//! let program = Program::new(
//!     StatusCheck { url: "https://example.com".into() },
//!     renderer.clone(),
//!     ThreadPoolSpawner::new().unwrap(),
//! );
//!
//! let model = program.run_blocking().unwrap();
//! assert_eq!(model.status, 200);
//! assert_eq!(renderer.last().as_deref(), Some("status: 200"));
//! ```

mod command;
mod config;
mod emitter;
mod error;
mod logic;
mod message;
mod renderer;
mod runtime;
mod shutdown;
mod spawner;

pub use command::Command;
pub use config::{OverflowPolicy, ProgramConfig, DEFAULT_CAPACITY};
pub use emitter::Emitter;
pub use error::ProgramError;
pub use logic::{from_fns, FnLogic, ProgramLogic};
pub use message::{CommandError, Key, Message};
pub use renderer::{RenderError, Renderer, WriterRenderer};
pub use runtime::Program;
pub use spawner::{Spawner, ThreadPoolSpawner};

#[cfg(feature = "tokio")]
pub use spawner::TokioSpawner;

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use renderer::TestRenderer;
#[cfg(any(test, feature = "testing"))]
pub use runtime::{create_test_spawner, TestDriver, TestProgram};
#[cfg(any(test, feature = "testing"))]
pub use spawner::DeferredSpawner;

// Re-exported so custom spawners can be written without depending on futures
pub use futures::future::BoxFuture;
pub use futures::task::SpawnError;
