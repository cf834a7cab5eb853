//! The program loop that owns the model and serializes every update.

use core::any::Any;
use core::future::Future;
use core::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use flume::Receiver;
use futures::future::{self, BoxFuture, Either};
use futures::FutureExt;

use crate::command::Inner;
use crate::config::ProgramConfig;
use crate::error::ProgramError;
use crate::message::{CommandError, Message};
use crate::shutdown::{self, ShutdownSignal, ShutdownTrigger};
use crate::{Command, Emitter, ProgramLogic, Renderer, Spawner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The program loop.
///
/// This is the core of the crate. It:
/// 1. Obtains the initial Model and startup Command via [`ProgramLogic::init`]
/// 2. Renders the initial view
/// 3. Takes Messages from its channel one at a time and feeds them to
///    [`ProgramLogic::update`]
/// 4. Renders the view of every new Model through the [`Renderer`]
/// 5. Schedules returned Commands on the [`Spawner`] without awaiting them
///
/// The model, `update`, `view` and the renderer are only ever touched by the
/// task driving [`Program::run`], so no locking is involved. Commands only
/// talk back through the channel.
///
/// For testing with manual control, use [`TestProgram`] with a
/// [`crate::TestRenderer`].
///
/// # Type Parameters
///
/// * `M` - The application's message payload (see [`Message::App`])
/// * `Model` - The application state
/// * `Logic` - The logic implementation type (implements [`ProgramLogic`])
/// * `Render` - The renderer implementation type (implements [`Renderer`])
/// * `Spawn` - The spawner implementation type (implements [`Spawner`])
///
/// # Example
///
/// ```rust
/// use mvu_program::{from_fns, Command, Message, Program, TestRenderer, ThreadPoolSpawner};
///
/// #[derive(Debug)]
/// enum Msg { Status(u16) }
///
/// let logic = from_fns(
///     || (0u16, Some(Command::perform(async { Msg::Status(200) }))),
///     |status: u16, msg: Message<Msg>| match msg {
///         Message::App(Msg::Status(code)) => (code, Some(Command::quit())),
///         _ => (status, None),
///     },
///     |status: &u16| format!("status: {status}"),
/// );
///
/// let renderer = TestRenderer::new();
/// let spawner = ThreadPoolSpawner::new().unwrap();
/// let status = Program::new(logic, renderer.clone(), spawner).run_blocking().unwrap();
///
/// assert_eq!(status, 200);
/// assert_eq!(renderer.last().as_deref(), Some("status: 200"));
/// ```
pub struct Program<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    logic: Logic,
    renderer: Render,
    spawner: Spawn,
    receiver: Receiver<Message<M>>,
    emitter: Emitter<M>,
    trigger: ShutdownTrigger,
    signal: ShutdownSignal,
    _model: PhantomData<fn() -> Model>,
}

impl<M, Model, Logic, Render, Spawn> Program<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    /// Create a program with the default [`ProgramConfig`].
    ///
    /// Nothing runs until [`Program::run`] is called.
    ///
    /// # Arguments
    ///
    /// * `logic` - Application logic implementing ProgramLogic
    /// * `renderer` - Sink the rendered views are written to
    /// * `spawner` - Spawner to execute commands on your chosen runtime
    pub fn new(logic: Logic, renderer: Render, spawner: Spawn) -> Self {
        Self::with_config(logic, renderer, spawner, ProgramConfig::default())
    }

    /// Create a program with an explicit channel configuration.
    pub fn with_config(
        logic: Logic,
        renderer: Render,
        spawner: Spawn,
        config: ProgramConfig,
    ) -> Self {
        let (sender, receiver) = config.channel();
        let (trigger, signal) = shutdown::channel();

        Program {
            logic,
            renderer,
            spawner,
            receiver,
            emitter: Emitter::new(sender, config.overflow),
            trigger,
            signal,
            _model: PhantomData,
        }
    }

    /// A handle for feeding messages into this program from outside.
    pub fn emitter(&self) -> Emitter<M> {
        self.emitter.clone()
    }

    /// Start a long-lived producer, such as a terminal input reader.
    ///
    /// The future returned by `producer` runs on the spawner and is dropped
    /// when the program stops. A panic inside it is reported as a
    /// [`Message::Error`].
    pub fn spawn_input<F, Fut>(&self, producer: F) -> Result<(), ProgramError>
    where
        F: FnOnce(Emitter<M>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let emitter = self.emitter.clone();
        let input = AssertUnwindSafe(producer(self.emitter.clone())).catch_unwind();
        let signal = self.signal.clone();

        self.spawner.spawn(
            async move {
                futures::pin_mut!(input);
                if let Either::Left((Err(panic), _)) = future::select(input, signal).await {
                    let detail = panic_detail(panic.as_ref());
                    tracing::warn!(%detail, "input source panicked");
                    emitter
                        .emit_async(Message::Error(CommandError::Panicked(detail)))
                        .await;
                }
            }
            .boxed(),
        )?;
        Ok(())
    }

    /// Initialize the program and run the message loop until it quits.
    ///
    /// - Calls ProgramLogic::init once and renders the initial model.
    /// - Schedules the startup command, if any.
    /// - Processes messages from the channel one at a time.
    ///
    /// Returns the final model once a [`Message::Quit`] arrives or `update`
    /// returns [`Command::quit`]. Commands still in flight are abandoned,
    /// not awaited, and their results are discarded.
    pub async fn run(mut self) -> Result<Model, ProgramError> {
        let (mut model, mut flow) = self.start()?;

        while flow == Flow::Continue {
            // The program holds a sender, so the channel stays connected.
            let Ok(message) = self.receiver.recv_async().await else {
                break;
            };
            (model, flow) = self.step(model, message)?;
        }

        self.stop();
        Ok(model)
    }

    /// Run the program on the current thread, blocking until it quits.
    ///
    /// Commands still run on the spawner, which must not depend on the
    /// calling thread being free.
    pub fn run_blocking(self) -> Result<Model, ProgramError> {
        futures::executor::block_on(self.run())
    }

    fn start(&mut self) -> Result<(Model, Flow), ProgramError> {
        tracing::debug!("starting program");

        let (model, command) = self.logic.init();
        let view = self.logic.view(&model);
        self.renderer.render(&view).map_err(ProgramError::Startup)?;

        let flow = match command {
            Some(command) => self.schedule(command)?,
            None => Flow::Continue,
        };
        Ok((model, flow))
    }

    fn step(&mut self, model: Model, message: Message<M>) -> Result<(Model, Flow), ProgramError> {
        if message.is_quit() {
            tracing::debug!("quit message received");
            return Ok((model, Flow::Quit));
        }

        tracing::trace!(kind = message.kind(), pending = self.receiver.len(), "processing message");

        let (model, command) = self.logic.update(model, message);
        let view = self.logic.view(&model);
        self.renderer.render(&view).map_err(ProgramError::Render)?;

        let flow = match command {
            Some(command) => self.schedule(command)?,
            None => Flow::Continue,
        };
        Ok((model, flow))
    }

    fn schedule(&self, command: Command<M>) -> Result<Flow, ProgramError> {
        match command.0 {
            Inner::Quit => {
                tracing::debug!("quit command returned");
                Ok(Flow::Quit)
            }
            Inner::Task(task) => {
                self.spawn_command(task)?;
                Ok(Flow::Continue)
            }
            Inner::Batch(commands) => {
                for command in commands {
                    if self.schedule(command)? == Flow::Quit {
                        return Ok(Flow::Quit);
                    }
                }
                Ok(Flow::Continue)
            }
        }
    }

    fn spawn_command(&self, task: BoxFuture<'static, Option<Message<M>>>) -> Result<(), ProgramError> {
        let emitter = self.emitter.clone();
        let signal = self.signal.clone();

        let future = async move {
            let outcome = AssertUnwindSafe(task).catch_unwind();
            let message = match future::select(outcome, signal.clone()).await {
                Either::Left((Ok(message), _)) => message,
                Either::Left((Err(panic), _)) => {
                    let detail = panic_detail(panic.as_ref());
                    tracing::warn!(%detail, "command panicked");
                    Some(Message::Error(CommandError::Panicked(detail)))
                }
                Either::Right(_) => {
                    tracing::trace!("command abandoned at shutdown");
                    return;
                }
            };

            let Some(message) = message else {
                tracing::trace!("command finished without a message");
                return;
            };

            let kind = message.kind();
            if signal.is_fired() {
                tracing::trace!(kind, "discarding command result after shutdown");
                return;
            }

            let delivery = emitter.emit_async(message);
            futures::pin_mut!(delivery);
            if let Either::Right(_) = future::select(delivery, signal).await {
                tracing::trace!(kind, "command delivery abandoned at shutdown");
            }
        };

        self.spawner.spawn(future.boxed())?;
        Ok(())
    }

    fn stop(&mut self) {
        self.trigger.fire();
        tracing::debug!(abandoned = self.receiver.len(), "program stopped");
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(detail) = payload.downcast_ref::<&str>() {
        (*detail).to_owned()
    } else if let Some(detail) = payload.downcast_ref::<String>() {
        detail.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test spawner function that executes futures synchronously.
///
/// This blocks on the future immediately rather than spawning it on an async
/// runtime, so a command's message is queued before `update` returns control.
pub fn test_spawner_fn(fut: BoxFuture<'static, ()>) {
    futures::executor::block_on(fut);
}

#[cfg(any(test, feature = "testing"))]
/// Creates a test spawner that executes futures synchronously.
///
/// Use this with [`TestProgram`]. Do not combine it with [`Program::run`],
/// whose executor cannot be re-entered.
///
/// Returns a function pointer that can be passed directly to program
/// constructors without heap allocation.
pub fn create_test_spawner() -> fn(BoxFuture<'static, ()>) {
    test_spawner_fn
}

#[cfg(any(test, feature = "testing"))]
/// Test program with manual message processing control.
///
/// Only available with the `testing` feature or during tests.
///
/// Unlike [`Program`], this does not process messages on its own. Tests
/// call [`process_messages`](TestDriver::process_messages) on the returned
/// driver to drain the queue, which gives precise control over ordering.
///
/// Commands run on the test thread, which is also the only consumer, so a
/// producer waiting for room would never be woken. Under
/// [`OverflowPolicy::Block`](crate::OverflowPolicy::Block) the channel is
/// left unbounded and the configured capacity is ignored.
/// [`OverflowPolicy::DropNewest`](crate::OverflowPolicy::DropNewest) keeps
/// its bound since it never waits.
///
/// ```rust
/// use mvu_program::{create_test_spawner, from_fns, Command, Message, TestProgram, TestRenderer};
///
/// let logic = from_fns(
///     || (0i32, Some(Command::message(1))),
///     |count: i32, msg: Message<i32>| match msg {
///         Message::App(delta) => (count + delta, None),
///         _ => (count, None),
///     },
///     |count: &i32| count.to_string(),
/// );
///
/// let renderer = TestRenderer::new();
/// let mut driver = TestProgram::new(logic, renderer.clone(), create_test_spawner())
///     .run()
///     .unwrap();
/// driver.process_messages().unwrap();
///
/// assert_eq!(driver.model(), Some(&1));
/// assert_eq!(renderer.count(), 2);
/// ```
pub struct TestProgram<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    program: Program<M, Model, Logic, Render, Spawn>,
}

#[cfg(any(test, feature = "testing"))]
impl<M, Model, Logic, Render, Spawn> TestProgram<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    pub fn new(logic: Logic, renderer: Render, spawner: Spawn) -> Self {
        Self::with_config(logic, renderer, spawner, ProgramConfig::default())
    }

    pub fn with_config(
        logic: Logic,
        renderer: Render,
        spawner: Spawn,
        config: ProgramConfig,
    ) -> Self {
        let config = match config.overflow {
            crate::OverflowPolicy::Block => ProgramConfig {
                capacity: None,
                ..config
            },
            crate::OverflowPolicy::DropNewest => config,
        };
        TestProgram {
            program: Program::with_config(logic, renderer, spawner, config),
        }
    }

    /// Initializes the program and returns a driver for manual processing.
    ///
    /// This renders the initial model and schedules the startup command.
    pub fn run(mut self) -> Result<TestDriver<M, Model, Logic, Render, Spawn>, ProgramError> {
        let (model, flow) = self.program.start()?;

        let mut driver = TestDriver {
            program: self.program,
            model: Some(model),
            finished: false,
        };
        if flow == Flow::Quit {
            driver.finish();
        }
        Ok(driver)
    }
}

#[cfg(any(test, feature = "testing"))]
/// Manual driver for a started [`TestProgram`].
///
/// Only available with the `testing` feature or during tests.
pub struct TestDriver<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    program: Program<M, Model, Logic, Render, Spawn>,
    model: Option<Model>,
    finished: bool,
}

#[cfg(any(test, feature = "testing"))]
impl<M, Model, Logic, Render, Spawn> TestDriver<M, Model, Logic, Render, Spawn>
where
    M: Send + 'static,
    Logic: ProgramLogic<M, Model>,
    Render: Renderer,
    Spawn: Spawner,
{
    pub fn emitter(&self) -> Emitter<M> {
        self.program.emitter()
    }

    /// Process queued messages until the queue is empty or the program quits.
    pub fn process_messages(&mut self) -> Result<(), ProgramError> {
        while self.process_next()? {}
        Ok(())
    }

    /// Process a single queued message. Returns `false` if nothing was processed.
    pub fn process_next(&mut self) -> Result<bool, ProgramError> {
        if self.finished {
            return Ok(false);
        }
        let Ok(message) = self.program.receiver.try_recv() else {
            return Ok(false);
        };
        let Some(model) = self.model.take() else {
            return Ok(false);
        };

        match self.program.step(model, message) {
            Ok((model, flow)) => {
                self.model = Some(model);
                if flow == Flow::Quit {
                    self.finish();
                }
                Ok(true)
            }
            Err(error) => {
                self.finish();
                Err(error)
            }
        }
    }

    /// Number of messages waiting in the channel.
    pub fn pending(&self) -> usize {
        self.program.receiver.len()
    }

    /// Whether the program has quit or failed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The current model. `None` only after a runtime fault.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn into_model(self) -> Option<Model> {
        self.model
    }

    fn finish(&mut self) {
        self.finished = true;
        self.program.stop();
    }
}
