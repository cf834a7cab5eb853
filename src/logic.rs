//! Application logic trait defining the Model-Update-View contract.

use crate::{Command, Message};

/// Application logic trait defining the MVU contract.
///
/// Implementations must provide three pure functions:
/// - [`init`](Self::init): produce the initial model and an optional startup command
/// - [`update`](Self::update): transform (Model, Message) → (Model, Command?)
/// - [`view`](Self::view): project the model to text
///
/// None of them may perform I/O. Side effects are expressed by returning a
/// [`Command`], which the program runs off the loop thread.
///
/// The program is parameterized by the concrete `Model`, so logic never needs
/// to downcast.
pub trait ProgramLogic<M, Model> {
    /// Build the initial model.
    ///
    /// Called exactly once, before anything is rendered.
    fn init(&self) -> (Model, Option<Command<M>>);

    /// Reduce a message to the next model and an optional command.
    ///
    /// The current model is moved in and the returned one replaces it. Messages
    /// the logic does not care about should return the model unchanged and no
    /// command. Returning [`Command::quit`] ends the program after this
    /// model is rendered.
    fn update(&self, model: Model, message: Message<M>) -> (Model, Option<Command<M>>);

    /// Project the model to the text handed to the [`Renderer`](crate::Renderer).
    fn view(&self, model: &Model) -> String;
}

impl<M, Model, L> ProgramLogic<M, Model> for Box<L>
where
    L: ProgramLogic<M, Model> + ?Sized,
{
    fn init(&self) -> (Model, Option<Command<M>>) {
        (**self).init()
    }

    fn update(&self, model: Model, message: Message<M>) -> (Model, Option<Command<M>>) {
        (**self).update(model, message)
    }

    fn view(&self, model: &Model) -> String {
        (**self).view(model)
    }
}

/// [`ProgramLogic`] assembled from three closures. See [`from_fns`].
pub struct FnLogic<I, U, V> {
    init: I,
    update: U,
    view: V,
}

/// Build program logic from an initializer, an update function and a view
/// function.
///
/// ```rust
/// use mvu_program::{from_fns, Command, Message, ProgramLogic};
///
/// let logic = from_fns(
///     || (0i32, None),
///     |count: i32, msg: Message<i32>| match msg {
///         Message::App(delta) => (count + delta, None),
///         _ => (count, Some(Command::quit())),
///     },
///     |count: &i32| format!("count: {count}"),
/// );
///
/// let (model, _) = logic.init();
/// let (model, _) = logic.update(model, Message::App(3));
/// assert_eq!(logic.view(&model), "count: 3");
/// ```
pub fn from_fns<M, Model, I, U, V>(init: I, update: U, view: V) -> FnLogic<I, U, V>
where
    I: Fn() -> (Model, Option<Command<M>>),
    U: Fn(Model, Message<M>) -> (Model, Option<Command<M>>),
    V: Fn(&Model) -> String,
{
    FnLogic { init, update, view }
}

impl<M, Model, I, U, V> ProgramLogic<M, Model> for FnLogic<I, U, V>
where
    I: Fn() -> (Model, Option<Command<M>>),
    U: Fn(Model, Message<M>) -> (Model, Option<Command<M>>),
    V: Fn(&Model) -> String,
{
    fn init(&self) -> (Model, Option<Command<M>>) {
        (self.init)()
    }

    fn update(&self, model: Model, message: Message<M>) -> (Model, Option<Command<M>>) {
        (self.update)(model, message)
    }

    fn view(&self, model: &Model) -> String {
        (self.view)(model)
    }
}
