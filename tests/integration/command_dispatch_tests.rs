use mvu_program::{
    create_test_spawner, from_fns, BoxFuture, Command, DeferredSpawner, Message, OverflowPolicy,
    Program, ProgramConfig, ProgramError, SpawnError, Spawner, TestProgram, TestRenderer,
    ThreadPoolSpawner,
};

use super::{
    given_a_check_resolving_to, given_a_configured_counter, given_a_counter_with,
    given_a_deferred_counter_with, CounterLogic, StatusMsg,
};

async fn reset_connection() -> StatusMsg {
    panic!("connection reset by peer")
}

#[test]
fn given_a_command_with_no_message_should_not_trigger_an_update() {
    let (mut driver, renderer) = given_a_check_resolving_to(Command::optional(async { None }));

    driver.process_messages().unwrap();

    assert_eq!(driver.pending(), 0);
    assert_eq!(renderer.count(), 1);
    assert!(!driver.is_finished());
}

#[test]
fn given_a_panicking_command_should_deliver_an_error_message() {
    let (mut driver, renderer) = given_a_check_resolving_to(Command::perform(reset_connection()));

    driver.process_messages().unwrap();

    assert!(driver.is_finished());
    assert_eq!(
        driver.model().and_then(|model| model.error.clone()),
        Some("command panicked: connection reset by peer".to_string())
    );
    assert!(renderer.last().unwrap().contains("connection reset by peer"));
}

#[test]
fn given_a_failing_command_should_deliver_its_error_text() {
    let (mut driver, _renderer) = given_a_check_resolving_to(Command::attempt(async {
        Err::<StatusMsg, _>("dns lookup failed")
    }));

    driver.process_messages().unwrap();

    assert_eq!(
        driver.model().and_then(|model| model.error.clone()),
        Some("dns lookup failed".to_string())
    );
}

#[test]
fn given_a_batch_as_initial_command_should_update_once_per_member() {
    let (mut driver, renderer) = given_a_counter_with(Some(Command::batch([
        Command::message(1),
        Command::message(2),
        Command::message(3),
    ])));

    driver.process_messages().unwrap();

    // Should have 4 renders total:
    // 1. Initial render (0)
    // 2-4. One per batched message
    renderer.with_renders(|renders| {
        assert_eq!(renders, &vec!["0", "1", "3", "6"]);
    });
    assert_eq!(driver.model(), Some(&6));
}

#[test]
fn given_a_batch_containing_quit_should_stop_scheduling_at_the_quit() {
    let (driver, renderer, spawner) = given_a_deferred_counter_with(Some(Command::batch([
        Command::message(1),
        Command::quit(),
        Command::message(100),
    ])));

    assert!(driver.is_finished());
    assert_eq!(spawner.pending(), 1);
    assert_eq!(renderer.count(), 1);
}

#[test]
fn given_commands_completing_out_of_order_should_process_in_arrival_order() {
    let (mut driver, renderer, spawner) = given_a_deferred_counter_with(Some(Command::batch([
        Command::message(1),
        Command::message(10),
    ])));

    assert!(spawner.run_latest());
    driver.process_messages().unwrap();
    assert!(spawner.run_next());
    driver.process_messages().unwrap();

    renderer.with_renders(|renders| {
        assert_eq!(renders, &vec!["0", "10", "11"]);
    });
}

#[test]
fn given_a_full_channel_with_drop_policy_should_drop_newest_messages() {
    let (mut driver, _renderer) = given_a_configured_counter(
        ProgramConfig::default()
            .with_capacity(1)
            .with_overflow(OverflowPolicy::DropNewest),
    );

    let input = driver.emitter();
    input.emit(Message::App(5));
    input.emit(Message::App(7));
    input.emit(Message::App(9));

    assert_eq!(driver.pending(), 1);
    driver.process_messages().unwrap();
    assert_eq!(driver.model(), Some(&5));
}

#[test]
fn given_an_unbounded_channel_should_keep_every_message() {
    let (mut driver, _renderer) = given_a_configured_counter(ProgramConfig::unbounded());

    let input = driver.emitter();
    for _ in 0..5000 {
        input.emit(Message::App(1));
    }
    driver.process_messages().unwrap();

    assert_eq!(driver.model(), Some(&5000));
}

#[test]
fn given_a_capacity_of_one_and_a_two_member_batch_should_start_and_update_twice() {
    let renderer = TestRenderer::new();
    let program = TestProgram::with_config(
        CounterLogic::new(Some(Command::batch([Command::message(1), Command::message(2)]))),
        renderer.clone(),
        create_test_spawner(),
        ProgramConfig::default().with_capacity(1),
    );

    let Ok(mut driver) = program.run() else {
        panic!("counter program failed to start");
    };
    assert_eq!(driver.pending(), 2);
    driver.process_messages().unwrap();

    assert_eq!(driver.model(), Some(&3));
    renderer.with_renders(|renders| {
        assert_eq!(renders, &vec!["0", "1", "3"]);
    });
}

#[test]
fn given_a_capacity_of_one_should_accept_more_input_than_fits() {
    let (mut driver, _renderer) =
        given_a_configured_counter(ProgramConfig::default().with_capacity(1));

    let input = driver.emitter();
    for amount in [4, 5, 6] {
        input.emit(Message::App(amount));
    }
    driver.process_messages().unwrap();

    assert_eq!(driver.model(), Some(&15));
}

#[test]
fn given_a_capacity_of_one_when_released_together_should_deliver_every_result() {
    let spawner = DeferredSpawner::new();
    let program = TestProgram::with_config(
        CounterLogic::new(Some(Command::batch([Command::message(1), Command::message(2)]))),
        TestRenderer::new(),
        spawner.clone(),
        ProgramConfig::default().with_capacity(1),
    );
    let Ok(mut driver) = program.run() else {
        panic!("counter program failed to start");
    };

    assert_eq!(spawner.run_all(), 2);
    driver.process_messages().unwrap();

    assert_eq!(driver.model(), Some(&3));
}

#[test]
fn given_a_full_channel_with_block_policy_should_wait_and_keep_every_message() {
    const MESSAGES: i32 = 200;

    let renderer = TestRenderer::new();
    let logic = from_fns(
        || {
            let batch = (0..MESSAGES).map(|_| Command::message(1));
            (0, Some(Command::batch(batch)))
        },
        |count: i32, msg: Message<i32>| match msg {
            Message::App(delta) => {
                let count = count + delta;
                (count, (count == MESSAGES).then(Command::quit))
            }
            _ => (count, None),
        },
        |count: &i32| count.to_string(),
    );
    let program = Program::with_config(
        logic,
        renderer.clone(),
        ThreadPoolSpawner::with_workers(4).unwrap(),
        ProgramConfig::default().with_capacity(1),
    );

    let model = program.run_blocking().unwrap();

    assert_eq!(model, MESSAGES);
    assert_eq!(renderer.count(), MESSAGES as usize + 1);
    assert_eq!(renderer.last().as_deref(), Some("200"));
}

struct RefusingSpawner;

impl Spawner for RefusingSpawner {
    fn spawn(&self, _future: BoxFuture<'static, ()>) -> Result<(), SpawnError> {
        Err(SpawnError::shutdown())
    }
}

#[test]
fn given_a_spawner_refusing_work_should_fail_with_a_runtime_fault() {
    let program = TestProgram::new(
        CounterLogic::new(Some(Command::message(1))),
        TestRenderer::new(),
        RefusingSpawner,
    );

    let Err(error) = program.run() else {
        panic!("expected a spawn failure");
    };
    assert!(matches!(error, ProgramError::Spawn(_)));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn given_a_mapped_command_should_deliver_the_lifted_message() {
    let (mut driver, _renderer) = given_a_counter_with(Some(
        Command::message(StatusMsg::Received(42)).map(|StatusMsg::Received(code)| i32::from(code)),
    ));

    driver.process_messages().unwrap();

    assert_eq!(driver.model(), Some(&42));
}

#[test]
fn given_a_test_spawner_should_queue_the_message_before_update_returns() {
    let program = TestProgram::new(
        CounterLogic::new(Some(Command::message(3))),
        TestRenderer::new(),
        create_test_spawner(),
    );
    let Ok(driver) = program.run() else {
        panic!("program failed to start");
    };

    assert_eq!(driver.pending(), 1);
}
