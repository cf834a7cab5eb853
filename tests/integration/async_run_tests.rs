use std::time::Duration;

use mvu_program::{
    Command, Key, Message, Program, TestRenderer, ThreadPoolSpawner, TokioSpawner,
};

use super::{checker_returning, StatusLogic, StatusModel, StatusMsg};

fn tokio_spawner() -> TokioSpawner {
    let Ok(spawner) = TokioSpawner::current() else {
        panic!("tests run inside a tokio runtime");
    };
    spawner
}

#[tokio::test]
async fn given_a_slow_check_when_ran_should_return_the_final_model() {
    let renderer = TestRenderer::new();
    let check = Command::perform(async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        StatusMsg::Received(200)
    });
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        renderer.clone(),
        tokio_spawner(),
    );

    let model = program.run().await.unwrap();

    assert_eq!(
        model,
        StatusModel {
            status: 200,
            error: None
        }
    );
    assert_eq!(renderer.count(), 2);
    assert_eq!(
        renderer.last().as_deref(),
        Some("Checking https://charm.sh... 200!")
    );
}

#[tokio::test]
async fn given_a_check_exceeding_its_timeout_should_end_with_a_timeout_error() {
    let renderer = TestRenderer::new();
    let check = Command::perform(async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        StatusMsg::Received(200)
    })
    .timeout(Duration::from_millis(20));
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        renderer.clone(),
        tokio_spawner(),
    );

    let model = program.run().await.unwrap();

    assert_eq!(model.status, 0);
    assert_eq!(model.error.as_deref(), Some("timed out after 20ms"));
    assert!(renderer.last().unwrap().contains("timed out"));
}

#[tokio::test]
async fn given_an_input_source_interrupt_should_abandon_the_pending_check() {
    let renderer = TestRenderer::new();
    let check = Command::perform(std::future::pending::<StatusMsg>());
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        renderer.clone(),
        tokio_spawner(),
    );

    program
        .spawn_input(|input| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            input.emit_async(Message::Key(Key::Interrupt)).await;
        })
        .unwrap();
    let model = program.run().await.unwrap();

    assert_eq!(model, StatusModel::default());
    assert_eq!(renderer.count(), 2);
}

#[tokio::test]
async fn given_a_quit_message_queued_before_start_should_stop_without_updating() {
    let renderer = TestRenderer::new();
    let check = Command::perform(std::future::pending::<StatusMsg>());
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        renderer.clone(),
        tokio_spawner(),
    );

    program.emitter().emit(Message::Quit);
    let model = program.run().await.unwrap();

    assert_eq!(model, StatusModel::default());
    assert_eq!(renderer.count(), 1);
}

#[tokio::test]
async fn given_a_panicking_input_source_should_report_an_error_message() {
    let renderer = TestRenderer::new();
    let check = Command::perform(std::future::pending::<StatusMsg>());
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        renderer.clone(),
        tokio_spawner(),
    );

    program
        .spawn_input(|_input| async move {
            panic!("terminal input closed");
        })
        .unwrap();
    let model = program.run().await.unwrap();

    assert_eq!(
        model.error.as_deref(),
        Some("command panicked: terminal input closed")
    );
}

#[test]
fn given_a_thread_pool_when_ran_blocking_should_return_the_final_model() {
    let renderer = TestRenderer::new();
    let spawner = ThreadPoolSpawner::with_workers(2).unwrap();
    let program = Program::new(
        StatusLogic::new(checker_returning(Command::message(StatusMsg::Received(503)))),
        renderer.clone(),
        spawner,
    );

    let model = program.run_blocking().unwrap();

    assert_eq!(model.status, 503);
    assert_eq!(renderer.count(), 2);
}

#[test]
fn given_a_timeout_without_a_tokio_runtime_should_report_a_panicked_command() {
    let check = Command::message(StatusMsg::Received(200)).timeout(Duration::from_secs(1));
    let program = Program::new(
        StatusLogic::new(checker_returning(check)),
        TestRenderer::new(),
        ThreadPoolSpawner::with_workers(1).unwrap(),
    );

    let model = program.run_blocking().unwrap();

    assert_eq!(model.status, 0);
    let error = model.error.unwrap();
    assert!(error.starts_with("command panicked:"), "{error}");
}
