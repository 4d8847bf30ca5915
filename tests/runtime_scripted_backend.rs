// tests/runtime_scripted_backend.rs
//
// Drives the full async runtime against the scripted backend from
// `squidrun-test-utils`: no OS processes, but real channels and ordering.

use tokio::sync::mpsc;

use squidrun::engine::{ProcessState, RestartPolicy, Runtime, RuntimeEvent, Supervisor};
use squidrun::output::Color;
use squidrun_test_utils::builders::specs;
use squidrun_test_utils::fake_backend::{Behaviour, ScriptedBackend};
use squidrun_test_utils::{init_tracing, with_timeout};

fn channel() -> (mpsc::Sender<RuntimeEvent>, mpsc::Receiver<RuntimeEvent>) {
    mpsc::channel(256)
}

#[tokio::test]
async fn exhausted_process_cascades_to_the_rest() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(
        tx,
        &[("api", Behaviour::Exit(1)), ("worker", Behaviour::RunUntilKilled)],
    );

    let supervisor = Supervisor::new(specs(&["api", "worker"]), RestartPolicy::default());
    let finished = with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .expect("runtime failed");

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.launch_count("api"), 6);
    assert_eq!(recorded.launch_count("worker"), 1);
    assert_eq!(recorded.terminated, vec!["worker".to_string()]);

    let attempts: Vec<u32> = recorded
        .launches
        .iter()
        .filter(|l| l.name == "api")
        .map(|l| l.attempt)
        .collect();
    assert_eq!(attempts, vec![0, 1, 2, 3, 4, 5]);

    assert_eq!(finished.cascade_origin(), Some("api"));
    for entry in finished.entries() {
        assert_eq!(entry.state(), ProcessState::Killed, "{}", entry.name());
        assert_eq!(entry.restart_count(), 5);
    }
}

#[tokio::test]
async fn clean_exits_end_the_run_without_restarts() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(
        tx,
        &[("api", Behaviour::Exit(0)), ("worker", Behaviour::Exit(0))],
    );

    let supervisor = Supervisor::new(specs(&["api", "worker"]), RestartPolicy::default());
    let finished = with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.launched_names(), vec!["api", "worker"]);
    assert_eq!(recorded.launches.len(), 2);
    assert!(recorded.terminated.is_empty());

    assert!(finished.is_finished());
    assert_eq!(finished.cascade_origin(), None);
    assert!(
        finished
            .entries()
            .iter()
            .all(|e| e.state() == ProcessState::Stopped)
    );
}

#[tokio::test]
async fn flaky_process_recovers_within_budget() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(
        tx,
        &[
            ("eth", Behaviour::Sequence(vec![1, 1, 0])),
            ("api", Behaviour::Exit(0)),
        ],
    );

    let supervisor = Supervisor::new(specs(&["api", "eth"]), RestartPolicy::default());
    let finished = with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .unwrap();

    assert_eq!(recorded.lock().unwrap().launch_count("eth"), 3);
    let eth = finished.entry("eth").unwrap();
    assert_eq!(eth.state(), ProcessState::Stopped);
    assert_eq!(eth.restart_count(), 2);
    assert_eq!(finished.entry("api").unwrap().restart_count(), 0);
}

#[tokio::test]
async fn zero_retries_never_relaunches() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(
        tx,
        &[("api", Behaviour::Exit(3)), ("worker", Behaviour::RunUntilKilled)],
    );

    let supervisor = Supervisor::new(
        specs(&["api", "worker"]),
        RestartPolicy { max_retries: 0 },
    );
    with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.launch_count("api"), 1);
    assert_eq!(recorded.terminated, vec!["worker".to_string()]);
}

#[tokio::test]
async fn spawn_failure_does_not_stop_the_others() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(
        tx,
        &[("api", Behaviour::FailSpawn), ("worker", Behaviour::Exit(0))],
    );

    let supervisor = Supervisor::new(specs(&["api", "worker"]), RestartPolicy::default());
    let finished = with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.launch_count("api"), 1);
    assert!(recorded.terminated.is_empty());

    assert_eq!(finished.entry("api").unwrap().state(), ProcessState::Killed);
    assert_eq!(finished.entry("worker").unwrap().state(), ProcessState::Stopped);
    assert_eq!(finished.cascade_origin(), None);
}

#[tokio::test]
async fn shutdown_terminates_every_running_process() {
    init_tracing();
    let (tx, rx) = channel();
    let (backend, recorded) = ScriptedBackend::new(tx.clone(), &[]);

    let supervisor = Supervisor::new(specs(&["api", "worker"]), RestartPolicy::default());
    let run = tokio::spawn(Runtime::new(supervisor, rx, backend).run());

    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();
    let finished = with_timeout(run).await.unwrap().unwrap();

    let mut terminated = recorded.lock().unwrap().terminated.clone();
    terminated.sort();
    assert_eq!(terminated, vec!["api".to_string(), "worker".to_string()]);
    assert!(finished.is_finished());
    assert_eq!(finished.cascade_origin(), None);
}

#[tokio::test]
async fn colors_follow_start_order_and_survive_restarts() {
    init_tracing();
    let (tx, rx) = channel();
    let names = ["p0", "p1", "p2", "p3", "p4", "p5"];
    let script: Vec<(&str, Behaviour)> = names
        .iter()
        .map(|n| {
            let behaviour = if *n == "p1" {
                Behaviour::Sequence(vec![1, 0])
            } else {
                Behaviour::Exit(0)
            };
            (*n, behaviour)
        })
        .collect();
    let (backend, recorded) = ScriptedBackend::new(tx, &script);

    let supervisor = Supervisor::new(specs(&names), RestartPolicy::default());
    with_timeout(Runtime::new(supervisor, rx, backend).run())
        .await
        .unwrap();

    let recorded = recorded.lock().unwrap();
    let color_of = |name: &str| -> Vec<Color> {
        recorded
            .launches
            .iter()
            .filter(|l| l.name == name)
            .map(|l| l.color)
            .collect()
    };

    assert_eq!(color_of("p0"), vec![Color::Green]);
    assert_eq!(color_of("p1"), vec![Color::Yellow, Color::Yellow]);
    assert_eq!(color_of("p4"), vec![Color::Cyan]);
    assert_eq!(color_of("p5"), vec![Color::Green]);
}
