// tests/local_processes.rs
//
// End-to-end runs against real `sh` processes through the local backend.

#![cfg(unix)]

use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use tempfile::TempDir;
use tokio::sync::mpsc;

use squidrun::engine::{LaunchSpec, ProcessState, RestartPolicy, Runtime, RuntimeEvent, Supervisor};
use squidrun::exec::{ExecutorOptions, LocalProcessBackend};
use squidrun_test_utils::buffer::SharedBuffer;
use squidrun_test_utils::builders::LaunchSpecBuilder;
use squidrun_test_utils::init_tracing;

fn shell(name: &str, script: &str) -> LaunchSpec {
    let path = std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string());
    LaunchSpecBuilder::new(name)
        .command(&["/bin/sh", "-c", script])
        .env("PATH", &path)
        .build()
}

async fn run(
    specs: Vec<LaunchSpec>,
    max_retries: u32,
    cwd: &TempDir,
) -> (Supervisor, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
    let backend = LocalProcessBackend::new(
        tx,
        ExecutorOptions {
            cwd: cwd.path().to_path_buf(),
            sink: buffer.sink(),
        },
    );

    let supervisor = Supervisor::new(specs, RestartPolicy { max_retries });
    let finished = tokio::time::timeout(
        Duration::from_secs(20),
        Runtime::new(supervisor, rx, backend).run(),
    )
    .await
    .expect("run timed out")
    .expect("runtime failed");

    (finished, buffer)
}

#[tokio::test]
async fn output_is_labelled_per_process() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let (finished, buffer) = run(
        vec![
            shell("api", "echo hello; echo oops >&2"),
            shell("eth", "printf 'no newline'"),
        ],
        5,
        &dir,
    )
    .await;

    let lines = buffer.lines();
    assert!(lines.iter().any(|l| l.ends_with("[api]\u{1b}[0m hello")), "{lines:?}");
    assert!(lines.iter().any(|l| l.ends_with("[api]\u{1b}[0m oops")), "{lines:?}");
    assert!(
        lines.iter().any(|l| l.ends_with("[eth]\u{1b}[0m no newline")),
        "{lines:?}"
    );
    assert!(
        finished
            .entries()
            .iter()
            .all(|e| e.state() == ProcessState::Stopped)
    );
}

#[tokio::test]
async fn children_see_only_the_resolved_environment_and_squid_dir() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "found").unwrap();

    let spec = LaunchSpecBuilder::new("api")
        .command(&["/bin/sh", "-c", "echo \"$GREETING\"; echo \"[$HOME]\"; cat marker.txt"])
        .env("GREETING", "hi")
        .env("PATH", "/usr/bin:/bin")
        .build();

    let (_, buffer) = run(vec![spec], 0, &dir).await;

    let bodies: Vec<String> = buffer
        .lines()
        .iter()
        .filter_map(|l| l.split_once("\u{1b}[0m ").map(|(_, b)| b.to_string()))
        .collect();
    assert_eq!(bodies, vec!["hi", "[]", "found"]);
}

#[tokio::test]
async fn failing_process_is_retried_then_cascades() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let (finished, buffer) = run(
        vec![
            shell("api", "echo attempt; exit 1"),
            shell("worker", "sleep 30"),
        ],
        2,
        &dir,
    )
    .await;

    let attempts = buffer
        .lines()
        .iter()
        .filter(|l| l.ends_with("attempt"))
        .count();
    assert_eq!(attempts, 3);

    assert_eq!(finished.cascade_origin(), Some("api"));
    let api = finished.entry("api").unwrap();
    assert_eq!(api.state(), ProcessState::Killed);
    assert_eq!(api.launches(), 3);
    assert_eq!(finished.entry("worker").unwrap().state(), ProcessState::Killed);
}

#[tokio::test]
async fn cascade_kills_grandchildren_too() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("grandchild.pid");

    // The worker forks a background sleeper and waits on it, so the sleeper
    // is a grandchild of squidrun.
    let worker_script = format!(
        "sleep 60 & echo $! > '{}'; wait",
        pid_file.display()
    );
    let started = Instant::now();
    let (finished, _) = run(
        vec![
            shell("worker", &worker_script),
            shell("api", "sleep 0.5; exit 7"),
        ],
        0,
        &dir,
    )
    .await;

    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(finished.cascade_origin(), Some("api"));

    let pid: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    // Give the kernel a moment to reap the group.
    let mut alive = true;
    for _ in 0..50 {
        alive = process_alive(pid);
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!alive, "grandchild {pid} survived the cascade");
}

#[test]
fn shutdown_leaves_no_grandchild_behind() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("grandchild.pid");
    let worker_script = format!(
        "sleep 60 & echo $! > '{}'; wait",
        pid_file.display()
    );

    // Mirror `main`: run on a runtime that is dropped as soon as `run`
    // returns, so nothing can finish the teardown afterwards.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let finished = runtime.block_on(async {
        let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
        let backend = LocalProcessBackend::new(
            tx.clone(),
            ExecutorOptions {
                cwd: dir.path().to_path_buf(),
                sink: SharedBuffer::new().sink(),
            },
        );

        let pid_path = pid_file.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                if pid_path.exists() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });

        let supervisor = Supervisor::new(
            vec![shell("worker", &worker_script)],
            RestartPolicy::default(),
        );
        tokio::time::timeout(
            Duration::from_secs(20),
            Runtime::new(supervisor, rx, backend).run(),
        )
        .await
        .expect("run timed out")
        .expect("runtime failed")
    });
    drop(runtime);

    assert!(finished.is_shutting_down());
    assert_eq!(finished.entry("worker").unwrap().state(), ProcessState::Killed);

    let pid: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    let mut alive = true;
    for _ in 0..50 {
        alive = process_alive(pid);
        if !alive {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(!alive, "grandchild {pid} survived the shutdown");
}

#[tokio::test]
async fn missing_binary_is_a_spawn_failure() {
    init_tracing();
    let dir = TempDir::new().unwrap();

    let missing = LaunchSpecBuilder::new("ghost")
        .command(&["/definitely/not/here"])
        .build();
    let (finished, buffer) = run(vec![missing, shell("api", "echo still ran")], 5, &dir).await;

    let ghost = finished.entry("ghost").unwrap();
    assert_eq!(ghost.state(), ProcessState::Killed);
    assert_eq!(ghost.launches(), 1);
    assert_eq!(finished.cascade_origin(), None);
    assert_eq!(finished.entry("api").unwrap().state(), ProcessState::Stopped);
    assert!(buffer.lines().iter().any(|l| l.ends_with("still ran")));
}

fn process_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None::<Signal>).is_ok()
        && !is_zombie(pid)
}

fn is_zombie(pid: i32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .map(|stat| {
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next())
                == Some("Z")
        })
        .unwrap_or(false)
}
