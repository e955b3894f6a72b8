use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::TempDir;

/// Working directory holding a valid S3.ini with dummy credentials.
fn workdir_with_credentials() -> TempDir {
    let dir = tempfile::tempdir().expect("Creating temp dir failed");
    write(
        dir.path().join("S3.ini"),
        "[AWS]\nAWS_ACCESS_KEY_ID=AKIDEXAMPLE\nAWS_SECRET_ACCESS_KEY=not-a-real-secret\n",
    )
    .expect("Writing S3.ini failed");
    dir
}

fn today_prefix(dataset: &str) -> String {
    format!(
        "delivery/dataset={dataset}/status=staged/delivery-date={}/",
        chrono::Local::now().format("%Y-%m-%d")
    )
}

#[test]
fn missing_credentials_file_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path().join("report.txt"), "hello").unwrap();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["upload", "winistry", "report.txt", "--dry-run"]);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("S3.ini").and(predicate::str::contains("not found")))
        .stdout(predicate::str::contains("Would upload").not());
}

#[test]
fn dry_run_single_file_logs_destination_key() {
    let dir = workdir_with_credentials();
    write(dir.path().join("report.txt"), "hello").unwrap();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["upload", "winistry", "report.txt", "--dry-run"]);

    let expected_key = format!("{}report.txt", today_prefix("winistry"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Would upload file"))
        .stdout(predicate::str::contains(expected_key))
        .stdout(predicate::str::contains("Uploaded file").not());
}

#[test]
fn dry_run_directory_logs_relative_keys() {
    let dir = workdir_with_credentials();
    let data = dir.path().join("data");
    std::fs::create_dir_all(data.join("sub")).unwrap();
    write(data.join("a.txt"), "a").unwrap();
    write(data.join("sub/b.txt"), "b").unwrap();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["upload", "sparkloft", "data", "-n", "-p", "2"]);

    let prefix = today_prefix("sparkloft");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!("{prefix}a.txt")))
        .stdout(predicate::str::contains(format!("{prefix}sub/b.txt")));
}

#[test]
fn dry_run_workbook_logs_one_key_per_non_empty_sheet() {
    let dir = workdir_with_credentials();
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let jan = workbook.add_worksheet();
    jan.set_name("Jan").unwrap();
    jan.write_string(0, 0, "region").unwrap();
    jan.write_string(1, 0, "north").unwrap();
    workbook.add_worksheet().set_name("Feb 2024").unwrap();
    workbook.save(dir.path().join("q.xlsx")).unwrap();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["upload", "winistry", "q.xlsx", "--dry-run"]);

    let expected_key = format!("{}q_Jan.csv", today_prefix("winistry"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Would upload sheet").count(1))
        .stdout(predicate::str::contains(expected_key))
        .stdout(predicate::str::contains("Sheet is empty. Skipping"))
        .stdout(predicate::str::contains("q_Feb_2024.csv").not());
}

#[test]
fn dashboard_with_missing_sources_still_succeeds() {
    let dir = workdir_with_credentials();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path()).args(["upload-dashboard", "--dry-run"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("File not found").count(2))
        .stdout(predicate::str::contains("Dashboard file uploads completed"));
}

#[test]
fn verbose_flag_enables_debug_lines() {
    let dir = workdir_with_credentials();
    write(dir.path().join("report.txt"), "hello").unwrap();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["--verbose", "upload", "winistry", "report.txt", "-n"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DEBUG"));
}

#[test]
fn unknown_dataset_is_a_usage_error() {
    let dir = workdir_with_credentials();

    let mut cmd = Command::cargo_bin("s3-delivery").expect("Binary exists");
    cmd.current_dir(dir.path())
        .args(["upload", "marketing", "."]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("winistry"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn run_fails_without_credentials_and_logs_why() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use s3_delivery::cli::{run, Cli, Commands, UploadArgs};

    // The package directory has no S3.ini.
    let cli = Cli {
        verbose: false,
        command: Commands::UploadDashboard {
            options: UploadArgs {
                processes: 3,
                dry_run: true,
            },
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "run should fail when S3.ini is missing");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs
            .iter()
            .any(|msg| msg.contains("Configuration file not found")),
        "Expected a 'Configuration file not found' event, got: {:?}",
        event_msgs
    );
    assert!(
        !event_msgs.iter().any(|msg| msg.contains("Starting delivery")),
        "No delivery should start without credentials"
    );
}
