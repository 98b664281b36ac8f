use serial_test::serial;
use site_push::cli::{exit_code, run, Cli, Commands};
use site_push::load_config::TOKEN_ENV;
use std::fs::{create_dir_all, read_to_string, write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_site(root: &Path, endpoint: &str, posts: &[&str]) -> PathBuf {
    write(
        root.join("globals.js"),
        "export const siteUrl = 'https://example.com';\n",
    )
    .unwrap();
    for post in posts {
        let path = root.join("src/blogs").join(post);
        create_dir_all(path.parent().unwrap()).unwrap();
        write(path, "# post\n").unwrap();
    }
    let config = root.join("site-push.yaml");
    write(
        &config,
        format!(
            "site:\n  config_path: globals.js\n  content_dir: src/blogs\nhistory:\n  path: pushed_urls.txt\npush:\n  endpoint: {endpoint}\n"
        ),
    )
    .unwrap();
    config
}

fn push_command(config: PathBuf) -> Cli {
    Cli {
        command: Commands::Push {
            config,
            dry_run: false,
        },
    }
}

#[tokio::test]
#[serial]
async fn run_pushes_new_post_and_records_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/urls"))
        .and(query_param("site", "https://example.com"))
        .and(query_param("token", "tok"))
        .and(body_string("https://example.com/posts/foo/bar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"remain":9,"success":1}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = write_site(dir.path(), &format!("{}/urls", server.uri()), &["foo/bar.md"]);
    std::env::set_var(TOKEN_ENV, "tok");

    run(push_command(config.clone())).await.expect("run should succeed");
    assert_eq!(
        read_to_string(dir.path().join("pushed_urls.txt")).unwrap(),
        "https://example.com/posts/foo/bar\n"
    );

    // Second run finds nothing new and must not call the service again.
    run(push_command(config)).await.expect("second run should succeed");

    std::env::remove_var(TOKEN_ENV);
}

#[tokio::test]
#[serial]
async fn run_treats_unreadable_reply_as_soft_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = write_site(dir.path(), &format!("{}/urls", server.uri()), &["a.md"]);
    std::env::set_var(TOKEN_ENV, "tok");

    run(push_command(config))
        .await
        .expect("unreadable reply does not fail the run");
    assert!(!dir.path().join("pushed_urls.txt").exists());

    std::env::remove_var(TOKEN_ENV);
}

#[tokio::test]
#[serial]
async fn run_without_token_fails_with_configuration_code() {
    let dir = tempdir().unwrap();
    let config = write_site(dir.path(), "http://127.0.0.1:9/urls", &["a.md"]);
    std::env::remove_var(TOKEN_ENV);

    let err = run(push_command(config)).await.unwrap_err();
    assert_eq!(exit_code(&err), 2, "got: {err}");
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
#[serial]
async fn run_emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    // A missing config file still goes through run's entry.
    let _ = run(push_command(PathBuf::from("dummy.yaml"))).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
